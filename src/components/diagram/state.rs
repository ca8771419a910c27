//! Diagram state: every mutation the host performs goes through here.
//!
//! Mutations update the store synchronously; nothing moves on screen until
//! [`Diagram::commit`] batches the pending coordinate changes into a single
//! timed transition, which [`Diagram::frame`] then plays back.

use std::collections::HashSet;

use log::{debug, info, trace};

use super::animation::{AnimationScheduler, Clock, FadeTarget, Landing, Task, Transition};
use super::config::DiagramConfig;
use super::focus::FocusNavigator;
use super::geometry::{Grid, cell_anchor};
use super::path::PathData;
use super::routing::{Endpoint, border_point, route_path};
use super::scene::{Scene, ShapeHandle};
use super::store::{EdgeEntry, GraphStore, NodeEntry, NodeVisual};
use super::types::{
	DiagramData, Direction, EdgeKey, FocusTarget, KnobDirection, NavigationLevel, Node, NodeId,
	Point,
};

pub struct Diagram<S: Scene, C: Clock> {
	config: DiagramConfig,
	grid: Grid,
	store: GraphStore,
	animation: AnimationScheduler,
	navigator: FocusNavigator,
	scene: S,
	clock: C,
	marker: Option<ShapeHandle>,
	marker_at: Point,
	committed: bool,
}

impl<S: Scene, C: Clock> Diagram<S, C> {
	pub fn new(mut scene: S, clock: C, config: DiagramConfig) -> Self {
		scene.set_scene_opacity(0.0);
		Self {
			config,
			grid: Grid::default(),
			store: GraphStore::new(),
			animation: AnimationScheduler::new(),
			navigator: FocusNavigator::new(),
			scene,
			clock,
			marker: None,
			marker_at: Point::default(),
			committed: false,
		}
	}

	pub fn scene(&self) -> &S {
		&self.scene
	}

	pub fn config(&self) -> &DiagramConfig {
		&self.config
	}

	pub fn grid(&self) -> &Grid {
		&self.grid
	}

	/// Change the logical grid. Every node is re-laid out on the next commit.
	pub fn set_size(&mut self, rows: u32, cols: u32) {
		debug!("grid size {}x{}", rows, cols);
		self.grid.rows = rows;
		self.grid.cols = cols;
		self.store.mark_all_pending();
	}

	/// Change the viewport the grid is centred in.
	pub fn set_viewport(&mut self, width: f64, height: f64) {
		if self.grid.width == width && self.grid.height == height {
			return;
		}
		debug!("viewport {}x{}", width, height);
		self.grid.width = width;
		self.grid.height = height;
		self.store.mark_all_pending();
	}

	pub fn upsert_node(&mut self, id: &str, label: &str, row: i32, col: i32, invisible: bool) {
		if let Some(change) = self.store.update_node(id, label, row, col, invisible) {
			trace!("update node {} {:?}", id, change);
			let Some(entry) = self.store.node_mut(id) else {
				return;
			};
			let shape = entry.visual.shape;
			if change.relabeled {
				let width = self.config.node_width(self.scene.measure_text(label));
				entry.visual.width = width;
				self.scene.set_label(shape, label);
				self.scene.set_size(shape, width, self.config.node_height);
			}
			if change.visibility {
				self.scene.set_visible(shape, !invisible);
				if invisible && self.focused_node() == Some(id) {
					debug!("focused node {} became invisible", id);
					self.clear_focus();
				}
			}
			return;
		}

		debug!("insert node {} at ({}, {})", id, row, col);
		let anchor = cell_anchor(row, col, &self.grid, &self.config);
		let start = Point::new(anchor.x, anchor.y + self.config.enter_offset);
		let width = self.config.node_width(self.scene.measure_text(label));
		let theme = &self.config.theme;

		let shape = self.scene.create_box(label, start);
		self.scene.set_size(shape, width, self.config.node_height);
		self.scene.set_colors(shape, theme.node_fill, theme.node_text);
		self.scene.set_opacity(shape, 0.0);
		self.scene.set_visible(shape, !invisible);

		self.store.insert_node(NodeEntry {
			node: Node {
				id: id.to_owned(),
				label: label.to_owned(),
				invisible,
				active: true,
				row,
				col,
			},
			visual: NodeVisual {
				shape,
				width,
				position: start,
				entering: true,
			},
		});
	}

	/// Detach a node at once; its box fades out and is disposed later.
	/// Edges touching it are left in place.
	pub fn remove_node(&mut self, id: &str) {
		let Some(entry) = self.store.remove_node(id) else {
			debug!("remove of unknown node {}", id);
			return;
		};
		debug!("remove node {}", id);
		let now = self.clock.now();
		let shape = entry.visual.shape;
		let from = if entry.visual.entering { 0.0 } else { 1.0 };

		self.animation.abandon(id);
		self.animation.forget_shape(shape);
		self.animation
			.fade(FadeTarget::Shape(shape), from, 0.0, now, self.config.exit_ms);
		self.animation.schedule(now + self.config.exit_ms, Task::Dispose(shape));

		if self.focused_node() == Some(id) {
			self.navigator.set(None);
		}
	}

	/// Create the edge, or re-route it in place if the ordered pair exists.
	pub fn add_edge(&mut self, from: &str, to: &str) {
		let key = EdgeKey::new(from, to);
		let path = self.route_key(&key, self.clock.now());
		if let Some(existing) = self.store.edge(&key) {
			trace!("replace edge {}", key);
			self.scene.set_path(existing.shape, &path);
			return;
		}
		debug!("add edge {} [{}]", key, path);
		let shape = self.scene.create_path(&path);
		let active = self.edge_active(&key);
		let theme = &self.config.theme;
		self.scene
			.set_stroke(shape, if active { theme.edge } else { theme.dimmed });
		self.store.insert_edge(EdgeEntry { key, shape });
	}

	pub fn remove_edge(&mut self, from: &str, to: &str) {
		let key = EdgeKey::new(from, to);
		let Some(entry) = self.store.remove_edge(&key) else {
			debug!("remove of unknown edge {}", key);
			return;
		};
		debug!("remove edge {}", key);
		self.scene.remove(entry.shape);
		if self.navigator.focus() == Some(&FocusTarget::Edge(key)) {
			self.navigator.set(None);
			self.release_marker(None);
		}
	}

	/// Focus a visible node. Unknown and invisible nodes are ignored.
	pub fn focus_node(&mut self, id: &str) {
		match self.store.node(id) {
			Some(entry) if !entry.node.invisible => {}
			_ => {
				debug!("node {} cannot take focus", id);
				return;
			}
		}
		self.focus_to_node(id.to_owned(), None);
	}

	pub fn focus_edge(&mut self, from: &str, to: &str) {
		self.focus_edge_from(from, to, None);
	}

	/// Focus an edge, flying the marker in from `origin` when given.
	pub fn focus_edge_from(&mut self, from: &str, to: &str, origin: Option<Point>) {
		let key = EdgeKey::new(from, to);
		if !self.store.contains_edge(&key) {
			debug!("edge {} cannot take focus", key);
			return;
		}
		self.navigator.remember_edge(key.clone());
		self.focus_to_edge(key, origin);
	}

	pub fn clear_focus(&mut self) {
		if let Some(FocusTarget::Node(id)) = self.navigator.set(None) {
			self.paint_node(&id);
		}
		self.release_marker(None);
	}

	pub fn move_focus(&mut self, direction: Direction) {
		let Some(current) = self.navigator.focus().cloned() else {
			debug!("move {:?} without focus", direction);
			return;
		};
		let Some(next) = self.navigator.target(&self.store, direction) else {
			debug!("no focus target {:?} of {:?}", direction, current);
			return;
		};
		let now = self.clock.now();
		match (current, next) {
			(FocusTarget::Node(_), FocusTarget::Node(id)) => {
				self.navigator.forget_edge();
				self.focus_to_node(id, None);
			}
			(FocusTarget::Edge(_), FocusTarget::Edge(key)) => {
				self.navigator.forget_edge();
				self.focus_to_edge(key, None);
			}
			(FocusTarget::Node(id), FocusTarget::Edge(key)) => {
				let origin = self
					.endpoint(&id, now)
					.map(|e| border_point(&e, direction == Direction::Left));
				self.focus_to_edge(key, origin);
			}
			(FocusTarget::Edge(key), FocusTarget::Node(id)) => {
				let landing = self
					.endpoint(&id, now)
					.map(|e| border_point(&e, direction == Direction::Right));
				self.navigator.remember_edge(key);
				self.focus_to_node(id, landing);
			}
		}
	}

	pub fn move_focus_up(&mut self) {
		self.move_focus(Direction::Up);
	}

	pub fn move_focus_down(&mut self) {
		self.move_focus(Direction::Down);
	}

	pub fn move_focus_left(&mut self) {
		self.move_focus(Direction::Left);
	}

	pub fn move_focus_right(&mut self) {
		self.move_focus(Direction::Right);
	}

	/// One knob step from the host controller.
	pub fn navigate(&mut self, level: NavigationLevel, direction: KnobDirection) {
		self.move_focus(Direction::from_knob(level, direction));
	}

	/// Start one transition for every pending node, re-route edges and
	/// recompute the active set.
	pub fn commit(&mut self) {
		let now = self.clock.now();
		let pending = self.store.take_pending();
		for id in &pending {
			let Some(entry) = self.store.node_mut(id) else {
				continue;
			};
			let end = cell_anchor(entry.node.row, entry.node.col, &self.grid, &self.config);
			let start = self
				.animation
				.position_of(id, now)
				.unwrap_or(entry.visual.position);
			self.animation.start_transition(
				id.clone(),
				Transition {
					start,
					end,
					start_time: now,
					duration: self.config.transition_ms,
				},
			);
			let shape = entry.visual.shape;
			if entry.visual.entering && !self.animation.is_fading(FadeTarget::Shape(shape)) {
				self.animation
					.fade(FadeTarget::Shape(shape), 0.0, 1.0, now, self.config.transition_ms);
				self.animation
					.schedule(now + self.config.transition_ms, Task::Revealed(shape));
			}
		}
		if !pending.is_empty() {
			debug!("commit: {} node(s) in transition", pending.len());
		}

		if !self.committed {
			info!("first commit, fading diagram in");
			self.committed = true;
			self.animation
				.fade(FadeTarget::Scene, 0.0, 1.0, now, self.config.fade_in_ms);
		}

		self.reroute_edges(now);
		self.park_marker();
		self.refresh_highlight();
	}

	/// Advance all animations to the clock's current time. Returns whether
	/// another frame is needed.
	pub fn frame(&mut self) -> bool {
		let now = self.clock.now();
		let frame = self.animation.step(now);

		for (id, at) in &frame.positions {
			if let Some(entry) = self.store.node_mut(id) {
				entry.visual.position = *at;
				self.scene.set_position(entry.visual.shape, *at);
			}
		}
		if frame.moved {
			self.reroute_edges(now);
		}

		for (target, opacity) in frame.opacities {
			match target {
				FadeTarget::Shape(shape) => self.scene.set_opacity(shape, opacity),
				FadeTarget::Scene => self.scene.set_scene_opacity(opacity),
			}
		}

		for task in frame.tasks {
			match task {
				Task::Dispose(shape) => {
					trace!("dispose {:?}", shape);
					self.scene.remove(shape);
				}
				Task::Revealed(shape) => {
					if let Some(entry) = self.store.nodes_mut().find(|e| e.visual.shape == shape) {
						entry.visual.entering = false;
					}
				}
			}
		}

		match frame.marker {
			Some((marker, at, landing)) => {
				self.scene.set_position(marker, at);
				if self.marker == Some(marker) {
					self.marker_at = at;
				}
				if landing == Some(Landing::Remove) {
					self.scene.remove(marker);
				}
			}
			None if frame.moved => self.park_marker(),
			None => {}
		}

		!self.animation.is_idle()
	}

	pub fn is_animating(&self) -> bool {
		!self.animation.is_idle()
	}

	/// Bring the diagram in line with `data` and commit.
	pub fn sync(&mut self, data: &DiagramData) {
		if data.rows != self.grid.rows || data.cols != self.grid.cols {
			self.set_size(data.rows, data.cols);
		}

		let edges: HashSet<&EdgeKey> = data.edges.iter().collect();
		let stale: Vec<EdgeKey> = self
			.store
			.edges()
			.map(|e| &e.key)
			.filter(|k| !edges.contains(k))
			.cloned()
			.collect();
		for key in stale {
			self.remove_edge(&key.from, &key.to);
		}

		let nodes: HashSet<&str> = data.nodes.iter().map(|n| n.id.as_str()).collect();
		let gone: Vec<NodeId> = self
			.store
			.nodes()
			.map(|e| &e.node.id)
			.filter(|id| !nodes.contains(id.as_str()))
			.cloned()
			.collect();
		for id in gone {
			self.remove_node(&id);
		}

		for n in &data.nodes {
			self.upsert_node(&n.id, &n.label, n.row, n.col, n.invisible);
		}
		for key in &data.edges {
			if !self.store.contains_edge(key) {
				self.add_edge(&key.from, &key.to);
			}
		}
		self.commit();
	}

	pub fn focus(&self) -> Option<&FocusTarget> {
		self.navigator.focus()
	}

	/// The element a host "select" action applies to.
	pub fn selected(&self) -> Option<FocusTarget> {
		self.navigator.focus().cloned()
	}

	pub fn preferred_edge(&self) -> Option<&EdgeKey> {
		self.navigator.preferred_edge()
	}

	pub fn node(&self, id: &str) -> Option<&Node> {
		self.store.node(id).map(|e| &e.node)
	}

	pub fn nodes(&self) -> impl Iterator<Item = &Node> {
		self.store.nodes().map(|e| &e.node)
	}

	pub fn edges(&self) -> impl Iterator<Item = &EdgeKey> {
		self.store.edges().map(|e| &e.key)
	}

	pub fn has_edge(&self, from: &str, to: &str) -> bool {
		self.store.contains_edge(&EdgeKey::new(from, to))
	}

	pub fn is_active(&self, id: &str) -> Option<bool> {
		self.node(id).map(|n| n.active)
	}

	/// Where the node's box is currently drawn.
	pub fn anchor_of(&self, id: &str) -> Option<Point> {
		self.store.node(id).map(|e| e.visual.position)
	}

	pub fn node_shape(&self, id: &str) -> Option<ShapeHandle> {
		self.store.node(id).map(|e| e.visual.shape)
	}

	pub fn edge_shape(&self, from: &str, to: &str) -> Option<ShapeHandle> {
		self.store.edge(&EdgeKey::new(from, to)).map(|e| e.shape)
	}

	pub fn marker(&self) -> Option<ShapeHandle> {
		self.marker
	}

	/// Path the edge would take right now; empty for missing endpoints.
	pub fn route(&self, from: &str, to: &str) -> PathData {
		self.route_key(&EdgeKey::new(from, to), self.clock.now())
	}

	fn focused_node(&self) -> Option<&str> {
		match self.navigator.focus() {
			Some(FocusTarget::Node(id)) => Some(id.as_str()),
			_ => None,
		}
	}

	/// Current anchor of a node: interpolated while in transition, where the
	/// box is still drawn while a move awaits commit, otherwise its grid cell.
	fn endpoint(&self, id: &str, now: f64) -> Option<Endpoint> {
		let entry = self.store.node(id)?;
		let anchor = match self.animation.position_of(id, now) {
			Some(at) => at,
			None if self.store.is_pending(id) => entry.visual.position,
			None => cell_anchor(entry.node.row, entry.node.col, &self.grid, &self.config),
		};
		Some(Endpoint {
			anchor,
			width: entry.visual.width,
			invisible: entry.node.invisible,
		})
	}

	fn route_key(&self, key: &EdgeKey, now: f64) -> PathData {
		let from = self.endpoint(&key.from, now);
		let to = self.endpoint(&key.to, now);
		route_path(from.as_ref(), to.as_ref(), &self.config)
	}

	fn reroute_edges(&mut self, now: f64) {
		let routes: Vec<(ShapeHandle, PathData)> = self
			.store
			.edges()
			.map(|e| (e.shape, self.route_key(&e.key, now)))
			.collect();
		for (shape, path) in &routes {
			self.scene.set_path(*shape, path);
		}
	}

	fn edge_active(&self, key: &EdgeKey) -> bool {
		let active = |id: &str| self.store.node(id).is_some_and(|e| e.node.active);
		active(&key.from) && active(&key.to)
	}

	fn paint_node(&mut self, id: &str) {
		let focused = self.focused_node() == Some(id);
		let Some(entry) = self.store.node(id) else {
			return;
		};
		let theme = &self.config.theme;
		let (fill, text) = if focused {
			(theme.node_text, theme.node_fill)
		} else if entry.node.active {
			(theme.node_fill, theme.node_text)
		} else {
			(theme.node_fill, theme.dimmed)
		};
		self.scene.set_colors(entry.visual.shape, fill, text);
	}

	fn refresh_highlight(&mut self) {
		let reachable = self.navigator.reachable(&self.store);
		for entry in self.store.nodes_mut() {
			entry.node.active = reachable
				.as_ref()
				.is_none_or(|r| r.contains(&entry.node.id));
		}
		if let Some(r) = &reachable {
			trace!("active set: {} of {} node(s)", r.len(), self.store.node_count());
		}

		let ids: Vec<NodeId> = self.store.nodes().map(|e| e.node.id.clone()).collect();
		for id in &ids {
			self.paint_node(id);
		}

		let edges: Vec<(ShapeHandle, bool)> = self
			.store
			.edges()
			.map(|e| (e.shape, self.edge_active(&e.key)))
			.collect();
		let theme = &self.config.theme;
		for (shape, active) in edges {
			if active {
				self.scene.set_stroke(shape, theme.edge);
				self.scene.raise(shape);
			} else {
				self.scene.set_stroke(shape, theme.dimmed);
			}
		}
		if let Some(marker) = self.marker {
			self.scene.raise(marker);
		}
	}

	fn focus_to_node(&mut self, id: NodeId, landing: Option<Point>) {
		debug!("focus node {}", id);
		if let Some(FocusTarget::Node(previous)) = self.navigator.set(Some(FocusTarget::Node(id.clone()))) {
			self.paint_node(&previous);
		}
		self.release_marker(landing);
		self.paint_node(&id);
	}

	fn focus_to_edge(&mut self, key: EdgeKey, origin: Option<Point>) {
		debug!("focus edge {}", key);
		let Some(shape) = self.store.edge(&key).map(|e| e.shape) else {
			return;
		};
		if let Some(FocusTarget::Node(previous)) = self.navigator.set(Some(FocusTarget::Edge(key))) {
			self.paint_node(&previous);
		}

		let mid = self
			.scene
			.point_at_length(shape, self.scene.path_length(shape) / 2.0);
		self.settle_flight();
		let (marker, from) = match self.marker {
			Some(marker) => (marker, origin.unwrap_or(self.marker_at)),
			None => {
				let at = origin.unwrap_or(mid);
				let theme = &self.config.theme;
				let marker = self
					.scene
					.create_marker(at, self.config.marker_radius, theme.marker);
				(marker, at)
			}
		};
		self.marker = Some(marker);
		self.scene.raise(marker);
		if from == mid {
			self.scene.set_position(marker, mid);
		} else {
			let now = self.clock.now();
			self.animation
				.fly_marker(marker, from, mid, now, self.config.marker_ms, Landing::Park);
			self.scene.set_position(marker, from);
		}
		self.marker_at = from;
	}

	/// Detach the focus marker, flying it to `landing` first when given.
	fn release_marker(&mut self, landing: Option<Point>) {
		self.settle_flight();
		let Some(marker) = self.marker.take() else {
			return;
		};
		match landing {
			Some(to) => {
				let now = self.clock.now();
				self.animation
					.fly_marker(marker, self.marker_at, to, now, self.config.marker_ms, Landing::Remove);
			}
			None => self.scene.remove(marker),
		}
	}

	/// Cut short any flight in progress, disposing a marker that was already
	/// on its way out.
	fn settle_flight(&mut self) {
		if let Some((marker, Landing::Remove)) = self.animation.ground_marker() {
			if self.marker != Some(marker) {
				self.scene.remove(marker);
			}
		}
	}

	/// Keep a parked marker on the midpoint of its edge while nodes move.
	fn park_marker(&mut self) {
		let (Some(marker), Some(FocusTarget::Edge(key))) = (self.marker, self.navigator.focus()) else {
			return;
		};
		if self.animation.marker_in_flight(marker) {
			return;
		}
		let Some(shape) = self.store.edge(key).map(|e| e.shape) else {
			return;
		};
		let mid = self
			.scene
			.point_at_length(shape, self.scene.path_length(shape) / 2.0);
		self.scene.set_position(marker, mid);
		self.marker_at = mid;
	}
}
