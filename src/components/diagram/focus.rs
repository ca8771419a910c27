//! Focus state, directional moves and reachability highlighting.

use std::collections::{HashSet, VecDeque};

use log::trace;

use super::store::GraphStore;
use super::types::{Direction, EdgeKey, FocusTarget, NodeId};

#[derive(Debug, Default)]
pub struct FocusNavigator {
	focus: Option<FocusTarget>,
	/// Last edge focus left through; left/right moves from a node return to it.
	preferred_edge: Option<EdgeKey>,
}

impl FocusNavigator {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn focus(&self) -> Option<&FocusTarget> {
		self.focus.as_ref()
	}

	pub fn preferred_edge(&self) -> Option<&EdgeKey> {
		self.preferred_edge.as_ref()
	}

	/// Replace the focus, returning the previous one.
	pub fn set(&mut self, target: Option<FocusTarget>) -> Option<FocusTarget> {
		std::mem::replace(&mut self.focus, target)
	}

	pub fn remember_edge(&mut self, key: EdgeKey) {
		self.preferred_edge = Some(key);
	}

	pub fn forget_edge(&mut self) {
		self.preferred_edge = None;
	}

	/// Where a move in `direction` would land, if anywhere.
	pub fn target(&self, store: &GraphStore, direction: Direction) -> Option<FocusTarget> {
		let focus = self.focus.as_ref()?;
		let next = match (focus, direction) {
			(FocusTarget::Node(id), Direction::Up | Direction::Down) => {
				vertical_node(store, id, direction).map(FocusTarget::Node)
			}
			(FocusTarget::Node(id), Direction::Left | Direction::Right) => {
				incident_edge(store, id, direction, self.preferred_edge.as_ref()).map(FocusTarget::Edge)
			}
			(FocusTarget::Edge(key), Direction::Up | Direction::Down) => {
				vertical_edge(store, key, direction).map(FocusTarget::Edge)
			}
			(FocusTarget::Edge(key), Direction::Left | Direction::Right) => {
				let id = if direction == Direction::Left {
					&key.from
				} else {
					&key.to
				};
				store
					.node(id)
					.filter(|e| !e.node.invisible)
					.map(|e| FocusTarget::Node(e.node.id.clone()))
			}
		};
		trace!("focus move {:?} from {:?} -> {:?}", direction, focus, next);
		next
	}

	/// Nodes reachable from the focus by walking edges strictly forward or
	/// strictly backward. `None` while unfocused, meaning every node is active.
	pub fn reachable(&self, store: &GraphStore) -> Option<HashSet<NodeId>> {
		let focus = self.focus.as_ref()?;
		let seeds: Vec<&str> = match focus {
			FocusTarget::Node(id) => vec![id.as_str()],
			FocusTarget::Edge(key) => vec![key.from.as_str(), key.to.as_str()],
		};
		let seeds: Vec<&str> = seeds.into_iter().filter(|id| store.contains_node(id)).collect();

		let mut active: HashSet<NodeId> = seeds.iter().map(|s| (*s).to_owned()).collect();
		active.extend(walk(store, &seeds, true));
		active.extend(walk(store, &seeds, false));
		Some(active)
	}
}

/// Breadth-first walk along edges in one direction, over nodes still present.
fn walk(store: &GraphStore, seeds: &[&str], forward: bool) -> HashSet<NodeId> {
	let mut seen: HashSet<NodeId> = seeds.iter().map(|s| (*s).to_owned()).collect();
	let mut queue: VecDeque<NodeId> = seen.iter().cloned().collect();
	while let Some(id) = queue.pop_front() {
		let next: Vec<&NodeId> = if forward {
			store.outgoing(&id).map(|k| &k.to).collect()
		} else {
			store.incoming(&id).map(|k| &k.from).collect()
		};
		for n in next {
			if store.contains_node(n) && seen.insert(n.clone()) {
				queue.push_back(n.clone());
			}
		}
	}
	seen
}

/// Signed row distance from `from` to `to` in the move direction.
fn row_step(from: i32, to: i32, direction: Direction) -> i64 {
	let (from, to) = (i64::from(from), i64::from(to));
	match direction {
		Direction::Up => from - to,
		_ => to - from,
	}
}

fn vertical_node(store: &GraphStore, id: &str, direction: Direction) -> Option<NodeId> {
	let current = &store.node(id)?.node;
	let mut best: Option<(i64, &NodeId)> = None;
	for entry in store.nodes() {
		let n = &entry.node;
		if n.invisible || n.id == current.id || n.col != current.col {
			continue;
		}
		let d = row_step(current.row, n.row, direction);
		if d > 0 && best.is_none_or(|(bd, _)| d < bd) {
			best = Some((d, &n.id));
		}
	}
	best.map(|(_, id)| id.clone())
}

fn vertical_edge(store: &GraphStore, key: &EdgeKey, direction: Direction) -> Option<EdgeKey> {
	let from = &store.node(&key.from)?.node;
	let to = &store.node(&key.to)?.node;
	let mut best: Option<(i64, &EdgeKey)> = None;
	for entry in store.edges() {
		let other = &entry.key;
		if other == key {
			continue;
		}
		let (Some(of), Some(ot)) = (store.node(&other.from), store.node(&other.to)) else {
			continue;
		};
		let start = (of.node.col == from.col).then(|| row_step(from.row, of.node.row, direction));
		let end = (ot.node.col == to.col).then(|| row_step(to.row, ot.node.row, direction));
		let d = match (start, end) {
			(Some(a), Some(b)) if a >= 0 && b >= 0 => a.max(b),
			(Some(a), None) => a,
			(None, Some(b)) => b,
			_ => continue,
		};
		if d > 0 && best.is_none_or(|(bd, _)| d < bd) {
			best = Some((d, other));
		}
	}
	best.map(|(_, k)| k.clone())
}

fn incident_edge(
	store: &GraphStore,
	id: &str,
	direction: Direction,
	preferred: Option<&EdgeKey>,
) -> Option<EdgeKey> {
	let row = store.node(id)?.node.row;
	let incident: Vec<&EdgeKey> = if direction == Direction::Left {
		store.incoming(id).collect()
	} else {
		store.outgoing(id).collect()
	};
	if let Some(p) = preferred.filter(|p| incident.contains(p)) {
		return Some(p.clone());
	}
	let mut best: Option<(u32, &EdgeKey)> = None;
	for key in incident {
		let far = if direction == Direction::Left {
			&key.from
		} else {
			&key.to
		};
		let Some(far) = store.node(far) else {
			continue;
		};
		let d = far.node.row.abs_diff(row);
		if best.is_none_or(|(bd, _)| d < bd) {
			best = Some((d, key));
		}
	}
	best.map(|(_, k)| k.clone())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::diagram::scene::ShapeHandle;
	use crate::components::diagram::store::{EdgeEntry, NodeEntry, NodeVisual};
	use crate::components::diagram::types::{Node, Point};

	fn store(nodes: &[(&str, i32, i32)], edges: &[(&str, &str)]) -> GraphStore {
		let mut store = GraphStore::new();
		for (i, (id, row, col)) in nodes.iter().enumerate() {
			store.insert_node(NodeEntry {
				node: Node {
					id: (*id).into(),
					label: (*id).into(),
					invisible: id.starts_with('_'),
					active: true,
					row: *row,
					col: *col,
				},
				visual: NodeVisual {
					shape: ShapeHandle(i as u64),
					width: 60.0,
					position: Point::default(),
					entering: false,
				},
			});
		}
		for (i, (from, to)) in edges.iter().enumerate() {
			store.insert_edge(EdgeEntry {
				key: EdgeKey::new(*from, *to),
				shape: ShapeHandle(100 + i as u64),
			});
		}
		store
	}

	fn focused(target: FocusTarget) -> FocusNavigator {
		let mut nav = FocusNavigator::new();
		nav.set(Some(target));
		nav
	}

	fn node(id: &str) -> FocusTarget {
		FocusTarget::Node(id.into())
	}

	fn edge(from: &str, to: &str) -> FocusTarget {
		FocusTarget::Edge(EdgeKey::new(from, to))
	}

	fn set(ids: &[&str]) -> HashSet<NodeId> {
		ids.iter().map(|s| (*s).to_owned()).collect()
	}

	#[test]
	fn unfocused_has_no_reachable_set() {
		let s = store(&[("a", 0, 0)], &[]);
		assert!(FocusNavigator::new().reachable(&s).is_none());
		assert!(FocusNavigator::new().target(&s, Direction::Up).is_none());
	}

	#[test]
	fn chain_is_reachable_from_edge() {
		let s = store(
			&[("a", 0, 0), ("b", 0, 1), ("c", 0, 2), ("x", 1, 0)],
			&[("a", "b"), ("b", "c")],
		);
		let nav = focused(edge("a", "b"));
		assert_eq!(nav.reachable(&s), Some(set(&["a", "b", "c"])));
	}

	#[test]
	fn reachability_is_strictly_directional() {
		// a -> b <- c: from a, c is neither downstream nor upstream.
		let s = store(&[("a", 0, 0), ("b", 0, 1), ("c", 1, 0)], &[("a", "b"), ("c", "b")]);
		assert_eq!(focused(node("a")).reachable(&s), Some(set(&["a", "b"])));
		assert_eq!(focused(node("b")).reachable(&s), Some(set(&["a", "b", "c"])));
	}

	#[test]
	fn reachability_handles_cycles_and_missing_nodes() {
		let mut s = store(
			&[("a", 0, 0), ("b", 0, 1), ("c", 0, 2)],
			&[("a", "b"), ("b", "a"), ("b", "c")],
		);
		assert_eq!(focused(node("a")).reachable(&s), Some(set(&["a", "b", "c"])));
		s.remove_node("b");
		assert_eq!(focused(node("a")).reachable(&s), Some(set(&["a"])));
		assert_eq!(focused(edge("a", "b")).reachable(&s), Some(set(&["a"])));
	}

	#[test]
	fn vertical_node_moves_stay_in_column() {
		let s = store(
			&[("a", 0, 0), ("b", 2, 0), ("c", 1, 1), ("d", 3, 0), ("_j", 1, 0)],
			&[],
		);
		let nav = focused(node("a"));
		assert_eq!(nav.target(&s, Direction::Down), Some(node("b")));
		assert_eq!(nav.target(&s, Direction::Up), None);
		assert_eq!(focused(node("d")).target(&s, Direction::Up), Some(node("b")));
	}

	#[test]
	fn vertical_node_ties_pick_first_found() {
		let s = store(&[("a", 1, 0), ("b", 0, 0), ("c", 0, 0)], &[]);
		assert_eq!(focused(node("a")).target(&s, Direction::Up), Some(node("b")));
	}

	#[test]
	fn vertical_edge_moves_compare_shared_ends() {
		let s = store(
			&[("in", 1, 0), ("g", 0, 1), ("m", 2, 1), ("out", 1, 2)],
			&[("in", "g"), ("in", "m"), ("g", "out"), ("m", "out")],
		);
		// Fan-out from `in`: the starts coincide, so the end rows decide.
		assert_eq!(focused(edge("in", "g")).target(&s, Direction::Down), Some(edge("in", "m")));
		assert_eq!(focused(edge("in", "m")).target(&s, Direction::Up), Some(edge("in", "g")));
		assert_eq!(focused(edge("g", "out")).target(&s, Direction::Down), Some(edge("m", "out")));
		assert_eq!(focused(edge("in", "g")).target(&s, Direction::Up), None);
	}

	#[test]
	fn vertical_edge_with_one_shared_end() {
		let s = store(
			&[("a", 0, 0), ("b", 0, 1), ("c", 2, 0), ("d", 1, 2)],
			&[("a", "b"), ("c", "d")],
		);
		assert_eq!(focused(edge("a", "b")).target(&s, Direction::Down), Some(edge("c", "d")));
		assert_eq!(focused(edge("c", "d")).target(&s, Direction::Up), Some(edge("a", "b")));
	}

	#[test]
	fn horizontal_moves_pick_nearest_row_then_prefer_memory() {
		let s = store(
			&[("a", 1, 0), ("b", 0, 1), ("c", 1, 1), ("d", 3, 1)],
			&[("a", "b"), ("a", "d"), ("a", "c")],
		);
		let mut nav = focused(node("a"));
		assert_eq!(nav.target(&s, Direction::Right), Some(edge("a", "c")));
		assert_eq!(nav.target(&s, Direction::Left), None);

		nav.remember_edge(EdgeKey::new("a", "d"));
		assert_eq!(nav.target(&s, Direction::Right), Some(edge("a", "d")));

		// A remembered edge that is not incident is ignored.
		nav.remember_edge(EdgeKey::new("x", "y"));
		assert_eq!(nav.target(&s, Direction::Right), Some(edge("a", "c")));
	}

	#[test]
	fn edge_moves_sideways_to_visible_endpoints() {
		let s = store(&[("a", 0, 0), ("_j", 0, 1), ("c", 0, 2)], &[("a", "_j"), ("_j", "c")]);
		let nav = focused(edge("a", "_j"));
		assert_eq!(nav.target(&s, Direction::Left), Some(node("a")));
		assert_eq!(nav.target(&s, Direction::Right), None);
	}

	#[test]
	fn extreme_rows_do_not_overflow() {
		let (lo, hi) = (i32::MIN, i32::MAX);
		let s = store(
			&[("a", lo, 0), ("b", hi, 0), ("c", hi, 1), ("d", 0, 1)],
			&[("a", "c"), ("a", "d"), ("b", "d")],
		);
		assert_eq!(focused(node("a")).target(&s, Direction::Down), Some(node("b")));
		assert_eq!(focused(node("b")).target(&s, Direction::Up), Some(node("a")));
		assert_eq!(focused(node("a")).target(&s, Direction::Right), Some(edge("a", "d")));
		assert_eq!(focused(edge("a", "d")).target(&s, Direction::Down), Some(edge("a", "c")));
		assert_eq!(focused(edge("b", "d")).target(&s, Direction::Up), Some(edge("a", "d")));
	}
}
