//! Drawing surface the diagram renders into.
//!
//! The diagram only ever holds [`ShapeHandle`]s; the surface owns whatever
//! backs them. [`RetainedScene`] keeps every shape in memory so it can be
//! painted later (see `render`) or inspected headless.

use std::collections::BTreeMap;

use super::path::PathData;
use super::types::Point;

/// Opaque reference to a drawable owned by a [`Scene`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeHandle(pub u64);

/// Operations the diagram needs from its drawing surface. Calls with a handle
/// the surface no longer knows are ignored.
pub trait Scene {
	/// Create a labelled box whose left edge and vertical centre sit at `at`.
	fn create_box(&mut self, label: &str, at: Point) -> ShapeHandle;
	fn set_label(&mut self, shape: ShapeHandle, label: &str);
	fn set_position(&mut self, shape: ShapeHandle, at: Point);
	fn set_size(&mut self, shape: ShapeHandle, width: f64, height: f64);
	fn set_colors(&mut self, shape: ShapeHandle, fill: &str, text: &str);
	fn set_opacity(&mut self, shape: ShapeHandle, opacity: f64);
	fn set_visible(&mut self, shape: ShapeHandle, visible: bool);
	/// Rendered width of `label`.
	fn measure_text(&self, label: &str) -> f64;

	fn create_path(&mut self, data: &PathData) -> ShapeHandle;
	fn set_path(&mut self, shape: ShapeHandle, data: &PathData);
	fn set_stroke(&mut self, shape: ShapeHandle, color: &str);
	fn path_length(&self, shape: ShapeHandle) -> f64;
	fn point_at_length(&self, shape: ShapeHandle, length: f64) -> Point;

	/// Create the round focus marker centred on `at`.
	fn create_marker(&mut self, at: Point, radius: f64, color: &str) -> ShapeHandle;

	/// Move a shape to the top of the draw order.
	fn raise(&mut self, shape: ShapeHandle);
	fn remove(&mut self, shape: ShapeHandle);
	/// Opacity applied on top of every shape.
	fn set_scene_opacity(&mut self, opacity: f64);
}

/// What a retained shape draws.
#[derive(Clone, Debug, PartialEq)]
pub enum ShapeKind {
	Box {
		label: String,
		width: f64,
		height: f64,
		fill: String,
		text: String,
	},
	Path {
		data: PathData,
		stroke: String,
	},
	Marker {
		radius: f64,
		color: String,
	},
}

#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
	pub kind: ShapeKind,
	pub position: Point,
	pub opacity: f64,
	pub visible: bool,
	/// Draw order key, higher is drawn later.
	pub z: u64,
}

/// In-memory scene graph.
#[derive(Clone, Debug)]
pub struct RetainedScene {
	shapes: BTreeMap<ShapeHandle, Shape>,
	next_handle: u64,
	next_z: u64,
	pub opacity: f64,
	pub char_width: f64,
}

impl RetainedScene {
	pub fn new(char_width: f64) -> Self {
		Self {
			shapes: BTreeMap::new(),
			next_handle: 1,
			next_z: 1,
			opacity: 1.0,
			char_width,
		}
	}

	pub fn shape(&self, shape: ShapeHandle) -> Option<&Shape> {
		self.shapes.get(&shape)
	}

	pub fn len(&self) -> usize {
		self.shapes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.shapes.is_empty()
	}

	/// Visible shapes in draw order.
	pub fn draw_list(&self) -> Vec<&Shape> {
		let mut list: Vec<&Shape> = self.shapes.values().filter(|s| s.visible).collect();
		list.sort_by_key(|s| s.z);
		list
	}

	fn insert(&mut self, kind: ShapeKind, position: Point) -> ShapeHandle {
		let handle = ShapeHandle(self.next_handle);
		self.next_handle += 1;
		let z = self.bump_z();
		self.shapes.insert(
			handle,
			Shape {
				kind,
				position,
				opacity: 1.0,
				visible: true,
				z,
			},
		);
		handle
	}

	fn bump_z(&mut self) -> u64 {
		let z = self.next_z;
		self.next_z += 1;
		z
	}

	fn path_data(&self, shape: ShapeHandle) -> Option<&PathData> {
		match self.shapes.get(&shape).map(|s| &s.kind) {
			Some(ShapeKind::Path { data, .. }) => Some(data),
			_ => None,
		}
	}
}

impl Default for RetainedScene {
	fn default() -> Self {
		Self::new(9.0)
	}
}

impl Scene for RetainedScene {
	fn create_box(&mut self, label: &str, at: Point) -> ShapeHandle {
		let kind = ShapeKind::Box {
			label: label.to_owned(),
			width: 0.0,
			height: 0.0,
			fill: String::new(),
			text: String::new(),
		};
		self.insert(kind, at)
	}

	fn set_label(&mut self, shape: ShapeHandle, label: &str) {
		if let Some(ShapeKind::Box { label: l, .. }) = self.shapes.get_mut(&shape).map(|s| &mut s.kind) {
			*l = label.to_owned();
		}
	}

	fn set_position(&mut self, shape: ShapeHandle, at: Point) {
		if let Some(s) = self.shapes.get_mut(&shape) {
			s.position = at;
		}
	}

	fn set_size(&mut self, shape: ShapeHandle, w: f64, h: f64) {
		if let Some(ShapeKind::Box { width, height, .. }) =
			self.shapes.get_mut(&shape).map(|s| &mut s.kind)
		{
			*width = w;
			*height = h;
		}
	}

	fn set_colors(&mut self, shape: ShapeHandle, fill_color: &str, text_color: &str) {
		if let Some(ShapeKind::Box { fill, text, .. }) =
			self.shapes.get_mut(&shape).map(|s| &mut s.kind)
		{
			*fill = fill_color.to_owned();
			*text = text_color.to_owned();
		}
	}

	fn set_opacity(&mut self, shape: ShapeHandle, opacity: f64) {
		if let Some(s) = self.shapes.get_mut(&shape) {
			s.opacity = opacity.clamp(0.0, 1.0);
		}
	}

	fn set_visible(&mut self, shape: ShapeHandle, visible: bool) {
		if let Some(s) = self.shapes.get_mut(&shape) {
			s.visible = visible;
		}
	}

	fn measure_text(&self, label: &str) -> f64 {
		label.chars().count() as f64 * self.char_width
	}

	fn create_path(&mut self, data: &PathData) -> ShapeHandle {
		let kind = ShapeKind::Path {
			data: data.clone(),
			stroke: String::new(),
		};
		self.insert(kind, Point::default())
	}

	fn set_path(&mut self, shape: ShapeHandle, new_data: &PathData) {
		if let Some(ShapeKind::Path { data, .. }) = self.shapes.get_mut(&shape).map(|s| &mut s.kind) {
			data.clone_from(new_data);
		}
	}

	fn set_stroke(&mut self, shape: ShapeHandle, color: &str) {
		if let Some(ShapeKind::Path { stroke, .. }) = self.shapes.get_mut(&shape).map(|s| &mut s.kind)
		{
			*stroke = color.to_owned();
		}
	}

	fn path_length(&self, shape: ShapeHandle) -> f64 {
		self.path_data(shape).map_or(0.0, PathData::length)
	}

	fn point_at_length(&self, shape: ShapeHandle, length: f64) -> Point {
		self.path_data(shape)
			.map(|d| d.point_at_length(length))
			.unwrap_or_default()
	}

	fn create_marker(&mut self, at: Point, radius: f64, color: &str) -> ShapeHandle {
		let kind = ShapeKind::Marker {
			radius,
			color: color.to_owned(),
		};
		self.insert(kind, at)
	}

	fn raise(&mut self, shape: ShapeHandle) {
		if !self.shapes.contains_key(&shape) {
			return;
		}
		let z = self.bump_z();
		if let Some(s) = self.shapes.get_mut(&shape) {
			s.z = z;
		}
	}

	fn remove(&mut self, shape: ShapeHandle) {
		self.shapes.remove(&shape);
	}

	fn set_scene_opacity(&mut self, opacity: f64) {
		self.opacity = opacity.clamp(0.0, 1.0);
	}
}
