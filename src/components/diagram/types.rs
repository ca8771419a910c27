use std::fmt;

/// Node identity, supplied by the caller.
pub type NodeId = String;

/// A point in viewport pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Linear interpolation towards `to`. The ends are returned exactly.
	pub fn lerp(self, to: Point, t: f64) -> Point {
		if t <= 0.0 {
			return self;
		}
		if t >= 1.0 {
			return to;
		}
		Point::new(self.x + (to.x - self.x) * t, self.y + (to.y - self.y) * t)
	}

	pub fn distance(self, other: Point) -> f64 {
		let (dx, dy) = (other.x - self.x, other.y - self.y);
		(dx * dx + dy * dy).sqrt()
	}
}

/// Ordered `(from, to)` pair identifying a directed edge.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
	pub from: NodeId,
	pub to: NodeId,
}

impl EdgeKey {
	pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
		Self {
			from: from.into(),
			to: to.into(),
		}
	}
}

impl fmt::Display for EdgeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}->{}", self.from, self.to)
	}
}

/// A positioned vertex of the diagram.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	pub id: NodeId,
	pub label: String,
	pub invisible: bool,
	/// Derived on every commit from the focus reachability set.
	pub active: bool,
	pub row: i32,
	pub col: i32,
}

/// The single element holding focus, if any.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FocusTarget {
	Node(NodeId),
	Edge(EdgeKey),
}

/// Direction of a focus move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
	Up,
	Down,
	Left,
	Right,
}

/// Which of the two host knobs produced a navigation step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigationLevel {
	Main,
	Secondary,
}

/// Rotation sense of a knob step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KnobDirection {
	Backward,
	Forward,
}

impl Direction {
	/// Main knob walks along the signal flow, the secondary knob across rows.
	pub fn from_knob(level: NavigationLevel, direction: KnobDirection) -> Self {
		match (level, direction) {
			(NavigationLevel::Main, KnobDirection::Forward) => Direction::Right,
			(NavigationLevel::Main, KnobDirection::Backward) => Direction::Left,
			(NavigationLevel::Secondary, KnobDirection::Forward) => Direction::Down,
			(NavigationLevel::Secondary, KnobDirection::Backward) => Direction::Up,
		}
	}
}

/// Declarative node description used by [`DiagramData`].
#[derive(Clone, Debug, PartialEq)]
pub struct DiagramNode {
	pub id: NodeId,
	pub label: String,
	pub row: i32,
	pub col: i32,
	pub invisible: bool,
}

impl DiagramNode {
	pub fn new(id: impl Into<NodeId>, label: impl Into<String>, row: i32, col: i32) -> Self {
		Self {
			id: id.into(),
			label: label.into(),
			row,
			col,
			invisible: false,
		}
	}

	pub fn invisible(mut self) -> Self {
		self.invisible = true;
		self
	}
}

/// A full snapshot of what the diagram should show.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DiagramData {
	pub rows: u32,
	pub cols: u32,
	pub nodes: Vec<DiagramNode>,
	pub edges: Vec<EdgeKey>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn edge_keys_are_ordered_pairs() {
		assert_ne!(EdgeKey::new("a", "b"), EdgeKey::new("b", "a"));
		assert_eq!(EdgeKey::new("a", "b").to_string(), "a->b");
	}

	#[test]
	fn knob_steps_map_to_moves() {
		use KnobDirection::*;
		use NavigationLevel::*;
		assert_eq!(Direction::from_knob(Main, Forward), Direction::Right);
		assert_eq!(Direction::from_knob(Main, Backward), Direction::Left);
		assert_eq!(Direction::from_knob(Secondary, Forward), Direction::Down);
		assert_eq!(Direction::from_knob(Secondary, Backward), Direction::Up);
	}

	#[test]
	fn lerp_hits_endpoints() {
		let (a, b) = (Point::new(0.0, 10.0), Point::new(10.0, 30.0));
		assert_eq!(a.lerp(b, 0.0), a);
		assert_eq!(a.lerp(b, 1.0), b);
		assert_eq!(a.lerp(b, 0.5), Point::new(5.0, 20.0));
	}
}
