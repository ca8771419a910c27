use std::fmt;

use super::types::Point;

/// An open polyline; the only path shape edges are drawn with.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathData {
	pub points: Vec<Point>,
}

impl PathData {
	pub fn new(points: Vec<Point>) -> Self {
		Self { points }
	}

	pub fn is_empty(&self) -> bool {
		self.points.len() < 2
	}

	pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
		self.points.windows(2).map(|w| (w[0], w[1]))
	}

	pub fn length(&self) -> f64 {
		self.segments().map(|(a, b)| a.distance(b)).sum()
	}

	/// Point at arc length `at`, clamped to the ends of the path.
	pub fn point_at_length(&self, at: f64) -> Point {
		let Some(&first) = self.points.first() else {
			return Point::default();
		};
		let mut remaining = at.max(0.0);
		for (a, b) in self.segments() {
			let len = a.distance(b);
			if remaining <= len {
				if len == 0.0 {
					return a;
				}
				return a.lerp(b, remaining / len);
			}
			remaining -= len;
		}
		self.points.last().copied().unwrap_or(first)
	}

	pub fn midpoint(&self) -> Point {
		self.point_at_length(self.length() / 2.0)
	}
}

/// SVG path syntax, e.g. `M 0 0 L 10 0`.
impl fmt::Display for PathData {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, p) in self.points.iter().enumerate() {
			if i > 0 {
				f.write_str(" ")?;
			}
			let cmd = if i == 0 { 'M' } else { 'L' };
			write!(f, "{cmd} {} {}", p.x, p.y)?;
		}
		Ok(())
	}
}
