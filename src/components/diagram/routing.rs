//! Edge path computation.

use super::config::DiagramConfig;
use super::path::PathData;
use super::types::Point;

/// Resolved geometry of one edge endpoint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Endpoint {
	/// Left edge, vertical centre.
	pub anchor: Point,
	pub width: f64,
	pub invisible: bool,
}

impl Endpoint {
	/// Where an edge leaving this node starts. Invisible nodes flip sides so a
	/// line entering on the left continues out through the right.
	fn outgoing(&self, stand_off: f64) -> Point {
		if self.invisible {
			self.left(stand_off)
		} else {
			self.right(stand_off)
		}
	}

	fn incoming(&self, stand_off: f64) -> Point {
		if self.invisible {
			self.right(stand_off)
		} else {
			self.left(stand_off)
		}
	}

	fn left(&self, stand_off: f64) -> Point {
		Point::new(self.anchor.x - stand_off, self.anchor.y)
	}

	fn right(&self, stand_off: f64) -> Point {
		Point::new(self.anchor.x + self.width + stand_off, self.anchor.y)
	}
}

/// Path from `from` to `to`: a straight segment on equal heights, otherwise
/// stand-off, vertical jog, stand-off. Missing endpoints give an empty path.
pub fn route_path(from: Option<&Endpoint>, to: Option<&Endpoint>, config: &DiagramConfig) -> PathData {
	let (Some(from), Some(to)) = (from, to) else {
		return PathData::default();
	};
	let start = from.outgoing(config.stand_off);
	let end = to.incoming(config.stand_off);

	if (start.y - end.y).abs() < f64::EPSILON {
		return PathData::new(vec![start, end]);
	}

	let jog_x = ((start.x + end.x) / 2.0).floor();
	PathData::new(vec![
		start,
		Point::new(jog_x, start.y.floor()),
		Point::new(jog_x, end.y.floor()),
		end,
	])
}

/// Point on a node's border where the focus marker lands when leaving an edge.
pub fn border_point(node: &Endpoint, incoming: bool) -> Point {
	if incoming {
		node.incoming(0.0)
	} else {
		node.outgoing(0.0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn endpoint(x: f64, y: f64) -> Endpoint {
		Endpoint {
			anchor: Point::new(x, y),
			width: 60.0,
			invisible: false,
		}
	}

	#[test]
	fn same_row_is_straight() {
		let config = DiagramConfig::default();
		let path = route_path(Some(&endpoint(0.0, 100.0)), Some(&endpoint(200.0, 100.0)), &config);
		assert_eq!(
			path.points,
			vec![Point::new(66.0, 100.0), Point::new(194.0, 100.0)]
		);
	}

	#[test]
	fn different_rows_jog_with_floored_corners() {
		let config = DiagramConfig::default();
		let path = route_path(Some(&endpoint(0.0, 100.5)), Some(&endpoint(201.0, 180.7)), &config);
		assert_eq!(path.points.len(), 4);
		assert_eq!(path.points[1], Point::new(130.0, 100.0));
		assert_eq!(path.points[2], Point::new(130.0, 180.0));
		assert_eq!(path.points[3], Point::new(195.0, 180.7));
	}

	#[test]
	fn invisible_nodes_flip_attachment_side() {
		let config = DiagramConfig::default();
		let mut junction = endpoint(100.0, 50.0);
		junction.invisible = true;
		let into = route_path(Some(&endpoint(0.0, 50.0)), Some(&junction), &config);
		assert_eq!(into.points[1], Point::new(166.0, 50.0));
		let out = route_path(Some(&junction), Some(&endpoint(300.0, 50.0)), &config);
		assert_eq!(out.points[0], Point::new(94.0, 50.0));
	}

	#[test]
	fn missing_endpoint_routes_empty() {
		let config = DiagramConfig::default();
		assert!(route_path(Some(&endpoint(0.0, 0.0)), None, &config).is_empty());
		assert!(route_path(None, None, &config).is_empty());
	}

	#[test]
	fn border_point_follows_direction() {
		let node = endpoint(10.0, 20.0);
		assert_eq!(border_point(&node, true), Point::new(10.0, 20.0));
		assert_eq!(border_point(&node, false), Point::new(70.0, 20.0));
	}
}
