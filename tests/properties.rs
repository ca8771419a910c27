//! Property-based tests for the diagram state machine.
//!
//! Random sequences of host calls are replayed against a headless diagram,
//! checking focus validity, marker bookkeeping and active-set recomputation
//! after every step.

use proptest::prelude::*;
use diagram_canvas::components::diagram::{
	Diagram, DiagramConfig, Direction, FocusTarget, Grid, ManualClock, Point, RetainedScene,
	cell_anchor, horizontal_spacing,
};

type TestDiagram = Diagram<RetainedScene, ManualClock>;

/// `(id, row, col, invisible)`
const NODES: [(&str, i32, i32, bool); 6] = [
	("in", 1, 0, false),
	("a", 0, 1, false),
	("b", 2, 1, false),
	("j", 0, 2, true),
	("c", 2, 2, false),
	("out", 1, 3, false),
];

const EDGES: [(&str, &str); 6] = [
	("in", "a"),
	("in", "b"),
	("a", "j"),
	("j", "out"),
	("b", "c"),
	("c", "out"),
];

/// Pairs the sequences may link beyond the initial wiring.
const EXTRA: [(&str, &str); 2] = [("a", "b"), ("in", "out")];

#[derive(Clone, Debug)]
enum Op {
	FocusNode(usize),
	FocusEdge(usize),
	Move(Direction),
	Clear,
	Remove(usize),
	Restore(usize),
	Link(usize),
	Unlink(usize),
	Commit,
	Advance(f64),
}

fn pair(i: usize) -> (&'static str, &'static str) {
	let all: Vec<_> = EDGES.iter().chain(EXTRA.iter()).copied().collect();
	all[i % all.len()]
}

fn direction() -> impl Strategy<Value = Direction> {
	prop_oneof![
		Just(Direction::Up),
		Just(Direction::Down),
		Just(Direction::Left),
		Just(Direction::Right),
	]
}

fn op() -> impl Strategy<Value = Op> {
	let links = EDGES.len() + EXTRA.len();
	prop_oneof![
		3 => (0..NODES.len()).prop_map(Op::FocusNode),
		2 => (0..links).prop_map(Op::FocusEdge),
		6 => direction().prop_map(Op::Move),
		1 => Just(Op::Clear),
		1 => (0..NODES.len()).prop_map(Op::Remove),
		1 => (0..NODES.len()).prop_map(Op::Restore),
		1 => (0..links).prop_map(Op::Link),
		1 => (0..links).prop_map(Op::Unlink),
		2 => Just(Op::Commit),
		2 => (0.0f64..600.0).prop_map(Op::Advance),
	]
}

fn build() -> (TestDiagram, ManualClock) {
	let clock = ManualClock::new(0.0);
	let mut d = Diagram::new(RetainedScene::default(), clock.clone(), DiagramConfig::default());
	d.set_size(3, 4);
	for (id, row, col, invisible) in NODES {
		d.upsert_node(id, id, row, col, invisible);
	}
	for (from, to) in EDGES {
		d.add_edge(from, to);
	}
	d.commit();
	(d, clock)
}

fn apply(d: &mut TestDiagram, clock: &ManualClock, op: &Op) {
	match *op {
		Op::FocusNode(i) => d.focus_node(NODES[i].0),
		Op::FocusEdge(i) => {
			let (from, to) = pair(i);
			d.focus_edge(from, to);
		}
		Op::Move(direction) => d.move_focus(direction),
		Op::Clear => d.clear_focus(),
		Op::Remove(i) => d.remove_node(NODES[i].0),
		Op::Restore(i) => {
			let (id, row, col, invisible) = NODES[i];
			d.upsert_node(id, id, row, col, invisible);
		}
		Op::Link(i) => {
			let (from, to) = pair(i);
			d.add_edge(from, to);
		}
		Op::Unlink(i) => {
			let (from, to) = pair(i);
			d.remove_edge(from, to);
		}
		Op::Commit => d.commit(),
		Op::Advance(ms) => {
			clock.advance(ms);
			d.frame();
		}
	}
}

/// Focus always names something that can hold it, and the marker exists
/// exactly while an edge is focused.
fn check_focus(d: &TestDiagram) -> Result<(), TestCaseError> {
	match d.focus() {
		Some(FocusTarget::Node(id)) => {
			let node = d.node(id);
			prop_assert!(node.is_some(), "focused node {} is gone", id);
			prop_assert!(!node.is_some_and(|n| n.invisible), "focused node {} is invisible", id);
			prop_assert!(d.marker().is_none());
		}
		Some(FocusTarget::Edge(key)) => {
			prop_assert!(d.has_edge(&key.from, &key.to), "focused edge {} is gone", key);
			let marker = d.marker();
			prop_assert!(marker.is_some_and(|m| d.scene().shape(m).is_some()));
		}
		None => prop_assert!(d.marker().is_none()),
	}
	Ok(())
}

proptest! {
	#![proptest_config(ProptestConfig::with_cases(256))]

	/// Any sequence of host calls keeps focus and marker consistent, and
	/// every commit leaves the focused element active.
	#[test]
	fn focus_survives_random_sequences(ops in prop::collection::vec(op(), 1..60)) {
		let (mut d, clock) = build();
		for op in &ops {
			apply(&mut d, &clock, op);
			check_focus(&d)?;

			if matches!(op, Op::Commit) {
				match d.focus() {
					None => prop_assert!(d.nodes().all(|n| n.active)),
					Some(FocusTarget::Node(id)) => prop_assert_eq!(d.is_active(id), Some(true)),
					Some(FocusTarget::Edge(key)) => {
						for id in [&key.from, &key.to] {
							prop_assert!(d.is_active(id).is_none_or(|a| a));
						}
					}
				}
			}
		}
	}

	/// A second commit with nothing pending changes nothing.
	#[test]
	fn commit_is_idempotent(ops in prop::collection::vec(op(), 0..40)) {
		let (mut d, clock) = build();
		for op in &ops {
			apply(&mut d, &clock, op);
		}
		d.commit();
		clock.advance(5_000.0);
		d.frame();

		let snapshot = |d: &TestDiagram| -> Vec<(String, Option<Point>, bool)> {
			d.nodes().map(|n| (n.id.clone(), d.anchor_of(&n.id), n.active)).collect()
		};
		let before = snapshot(&d);
		d.commit();
		prop_assert!(!d.is_animating());
		prop_assert_eq!(snapshot(&d), before);
	}

	/// Once settled, every node sits exactly on its cell anchor.
	#[test]
	fn settled_nodes_sit_on_their_cells(
		rows in 1u32..8,
		cols in 1u32..16,
		width in 200.0f64..2000.0,
		height in 200.0f64..1200.0,
	) {
		let (mut d, clock) = build();
		d.set_size(rows, cols);
		d.set_viewport(width, height);
		d.commit();
		clock.advance(5_000.0);
		d.frame();

		for n in d.nodes() {
			let expected = cell_anchor(n.row, n.col, d.grid(), d.config());
			prop_assert_eq!(d.anchor_of(&n.id), Some(expected));
		}
	}

	/// Spacing stays within bounds and never grows with more columns.
	#[test]
	fn spacing_is_bounded_and_monotonic(cols in 0u32..64) {
		let config = DiagramConfig::default();
		let h = horizontal_spacing(cols, &config);
		prop_assert!(h <= config.max_h_spacing);
		prop_assert!(h >= config.min_h_spacing);
		prop_assert!(horizontal_spacing(cols + 1, &config) <= h);
	}

	/// Neighbouring cells are one spacing step apart in each axis.
	#[test]
	fn cells_are_evenly_spaced(
		rows in 1u32..8,
		cols in 1u32..16,
		row in -2i32..8,
		col in -2i32..16,
	) {
		let config = DiagramConfig::default();
		let grid = Grid { rows, cols, width: 1024.0, height: 768.0 };
		let h = horizontal_spacing(cols, &config);
		let here = cell_anchor(row, col, &grid, &config);
		let right = cell_anchor(row, col + 1, &grid, &config);
		let below = cell_anchor(row + 1, col, &grid, &config);

		prop_assert!((right.x - here.x - h).abs() < 1e-9);
		prop_assert_eq!(right.y, here.y);
		prop_assert!((below.y - here.y - config.v_spacing).abs() < 1e-9);
		prop_assert_eq!(below.x, here.x);
		prop_assert_eq!(here, cell_anchor(row, col, &grid, &config));
	}
}
