//! Time-driven presentation state.
//!
//! Nothing here mutates the graph. [`AnimationScheduler::step`] is a function
//! of the injected time and the recorded transitions, so tests drive it with
//! a [`ManualClock`].

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use super::scene::ShapeHandle;
use super::types::{NodeId, Point};

/// Monotonic millisecond time source.
pub trait Clock {
	fn now(&self) -> f64;
}

/// Clock advanced by hand. Clones share the same time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock(Rc<Cell<f64>>);

impl ManualClock {
	pub fn new(start: f64) -> Self {
		Self(Rc::new(Cell::new(start)))
	}

	pub fn set(&self, now: f64) {
		self.0.set(now);
	}

	pub fn advance(&self, ms: f64) {
		self.0.set(self.0.get() + ms);
	}
}

impl Clock for ManualClock {
	fn now(&self) -> f64 {
		self.0.get()
	}
}

fn progress(now: f64, start_time: f64, duration: f64) -> f64 {
	if duration <= 0.0 {
		return 1.0;
	}
	((now - start_time) / duration).clamp(0.0, 1.0)
}

/// A node moving from `start` to `end`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
	pub start: Point,
	pub end: Point,
	pub start_time: f64,
	pub duration: f64,
}

impl Transition {
	pub fn progress(&self, now: f64) -> f64 {
		progress(now, self.start_time, self.duration)
	}

	pub fn position_at(&self, now: f64) -> Point {
		self.start.lerp(self.end, self.progress(now))
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FadeTarget {
	Shape(ShapeHandle),
	Scene,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Fade {
	target: FadeTarget,
	from: f64,
	to: f64,
	start_time: f64,
	duration: f64,
}

/// One-shot work due at a point in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
	/// Drop a shape whose exit animation has finished.
	Dispose(ShapeHandle),
	/// A new node's box has finished appearing.
	Revealed(ShapeHandle),
}

/// What happens to the focus marker when its flight lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Landing {
	Park,
	Remove,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct MarkerFlight {
	marker: ShapeHandle,
	from: Point,
	to: Point,
	start_time: f64,
	duration: f64,
	landing: Landing,
}

/// Everything a single frame has to apply to the scene.
#[derive(Debug, Default, PartialEq)]
pub struct Frame {
	pub positions: Vec<(NodeId, Point)>,
	pub opacities: Vec<(FadeTarget, f64)>,
	pub tasks: Vec<Task>,
	/// Marker position this frame, with the landing action once it arrives.
	pub marker: Option<(ShapeHandle, Point, Option<Landing>)>,
	/// Whether any node moved, so edges need re-routing.
	pub moved: bool,
}

#[derive(Debug, Default)]
pub struct AnimationScheduler {
	transitions: HashMap<NodeId, Transition>,
	fades: Vec<Fade>,
	tasks: Vec<(f64, Task)>,
	flight: Option<MarkerFlight>,
}

impl AnimationScheduler {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn start_transition(&mut self, id: NodeId, transition: Transition) {
		self.transitions.insert(id, transition);
	}

	/// Forget a node's transition, e.g. when it is removed mid-flight.
	pub fn abandon(&mut self, id: &str) {
		self.transitions.remove(id);
	}

	/// Interpolated position of a node that is mid-transition.
	pub fn position_of(&self, id: &str, now: f64) -> Option<Point> {
		self.transitions.get(id).map(|t| t.position_at(now))
	}

	pub fn fade(&mut self, target: FadeTarget, from: f64, to: f64, now: f64, duration: f64) {
		self.fades.retain(|f| f.target != target);
		self.fades.push(Fade {
			target,
			from,
			to,
			start_time: now,
			duration,
		});
	}

	pub fn is_fading(&self, target: FadeTarget) -> bool {
		self.fades.iter().any(|f| f.target == target)
	}

	pub fn schedule(&mut self, due: f64, task: Task) {
		self.tasks.push((due, task));
	}

	/// Drop pending fades and reveal tasks for a shape that is going away.
	pub fn forget_shape(&mut self, shape: ShapeHandle) {
		self.fades.retain(|f| f.target != FadeTarget::Shape(shape));
		self.tasks.retain(|(_, t)| *t != Task::Revealed(shape));
	}

	pub fn fly_marker(&mut self, marker: ShapeHandle, from: Point, to: Point, now: f64, duration: f64, landing: Landing) {
		self.flight = Some(MarkerFlight {
			marker,
			from,
			to,
			start_time: now,
			duration,
			landing,
		});
	}

	pub fn marker_in_flight(&self, marker: ShapeHandle) -> bool {
		self.flight.is_some_and(|f| f.marker == marker)
	}

	/// Stop a flight without applying its landing, handing the landing back.
	pub fn ground_marker(&mut self) -> Option<(ShapeHandle, Landing)> {
		self.flight.take().map(|f| (f.marker, f.landing))
	}

	pub fn is_idle(&self) -> bool {
		self.transitions.is_empty() && self.fades.is_empty() && self.tasks.is_empty() && self.flight.is_none()
	}

	/// Advance to `now`. Transitions are cleared together once every one of
	/// them has reached its end.
	pub fn step(&mut self, now: f64) -> Frame {
		let mut frame = Frame::default();

		if !self.transitions.is_empty() {
			frame.moved = true;
			let mut finished = true;
			for (id, t) in &self.transitions {
				frame.positions.push((id.clone(), t.position_at(now)));
				finished &= t.progress(now) >= 1.0;
			}
			if finished {
				self.transitions.clear();
			}
		}

		self.fades.retain(|f| {
			let p = progress(now, f.start_time, f.duration);
			frame.opacities.push((f.target, f.from + (f.to - f.from) * p));
			p < 1.0
		});

		let (due, later): (Vec<_>, Vec<_>) = self.tasks.drain(..).partition(|(at, _)| *at <= now);
		self.tasks = later;
		frame.tasks = due.into_iter().map(|(_, t)| t).collect();

		if let Some(flight) = self.flight {
			let p = progress(now, flight.start_time, flight.duration);
			let at = flight.from.lerp(flight.to, p);
			if p >= 1.0 {
				self.flight = None;
				frame.marker = Some((flight.marker, at, Some(flight.landing)));
			} else {
				frame.marker = Some((flight.marker, at, None));
			}
		}

		frame
	}
}
