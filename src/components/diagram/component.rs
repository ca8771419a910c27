use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, Performance, Window};

use super::animation::Clock;
use super::config::DiagramConfig;
use super::error::MountError;
use super::render;
use super::scene::RetainedScene;
use super::state::Diagram;
use super::types::{DiagramData, Direction};

/// Browser `performance.now()`, falling back to wall-clock time.
#[derive(Clone, Debug)]
pub struct PerformanceClock(Option<Performance>);

impl PerformanceClock {
	pub fn new() -> Self {
		Self(web_sys::window().and_then(|w| w.performance()))
	}
}

impl Default for PerformanceClock {
	fn default() -> Self {
		Self::new()
	}
}

impl Clock for PerformanceClock {
	fn now(&self) -> f64 {
		self.0.as_ref().map_or_else(js_sys::Date::now, Performance::now)
	}
}

struct Mounted {
	diagram: Diagram<RetainedScene, PerformanceClock>,
	ctx: CanvasRenderingContext2d,
	width: f64,
	height: f64,
}

#[component]
pub fn DiagramCanvas(
	#[prop(into)] data: Signal<DiagramData>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
	#[prop(optional)] config: Option<DiagramConfig>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<Mounted>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let key_cb: Rc<RefCell<Option<Closure<dyn FnMut(KeyboardEvent)>>>> = Rc::new(RefCell::new(None));
	let config = config.unwrap_or_default();

	Effect::new(move |_| {
		let snapshot = data.get();
		if let Some(ref mut m) = *state.borrow_mut() {
			m.diagram.sync(&snapshot);
			return;
		}

		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let mut mounted = match mount(&canvas, fullscreen, width, height, config.clone()) {
			Ok(mounted) => mounted,
			Err(e) => {
				warn!("diagram canvas unavailable: {e}");
				return;
			}
		};
		mounted.diagram.sync(&snapshot);
		*state.borrow_mut() = Some(mounted);

		let Some(window) = web_sys::window() else {
			return;
		};

		if fullscreen {
			let (state_resize, canvas_resize) = (state.clone(), canvas.clone());
			*resize_cb.borrow_mut() = Some(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = window_size(&win);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut m) = *state_resize.borrow_mut() {
					m.width = nw;
					m.height = nh;
					m.diagram.set_viewport(nw, nh);
					m.diagram.commit();
				}
			}));
			if let Some(ref cb) = *resize_cb.borrow() {
				let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let state_keys = state.clone();
		*key_cb.borrow_mut() = Some(Closure::new(move |ev: KeyboardEvent| {
			let direction = match ev.key().as_str() {
				"ArrowUp" => Some(Direction::Up),
				"ArrowDown" => Some(Direction::Down),
				"ArrowLeft" => Some(Direction::Left),
				"ArrowRight" => Some(Direction::Right),
				"Escape" => None,
				_ => return,
			};
			ev.prevent_default();
			if let Some(ref mut m) = *state_keys.borrow_mut() {
				let d = &mut m.diagram;
				match direction {
					Some(_) if d.focus().is_none() => {
						let first = d.nodes().find(|n| !n.invisible).map(|n| n.id.clone());
						if let Some(id) = first {
							d.focus_node(&id);
						}
					}
					Some(direction) => d.move_focus(direction),
					None => d.clear_focus(),
				}
				d.commit();
			}
		}));
		if let Some(ref cb) = *key_cb.borrow() {
			let _ = window.add_event_listener_with_callback("keydown", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner) = (state.clone(), animate.clone());
		*animate.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut m) = *state_anim.borrow_mut() {
				if m.diagram.is_animating() {
					m.diagram.frame();
				}
				let background = m.diagram.config().theme.background;
				render::render(m.diagram.scene(), background, &m.ctx, m.width, m.height);
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				if let Some(win) = web_sys::window() {
					let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
				}
			}
		}));
		if let Some(ref cb) = *animate.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	view! {
		<canvas
			node_ref=canvas_ref
			class="diagram-canvas"
			tabindex="0"
			style="display: block;"
		/>
	}
}

fn mount(
	canvas: &HtmlCanvasElement,
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
	config: DiagramConfig,
) -> Result<Mounted, MountError> {
	let window = web_sys::window().ok_or(MountError::NoWindow)?;
	let (w, h) = if fullscreen {
		window_size(&window)
	} else {
		(
			width.unwrap_or_else(|| {
				canvas
					.parent_element()
					.map(|p| p.client_width() as f64)
					.unwrap_or(800.0)
			}),
			height.unwrap_or_else(|| {
				canvas
					.parent_element()
					.map(|p| p.client_height() as f64)
					.unwrap_or(600.0)
			}),
		)
	};
	canvas.set_width(w as u32);
	canvas.set_height(h as u32);

	let ctx = context_2d(canvas)?;
	let scene = RetainedScene::new(config.char_width);
	let mut diagram = Diagram::new(scene, PerformanceClock::new(), config);
	diagram.set_viewport(w, h);
	info!("diagram canvas mounted at {}x{}", w, h);

	Ok(Mounted {
		diagram,
		ctx,
		width: w,
		height: h,
	})
}

fn window_size(window: &Window) -> (f64, f64) {
	let dim = |v: Result<JsValue, JsValue>, fallback: f64| v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback);
	(dim(window.inner_width(), 800.0), dim(window.inner_height(), 600.0))
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, MountError> {
	canvas
		.get_context("2d")
		.map_err(|e| MountError::Context(format!("{e:?}")))?
		.ok_or(MountError::NoContext)?
		.dyn_into::<CanvasRenderingContext2d>()
		.map_err(|_| MountError::WrongContext)
}
