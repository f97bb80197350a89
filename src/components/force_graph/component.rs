//! Leptos component wrapping the concept graph canvas.
//!
//! The component creates an HTML canvas element and wires up mouse, wheel and
//! touch handlers. An animation loop runs via `requestAnimationFrame`, handing
//! each frame timestamp to [`GraphEngine::tick`]. Unmounting cancels the
//! pending frame, the resize debounce timer and the resize listener.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, TouchEvent, WheelEvent, Window,
};

use super::config::EngineConfig;
use super::engine::{GraphEngine, GraphEvent, HoverInfo};
use super::theme::Theme;
use super::types::{GraphData, GraphNode};

/// Delay before a window resize is applied, in milliseconds.
const RESIZE_DEBOUNCE_MS: i32 = 150;

/// Browser resources owned by a mounted canvas.
#[derive(Default)]
struct LoopHandles {
	animate: RefCell<Option<Closure<dyn FnMut(f64)>>>,
	frame_id: Cell<Option<i32>>,
	resize: RefCell<Option<Closure<dyn FnMut()>>>,
	resize_apply: RefCell<Option<Closure<dyn FnMut()>>>,
	resize_timer: Cell<Option<i32>>,
}

impl LoopHandles {
	fn request_frame(&self, window: &Window) {
		let id = self.animate.borrow().as_ref().and_then(|cb| {
			window
				.request_animation_frame(cb.as_ref().unchecked_ref())
				.ok()
		});
		self.frame_id.set(id);
	}

	fn teardown(&self) {
		let Some(window) = web_sys::window() else {
			return;
		};
		if let Some(id) = self.frame_id.take() {
			let _ = window.cancel_animation_frame(id);
		}
		if let Some(id) = self.resize_timer.take() {
			window.clear_timeout_with_handle(id);
		}
		if let Some(cb) = self.resize.borrow_mut().take() {
			let _ =
				window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}
		self.resize_apply.borrow_mut().take();
		self.animate.borrow_mut().take();
		info!("concept-graph: canvas unmounted");
	}
}

fn window_size(window: &Window) -> (f64, f64) {
	(
		window
			.inner_width()
			.ok()
			.and_then(|v| v.as_f64())
			.unwrap_or(0.0),
		window
			.inner_height()
			.ok()
			.and_then(|v| v.as_f64())
			.unwrap_or(0.0),
	)
}

/// Pointer position relative to the canvas' top-left corner.
fn canvas_point(canvas: &HtmlCanvasElement, client_x: i32, client_y: i32) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(client_x as f64 - rect.left(), client_y as f64 - rect.top())
}

fn touch_points(canvas: &HtmlCanvasElement, ev: &TouchEvent) -> Vec<(f64, f64)> {
	let touches = ev.touches();
	(0..touches.length())
		.filter_map(|i| touches.get(i))
		.map(|t| canvas_point(canvas, t.client_x(), t.client_y()))
		.collect()
}

/// Renders an interactive concept graph on a canvas element.
///
/// Pass graph data via the reactive `data` signal; each change is merged into
/// the running layout. `expanding_node_id` pulses one node and keeps the loop
/// drawing; `interactions_disabled` ignores node clicks while an operation is
/// in flight. The component sizes itself to its parent container by default;
/// set `fullscreen = true` to fill the viewport and follow window resizes.
#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(into, optional)] expanding_node_id: MaybeProp<String>,
	#[prop(into, optional)] interactions_disabled: MaybeProp<bool>,
	#[prop(optional)] on_node_click: Option<Callback<GraphNode>>,
	#[prop(optional)] on_hover: Option<Callback<Option<HoverInfo>>>,
	#[prop(optional)] config: Option<EngineConfig>,
	#[prop(optional)] theme: Option<Theme>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let engine: Rc<RefCell<Option<GraphEngine>>> = Rc::new(RefCell::new(None));
	let handles = Rc::new(LoopHandles::default());
	let setup = RefCell::new(Some((config.unwrap_or_default(), theme.unwrap_or_default())));

	let dispatch = move |event: Option<GraphEvent>| match event {
		Some(GraphEvent::NodeClick(node)) => {
			if let Some(cb) = on_node_click {
				cb.run(node);
			}
		}
		Some(GraphEvent::Hover(info)) => {
			if let Some(cb) = on_hover {
				cb.run(info);
			}
		}
		None => {}
	};

	let (engine_init, handles_init) = (engine.clone(), handles.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let Some((config, theme)) = setup.borrow_mut().take() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

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

		let mut ctx: CanvasRenderingContext2d = match canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into().ok())
		{
			Some(ctx) => ctx,
			None => {
				warn!("concept-graph: 2d canvas context unavailable");
				return;
			}
		};

		let mut graph = GraphEngine::new(&data.get_untracked(), w, h, config, theme);
		graph.set_expanding(expanding_node_id.get_untracked());
		graph.set_interactions_disabled(interactions_disabled.get_untracked().unwrap_or(false));
		*engine_init.borrow_mut() = Some(graph);
		info!("concept-graph: mounted {}x{} canvas", w, h);

		if fullscreen {
			let (engine_resize, canvas_resize, handles_resize) =
				(engine_init.clone(), canvas.clone(), handles_init.clone());
			*handles_init.resize_apply.borrow_mut() = Some(Closure::new(move || {
				handles_resize.resize_timer.set(None);
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = window_size(&win);
				if (canvas_resize.width(), canvas_resize.height()) == (nw as u32, nh as u32) {
					return;
				}
				// Setting the canvas size clears its bitmap.
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut e) = *engine_resize.borrow_mut() {
					e.resize(nw, nh);
					e.invalidate();
				}
			}));

			let handles_debounce = handles_init.clone();
			*handles_init.resize.borrow_mut() = Some(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				if let Some(id) = handles_debounce.resize_timer.take() {
					win.clear_timeout_with_handle(id);
				}
				let timer = handles_debounce.resize_apply.borrow().as_ref().and_then(|cb| {
					win.set_timeout_with_callback_and_timeout_and_arguments_0(
						cb.as_ref().unchecked_ref(),
						RESIZE_DEBOUNCE_MS,
					)
					.ok()
				});
				handles_debounce.resize_timer.set(timer);
			}));
			if let Some(ref cb) = *handles_init.resize.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (engine_anim, handles_anim) = (engine_init.clone(), handles_init.clone());
		*handles_init.animate.borrow_mut() = Some(Closure::new(move |now: f64| {
			if let Some(ref mut e) = *engine_anim.borrow_mut() {
				if let Err(err) = e.tick(now, &mut ctx) {
					warn!("concept-graph: frame failed: {}", err);
				}
			}
			if let Some(win) = web_sys::window() {
				handles_anim.request_frame(&win);
			}
		}));
		handles_init.request_frame(&window);
	});

	let engine_data = engine.clone();
	Effect::new(move |prev: Option<()>| {
		let graph = data.get();
		if prev.is_some() {
			if let Some(ref mut e) = *engine_data.borrow_mut() {
				e.set_graph(&graph);
			}
		}
	});

	let engine_expanding = engine.clone();
	Effect::new(move |_| {
		let id = expanding_node_id.get();
		if let Some(ref mut e) = *engine_expanding.borrow_mut() {
			e.set_expanding(id);
		}
	});

	let engine_disabled = engine.clone();
	Effect::new(move |_| {
		let disabled = interactions_disabled.get().unwrap_or(false);
		if let Some(ref mut e) = *engine_disabled.borrow_mut() {
			e.set_interactions_disabled(disabled);
		}
	});

	let teardown = StoredValue::new_local(handles.clone());
	on_cleanup(move || {
		teardown.try_with_value(|h| h.teardown());
	});

	let canvas_el = move || -> Option<HtmlCanvasElement> { canvas_ref.get().map(Into::into) };

	let engine_md = engine.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_el() else {
			return;
		};
		let (x, y) = canvas_point(&canvas, ev.client_x(), ev.client_y());
		let event = engine_md
			.borrow_mut()
			.as_mut()
			.and_then(|e| e.pointer_down(x, y));
		dispatch(event);
	};

	let engine_mm = engine.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_el() else {
			return;
		};
		let (x, y) = canvas_point(&canvas, ev.client_x(), ev.client_y());
		let (event, over_node) = match engine_mm.borrow_mut().as_mut() {
			Some(e) => {
				let event = e.pointer_move(x, y);
				(event, e.interaction().hovered.is_some())
			}
			None => (None, false),
		};
		let _ = web_sys::HtmlElement::style(&canvas).set_property("cursor", if over_node { "pointer" } else { "grab" });
		dispatch(event);
	};

	let engine_mu = engine.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut e) = *engine_mu.borrow_mut() {
			e.pointer_up();
		}
	};

	let engine_ml = engine.clone();
	let on_mouseleave = move |_: MouseEvent| {
		let event = engine_ml.borrow_mut().as_mut().and_then(|e| e.pointer_leave());
		dispatch(event);
	};

	let engine_wh = engine.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_el() else {
			return;
		};
		let (x, y) = canvas_point(&canvas, ev.client_x(), ev.client_y());
		if let Some(ref mut e) = *engine_wh.borrow_mut() {
			e.wheel(x, y, ev.delta_y());
		}
	};

	let engine_ts = engine.clone();
	let on_touchstart = move |ev: TouchEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_el() else {
			return;
		};
		let points = touch_points(&canvas, &ev);
		let event = engine_ts
			.borrow_mut()
			.as_mut()
			.and_then(|e| e.touch_start(&points));
		dispatch(event);
	};

	let engine_tm = engine.clone();
	let on_touchmove = move |ev: TouchEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_el() else {
			return;
		};
		let points = touch_points(&canvas, &ev);
		if let Some(ref mut e) = *engine_tm.borrow_mut() {
			e.touch_move(&points);
		}
	};

	let engine_te = engine.clone();
	let on_touchend = move |ev: TouchEvent| {
		let Some(canvas) = canvas_el() else {
			return;
		};
		let points = touch_points(&canvas, &ev);
		if let Some(ref mut e) = *engine_te.borrow_mut() {
			e.touch_end(&points);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			on:touchstart=on_touchstart
			on:touchmove=on_touchmove
			on:touchend=on_touchend
			style="display: block; cursor: grab; touch-action: none;"
		/>
	}
}
