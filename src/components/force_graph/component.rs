use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use leptos::prelude::*;
use send_wrapper::SendWrapper;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, Window};

use crate::architecture::config::ArchitectureConfig;
use crate::architecture::export::Snapshot;
use crate::architecture::simulation::FRAME;
use crate::architecture::types::{ArchitectureGraph, NodeDetails};

use super::render;
use super::state::ForceGraphState;

fn canvas_position(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

/// Canvas that lays out and paints an architecture graph, ticking the force
/// simulation once per animation frame until the component is unmounted.
#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] data: Signal<ArchitectureGraph>,
	#[prop(optional)] config: Option<ArchitectureConfig>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
	#[prop(optional, into)] on_select: Option<Callback<Option<NodeDetails>>>,
	#[prop(optional, into)] export_requests: Option<Signal<u32>>,
	#[prop(optional, into)] on_export: Option<Callback<Snapshot>>,
) -> impl IntoView {
	let config = config.unwrap_or_default();
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<ForceGraphState>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let running = Arc::new(AtomicBool::new(true));
	let frame_id = Arc::new(AtomicI32::new(0));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());
	let (running_init, frame_init) = (running.clone(), frame_id.clone());

	Effect::new(move |_| {
		let graph = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();

		// New batch: discard positions and reseed, keep the running frame loop.
		if let Some(ref mut s) = *state_init.borrow_mut() {
			let cleared = s.rebuild(graph, &config);
			log::debug!("graph rebuilt with {} nodes", s.layout.graph.nodes.len());
			if cleared {
				if let Some(cb) = on_select {
					cb.run(None);
				}
			}
			return;
		}

		let Some(window) = web_sys::window() else {
			return;
		};
		let (w, h) = if fullscreen {
			(
				window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0),
				window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0),
			)
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

		let ctx: CanvasRenderingContext2d = match canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		{
			Some(ctx) => ctx,
			None => {
				log::error!("canvas has no 2d context");
				return;
			}
		};
		*state_init.borrow_mut() = Some(ForceGraphState::new(graph, w, h, &config));

		if fullscreen {
			let (state_resize, canvas_resize, running_resize) =
				(state_init.clone(), canvas.clone(), running_init.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				if !running_resize.load(Ordering::Relaxed) {
					return;
				}
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = (
					win.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0),
					win.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0),
				);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, animate_inner, running_anim, frame_anim) = (
			state_init.clone(),
			animate_init.clone(),
			running_init.clone(),
			frame_init.clone(),
		);
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if !running_anim.load(Ordering::Relaxed) {
				return;
			}
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				if s.animation_running {
					s.tick(FRAME);
				}
				render::render(s, &ctx);
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let next = web_sys::window()
					.and_then(|win: Window| win.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
				if let Some(id) = next {
					frame_anim.store(id, Ordering::Relaxed);
				}
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
				frame_init.store(id, Ordering::Relaxed);
			}
		}
	});

	let (running_cleanup, frame_cleanup) = (running.clone(), frame_id.clone());
	let resize_cleanup = SendWrapper::new(resize_cb.clone());
	on_cleanup(move || {
		running_cleanup.store(false, Ordering::Relaxed);
		if let Some(win) = web_sys::window() {
			let _ = win.cancel_animation_frame(frame_cleanup.load(Ordering::Relaxed));
			if let Some(cb) = resize_cleanup.borrow_mut().take() {
				let _ =
					win.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}
		log::debug!("graph view torn down, frame loop stopped");
	});

	if let (Some(requests), Some(on_export)) = (export_requests, on_export) {
		let state_export = state.clone();
		Effect::new(move |prev: Option<u32>| {
			let current = requests.get();
			if prev.is_some_and(|p| p != current) {
				let snapshot = state_export.borrow().as_ref().map(ForceGraphState::snapshot);
				if let Some(snapshot) = snapshot {
					on_export.run(snapshot);
				}
			}
			current
		});
	}

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = canvas_position(&canvas, &ev);
		let details = match *state_md.borrow_mut() {
			Some(ref mut s) => s.press(x, y),
			None => return,
		};
		if let Some(cb) = on_select {
			cb.run(details);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = canvas_position(&canvas, &ev);

		if let Some(ref mut s) = *state_mm.borrow_mut() {
			if s.layout.dragged().is_some() {
				s.layout.drag_to(x, y);
			} else {
				let hovered = s.layout.node_at(x, y);
				s.set_hover(hovered);
			}
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			s.layout.release();
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.layout.release();
			s.set_hover(None);
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
			style="display: block; cursor: grab;"
		/>
	}
}
