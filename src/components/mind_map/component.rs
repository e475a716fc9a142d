use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, MouseEvent, WheelEvent, Window,
};

use super::render;
use super::state::{ConnectDraft, MindMapState};
use crate::components::editor::Editor;

const ZOOM_STEP: f64 = 1.2;

#[component]
pub fn MindMapCanvas(
	editor: Editor,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<MindMapState>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let window: Window = web_sys::window().unwrap();

		let (w, h) = if fullscreen {
			(
				window.inner_width().unwrap().as_f64().unwrap(),
				window.inner_height().unwrap().as_f64().unwrap(),
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

		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.unwrap()
			.unwrap()
			.dyn_into()
			.unwrap();
		let mut initial = MindMapState::new(w, h);
		editor.peek(|c| initial.fit_view(c.store()));
		*state_init.borrow_mut() = Some(initial);

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let win: Window = web_sys::window().unwrap();
				let (nw, nh) = (
					win.inner_width().unwrap().as_f64().unwrap(),
					win.inner_height().unwrap().as_f64().unwrap(),
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

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick(0.016);
				editor.peek(|c| render::render(s, c.store(), &ctx));
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = web_sys::window()
					.unwrap()
					.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let local_point = move |ev: &MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		(
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		)
	};

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let (x, y) = local_point(&ev);
		let mut guard = state_md.borrow_mut();
		let Some(s) = guard.as_mut() else {
			return;
		};

		if let Some((source, handle)) = editor.peek(|c| s.handle_at(c.store(), x, y)).flatten() {
			s.connect = Some(ConnectDraft {
				source,
				handle,
				to: s.screen_to_graph(x, y),
			});
			return;
		}

		if let Some(id) = editor.peek(|c| s.delete_button_at(c.store(), x, y)).flatten() {
			s.hovered = None;
			editor.update(|c| c.delete_node(&id));
			return;
		}

		let grabbed = editor
			.peek(|c| {
				s.node_at(c.store(), x, y)
					.and_then(|id| c.store().node(&id).cloned())
			})
			.flatten();
		if let Some(node) = grabbed {
			s.begin_drag(&node, x, y);
			return;
		}

		s.selected_edge = editor.peek(|c| s.edge_at(c.store(), x, y)).flatten();
		if s.selected_edge.is_none() {
			s.pan.active = true;
			s.pan.start_x = x;
			s.pan.start_y = y;
			s.pan.transform_start_x = s.transform.x;
			s.pan.transform_start_y = s.transform.y;
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let (x, y) = local_point(&ev);
		let mut guard = state_mm.borrow_mut();
		let Some(s) = guard.as_mut() else {
			return;
		};

		if s.drag.node.is_none() {
			s.hovered = editor.peek(|c| s.node_at(c.store(), x, y)).flatten();
		}

		if let Some(draft) = s.connect.as_mut() {
			draft.to = (
				(x - s.transform.x) / s.transform.k,
				(y - s.transform.y) / s.transform.k,
			);
		} else if s.drag.node.is_some() {
			s.drag_to(x, y);
		} else if s.pan.active {
			s.transform.x = s.pan.transform_start_x + (x - s.pan.start_x);
			s.transform.y = s.pan.transform_start_y + (y - s.pan.start_y);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let (x, y) = local_point(&ev);
		let mut guard = state_mu.borrow_mut();
		let Some(s) = guard.as_mut() else {
			return;
		};

		if let Some(draft) = s.connect.take() {
			let dropped = editor
				.peek(|c| {
					s.handle_at(c.store(), x, y)
						.map(|(id, handle)| (id, Some(handle)))
						.or_else(|| s.node_at(c.store(), x, y).map(|id| (id, None)))
				})
				.flatten();
			match dropped {
				// released on the handle it started from
				Some((target, Some(handle))) if target == draft.source && handle == draft.handle => {}
				Some((target, target_handle)) => {
					editor.update(|c| {
						let _ = c.connect(&draft.source, Some(draft.handle), &target, target_handle);
					});
				}
				None => {}
			}
		}

		if let Some((id, position)) = s.end_drag() {
			editor.update(|c| {
				let _ = c.move_node(&id, position);
			});
		}
		s.pan.active = false;
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			if let Some((id, position)) = s.end_drag() {
				editor.update(|c| {
					let _ = c.move_node(&id, position);
				});
			}
			s.reset_pointer();
			s.hovered = None;
		}
	};

	let state_dc = state.clone();
	let on_dblclick = move |ev: MouseEvent| {
		let (x, y) = local_point(&ev);
		let guard = state_dc.borrow();
		let Some(s) = guard.as_ref() else {
			return;
		};
		if let Some(id) = editor.peek(|c| s.node_at(c.store(), x, y)).flatten() {
			editor.update(|c| {
				let _ = c.begin_edit(&id);
			});
		}
	};

	let state_kd = state.clone();
	let on_keydown = move |ev: KeyboardEvent| {
		if !matches!(ev.key().as_str(), "Delete" | "Backspace") {
			return;
		}
		let mut guard = state_kd.borrow_mut();
		let Some(s) = guard.as_mut() else {
			return;
		};
		if let Some(id) = s.selected_edge.take() {
			ev.prevent_default();
			editor.update(|c| c.delete_edge(&id));
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);

		if let Some(ref mut s) = *state_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			s.zoom_at(x, y, factor);
		}
	};

	let state_zoom = state.clone();
	let zoom_by = move |factor: f64| {
		if let Some(ref mut s) = *state_zoom.borrow_mut() {
			s.zoom_centered(factor);
		}
	};
	let state_fit = state.clone();
	let fit = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_fit.borrow_mut() {
			editor.peek(|c| s.fit_view(c.store()));
		}
	};
	let zoom_out = zoom_by.clone();

	view! {
		<div
			class="mind-map-controls"
			style="position: fixed; left: 16px; bottom: 16px; display: flex; flex-direction: column; \
			       background: rgba(255,255,255,0.6); border: 1px solid #e5e7eb; border-radius: 6px; \
			       box-shadow: 0 1px 2px rgba(0,0,0,0.05);"
		>
			<button title="Zoom in" on:click=move |_| zoom_by(ZOOM_STEP)>"+"</button>
			<button title="Zoom out" on:click=move |_| zoom_out(1.0 / ZOOM_STEP)>"−"</button>
			<button title="Fit view" on:click=fit>"⤢"</button>
		</div>
		<canvas
			node_ref=canvas_ref
			class="mind-map-canvas"
			tabindex="0"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:dblclick=on_dblclick
			on:keydown=on_keydown
			on:wheel=on_wheel
			style="display: block; cursor: grab; outline: none;"
		/>
	}
}
