use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{
	Bounds, DELETE_BUTTON_SIZE, HANDLE_RADIUS, MindMapState, NODE_HEIGHT, NODE_WIDTH,
};
use crate::graph::{GraphStore, Handle, Node, NodeKind};

const EDGE_COLOR: &str = "rgba(99, 102, 241, 0.75)";
const SELECTED_EDGE_COLOR: &str = "rgba(239, 68, 68, 0.9)";
const BODY_PREVIEW_CHARS: usize = 120;
const GRID_DOT_COLOR: &str = "#cccccc";
const MINIMAP_WIDTH: f64 = 200.0;
const MINIMAP_HEIGHT: f64 = 140.0;
const MINIMAP_MARGIN: f64 = 16.0;

struct KindStyle {
	border: &'static str,
	fill: &'static str,
	badge: &'static str,
}

fn kind_style(kind: NodeKind) -> KindStyle {
	match kind {
		NodeKind::Chapter => KindStyle {
			border: "rgba(99, 102, 241, 0.6)",
			fill: "#f5f5ff",
			badge: "#4f46e5",
		},
		NodeKind::MainTopic => KindStyle {
			border: "rgba(59, 130, 246, 0.6)",
			fill: "#f0f6ff",
			badge: "#1d4ed8",
		},
		NodeKind::SubTopic => KindStyle {
			border: "rgba(34, 197, 94, 0.6)",
			fill: "#f0fdf4",
			badge: "#15803d",
		},
	}
}

pub fn render(state: &MindMapState, store: &GraphStore, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str("#fafafa");
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	draw_grid(state, ctx);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, store, ctx);
	draw_connect_draft(state, store, ctx);
	for node in store.nodes() {
		draw_node(state, node, ctx);
	}
	ctx.restore();
	draw_minimap(state, store, ctx);
}

fn draw_grid(state: &MindMapState, ctx: &CanvasRenderingContext2d) {
	let (x0, y0, step) = state.grid();
	// too dense to read at low zoom
	if step < 6.0 {
		return;
	}
	ctx.set_fill_style_str(GRID_DOT_COLOR);
	let mut y = y0;
	while y < state.height {
		let mut x = x0;
		while x < state.width {
			ctx.fill_rect(x - 0.5, y - 0.5, 1.0, 1.0);
			x += step;
		}
		y += step;
	}
}

/// Scaled overview in the bottom-right corner: every card plus the
/// rectangle currently on screen.
fn draw_minimap(state: &MindMapState, store: &GraphStore, ctx: &CanvasRenderingContext2d) {
	let Some(cards) = Bounds::of_nodes(store.nodes()) else {
		return;
	};
	let view = state.viewport();
	let world = cards.union(view);
	let scale = (MINIMAP_WIDTH / world.width()).min(MINIMAP_HEIGHT / world.height());
	let (left, top) = (
		state.width - MINIMAP_WIDTH - MINIMAP_MARGIN,
		state.height - MINIMAP_HEIGHT - MINIMAP_MARGIN,
	);
	let map = |x: f64, y: f64| {
		(
			left + (x - world.min_x) * scale,
			top + (y - world.min_y) * scale,
		)
	};

	ctx.set_fill_style_str("rgba(255, 255, 255, 0.8)");
	ctx.fill_rect(left, top, MINIMAP_WIDTH, MINIMAP_HEIGHT);
	ctx.set_stroke_style_str("#e5e7eb");
	ctx.set_line_width(1.0);
	ctx.stroke_rect(left, top, MINIMAP_WIDTH, MINIMAP_HEIGHT);

	for node in store.nodes() {
		let p = state.position_of(node);
		let (x, y) = map(p.x, p.y);
		ctx.set_fill_style_str(kind_style(node.kind).border);
		ctx.fill_rect(x, y, NODE_WIDTH * scale, NODE_HEIGHT * scale);
	}

	let (vx, vy) = map(view.min_x, view.min_y);
	ctx.set_stroke_style_str("rgba(79, 70, 229, 0.8)");
	ctx.stroke_rect(vx, vy, view.width() * scale, view.height() * scale);
}

fn draw_edges(state: &MindMapState, store: &GraphStore, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let (dash, gap, arrow_size) = (8.0 / k, 4.0 / k, 9.0 / k);
	let dash_offset = -(state.flow_time * 30.0) % (dash + gap);

	for edge in store.edges() {
		let Some(((x1, y1), (x2, y2))) = state.edge_endpoints(store, edge) else {
			continue;
		};
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}
		let color = if state.selected_edge.as_ref() == Some(&edge.id) {
			SELECTED_EDGE_COLOR
		} else {
			EDGE_COLOR
		};

		// animated dashes, like the default edge options of the editor
		ctx.set_stroke_style_str(color);
		ctx.set_line_width(2.0 / k.max(0.5));
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(dash),
			&JsValue::from_f64(gap),
		));
		ctx.set_line_dash_offset(dash_offset);

		let (ux, uy) = (dx / dist, dy / dist);
		ctx.begin_path();
		ctx.move_to(x1, y1);
		ctx.line_to(x2 - ux * arrow_size, y2 - uy * arrow_size);
		ctx.stroke();

		let _ = ctx.set_line_dash(&js_sys::Array::new());
		ctx.set_fill_style_str(color);
		let (back_x, back_y) = (x2 - ux * arrow_size, y2 - uy * arrow_size);
		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(x2, y2);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_connect_draft(state: &MindMapState, store: &GraphStore, ctx: &CanvasRenderingContext2d) {
	let Some(draft) = &state.connect else {
		return;
	};
	let Some(source) = store.node(&draft.source) else {
		return;
	};
	let (x1, y1) = state.anchor(source, draft.handle);
	ctx.set_stroke_style_str(EDGE_COLOR);
	ctx.set_line_width(1.5 / state.transform.k);
	ctx.begin_path();
	ctx.move_to(x1, y1);
	ctx.line_to(draft.to.0, draft.to.1);
	ctx.stroke();
}

fn draw_node(state: &MindMapState, node: &Node, ctx: &CanvasRenderingContext2d) {
	let style = kind_style(node.kind);
	let p = state.position_of(node);
	let hovered = state.hovered.as_ref() == Some(&node.id);

	ctx.set_fill_style_str(style.fill);
	ctx.fill_rect(p.x, p.y, NODE_WIDTH, NODE_HEIGHT);
	ctx.set_stroke_style_str(style.border);
	ctx.set_line_width(if hovered { 3.0 } else { 2.0 });
	ctx.stroke_rect(p.x, p.y, NODE_WIDTH, NODE_HEIGHT);

	ctx.set_fill_style_str(style.badge);
	ctx.set_font("600 11px sans-serif");
	let _ = ctx.fill_text(&capitalize(node.kind.display_name()), p.x + 14.0, p.y + 22.0);

	ctx.set_fill_style_str("#111827");
	ctx.set_font("500 17px sans-serif");
	let title = if node.title.is_empty() {
		"Double click to edit"
	} else {
		node.title.as_str()
	};
	let _ = ctx.fill_text_with_max_width(title, p.x + 14.0, p.y + 50.0, NODE_WIDTH - 28.0);

	ctx.set_fill_style_str("#4b5563");
	ctx.set_font("13px sans-serif");
	let preview = body_preview(&node.body);
	let _ = ctx.fill_text_with_max_width(
		if preview.is_empty() { "Click to add content..." } else { preview.as_str() },
		p.x + 14.0,
		p.y + 80.0,
		NODE_WIDTH - 28.0,
	);

	let (bx, by) = state.delete_button(node);
	ctx.set_stroke_style_str("#dc2626");
	ctx.set_line_width(1.5);
	let inset = DELETE_BUTTON_SIZE * 0.3;
	ctx.begin_path();
	ctx.move_to(bx + inset, by + inset);
	ctx.line_to(bx + DELETE_BUTTON_SIZE - inset, by + DELETE_BUTTON_SIZE - inset);
	ctx.move_to(bx + DELETE_BUTTON_SIZE - inset, by + inset);
	ctx.line_to(bx + inset, by + DELETE_BUTTON_SIZE - inset);
	ctx.stroke();

	for handle in Handle::ALL {
		let (hx, hy) = state.anchor(node, handle);
		ctx.begin_path();
		let _ = ctx.arc(hx, hy, HANDLE_RADIUS, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(style.border);
		ctx.fill();
	}
}

fn capitalize(text: &str) -> String {
	text.split(' ')
		.map(|word| {
			let mut chars = word.chars();
			chars
				.next()
				.map(|c| c.to_uppercase().chain(chars).collect::<String>())
				.unwrap_or_default()
		})
		.collect::<Vec<_>>()
		.join(" ")
}

/// Plain-text excerpt of a markup body: tags stripped, whitespace collapsed.
fn body_preview(markup: &str) -> String {
	let mut text = String::with_capacity(markup.len());
	let mut in_tag = false;
	for c in markup.chars() {
		match c {
			'<' => {
				in_tag = true;
				text.push(' ');
			}
			'>' => in_tag = false,
			_ if !in_tag => text.push(c),
			_ => {}
		}
	}
	let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
	match collapsed.char_indices().nth(BODY_PREVIEW_CHARS) {
		Some((cut, _)) => format!("{}…", &collapsed[..cut]),
		None => collapsed,
	}
}
