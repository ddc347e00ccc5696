use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::architecture::types::GraphNode;

use super::state::{ForceGraphState, category_color};

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str("#1a1a2e");
	ctx.fill_rect(0.0, 0.0, state.width(), state.height());
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
}

/// Point where the segment from the node centre toward `(tx, ty)` leaves its rectangle.
fn border_point(node: &GraphNode, tx: f64, ty: f64) -> (f64, f64) {
	let (dx, dy) = (tx - node.x, ty - node.y);
	let (hw, hh) = (node.width / 2.0, node.height / 2.0);
	let sx = if dx.abs() > f64::EPSILON { hw / dx.abs() } else { f64::INFINITY };
	let sy = if dy.abs() > f64::EPSILON { hh / dy.abs() } else { f64::INFINITY };
	let s = sx.min(sy).min(1.0);
	(node.x + dx * s, node.y + dy * s)
}

fn draw_edges(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let nodes = &state.layout.graph.nodes;
	let (dash, gap, arrow_size) = (8.0, 4.0, 8.0);
	let dash_offset = -(state.flow_time * 30.0) % (dash + gap);
	let t = ease_out_cubic(state.hover.highlight_t);

	for &(a, b) in &state.layout.links {
		let (from, to) = (&nodes[a], &nodes[b]);
		let (x1, y1) = border_point(from, to.x, to.y);
		let (x2, y2) = border_point(to, from.x, from.y);
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}

		let lit = state.is_highlighted(a) && state.is_highlighted(b);
		let (edge_alpha, width) = if lit {
			(0.6 + 0.3 * t, 1.5 * (1.0 + 0.3 * t))
		} else {
			(0.6 - 0.45 * t, 1.5 * (1.0 - 0.3 * t))
		};

		ctx.set_stroke_style_str(&format!("rgba(100, 180, 255, {})", edge_alpha));
		ctx.set_line_width(width);
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
		ctx.set_fill_style_str(&format!("rgba(100, 180, 255, {})", edge_alpha + 0.2));
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

fn draw_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let t = ease_out_cubic(state.hover.highlight_t);
	let dimmed = state.hover.node.is_some();

	for (idx, node) in state.layout.graph.nodes.iter().enumerate() {
		let alpha = if dimmed && !state.is_highlighted(idx) { 1.0 - 0.6 * t } else { 1.0 };
		let (left, top) = (node.x - node.width / 2.0, node.y - node.height / 2.0);

		ctx.set_global_alpha(alpha);
		ctx.set_fill_style_str(category_color(node.category));
		ctx.fill_rect(left, top, node.width, node.height);

		if node.is_group() {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(4.0),
				&JsValue::from_f64(3.0),
			));
			ctx.set_stroke_style_str("rgba(255, 255, 255, 0.8)");
			ctx.set_line_width(1.5);
			ctx.stroke_rect(left, top, node.width, node.height);
			let _ = ctx.set_line_dash(&js_sys::Array::new());
		}

		if state.selected == Some(idx) || state.layout.dragged() == Some(idx) {
			ctx.set_stroke_style_str("white");
			ctx.set_line_width(2.5);
			ctx.stroke_rect(left - 2.0, top - 2.0, node.width + 4.0, node.height + 4.0);
		}

		ctx.set_fill_style_str("white");
		ctx.set_font("12px sans-serif");
		ctx.set_text_align("center");
		ctx.set_text_baseline("middle");
		let _ = ctx.fill_text_with_max_width(&node.name, node.x, node.y, node.width - 8.0);
		ctx.set_global_alpha(1.0);
	}
}
