use std::f64::consts::PI;

use force_graph::DefaultNodeIdx;
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{ForceGraphState, NODE_RADIUS};
use crate::api::types::{NodeType, Relation};

/// Paper titles run long; only the hovered neighbourhood shows them in full.
const LABEL_CHARS: usize = 24;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ArrowHead {
	Filled,
	Open,
	Bare,
}

/// How one relation is stroked. Dash lengths are in screen pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeStyle {
	pub rgb: (u8, u8, u8),
	pub dash: Option<(f64, f64)>,
	/// Dashes crawl from source to target.
	pub flows: bool,
	pub arrow: ArrowHead,
}

pub fn edge_style(relation: Relation) -> EdgeStyle {
	match relation {
		Relation::Cites => EdgeStyle {
			rgb: (100, 180, 255),
			dash: Some((8.0, 4.0)),
			flows: true,
			arrow: ArrowHead::Filled,
		},
		Relation::Authored => EdgeStyle {
			rgb: (255, 170, 90),
			dash: None,
			flows: false,
			arrow: ArrowHead::Open,
		},
		Relation::AffiliatedWith => EdgeStyle {
			rgb: (120, 210, 130),
			dash: Some((2.0, 4.0)),
			flows: false,
			arrow: ArrowHead::Bare,
		},
	}
}

pub fn node_radius(node_type: NodeType) -> f64 {
	match node_type {
		NodeType::Paper => NODE_RADIUS,
		NodeType::Author => NODE_RADIUS * 0.8,
		NodeType::Organization => NODE_RADIUS * 1.4,
	}
}

/// Where a node stands relative to the current hover.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Emphasis {
	Background,
	Neighbor,
	Hovered,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct NodeLook {
	alpha: f64,
	scale: f64,
	/// Glow radius as a multiple of the node radius, and its peak alpha.
	glow: Option<(f64, f64)>,
	ring: bool,
	full_label: bool,
}

/// `t` is the eased highlight progress in `[0, 1]`.
fn node_look(emphasis: Emphasis, t: f64) -> NodeLook {
	let glowing = t > 0.01;
	match emphasis {
		Emphasis::Background => NodeLook {
			alpha: 1.0 - 0.7 * t,
			scale: 1.0 - 0.15 * t,
			glow: None,
			ring: false,
			full_label: false,
		},
		Emphasis::Neighbor => NodeLook {
			alpha: 1.0,
			scale: 1.0 + 0.2 * t,
			glow: glowing.then_some((1.4 + 0.6 * t, 0.2 * t)),
			ring: false,
			full_label: true,
		},
		Emphasis::Hovered => NodeLook {
			alpha: 1.0,
			scale: 1.0 + 0.35 * t,
			glow: glowing.then_some((1.8 + 1.2 * t, 0.35 * t)),
			ring: glowing,
			full_label: true,
		},
	}
}

fn clip_label(label: &str) -> String {
	if label.chars().count() <= LABEL_CHARS {
		return label.to_string();
	}
	let mut clipped: String = label.chars().take(LABEL_CHARS - 1).collect();
	clipped.push('…');
	clipped
}

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// Draw one frame: background, edges styled by relation, then nodes shaped by
/// type with the hovered neighbourhood on top.
pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str("#1a1a2e");
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn set_dash(ctx: &CanvasRenderingContext2d, dash: Option<(f64, f64)>, k: f64) {
	let pattern = match dash {
		Some((on, off)) => {
			js_sys::Array::of2(&JsValue::from_f64(on / k), &JsValue::from_f64(off / k))
		}
		None => js_sys::Array::new(),
	};
	let _ = ctx.set_line_dash(&pattern);
}

fn draw_edges(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let (line_width, arrow_size) = (1.5 / k, 8.0 / k);
	let t = ease_out_cubic(state.hover.highlight_t);

	state.graph.visit_edges(|n1, n2, _| {
		let (x1, y1, x2, y2) = (n1.x() as f64, n1.y() as f64, n2.x() as f64, n2.y() as f64);
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			return;
		}
		let style = edge_style(
			state
				.relation(n1.index(), n2.index())
				.unwrap_or(Relation::Cites),
		);
		let (r, g, b) = style.rgb;
		let highlighted = state.is_highlighted(n1.index()) && state.is_highlighted(n2.index());

		// t=0: every edge at 0.6; t=1: highlighted edges at 0.9, the rest at 0.15
		let (alpha, width) = if highlighted {
			(0.6 + 0.3 * t, line_width * (1.0 + 0.3 * t))
		} else {
			(0.6 - 0.45 * t, line_width * (1.0 - 0.3 * t))
		};

		let (ux, uy) = (dx / dist, dy / dist);
		let (r1, r2) = (
			node_radius(n1.data.user_data.node_type),
			node_radius(n2.data.user_data.node_type),
		);
		let head = match style.arrow {
			ArrowHead::Bare => 0.0,
			_ => arrow_size,
		};

		ctx.set_stroke_style_str(&format!("rgba({r}, {g}, {b}, {alpha})"));
		ctx.set_line_width(width);
		set_dash(ctx, style.dash, k);
		if let (true, Some((on, off))) = (style.flows, style.dash) {
			let period = (on + off) / k;
			ctx.set_line_dash_offset(-(state.flow_time * 30.0) % period);
		} else {
			ctx.set_line_dash_offset(0.0);
		}
		ctx.begin_path();
		ctx.move_to(x1 + ux * r1, y1 + uy * r1);
		ctx.line_to(x2 - ux * (r2 + head), y2 - uy * (r2 + head));
		ctx.stroke();

		set_dash(ctx, None, k);
		let (tip_x, tip_y) = (x2 - ux * r2, y2 - uy * r2);
		let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		match style.arrow {
			ArrowHead::Filled => {
				ctx.set_fill_style_str(&format!("rgba({r}, {g}, {b}, {})", (alpha + 0.2).min(1.0)));
				ctx.begin_path();
				ctx.move_to(tip_x, tip_y);
				ctx.line_to(back_x + px, back_y + py);
				ctx.line_to(back_x - px, back_y - py);
				ctx.close_path();
				ctx.fill();
			}
			ArrowHead::Open => {
				ctx.begin_path();
				ctx.move_to(back_x + px, back_y + py);
				ctx.line_to(tip_x, tip_y);
				ctx.line_to(back_x - px, back_y - py);
				ctx.stroke();
			}
			ArrowHead::Bare => {}
		}
	});
	set_dash(ctx, None, k);
}

fn emphasis(state: &ForceGraphState, idx: DefaultNodeIdx) -> Emphasis {
	if !state.has_active_highlight() || !state.is_highlighted(idx) {
		Emphasis::Background
	} else if state.is_hovered(idx) {
		Emphasis::Hovered
	} else {
		Emphasis::Neighbor
	}
}

/// Papers are circles, authors diamonds, organizations squares.
fn trace_shape(ctx: &CanvasRenderingContext2d, node_type: NodeType, x: f64, y: f64, r: f64) {
	ctx.begin_path();
	match node_type {
		NodeType::Paper => {
			let _ = ctx.arc(x, y, r, 0.0, 2.0 * PI);
		}
		NodeType::Author => {
			ctx.move_to(x, y - r * 1.2);
			ctx.line_to(x + r * 1.2, y);
			ctx.line_to(x, y + r * 1.2);
			ctx.line_to(x - r * 1.2, y);
			ctx.close_path();
		}
		NodeType::Organization => ctx.rect(x - r, y - r, 2.0 * r, 2.0 * r),
	}
}

fn draw_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let (t, k) = (ease_out_cubic(state.hover.highlight_t), state.transform.k);
	let font = format!("{}px sans-serif", 10.0 / k.max(0.5));

	// background first so the highlighted neighbourhood stays on top
	for front in [false, true] {
		state.graph.visit_nodes(|node| {
			let level = emphasis(state, node.index());
			if (level != Emphasis::Background) != front {
				return;
			}
			let look = node_look(level, t);
			let info = &node.data.user_data;
			let (x, y) = (node.x() as f64, node.y() as f64);
			let radius = node_radius(info.node_type) * look.scale;

			if let Some((reach, alpha)) = look.glow {
				draw_glow(ctx, x, y, radius, radius * reach, alpha);
			}

			ctx.set_global_alpha(look.alpha);
			trace_shape(ctx, info.node_type, x, y, radius);
			ctx.set_fill_style_str(&info.color);
			ctx.fill();
			ctx.set_global_alpha(1.0);

			if look.ring {
				trace_shape(ctx, info.node_type, x, y, radius + 2.0 / k);
				ctx.set_stroke_style_str(&format!("rgba(255, 255, 255, {})", 0.7 * t));
				ctx.set_line_width(1.5 / k);
				ctx.stroke();
			}

			if let Some(label) = &info.label {
				ctx.set_font(&font);
				if look.full_label {
					ctx.set_fill_style_str("white");
					let _ = ctx.fill_text(label, x + radius + 3.0, y + 3.0);
				} else {
					ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {})", look.alpha * 0.8));
					let _ = ctx.fill_text(&clip_label(label), x + radius + 3.0, y + 3.0);
				}
			}
		});
	}
}

fn draw_glow(ctx: &CanvasRenderingContext2d, x: f64, y: f64, radius: f64, glow_radius: f64, alpha: f64) {
	let Ok(gradient) = ctx.create_radial_gradient(x, y, radius * 0.3, x, y, glow_radius) else {
		return;
	};
	let _ = gradient.add_color_stop(0.0, &format!("rgba(255, 255, 255, {alpha})"));
	let _ = gradient.add_color_stop(0.6, &format!("rgba(200, 220, 255, {})", alpha * 0.3));
	let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
	ctx.begin_path();
	let _ = ctx.arc(x, y, glow_radius, 0.0, 2.0 * PI);
	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill();
}
