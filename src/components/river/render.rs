//! Canvas painting of a [`Scene`].
//!
//! Passes, back to front:
//! 1. Background (screen space)
//! 2. Year grid, links, nodes, same-lane markers (world space)
//!
//! Pulsing elements get a glow drawn in the same pass as the element, so
//! markers stay on top of everything.

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::geometry::{Rect, Viewport};
use super::scale::{ScaleConfig, ScaledValues};
use super::scene::{LinkShape, MarkerShape, NodeFill, NodeShape, Scene};
use super::theme::Theme;
use super::types::LinkType;
use super::viewport::ViewTransform;

const LABEL_INSET: f64 = 4.0;

fn smooth_step(t: f64) -> f64 {
	let t = t.clamp(0.0, 1.0);
	t * t * (3.0 - 2.0 * t)
}

/// Paint the whole scene.
pub fn render(
	scene: &Scene,
	transform: ViewTransform,
	viewport: Viewport,
	ctx: &CanvasRenderingContext2d,
	config: &ScaleConfig,
	theme: &Theme,
) {
	let scale = ScaledValues::new(config, transform.k);

	ctx.set_fill_style_str(&theme.background.color.to_css());
	ctx.fill_rect(0.0, 0.0, viewport.width, viewport.height);

	ctx.save();
	let _ = ctx.translate(transform.x, transform.y);
	let _ = ctx.scale(transform.k, transform.k);

	draw_grid(scene, ctx, &scale, theme);
	for link in &scene.links {
		draw_link(ctx, link, &scale, theme);
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
	for node in &scene.nodes {
		draw_node(ctx, node, &scale, theme);
	}
	for marker in &scene.markers {
		draw_marker(ctx, marker, &scale, theme);
	}

	ctx.restore();
}

fn draw_grid(scene: &Scene, ctx: &CanvasRenderingContext2d, scale: &ScaledValues, theme: &Theme) {
	let Some((top, bottom)) = scene.grid_span else {
		return;
	};
	if scale.grid_alpha < 0.01 {
		return;
	}
	ctx.set_global_alpha(scale.grid_alpha);
	ctx.set_stroke_style_str(&theme.background.grid_color.to_css());
	ctx.set_line_width(scale.grid_width);
	ctx.set_fill_style_str(&theme.background.grid_label_color.to_css());
	ctx.set_font(&scale.grid_font);
	ctx.set_text_baseline("bottom");
	for tick in &scene.year_ticks {
		ctx.begin_path();
		ctx.move_to(tick.x, top);
		ctx.line_to(tick.x, bottom);
		ctx.stroke();
		let _ = ctx.fill_text(&tick.year.to_string(), tick.x + scale.grid_width * 3.0, top);
	}
	ctx.set_global_alpha(1.0);
}

fn trace_link(ctx: &CanvasRenderingContext2d, link: &LinkShape) {
	let path = &link.path;
	ctx.begin_path();
	ctx.move_to(path.start.x, path.start.y);
	ctx.bezier_curve_to(
		path.control1.x,
		path.control1.y,
		path.control2.x,
		path.control2.y,
		path.end.x,
		path.end.y,
	);
}

fn draw_link(ctx: &CanvasRenderingContext2d, link: &LinkShape, scale: &ScaledValues, theme: &Theme) {
	let pulse = smooth_step(link.pulse);
	if pulse > 0.01 {
		let _ = ctx.set_line_dash(&js_sys::Array::new());
		ctx.set_shadow_blur(theme.pulse.glow_blur * pulse);
		ctx.set_shadow_color(&theme.pulse.color.to_css());
		ctx.set_stroke_style_str(&theme.pulse.color.with_alpha(pulse).to_css());
		ctx.set_line_width(scale.link_width + scale.pulse_width * pulse);
		trace_link(ctx, link);
		ctx.stroke();
		ctx.set_shadow_blur(0.0);
	}

	if link.dashed {
		let (dash, gap) = theme.link.succession_dash;
		let k_dash = scale.link_width / 2.0;
		let pattern = js_sys::Array::of2(
			&JsValue::from_f64(dash * k_dash),
			&JsValue::from_f64(gap * k_dash),
		);
		let _ = ctx.set_line_dash(&pattern);
	} else {
		let _ = ctx.set_line_dash(&js_sys::Array::new());
	}
	ctx.set_stroke_style_str(&link.color.to_css());
	ctx.set_line_width(scale.link_width);
	trace_link(ctx, link);
	ctx.stroke();
}

fn trace_rounded_rect(ctx: &CanvasRenderingContext2d, rect: Rect, radius: f64) {
	let r = radius.min(rect.width / 2.0).min(rect.height / 2.0).max(0.0);
	ctx.begin_path();
	ctx.move_to(rect.x + r, rect.y);
	let _ = ctx.arc_to(rect.right(), rect.y, rect.right(), rect.bottom(), r);
	let _ = ctx.arc_to(rect.right(), rect.bottom(), rect.x, rect.bottom(), r);
	let _ = ctx.arc_to(rect.x, rect.bottom(), rect.x, rect.y, r);
	let _ = ctx.arc_to(rect.x, rect.y, rect.right(), rect.y, r);
	ctx.close_path();
}

fn draw_node(ctx: &CanvasRenderingContext2d, node: &NodeShape, scale: &ScaledValues, theme: &Theme) {
	let rect = node.rect;
	let pulse = smooth_step(node.pulse);

	if pulse > 0.01 {
		ctx.set_shadow_blur(theme.pulse.glow_blur * pulse);
		ctx.set_shadow_color(&theme.pulse.color.to_css());
	}

	ctx.save();
	trace_rounded_rect(ctx, rect, scale.corner_radius);
	match &node.fill {
		NodeFill::Solid(color) => {
			ctx.set_fill_style_str(&color.to_css());
			ctx.fill();
		}
		NodeFill::Stripes(stripes) => {
			ctx.set_fill_style_str(&theme.background.color.to_css());
			ctx.fill();
			ctx.set_shadow_blur(0.0);
			ctx.clip();
			let mut y = rect.y;
			for (color, share) in stripes {
				let band = rect.height * share;
				ctx.set_fill_style_str(&color.to_css());
				ctx.fill_rect(rect.x, y, rect.width, band);
				y += band;
			}
		}
	}
	ctx.restore();
	ctx.set_shadow_blur(0.0);

	trace_rounded_rect(ctx, rect, scale.corner_radius);
	if pulse > 0.01 {
		ctx.set_stroke_style_str(&theme.pulse.color.with_alpha(pulse).to_css());
		ctx.set_line_width(scale.pulse_width * pulse);
	} else {
		ctx.set_stroke_style_str(&theme.node.border_color.to_css());
		ctx.set_line_width(scale.link_width / 2.0);
	}
	ctx.stroke();

	if let Some(label) = &node.label {
		if scale.label_alpha < 0.01 {
			return;
		}
		ctx.save();
		trace_rounded_rect(ctx, rect, scale.corner_radius);
		ctx.clip();
		ctx.set_global_alpha(scale.label_alpha);
		ctx.set_fill_style_str(&node.label_color.to_css());
		ctx.set_font(&scale.label_font);
		ctx.set_text_baseline("middle");
		let _ = ctx.fill_text(label, rect.x + LABEL_INSET / scale.k, rect.y + rect.height / 2.0);
		ctx.restore();
	}
}

fn draw_marker(ctx: &CanvasRenderingContext2d, marker: &MarkerShape, scale: &ScaledValues, theme: &Theme) {
	let (x, y) = (marker.at.x, marker.at.y);
	let r = scale.marker_radius;
	let pulse = smooth_step(marker.pulse);

	if pulse > 0.01 {
		ctx.begin_path();
		let _ = ctx.arc(x, y, r * (1.0 + pulse), 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&theme.pulse.color.with_alpha(0.5 * pulse).to_css());
		ctx.fill();
	}

	ctx.begin_path();
	match marker.link_type {
		LinkType::Merge | LinkType::Split => {
			ctx.move_to(x, y - r);
			ctx.line_to(x + r, y);
			ctx.line_to(x, y + r);
			ctx.line_to(x - r, y);
			ctx.close_path();
		}
		LinkType::LegalTransfer | LinkType::SpiritualSuccession => {
			let _ = ctx.arc(x, y, r, 0.0, 2.0 * PI);
		}
	}
	if marker.link_type == LinkType::SpiritualSuccession {
		ctx.set_fill_style_str(&theme.marker.stroke.to_css());
	} else {
		ctx.set_fill_style_str(&theme.marker.fill.to_css());
	}
	ctx.fill();
	ctx.set_stroke_style_str(&marker.color.to_css());
	ctx.set_line_width(r / 2.0);
	ctx.stroke();
}
