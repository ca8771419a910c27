use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::scene::{RetainedScene, Shape, ShapeKind};

const EDGE_WIDTH: f64 = 2.0;
const BORDER_WIDTH: f64 = 1.5;
const FONT: &str = "600 15px Oxanium, sans-serif";

pub fn render(scene: &RetainedScene, background: &str, ctx: &CanvasRenderingContext2d, width: f64, height: f64) {
	ctx.set_global_alpha(1.0);
	ctx.set_fill_style_str(background);
	ctx.fill_rect(0.0, 0.0, width, height);
	ctx.save();
	for shape in scene.draw_list() {
		ctx.set_global_alpha(scene.opacity * shape.opacity);
		match &shape.kind {
			ShapeKind::Path { .. } => draw_path(shape, ctx),
			ShapeKind::Box { .. } => draw_box(shape, ctx),
			ShapeKind::Marker { .. } => draw_marker(shape, ctx),
		}
	}
	ctx.restore();
}

fn draw_path(shape: &Shape, ctx: &CanvasRenderingContext2d) {
	let ShapeKind::Path { data, stroke } = &shape.kind else {
		return;
	};
	let Some((first, rest)) = data.points.split_first() else {
		return;
	};
	if rest.is_empty() {
		return;
	}
	ctx.set_stroke_style_str(stroke);
	ctx.set_line_width(EDGE_WIDTH);
	ctx.begin_path();
	ctx.move_to(first.x, first.y);
	for p in rest {
		ctx.line_to(p.x, p.y);
	}
	ctx.stroke();
}

fn draw_box(shape: &Shape, ctx: &CanvasRenderingContext2d) {
	let ShapeKind::Box {
		label,
		width,
		height,
		fill,
		text,
	} = &shape.kind
	else {
		return;
	};
	// Anchor is the left edge at the vertical centre.
	let (x, y) = (shape.position.x, shape.position.y - height / 2.0);

	ctx.set_fill_style_str(fill);
	ctx.fill_rect(x, y, *width, *height);
	ctx.set_stroke_style_str(text);
	ctx.set_line_width(BORDER_WIDTH);
	ctx.stroke_rect(x, y, *width, *height);

	ctx.set_fill_style_str(text);
	ctx.set_font(FONT);
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text(label, x + width / 2.0, shape.position.y);
}

fn draw_marker(shape: &Shape, ctx: &CanvasRenderingContext2d) {
	let ShapeKind::Marker { radius, color } = &shape.kind else {
		return;
	};
	ctx.begin_path();
	let _ = ctx.arc(shape.position.x, shape.position.y, *radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(color);
	ctx.fill();
}
