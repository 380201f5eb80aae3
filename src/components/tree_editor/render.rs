use web_sys::CanvasRenderingContext2d;

use super::state::TreeEditor;

const BACKGROUND: &str = "#faebd7";
const BORDER: &str = "#cccccc";
const SELECTED_BORDER: &str = "#1f77b4";
const INK: &str = "#000000";

/// Draws the editor's scene: lines under labels under node boxes.
pub fn render(editor: &TreeEditor, ctx: &CanvasRenderingContext2d, width: f64, height: f64) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, width, height);
	draw_links(editor, ctx);
	draw_nodes(editor, ctx);
}

fn draw_links(editor: &TreeEditor, ctx: &CanvasRenderingContext2d) {
	ctx.set_stroke_style_str(INK);
	ctx.set_line_width(2.0);
	ctx.set_fill_style_str(INK);
	ctx.set_font("bold 14px sans-serif");
	ctx.set_text_align("center");
	ctx.set_text_baseline("bottom");

	for (_, link) in editor.scene().links() {
		ctx.begin_path();
		ctx.move_to(link.line.from.x, link.line.from.y);
		ctx.line_to(link.line.to.x, link.line.to.y);
		ctx.stroke();
		if !link.label.text.is_empty() {
			let _ = ctx.fill_text(&link.label.text, link.label.at.x, link.label.at.y);
		}
	}
}

fn draw_nodes(editor: &TreeEditor, ctx: &CanvasRenderingContext2d) {
	let selected = editor.interaction().selected();
	ctx.set_font("14px sans-serif");
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");

	for (id, node_box) in editor.scene().boxes() {
		let r = node_box.rect;
		ctx.set_fill_style_str(&node_box.fill.to_hex());
		ctx.fill_rect(r.origin.x, r.origin.y, r.size.width, r.size.height);

		let is_selected = selected == Some(id);
		ctx.set_stroke_style_str(if is_selected { SELECTED_BORDER } else { BORDER });
		ctx.set_line_width(if is_selected { 3.0 } else { 1.0 });
		ctx.stroke_rect(r.origin.x, r.origin.y, r.size.width, r.size.height);

		let center = r.anchor();
		ctx.set_fill_style_str(INK);
		let _ = ctx.fill_text(&node_box.label, center.x, center.y);
	}
}
