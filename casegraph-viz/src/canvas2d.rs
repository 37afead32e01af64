//! 2D Canvas rendering for case graphs
//!
//! Paints a [`Frame`] to an HTML canvas. Geometry arrives in model space;
//! the frame's viewport transform is applied to the context once per draw.

use casegraph::render::{Frame, NodeGlyph, Rgb};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

const BACKGROUND: &str = "#f8fafc";
const LABEL_COLOR: &str = "#1f2937";
const BADGE_COLOR: &str = "#ffffff";
const SELECTED_RING: &str = "#2563eb";
const FONT: &str = "12px -apple-system, BlinkMacSystemFont, sans-serif";

fn css(color: Rgb, alpha: f32) -> String {
    format!("rgba({}, {}, {}, {})", color.r, color.g, color.b, alpha)
}

/// 2D Canvas renderer
pub struct Canvas2DRenderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl Canvas2DRenderer {
    /// Create renderer from canvas element
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, String> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| format!("Failed to get 2d context: {:?}", e))?
            .ok_or("2d context not available")?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| "Failed to cast to CanvasRenderingContext2d")?;

        Ok(Self { canvas, ctx })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// CSS size of the canvas element as laid out by the page
    pub fn measure(&self) -> (f32, f32) {
        (
            self.canvas.client_width() as f32,
            self.canvas.client_height() as f32,
        )
    }

    /// Match the drawing buffer to the laid-out size
    pub fn resize(&mut self, width: f32, height: f32) {
        self.canvas.set_width(width.max(0.0) as u32);
        self.canvas.set_height(height.max(0.0) as u32);
    }

    /// Show a pointer cursor over nodes
    pub fn set_pointer_cursor(&self, pointer: bool) {
        let _ = self
            .canvas
            .style()
            .set_property("cursor", if pointer { "pointer" } else { "default" });
    }

    pub fn clear(&self) {
        let _ = self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        self.ctx.set_fill_style_str(BACKGROUND);
        self.ctx.fill_rect(
            0.0,
            0.0,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        );
    }

    /// Draw one frame
    pub fn render(&self, frame: &Frame) {
        self.clear();
        if frame.is_empty() {
            return;
        }

        let t = frame.transform;
        let _ = self
            .ctx
            .set_transform(t.k as f64, 0.0, 0.0, t.k as f64, t.x as f64, t.y as f64);

        // Edges first, behind nodes
        for edge in &frame.edges {
            self.ctx.set_stroke_style_str(&css(edge.color, edge.opacity));
            self.ctx.set_line_width(edge.width as f64);
            self.ctx.begin_path();
            self.ctx.move_to(edge.x1 as f64, edge.y1 as f64);
            self.ctx.line_to(edge.x2 as f64, edge.y2 as f64);
            self.ctx.stroke();
        }

        self.ctx.set_font(FONT);
        self.ctx.set_text_align("center");
        self.ctx.set_text_baseline("middle");
        for node in &frame.nodes {
            self.render_node(node);
        }

        // Tooltip on top of everything
        if let Some(node) = frame.nodes.iter().find(|n| n.tooltip.is_some()) {
            self.render_tooltip(node);
        }
    }

    fn render_node(&self, node: &NodeGlyph) {
        let (x, y) = (node.x as f64, node.y as f64);

        if node.selected {
            self.ctx.begin_path();
            self.ctx
                .arc(x, y, node.radius as f64 + 5.0, 0.0, std::f64::consts::TAU)
                .ok();
            self.ctx.set_stroke_style_str(SELECTED_RING);
            self.ctx.set_line_width(3.0);
            self.ctx.stroke();
        }

        self.ctx.begin_path();
        self.ctx
            .arc(x, y, node.radius as f64, 0.0, std::f64::consts::TAU)
            .ok();
        self.ctx.set_fill_style_str(&css(node.fill, node.opacity));
        self.ctx.fill();
        self.ctx.set_stroke_style_str(&css(node.stroke, 1.0));
        self.ctx.set_line_width(node.stroke_width as f64);
        self.ctx.stroke();

        if let Some(badge) = &node.badge {
            self.ctx.set_fill_style_str(BADGE_COLOR);
            let _ = self.ctx.fill_text(badge, x, y);
        }

        self.ctx.set_fill_style_str(LABEL_COLOR);
        let _ = self
            .ctx
            .fill_text(&node.label.text, node.label.x as f64, node.label.y as f64);
    }

    fn render_tooltip(&self, node: &NodeGlyph) {
        let Some(text) = &node.tooltip else {
            return;
        };
        let width = self
            .ctx
            .measure_text(text)
            .map(|m| m.width())
            .unwrap_or(text.chars().count() as f64 * 7.0);
        let padding = 6.0;
        let x = node.x as f64;
        let y = node.y as f64 - node.radius as f64 - 18.0;

        self.ctx.set_fill_style_str("rgba(17, 24, 39, 0.9)");
        self.ctx.fill_rect(
            x - width / 2.0 - padding,
            y - 9.0 - padding / 2.0,
            width + padding * 2.0,
            18.0 + padding,
        );
        self.ctx.set_fill_style_str("#ffffff");
        let _ = self.ctx.fill_text(text, x, y);
    }
}
