//! CPU rasterization of split-flap board frames.
//!
//! Each frame draws the background, every card (two rounded-rectangle halves
//! with a divider line and the resolved glyph centered inside), and the
//! fading subtitle overlay, then resolves the scene into an RGBA8 buffer.

use kurbo::{PathEl, Shape};

use crate::anim::flap::FlapBoard;
use crate::foundation::core::{FrameIndex, Rgba8};
use crate::foundation::error::{FlapgenError, FlapgenResult};
use crate::render::fonts::{self, GlyphEngine, TextBrushRgba8};
use crate::render::sink::{FrameSink, SinkConfig};

/// One rendered frame as straight RGBA8 (fully opaque).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRgba {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGBA8 pixel bytes.
    pub data: Vec<u8>,
}

/// Colors, glyph sizes, and the subtitle overlay.
///
/// [`RenderStyle::default`] is the shipped promo look.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderStyle {
    /// Background fill.
    pub background: Rgba8,
    /// Upper card half fill.
    pub card_top: Rgba8,
    /// Lower card half fill.
    pub card_bottom: Rgba8,
    /// Divider line between card halves.
    pub divider: Rgba8,
    /// Glyph and subtitle color.
    pub text_color: Rgba8,
    /// Card glyph size in pixels.
    pub glyph_size_px: f32,
    /// Subtitle shown below the board, if any.
    pub subtitle: Option<String>,
    /// Subtitle size in pixels.
    pub subtitle_size_px: f32,
    /// Subtitle opacity at full fade-in, in [0, 1].
    pub subtitle_max_alpha: f32,
    /// Global progress at which the subtitle starts fading in.
    pub subtitle_fade_start: f64,
    /// Gap between the board's bottom edge and the subtitle baseline area.
    pub subtitle_gap: f64,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            background: Rgba8::opaque(17, 17, 17),
            card_top: Rgba8::opaque(42, 42, 42),
            card_bottom: Rgba8::opaque(26, 26, 26),
            divider: Rgba8::opaque(51, 51, 51),
            text_color: Rgba8::opaque(224, 216, 176),
            glyph_size_px: 58.0,
            subtitle: Some("Your clock is boring. You're not. Fix it.".to_string()),
            subtitle_size_px: 28.0,
            subtitle_max_alpha: 180.0 / 255.0,
            subtitle_fade_start: 0.7,
            subtitle_gap: 60.0,
        }
    }
}

/// Renders a [`FlapBoard`] frame-by-frame on the CPU.
pub struct BoardRenderer {
    board: FlapBoard,
    style: RenderStyle,
    engine: GlyphEngine,
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
}

impl BoardRenderer {
    /// Create a renderer, resolving a monospace font from the system.
    pub fn new(board: FlapBoard, style: RenderStyle) -> FlapgenResult<Self> {
        let font_bytes = fonts::resolve_font_bytes()?;
        Self::with_font_bytes(board, style, font_bytes)
    }

    /// Create a renderer with explicit font bytes.
    pub fn with_font_bytes(
        board: FlapBoard,
        style: RenderStyle,
        font_bytes: Vec<u8>,
    ) -> FlapgenResult<Self> {
        let canvas = board.params().canvas;
        let width = u16::try_from(canvas.width)
            .map_err(|_| FlapgenError::validation("canvas width exceeds raster limit"))?;
        let height = u16::try_from(canvas.height)
            .map_err(|_| FlapgenError::validation("canvas height exceeds raster limit"))?;
        let engine = GlyphEngine::new(font_bytes)?;
        Ok(Self {
            board,
            style,
            engine,
            width,
            height,
            ctx: vello_cpu::RenderContext::new(width, height),
            pixmap: vello_cpu::Pixmap::new(width, height),
        })
    }

    /// The board driving this renderer.
    pub fn board(&self) -> &FlapBoard {
        &self.board
    }

    /// Rasterize one frame.
    pub fn render_frame(&mut self, frame: FrameIndex) -> FlapgenResult<FrameRgba> {
        self.ctx.reset();
        self.ctx
            .set_transform(vello_cpu::kurbo::Affine::IDENTITY);

        // Background.
        self.ctx.set_paint(paint(self.style.background));
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(self.width),
            f64::from(self.height),
        ));

        for card_idx in 0..self.board.cards().len() {
            self.draw_card(frame, card_idx)?;
        }
        self.draw_subtitle(frame)?;

        self.ctx.flush();
        self.pixmap.data_as_u8_slice_mut().fill(0);
        self.ctx.render_to_pixmap(&mut self.pixmap);

        Ok(FrameRgba {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: self.pixmap.data_as_u8_slice().to_vec(),
        })
    }

    /// Render every frame of the animation into `sink`, in timeline order.
    #[tracing::instrument(skip(self, sink))]
    pub fn render_all(&mut self, sink: &mut dyn FrameSink) -> FlapgenResult<()> {
        let total = self.board.params().total_frames();
        sink.begin(SinkConfig {
            canvas: self.board.params().canvas,
            total_frames: total,
        })?;
        for i in 0..total {
            let frame = self.render_frame(FrameIndex(i))?;
            sink.push_frame(FrameIndex(i), &frame)?;
        }
        sink.end()?;
        tracing::debug!(total, "rendered frame sequence");
        Ok(())
    }

    fn draw_card(&mut self, frame: FrameIndex, card_idx: usize) -> FlapgenResult<()> {
        let card = self.board.cards()[card_idx];
        let params = self.board.params();
        let (half_w, half_h) = (params.card_w / 2.0, params.card_h / 2.0);
        let radius = params.card_radius;
        let (x0, y0) = (card.cx - half_w, card.cy - half_h);
        let (x1, y1) = (card.cx + half_w, card.cy + half_h);
        let mid_y = card.cy;

        self.ctx
            .set_transform(vello_cpu::kurbo::Affine::IDENTITY);

        // Top and bottom halves, split by a 2px divider line.
        self.ctx.set_paint(paint(self.style.card_top));
        self.ctx
            .fill_path(&rounded_rect_path(x0, y0, x1, mid_y - 1.0, radius));
        self.ctx.set_paint(paint(self.style.card_bottom));
        self.ctx
            .fill_path(&rounded_rect_path(x0, mid_y + 1.0, x1, y1, radius));
        self.ctx.set_paint(paint(self.style.divider));
        self.ctx
            .fill_rect(&vello_cpu::kurbo::Rect::new(x0, mid_y - 1.0, x1, mid_y + 1.0));

        let state = self.board.card_state(frame, card_idx);
        if state.glyph.is_whitespace() {
            return Ok(());
        }

        let glyph = state.glyph.to_string();
        let layout = self.engine.layout(
            &glyph,
            self.style.glyph_size_px,
            TextBrushRgba8::from(self.style.text_color),
        )?;
        let tx = card.cx - f64::from(layout.width()) / 2.0;
        let ty = card.cy - f64::from(layout.height()) / 2.0
            + f64::from(self.board.jitter_px(frame, card_idx));

        self.ctx
            .set_transform(vello_cpu::kurbo::Affine::translate((tx, ty)));
        draw_layout(&mut self.ctx, self.engine.font().clone(), &layout);
        Ok(())
    }

    /// Subtitle fades in below the board during the tail of the animation.
    fn draw_subtitle(&mut self, frame: FrameIndex) -> FlapgenResult<()> {
        let Some(text) = self.style.subtitle.clone() else {
            return Ok(());
        };
        let fade_start = self.style.subtitle_fade_start;
        if fade_start >= 1.0 {
            return Ok(());
        }
        let t = self.board.progress(frame);
        let fade = ((t - fade_start) / (1.0 - fade_start)).clamp(0.0, 1.0);
        let alpha = fade as f32 * self.style.subtitle_max_alpha;
        if alpha <= 0.0 {
            return Ok(());
        }

        let layout = self.engine.layout(
            &text,
            self.style.subtitle_size_px,
            TextBrushRgba8::from(self.style.text_color),
        )?;
        let params = self.board.params();
        let board_bottom = self
            .board
            .cards()
            .iter()
            .map(|c| c.cy)
            .fold(f64::NEG_INFINITY, f64::max)
            + params.card_h / 2.0;
        let sx = (f64::from(self.width) - f64::from(layout.width())) / 2.0;
        let sy = board_bottom + self.style.subtitle_gap;

        self.ctx
            .set_transform(vello_cpu::kurbo::Affine::translate((sx, sy)));
        self.ctx.push_opacity_layer(alpha);
        draw_layout(&mut self.ctx, self.engine.font().clone(), &layout);
        self.ctx.pop_layer();
        Ok(())
    }
}

fn paint(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

/// Convert a rounded rectangle into the rasterizer's path type.
fn rounded_rect_path(x0: f64, y0: f64, x1: f64, y1: f64, radius: f64) -> vello_cpu::kurbo::BezPath {
    let rr = kurbo::RoundedRect::new(x0, y0, x1, y1, radius);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for el in rr.path_elements(0.1) {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn draw_layout(
    ctx: &mut vello_cpu::RenderContext,
    font: vello_cpu::peniko::FontData,
    layout: &parley::Layout<TextBrushRgba8>,
) {
    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let brush = run.style().brush;
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                brush.r, brush.g, brush.b, brush.a,
            ));
            let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(&font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_style_matches_promo_palette() {
        let style = RenderStyle::default();
        assert_eq!(style.background, Rgba8::opaque(17, 17, 17));
        assert_eq!(style.card_top, Rgba8::opaque(42, 42, 42));
        assert_eq!(style.card_bottom, Rgba8::opaque(26, 26, 26));
        assert_eq!(style.divider, Rgba8::opaque(51, 51, 51));
        assert_eq!(style.text_color, Rgba8::opaque(224, 216, 176));
        assert!(style.subtitle.is_some());
    }

    #[test]
    fn style_roundtrips_through_json() {
        let style = RenderStyle::default();
        let json = serde_json::to_string(&style).unwrap();
        let back: RenderStyle = serde_json::from_str(&json).unwrap();
        assert_eq!(back.subtitle, style.subtitle);
        assert_eq!(back.background, style.background);
    }

    #[test]
    fn rounded_rect_path_is_closed() {
        let path = rounded_rect_path(0.0, 0.0, 72.0, 49.0, 6.0);
        assert!(!path.elements().is_empty());
        assert!(matches!(
            path.elements().last(),
            Some(vello_cpu::kurbo::PathEl::ClosePath)
        ));
    }
}
