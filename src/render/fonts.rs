//! Monospace font resolution and text layout.
//!
//! Glyphs are shaped by Parley from raw font bytes and filled by the CPU
//! rasterizer. Font bytes come from a candidate list of well-known system
//! monospace faces; when none of them load, the resolver falls back to
//! scanning common font directories for any usable face. Missing fonts are a
//! robustness concern, not a correctness-critical path.

use std::path::{Path, PathBuf};

use crate::foundation::core::Rgba8;
use crate::foundation::error::{FlapgenError, FlapgenResult};

/// Well-known monospace faces, tried in order.
const CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/System/Library/Fonts/SFMono-Bold.otf",
    "/System/Library/Fonts/Menlo.ttc",
    "/System/Library/Fonts/Monaco.ttf",
];

/// Directories scanned as a last resort.
const FALLBACK_DIRS: &[&str] = &[
    "/usr/share/fonts",
    "/usr/local/share/fonts",
    "/System/Library/Fonts",
    "/Library/Fonts",
];

/// Resolve usable font bytes from the system.
///
/// Tries [`CANDIDATES`] first, then recursively scans [`FALLBACK_DIRS`] for
/// the first `.ttf`/`.otf`/`.ttc` file. Errors only when no face exists at
/// all.
pub fn resolve_font_bytes() -> FlapgenResult<Vec<u8>> {
    for path in CANDIDATES {
        if let Ok(bytes) = std::fs::read(path) {
            tracing::debug!(path, "resolved candidate font");
            return Ok(bytes);
        }
    }
    for dir in FALLBACK_DIRS {
        if let Some(path) = first_font_file(Path::new(dir)) {
            tracing::debug!(path = %path.display(), "resolved fallback font");
            if let Ok(bytes) = std::fs::read(&path) {
                return Ok(bytes);
            }
        }
    }
    Err(FlapgenError::render(
        "no usable font found in candidate list or system font directories",
    ))
}

fn first_font_file(dir: &Path) -> Option<PathBuf> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .collect();
    entries.sort();
    for path in &entries {
        if path.is_dir() {
            if let Some(found) = first_font_file(path) {
                return Some(found);
            }
        } else if matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("ttf" | "otf" | "ttc")
        ) {
            return Some(path.clone());
        }
    }
    None
}

/// RGBA8 brush color carried through Parley layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrushRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl From<Rgba8> for TextBrushRgba8 {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// Shapes text with one resolved font, registered once at construction.
pub struct GlyphEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: String,
    font: vello_cpu::peniko::FontData,
}

impl GlyphEngine {
    /// Register `font_bytes` and keep the raster-side font handle.
    pub fn new(font_bytes: Vec<u8>) -> FlapgenResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| FlapgenError::render("no font families registered from font bytes"))?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| FlapgenError::render("registered font family has no name"))?
            .to_string();
        let font = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0);

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font,
        })
    }

    /// Raster-side handle for the registered font.
    pub fn font(&self) -> &vello_cpu::peniko::FontData {
        &self.font
    }

    /// Shape and lay out plain single-style text.
    pub fn layout(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> FlapgenResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(FlapgenError::validation("text size_px must be finite and > 0"));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brush_from_color_keeps_channels() {
        let brush = TextBrushRgba8::from(Rgba8::opaque(224, 216, 176));
        assert_eq!(
            brush,
            TextBrushRgba8 {
                r: 224,
                g: 216,
                b: 176,
                a: 255
            }
        );
    }

    #[test]
    fn glyph_engine_rejects_garbage_bytes() {
        assert!(GlyphEngine::new(vec![0u8; 16]).is_err());
    }

    #[test]
    fn layout_rejects_bad_size() {
        let Ok(bytes) = resolve_font_bytes() else {
            // Host without any fonts installed; nothing to assert against.
            return;
        };
        let mut engine = GlyphEngine::new(bytes).unwrap();
        assert!(engine.layout("A", 0.0, TextBrushRgba8::default()).is_err());
        assert!(engine.layout("A", f32::NAN, TextBrushRgba8::default()).is_err());
    }
}
