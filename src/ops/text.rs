// ============================================================================
// TEXT RASTERIZATION — single-line layout and glyph rendering for the text
// watermark. One sprite is rasterized per render call and stamped at every
// tile anchor by the compositor.
// ============================================================================

use ab_glyph::{Font, FontArc, GlyphId, ScaleFont, point};

/// A rasterized line of text, ready to stamp onto the watermark layer.
pub struct TextSprite {
    /// RGBA pixels; alpha already carries the fill color's intrinsic alpha
    /// scaled by glyph coverage.
    pub image: image::RgbaImage,
    /// Offset from a (horizontally centered, baseline-anchored) tile anchor
    /// to the sprite's top-left corner.
    pub offset_x: i32,
    pub offset_y: i32,
}

/// Lay out one line of text at the given pixel size.
/// Returns positioned glyphs `(id, x_at_baseline)` and the total advance width.
pub fn layout_line(font: &FontArc, text: &str, font_size: f32) -> (Vec<(GlyphId, f32)>, f32) {
    let scaled = font.as_scaled(font_size);

    let mut glyphs = Vec::new();
    let mut cursor_x = 0.0f32;
    let mut last_glyph: Option<GlyphId> = None;

    for ch in text.chars() {
        let glyph_id = font.glyph_id(ch);
        if let Some(prev) = last_glyph {
            cursor_x += scaled.kern(prev, glyph_id);
        }
        glyphs.push((glyph_id, cursor_x));
        cursor_x += scaled.h_advance(glyph_id);
        last_glyph = Some(glyph_id);
    }

    (glyphs, cursor_x)
}

/// Rasterize one line of text into a tight RGBA sprite.
///
/// `fill` is applied uniformly; its alpha channel is scaled by per-pixel
/// glyph coverage. Returns `None` when nothing would be drawn (no outlines,
/// e.g. whitespace-only text).
pub fn rasterize_line(
    font: &FontArc,
    text: &str,
    font_size: f32,
    fill: [u8; 4],
) -> Option<TextSprite> {
    let (glyphs, advance) = layout_line(font, text, font_size);
    if glyphs.is_empty() {
        return None;
    }

    // Bounding box over the outlined glyphs, baseline at y = 0.
    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    let mut outlined = Vec::with_capacity(glyphs.len());
    for &(glyph_id, gx) in &glyphs {
        let glyph = glyph_id.with_scale_and_position(font_size, point(gx, 0.0));
        if let Some(outline) = font.outline_glyph(glyph) {
            let b = outline.px_bounds();
            min_x = min_x.min(b.min.x);
            min_y = min_y.min(b.min.y);
            max_x = max_x.max(b.max.x);
            max_y = max_y.max(b.max.y);
            outlined.push(outline);
        }
    }
    if outlined.is_empty() || min_x >= max_x || min_y >= max_y {
        return None;
    }

    let buf_w = (max_x - min_x).ceil() as usize + 1;
    let buf_h = (max_y - min_y).ceil() as usize + 1;

    // Single-channel coverage first, max-combined so overlapping glyph
    // edges don't double-darken.
    let mut coverage = vec![0.0f32; buf_w * buf_h];
    for outline in &outlined {
        let b = outline.px_bounds();
        let ox = (b.min.x - min_x).round() as i32;
        let oy = (b.min.y - min_y).round() as i32;
        outline.draw(|px, py, cov| {
            let ix = px as i32 + ox;
            let iy = py as i32 + oy;
            if ix >= 0 && iy >= 0 && (ix as usize) < buf_w && (iy as usize) < buf_h {
                let idx = iy as usize * buf_w + ix as usize;
                coverage[idx] = coverage[idx].max(cov);
            }
        });
    }

    // Convert coverage to RGBA.
    let mut buf = vec![0u8; buf_w * buf_h * 4];
    for (i, &cov) in coverage.iter().enumerate() {
        if cov > 0.001 {
            let idx = i * 4;
            buf[idx] = fill[0];
            buf[idx + 1] = fill[1];
            buf[idx + 2] = fill[2];
            buf[idx + 3] = (fill[3] as f32 * cov).round().min(255.0) as u8;
        }
    }

    let image = image::RgbaImage::from_raw(buf_w as u32, buf_h as u32, buf)?;
    Some(TextSprite {
        image,
        // Center the line on the anchor; the baseline sits at the anchor's y.
        offset_x: (min_x - advance * 0.5).round() as i32,
        offset_y: min_y.round() as i32,
    })
}
