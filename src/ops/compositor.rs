// ============================================================================
// COMPOSITOR — the one routine everything else feeds: base image + watermark
// overlay (tiled text or placed logo) + rotation envelope + global opacity,
// recomputed wholesale on every parameter change.
// ============================================================================

use ab_glyph::FontArc;
use image::{RgbaImage, imageops};
use rayon::prelude::*;

use super::text::rasterize_line;
use super::transform::rotate_about_center;
use crate::params::{WatermarkMode, WatermarkParams};

/// Fixed fill for text watermarks: black at 50% intrinsic alpha. The global
/// opacity parameter scales this further at blend time.
pub const TEXT_FILL: [u8; 4] = [0, 0, 0, 128];

/// Logos are drawn at this width; height follows the source aspect ratio.
pub const LOGO_TARGET_WIDTH: u32 = 150;

/// Horizontal tile step, in multiples of the font size.
pub const TILE_STEP_X: u32 = 8;
/// Vertical tile step, in multiples of the font size.
pub const TILE_STEP_Y: u32 = 3;

/// Compose the watermark over `base` and return the result.
///
/// The output always has `base`'s dimensions. The watermark layer is drawn
/// unrotated into a transparent overlay, rotated about the canvas center by
/// `params.rotation_deg`, then blended over the base with `params.opacity`
/// scaling the overlay's alpha. Logo mode with no logo loaded draws nothing;
/// the base passes through unmodified.
pub fn render(
    base: &RgbaImage,
    logo: Option<&RgbaImage>,
    font: Option<&FontArc>,
    params: &WatermarkParams,
) -> RgbaImage {
    let (width, height) = base.dimensions();
    let mut overlay = RgbaImage::new(width, height);
    let mut drew_content = false;

    match params.mode {
        WatermarkMode::Text => {
            if let Some(font) = font {
                let font_size = params.font_size_px;
                let sprite = rasterize_line(
                    font,
                    params.effective_text(),
                    font_size as f32,
                    TEXT_FILL,
                );
                if let Some(sprite) = sprite {
                    for (x, y) in tile_anchors(width, height, font_size) {
                        stamp(
                            &mut overlay,
                            &sprite.image,
                            x as i32 + sprite.offset_x,
                            y as i32 + sprite.offset_y,
                        );
                    }
                    drew_content = true;
                }
            }
        }
        WatermarkMode::Logo => {
            if let Some(logo) = logo
                && logo.width() > 0
            {
                let logo_h = ((LOGO_TARGET_WIDTH as u64 * logo.height() as u64)
                    / logo.width() as u64)
                    .max(1) as u32;
                let scaled = imageops::resize(
                    logo,
                    LOGO_TARGET_WIDTH,
                    logo_h,
                    imageops::FilterType::Triangle,
                );
                stamp(&mut overlay, &scaled, params.logo_pos.0, params.logo_pos.1);
                drew_content = true;
            }
        }
    }

    // Nothing drawn inside the envelope: the envelope has no visible effect.
    if !drew_content {
        return base.clone();
    }

    let rotated = rotate_about_center(&overlay, params.rotation_deg);

    let mut out = base.clone();
    blend_layer(&mut out, &rotated, params.opacity);
    out
}

/// Baseline anchors for the text tiling grid: rows start at y = font_size
/// stepping 3×font_size, columns at x = font_size stepping 8×font_size,
/// while inside the canvas.
pub fn tile_anchors(width: u32, height: u32, font_size: u32) -> Vec<(u32, u32)> {
    let mut anchors = Vec::new();
    if font_size == 0 {
        return anchors;
    }
    let mut y = font_size;
    while y < height {
        let mut x = font_size;
        while x < width {
            anchors.push((x, y));
            x += font_size * TILE_STEP_X;
        }
        y += font_size * TILE_STEP_Y;
    }
    anchors
}

/// Alpha-blend `patch` onto `target` at (x, y), clipping at the edges.
fn stamp(target: &mut RgbaImage, patch: &RgbaImage, x: i32, y: i32) {
    let (tw, th) = (target.width() as i32, target.height() as i32);
    let (pw, ph) = (patch.width() as i32, patch.height() as i32);

    let x_start = x.max(0);
    let y_start = y.max(0);
    let x_end = (x + pw).min(tw);
    let y_end = (y + ph).min(th);

    for ty in y_start..y_end {
        for tx in x_start..x_end {
            let src = patch.get_pixel((tx - x) as u32, (ty - y) as u32).0;
            let dst = target.get_pixel(tx as u32, ty as u32).0;
            target.put_pixel(tx as u32, ty as u32, image::Rgba(blend_over(dst, src, 1.0)));
        }
    }
}

/// Blend the whole overlay over `target`, scaling the overlay's alpha by
/// `opacity`. Rows run in parallel; both images have identical dimensions.
fn blend_layer(target: &mut RgbaImage, overlay: &RgbaImage, opacity: f32) {
    debug_assert_eq!(target.dimensions(), overlay.dimensions());
    let w = target.width() as usize;
    let stride = w * 4;
    let buf: &mut [u8] = &mut *target;
    buf.par_chunks_exact_mut(stride)
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..w {
                let fg = overlay.get_pixel(x as u32, y as u32).0;
                if fg[3] == 0 {
                    continue;
                }
                let idx = x * 4;
                let bg = [row[idx], row[idx + 1], row[idx + 2], row[idx + 3]];
                row[idx..idx + 4].copy_from_slice(&blend_over(bg, fg, opacity));
            }
        });
}

/// Porter-Duff "over", with `opacity` applied on top of the foreground's
/// own alpha. A near-zero effective foreground alpha returns the background
/// byte-for-byte so zero-opacity renders reproduce the base exactly.
#[inline]
fn blend_over(bg: [u8; 4], fg: [u8; 4], opacity: f32) -> [u8; 4] {
    let fg_alpha = (fg[3] as f32 / 255.0) * opacity.clamp(0.0, 1.0);
    if fg_alpha < 1.0 / 512.0 {
        return bg;
    }
    let bg_alpha = bg[3] as f32 / 255.0;
    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);
    if out_alpha < 0.001 {
        return [0, 0, 0, 0];
    }

    let channel = |f: u8, b: u8| -> u8 {
        let f = f as f32 / 255.0;
        let b = b as f32 / 255.0;
        let v = (f * fg_alpha + b * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        (v * 255.0).round().clamp(0.0, 255.0) as u8
    };

    [
        channel(fg[0], bg[0]),
        channel(fg[1], bg[1]),
        channel(fg[2], bg[2]),
        (out_alpha * 255.0).round() as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::discover_ui_font;
    use image::Rgba;

    fn base_image(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([220, 220, 220, 255]))
    }

    fn text_params() -> WatermarkParams {
        WatermarkParams {
            font_size_px: 20,
            ..Default::default()
        }
    }

    // --- tiling grid -------------------------------------------------------

    #[test]
    fn test_tile_grid_matches_step_formula() {
        // font_size=20 on 400×400: rows at 20,80,…,380 (7), columns at
        // 20,180,340 (3).
        let anchors = tile_anchors(400, 400, 20);
        assert_eq!(anchors.len(), 7 * 3);
        assert_eq!(anchors[0], (20, 20));
        assert!(anchors.contains(&(340, 380)));
        assert!(!anchors.iter().any(|&(x, y)| x >= 400 || y >= 400));
    }

    #[test]
    fn test_tile_grid_small_canvas_single_anchor() {
        // Canvas barely larger than the start offset: exactly one anchor.
        let anchors = tile_anchors(21, 21, 20);
        assert_eq!(anchors, vec![(20, 20)]);
    }

    #[test]
    fn test_tile_grid_canvas_smaller_than_font() {
        assert!(tile_anchors(19, 19, 20).is_empty());
    }

    // --- envelope invariants ----------------------------------------------

    #[test]
    fn test_output_dimensions_equal_base_for_any_rotation() {
        let base = base_image(123, 77);
        let font = discover_ui_font();
        for deg in [0.0, 45.0, 90.0, 180.0, 317.5, -60.0] {
            let params = WatermarkParams {
                rotation_deg: deg,
                ..text_params()
            };
            let out = render(&base, None, font.as_ref(), &params);
            assert_eq!(out.dimensions(), base.dimensions(), "angle {}", deg);
        }
    }

    #[test]
    fn test_zero_opacity_reproduces_base_exactly() {
        let Some(font) = discover_ui_font() else { return };
        let mut base = base_image(200, 150);
        base.put_pixel(13, 29, Rgba([1, 2, 3, 255]));
        let params = WatermarkParams {
            opacity: 0.0,
            rotation_deg: 30.0,
            ..text_params()
        };
        let out = render(&base, None, Some(&font), &params);
        assert_eq!(out, base);
    }

    #[test]
    fn test_text_mode_darkens_anchor_pixels() {
        let Some(font) = discover_ui_font() else { return };
        let base = base_image(400, 400);
        let out = render(&base, None, Some(&font), &text_params());
        // Watermark text is dark-on-light; something near the first tile
        // row must have changed.
        let changed = (0..400u32)
            .flat_map(|x| (0..40u32).map(move |y| (x, y)))
            .any(|(x, y)| out.get_pixel(x, y) != base.get_pixel(x, y));
        assert!(changed, "text tiles should alter pixels near the first row");
    }

    #[test]
    fn test_empty_text_renders_the_default_watermark() {
        let Some(font) = discover_ui_font() else { return };
        let base = base_image(400, 400);
        let empty = render(&base, None, Some(&font), &text_params());
        let explicit = render(
            &base,
            None,
            Some(&font),
            &WatermarkParams {
                text: crate::params::DEFAULT_WATERMARK_TEXT.to_string(),
                ..text_params()
            },
        );
        // Empty text falls back to the fixed default string, so both
        // renders are pixel-identical (and neither equals the bare base).
        assert_eq!(empty, explicit);
        assert_ne!(empty, base);
    }

    #[test]
    fn test_logo_mode_without_logo_passes_base_through() {
        let base = base_image(120, 90);
        let params = WatermarkParams {
            mode: WatermarkMode::Logo,
            opacity: 0.8,
            rotation_deg: 45.0,
            ..Default::default()
        };
        let out = render(&base, None, None, &params);
        assert_eq!(out, base);
    }

    #[test]
    fn test_text_mode_without_font_passes_base_through() {
        let base = base_image(64, 64);
        let out = render(&base, None, None, &text_params());
        assert_eq!(out, base);
    }

    // --- logo branch -------------------------------------------------------

    #[test]
    fn test_logo_scaled_to_fixed_width_preserving_aspect() {
        // 300×600 logo → 150×300 on canvas, anchored at logo_pos.
        let base = base_image(500, 500);
        let logo = RgbaImage::from_pixel(300, 600, Rgba([255, 0, 0, 255]));
        let params = WatermarkParams {
            mode: WatermarkMode::Logo,
            opacity: 1.0,
            logo_pos: (50, 50),
            ..Default::default()
        };
        let out = render(&base, Some(&logo), None, &params);

        // Inside the scaled logo rect (50..200, 50..350): red.
        assert_eq!(out.get_pixel(60, 60).0, [255, 0, 0, 255]);
        assert_eq!(out.get_pixel(199, 349).0, [255, 0, 0, 255]);
        // Just outside the rect: untouched base.
        assert_eq!(out.get_pixel(210, 60).0, [220, 220, 220, 255]);
        assert_eq!(out.get_pixel(60, 360).0, [220, 220, 220, 255]);
    }

    #[test]
    fn test_logo_clips_at_canvas_edge() {
        let base = base_image(100, 100);
        let logo = RgbaImage::from_pixel(150, 150, Rgba([0, 0, 255, 255]));
        let params = WatermarkParams {
            mode: WatermarkMode::Logo,
            opacity: 1.0,
            logo_pos: (60, 60),
            ..Default::default()
        };
        let out = render(&base, Some(&logo), None, &params);
        assert_eq!(out.dimensions(), (100, 100));
        assert_eq!(out.get_pixel(80, 80).0, [0, 0, 255, 255]);
        assert_eq!(out.get_pixel(30, 30).0, [220, 220, 220, 255]);
    }

    #[test]
    fn test_logo_opacity_blends_toward_base() {
        let base = RgbaImage::from_pixel(300, 300, Rgba([0, 0, 0, 255]));
        let logo = RgbaImage::from_pixel(100, 100, Rgba([255, 255, 255, 255]));
        let params = WatermarkParams {
            mode: WatermarkMode::Logo,
            opacity: 0.5,
            logo_pos: (50, 50),
            ..Default::default()
        };
        let out = render(&base, Some(&logo), None, &params);
        let px = out.get_pixel(100, 100);
        // 50% white over black lands mid-gray.
        assert!(px[0] > 100 && px[0] < 160, "got {:?}", px);
        assert_eq!(px[3], 255);
    }

    #[test]
    fn test_logo_rotation_moves_logo_about_canvas_center() {
        // Logo placed in the top-left quadrant; rotating 180° about the
        // canvas center moves it to the bottom-right quadrant.
        let base = base_image(400, 400);
        let logo = RgbaImage::from_pixel(150, 150, Rgba([255, 0, 0, 255]));
        let params = WatermarkParams {
            mode: WatermarkMode::Logo,
            opacity: 1.0,
            rotation_deg: 180.0,
            logo_pos: (20, 20),
            ..Default::default()
        };
        let out = render(&base, Some(&logo), None, &params);
        // Unrotated the logo would cover (20..170, 20..170); rotated it
        // covers (230..380, 230..380).
        assert_eq!(out.get_pixel(300, 300).0, [255, 0, 0, 255]);
        assert_eq!(out.get_pixel(60, 60).0, [220, 220, 220, 255]);
    }

    // --- blend helper ------------------------------------------------------

    #[test]
    fn test_blend_over_half_alpha_over_white() {
        let out = blend_over([255, 255, 255, 255], [0, 0, 0, 128], 1.0);
        // ~50% black over white: mid-gray, alpha stays opaque.
        assert!(out[0] > 110 && out[0] < 140, "got {:?}", out);
        assert_eq!(out[3], 255);
    }

    #[test]
    fn test_blend_over_zero_opacity_returns_background() {
        let bg = [17, 93, 201, 255];
        assert_eq!(blend_over(bg, [255, 255, 255, 255], 0.0), bg);
    }

    #[test]
    fn test_blend_over_transparent_foreground_returns_background() {
        let bg = [250, 1, 128, 255];
        assert_eq!(blend_over(bg, [90, 90, 90, 0], 1.0), bg);
    }
}
