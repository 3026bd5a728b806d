// ============================================================================
// TRANSFORM OPERATIONS — rotation of the watermark layer about the canvas
// center. Output dimensions always equal input dimensions; content that
// rotates past the edges is clipped, not recovered.
// ============================================================================

use image::{RgbaImage, imageops};
use rayon::prelude::*;

/// Rotate an RGBA layer about its geometric center by `degrees`
/// (clockwise-positive), returning a layer of identical dimensions.
///
/// Pixels that sample from outside the source stay fully transparent.
/// Sampling is bilinear with a pixel-center convention, so a 180° rotation
/// maps pixel (x, y) to (w-1-x, h-1-y) exactly and is its own inverse.
pub fn rotate_about_center(layer: &RgbaImage, degrees: f32) -> RgbaImage {
    let deg = degrees.rem_euclid(360.0);
    if deg == 0.0 {
        return layer.clone();
    }
    // 180° has an exact integer mapping; skip the resampling path.
    if deg == 180.0 {
        return imageops::rotate180(layer);
    }

    let (w, h) = layer.dimensions();
    let radians = deg.to_radians();
    let (sin, cos) = radians.sin_cos();
    let cx = w as f32 * 0.5;
    let cy = h as f32 * 0.5;

    let mut out = RgbaImage::new(w, h);
    let stride = w as usize * 4;
    let buf: &mut [u8] = &mut out;
    buf.par_chunks_exact_mut(stride)
        .enumerate()
        .for_each(|(y, row)| {
            let dy = y as f32 + 0.5 - cy;
            for x in 0..w as usize {
                let dx = x as f32 + 0.5 - cx;
                // Inverse rotation: the output pixel pulls from the source
                // location that the forward (clockwise) rotation maps here.
                let sx = cos * dx + sin * dy + cx - 0.5;
                let sy = -sin * dx + cos * dy + cy - 0.5;
                if let Some(px) = sample_bilinear(layer, sx, sy) {
                    row[x * 4..x * 4 + 4].copy_from_slice(&px);
                }
            }
        });
    out
}

/// Bilinear sample at a fractional pixel coordinate. Neighbors outside the
/// image contribute transparent black; returns `None` when the sample point
/// is entirely outside.
fn sample_bilinear(img: &RgbaImage, sx: f32, sy: f32) -> Option<[u8; 4]> {
    let (w, h) = (img.width() as i64, img.height() as i64);
    if sx <= -1.0 || sy <= -1.0 || sx >= w as f32 || sy >= h as f32 {
        return None;
    }

    let x0 = sx.floor();
    let y0 = sy.floor();
    let fx = sx - x0;
    let fy = sy - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let fetch = |x: i64, y: i64| -> [f32; 4] {
        if x < 0 || y < 0 || x >= w || y >= h {
            [0.0; 4]
        } else {
            let p = img.get_pixel(x as u32, y as u32).0;
            [p[0] as f32, p[1] as f32, p[2] as f32, p[3] as f32]
        }
    };

    let p00 = fetch(x0, y0);
    let p10 = fetch(x0 + 1, y0);
    let p01 = fetch(x0, y0 + 1);
    let p11 = fetch(x0 + 1, y0 + 1);

    let mut px = [0u8; 4];
    for (c, out) in px.iter_mut().enumerate() {
        let v = p00[c] * (1.0 - fx) * (1.0 - fy)
            + p10[c] * fx * (1.0 - fy)
            + p01[c] * (1.0 - fx) * fy
            + p11[c] * fx * fy;
        *out = v.round().clamp(0.0, 255.0) as u8;
    }
    Some(px)
}
