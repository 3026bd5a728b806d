//! Live preview of the composited image.
//!
//! The rendered RGBA buffer is uploaded to an egui texture once per render
//! (not per frame); the texture handle is reused via `set()` to avoid
//! allocation churn while sliders are dragged.

use egui::{ColorImage, TextureOptions};
use image::RgbaImage;

#[derive(Default)]
pub struct Preview {
    texture: Option<egui::TextureHandle>,
    size: (u32, u32),
}

impl Preview {
    /// Upload a freshly rendered image, reusing the existing texture handle
    /// when one exists.
    pub fn set_image(&mut self, ctx: &egui::Context, img: &RgbaImage) {
        let (w, h) = img.dimensions();
        let color_image =
            ColorImage::from_rgba_unmultiplied([w as usize, h as usize], img.as_raw());
        match &mut self.texture {
            Some(tex) => tex.set(color_image, TextureOptions::LINEAR),
            None => {
                self.texture = Some(ctx.load_texture("preview", color_image, TextureOptions::LINEAR))
            }
        }
        self.size = (w, h);
    }

    /// Drop the current preview (e.g. before a replacement image loads).
    pub fn clear(&mut self) {
        self.texture = None;
        self.size = (0, 0);
    }

    /// Draw the preview scaled to fit the available panel space, centered.
    pub fn show(&self, ui: &mut egui::Ui) {
        let Some(tex) = &self.texture else {
            ui.centered_and_justified(|ui| {
                ui.label("Open an image (File ▸ Open Image…) or drop one here");
            });
            return;
        };

        let (w, h) = (self.size.0 as f32, self.size.1 as f32);
        let avail = ui.available_size();
        let scale = (avail.x / w).min(avail.y / h).min(1.0);
        let display = egui::vec2(w * scale, h * scale);

        ui.centered_and_justified(|ui| {
            ui.add(egui::Image::new(egui::load::SizedTexture::new(
                tex.id(),
                display,
            )));
        });
    }
}
