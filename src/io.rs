//! Image loading and PNG export.
//!
//! Decoding covers the common raster formats the image crate is built with
//! (PNG, JPEG, WEBP, BMP). Export is PNG-only, offered under the fixed
//! default name `watermarked.png`.

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, RgbaImage};
use rfd::FileDialog;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Default file name offered by the export dialog.
pub const EXPORT_FILE_NAME: &str = "watermarked.png";

/// File extensions accepted by the open dialogs.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp"];

/// Error type for load/export operations.
#[derive(Debug)]
pub enum AquamarkError {
    Io(std::io::Error),
    Image(image::ImageError),
}

impl std::fmt::Display for AquamarkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AquamarkError::Io(e) => write!(f, "I/O error: {}", e),
            AquamarkError::Image(e) => write!(f, "Image error: {}", e),
        }
    }
}

impl std::error::Error for AquamarkError {}

impl From<std::io::Error> for AquamarkError {
    fn from(e: std::io::Error) -> Self {
        AquamarkError::Io(e)
    }
}

impl From<image::ImageError> for AquamarkError {
    fn from(e: image::ImageError) -> Self {
        AquamarkError::Image(e)
    }
}

/// Decode an image file to RGBA.
pub fn load_image(path: &Path) -> Result<RgbaImage, AquamarkError> {
    let img = image::open(path)?;
    Ok(img.to_rgba8())
}

/// Encode `image` as PNG at `path`.
pub fn export_png(image: &RgbaImage, path: &Path) -> Result<(), AquamarkError> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let encoder = PngEncoder::new(writer);
    encoder.write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ColorType::Rgba8,
    )?;
    Ok(())
}

/// Open-file dialog filtered to supported raster formats.
pub fn pick_image_dialog(title: &str) -> Option<PathBuf> {
    FileDialog::new()
        .set_title(title)
        .add_filter("Images", IMAGE_EXTENSIONS)
        .pick_file()
}

/// Save-file dialog pre-filled with the default export name.
pub fn pick_export_dialog() -> Option<PathBuf> {
    FileDialog::new()
        .set_title("Export watermarked image")
        .set_file_name(EXPORT_FILE_NAME)
        .add_filter("PNG image", &["png"])
        .save_file()
}

/// True when the path's extension looks like a supported raster image.
/// Used to filter dropped files before attempting a decode.
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("aquamark-test-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_export_then_load_round_trip() {
        let mut img = RgbaImage::from_pixel(31, 17, Rgba([10, 200, 30, 255]));
        img.put_pixel(5, 5, Rgba([255, 0, 0, 255]));

        let path = temp_path("roundtrip.png");
        export_png(&img, &path).expect("export should succeed");
        let loaded = load_image(&path).expect("load should succeed");
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.dimensions(), (31, 17));
        assert_eq!(loaded, img);
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let err = load_image(Path::new("/nonexistent/aquamark-missing.png"));
        assert!(err.is_err());
    }

    #[test]
    fn test_is_image_path() {
        assert!(is_image_path(Path::new("photo.PNG")));
        assert!(is_image_path(Path::new("dir/pic.jpeg")));
        assert!(!is_image_path(Path::new("notes.txt")));
        assert!(!is_image_path(Path::new("no_extension")));
    }

    #[test]
    fn test_error_display() {
        let err = AquamarkError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "gone",
        ));
        assert!(err.to_string().contains("I/O error"));
    }
}
