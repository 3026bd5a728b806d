use std::ops::RangeInclusive;

/// Text drawn when the user leaves the watermark text field empty.
pub const DEFAULT_WATERMARK_TEXT: &str = "WATERMARK";

/// Which kind of watermark is composited over the base image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum WatermarkMode {
    /// Repeat the watermark text in a regular grid across the image.
    #[default]
    Text,
    /// Place a single logo image at a fixed offset.
    Logo,
}

impl WatermarkMode {
    pub fn label(&self) -> &'static str {
        match self {
            WatermarkMode::Text => "Text",
            WatermarkMode::Logo => "Logo",
        }
    }

    pub fn all() -> &'static [WatermarkMode] {
        &[WatermarkMode::Text, WatermarkMode::Logo]
    }
}

/// Everything the compositor needs besides the images themselves.
///
/// The control panel mutates this in place on every edit; the compositor
/// only ever reads it. UI widgets are bound to the ranges below, so the
/// compositor never sees an out-of-range value.
#[derive(Clone, Debug, PartialEq)]
pub struct WatermarkParams {
    pub mode: WatermarkMode,
    /// Watermark text. Empty is valid — `effective_text` substitutes the default.
    pub text: String,
    pub font_size_px: u32,
    /// Global watermark opacity, 0.0..=1.0.
    pub opacity: f32,
    /// Rotation of the watermark layer about the image center, in degrees.
    /// Clockwise-positive, interpreted modulo 360.
    pub rotation_deg: f32,
    /// Top-left offset of the logo in output pixel space.
    pub logo_pos: (i32, i32),
}

impl WatermarkParams {
    pub const FONT_SIZE_RANGE: RangeInclusive<u32> = 8..=120;
    pub const OPACITY_RANGE: RangeInclusive<f32> = 0.0..=1.0;
    pub const ROTATION_RANGE: RangeInclusive<f32> = -180.0..=180.0;

    /// The text the compositor actually draws: the user's text, or the
    /// fixed default when the field is empty.
    pub fn effective_text(&self) -> &str {
        if self.text.is_empty() {
            DEFAULT_WATERMARK_TEXT
        } else {
            &self.text
        }
    }
}

impl Default for WatermarkParams {
    fn default() -> Self {
        Self {
            mode: WatermarkMode::Text,
            text: String::new(),
            font_size_px: 32,
            opacity: 0.5,
            rotation_deg: 0.0,
            logo_pos: (50, 50),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_falls_back_to_default() {
        let params = WatermarkParams::default();
        assert!(params.text.is_empty());
        assert_eq!(params.effective_text(), DEFAULT_WATERMARK_TEXT);
        assert_eq!(params.effective_text(), "WATERMARK");
    }

    #[test]
    fn test_non_empty_text_is_used_verbatim() {
        let params = WatermarkParams {
            text: "© example.com".to_string(),
            ..Default::default()
        };
        assert_eq!(params.effective_text(), "© example.com");
    }

    #[test]
    fn test_mode_labels_and_variants() {
        assert_eq!(WatermarkMode::all().len(), 2);
        assert_eq!(WatermarkMode::Text.label(), "Text");
        assert_eq!(WatermarkMode::Logo.label(), "Logo");
        assert_eq!(WatermarkMode::default(), WatermarkMode::Text);
    }

    #[test]
    fn test_defaults_match_control_panel_bounds() {
        let params = WatermarkParams::default();
        assert_eq!(params.mode, WatermarkMode::Text);
        assert_eq!(params.font_size_px, 32);
        assert!(WatermarkParams::FONT_SIZE_RANGE.contains(&params.font_size_px));
        assert!(WatermarkParams::OPACITY_RANGE.contains(&params.opacity));
        assert!(WatermarkParams::ROTATION_RANGE.contains(&params.rotation_deg));
        assert_eq!(params.logo_pos, (50, 50));
    }
}
