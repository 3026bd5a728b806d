//! Watermark typeface discovery.
//!
//! The app uses one fixed sans-serif typeface for text watermarks. Nothing
//! is bundled; the font is located at startup — first via font-kit's
//! best-match query, then by probing well-known file paths. When neither
//! finds a usable font, Text mode simply draws nothing.

use ab_glyph::FontArc;
use font_kit::family_name::FamilyName;
use font_kit::properties::Properties;
use font_kit::source::SystemSource;

/// Well-known font file locations, probed when font-kit has nothing usable
/// (headless systems, minimal containers).
const FALLBACK_FONT_PATHS: &[&str] = &[
    #[cfg(target_os = "linux")]
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    #[cfg(target_os = "linux")]
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    #[cfg(target_os = "linux")]
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    #[cfg(target_os = "linux")]
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    #[cfg(target_os = "linux")]
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    #[cfg(target_os = "linux")]
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    #[cfg(target_os = "linux")]
    "/usr/share/fonts/gnu-free/FreeSans.ttf",
    #[cfg(target_os = "windows")]
    "C:\\Windows\\Fonts\\arial.ttf",
    #[cfg(target_os = "windows")]
    "C:\\Windows\\Fonts\\segoeui.ttf",
    #[cfg(target_os = "macos")]
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    #[cfg(target_os = "macos")]
    "/Library/Fonts/Arial.ttf",
];

/// Locate the watermark typeface. Returns `None` when no font could be
/// found or parsed; callers treat that as "text mode draws nothing".
pub fn discover_ui_font() -> Option<FontArc> {
    if let Some(font) = query_system_sans() {
        return Some(font);
    }
    for path in FALLBACK_FONT_PATHS {
        if let Ok(data) = std::fs::read(path)
            && let Ok(font) = FontArc::try_from_vec(data)
        {
            return Some(font);
        }
    }
    None
}

/// Ask font-kit for the default sans-serif family and parse it with
/// ab_glyph. Collection files (.ttc) that ab_glyph can't parse fall
/// through to the path probe.
fn query_system_sans() -> Option<FontArc> {
    let handle = SystemSource::new()
        .select_best_match(&[FamilyName::SansSerif], &Properties::new())
        .ok()?;
    let font = handle.load().ok()?;
    let data = font.copy_font_data()?;
    FontArc::try_from_vec((*data).clone()).ok()
}
