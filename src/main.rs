use std::path::PathBuf;

use clap::Parser;
use eframe::egui;

use aquamark::app::AquamarkApp;
use aquamark::logger;

/// Aquamark — watermark an image with tiled text or a logo overlay.
#[derive(Parser, Debug)]
#[command(name = "aquamark", about = "Watermark studio")]
struct Args {
    /// Image file to open at startup.
    image: Option<PathBuf>,
}

fn main() -> Result<(), eframe::Error> {
    // Session log (overwrites the previous session's file)
    logger::init();

    let args = Args::parse();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_title("Aquamark"),
        ..Default::default()
    };

    eframe::run_native(
        "Aquamark",
        options,
        Box::new(move |cc| Box::new(AquamarkApp::new(cc, args.image))),
    )
}
