//! Application shell: one explicit state struct, one render entry point.
//!
//! Every mutating event (file loaded, slider dragged, text edited, mode
//! switched) flips `needs_render`; the end of the frame then invokes the
//! compositor exactly once and refreshes the preview texture. The render
//! always observes the fully-applied mutation of the event that triggered
//! it — there is no queuing and no debouncing; a full recomposite is cheap
//! enough to run per event.

use std::path::PathBuf;

use ab_glyph::FontArc;
use eframe::egui;
use image::RgbaImage;

use crate::fonts::discover_ui_font;
use crate::io;
use crate::ops::compositor;
use crate::params::{WatermarkMode, WatermarkParams};
use crate::preview::Preview;
use crate::{log_err, log_info, log_warn};

pub struct AquamarkApp {
    // Images (replaced wholesale on each load)
    base: Option<RgbaImage>,
    logo: Option<RgbaImage>,

    // Watermark parameters, mutated in place by the control panel
    params: WatermarkParams,

    // Fixed watermark typeface, discovered once at startup
    font: Option<FontArc>,

    // Latest composited output; exported as-is
    rendered: Option<RgbaImage>,

    // Preview texture management
    preview: Preview,

    // Set by any mutating event; consumed once per frame
    needs_render: bool,

    // One-line feedback shown in the status bar
    status: String,

    // Image path from the command line, opened on the first frame
    startup_file: Option<PathBuf>,
}

impl AquamarkApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, startup_file: Option<PathBuf>) -> Self {
        let font = discover_ui_font();
        match &font {
            Some(_) => log_info!("Watermark typeface discovered"),
            None => {
                log_warn!("No system font found; text watermarks will draw nothing")
            }
        }

        Self {
            base: None,
            logo: None,
            params: WatermarkParams::default(),
            font,
            rendered: None,
            preview: Preview::default(),
            needs_render: false,
            status: String::new(),
            startup_file,
        }
    }

    // -- Event handlers ------------------------------------------------------

    fn open_base_from_path(&mut self, path: PathBuf) {
        match io::load_image(&path) {
            Ok(img) => {
                log_info!(
                    "Loaded base image {} ({}x{})",
                    path.display(),
                    img.width(),
                    img.height()
                );
                self.status = format!(
                    "Loaded {} ({}×{})",
                    file_name(&path),
                    img.width(),
                    img.height()
                );
                self.base = Some(img);
                self.rendered = None;
                self.preview.clear();
                self.needs_render = true;
            }
            Err(e) => {
                log_err!("Failed to load {}: {}", path.display(), e);
                self.status = format!("Could not load {}: {}", file_name(&path), e);
            }
        }
    }

    fn open_logo_from_path(&mut self, path: PathBuf) {
        match io::load_image(&path) {
            Ok(img) => {
                log_info!(
                    "Loaded logo {} ({}x{})",
                    path.display(),
                    img.width(),
                    img.height()
                );
                self.status = format!("Loaded logo {}", file_name(&path));
                self.logo = Some(img);
                self.needs_render = true;
            }
            Err(e) => {
                log_err!("Failed to load logo {}: {}", path.display(), e);
                self.status = format!("Could not load logo: {}", e);
            }
        }
    }

    /// Export the latest composite. A no-op when nothing has been rendered
    /// (i.e. no base image loaded).
    fn export(&mut self) {
        let Some(rendered) = &self.rendered else {
            return;
        };
        let Some(path) = io::pick_export_dialog() else {
            return;
        };
        match io::export_png(rendered, &path) {
            Ok(()) => {
                log_info!("Exported {}", path.display());
                self.status = format!("Exported {}", file_name(&path));
            }
            Err(e) => {
                log_err!("Export to {} failed: {}", path.display(), e);
                self.status = format!("Export failed: {}", e);
            }
        }
    }

    /// Dropped files load as the base image (mirrors the drop zone of the
    /// control surface this app replaces).
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            if let Some(path) = file.path
                && io::is_image_path(&path)
            {
                self.open_base_from_path(path);
                break;
            }
        }
    }

    /// The single render entry point: recompute the composite from current
    /// state and refresh the preview.
    fn recomposite(&mut self, ctx: &egui::Context) {
        let Some(base) = &self.base else {
            return;
        };
        let out = compositor::render(base, self.logo.as_ref(), self.font.as_ref(), &self.params);
        self.preview.set_image(ctx, &out);
        self.rendered = Some(out);
    }

    // -- UI ------------------------------------------------------------------

    fn menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Image…").clicked() {
                        ui.close_menu();
                        if let Some(path) = io::pick_image_dialog("Open image") {
                            self.open_base_from_path(path);
                        }
                    }
                    if ui.button("Open Logo…").clicked() {
                        ui.close_menu();
                        if let Some(path) = io::pick_image_dialog("Open logo") {
                            self.open_logo_from_path(path);
                        }
                    }
                    ui.separator();
                    if ui
                        .add_enabled(self.rendered.is_some(), egui::Button::new("Export PNG…"))
                        .clicked()
                    {
                        ui.close_menu();
                        self.export();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ui.close_menu();
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });
    }

    fn control_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("controls")
            .resizable(false)
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.add_space(6.0);
                ui.heading("Watermark");
                ui.separator();

                let mut changed = false;

                egui::ComboBox::from_label("Mode")
                    .selected_text(self.params.mode.label())
                    .show_ui(ui, |ui| {
                        for mode in WatermarkMode::all() {
                            changed |= ui
                                .selectable_value(&mut self.params.mode, *mode, mode.label())
                                .changed();
                        }
                    });

                ui.add_space(8.0);
                match self.params.mode {
                    WatermarkMode::Text => changed |= self.text_controls(ui),
                    WatermarkMode::Logo => changed |= self.logo_controls(ui),
                }

                ui.add_space(8.0);
                ui.separator();
                changed |= ui
                    .add(
                        egui::Slider::new(
                            &mut self.params.opacity,
                            WatermarkParams::OPACITY_RANGE,
                        )
                        .text("Opacity"),
                    )
                    .changed();
                changed |= ui
                    .add(
                        egui::Slider::new(
                            &mut self.params.rotation_deg,
                            WatermarkParams::ROTATION_RANGE,
                        )
                        .suffix("°")
                        .text("Rotation"),
                    )
                    .changed();

                if changed {
                    self.needs_render = true;
                }
            });
    }

    fn text_controls(&mut self, ui: &mut egui::Ui) -> bool {
        let mut changed = false;
        ui.label("Text");
        changed |= ui
            .add(
                egui::TextEdit::singleline(&mut self.params.text)
                    .hint_text(crate::params::DEFAULT_WATERMARK_TEXT),
            )
            .changed();
        changed |= ui
            .add(
                egui::Slider::new(
                    &mut self.params.font_size_px,
                    WatermarkParams::FONT_SIZE_RANGE,
                )
                .suffix(" px")
                .text("Font size"),
            )
            .changed();
        if self.font.is_none() {
            ui.add_space(4.0);
            ui.colored_label(
                egui::Color32::YELLOW,
                "No system font found — text cannot be drawn",
            );
        }
        changed
    }

    fn logo_controls(&mut self, ui: &mut egui::Ui) -> bool {
        let mut changed = false;
        if ui.button("Open Logo…").clicked()
            && let Some(path) = io::pick_image_dialog("Open logo")
        {
            self.open_logo_from_path(path);
        }
        match &self.logo {
            Some(logo) => {
                ui.label(format!("Logo: {}×{}", logo.width(), logo.height()));
            }
            None => {
                ui.label("No logo loaded — base image passes through");
            }
        }
        ui.add_space(4.0);
        ui.horizontal(|ui| {
            ui.label("Position");
            changed |= ui
                .add(egui::DragValue::new(&mut self.params.logo_pos.0).prefix("x: "))
                .changed();
            changed |= ui
                .add(egui::DragValue::new(&mut self.params.logo_pos.1).prefix("y: "))
                .changed();
        });
        changed
    }

    fn status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.status);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if let Some(base) = &self.base {
                        ui.label(format!("{}×{}", base.width(), base.height()));
                    }
                });
            });
        });
    }
}

impl eframe::App for AquamarkApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(path) = self.startup_file.take() {
            self.open_base_from_path(path);
        }
        self.handle_dropped_files(ctx);

        self.menu_bar(ctx);
        self.control_panel(ctx);
        self.status_bar(ctx);

        // Apply this frame's mutations before drawing the preview.
        if self.needs_render {
            self.needs_render = false;
            self.recomposite(ctx);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.preview.show(ui);
        });
    }
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
