use anyhow::anyhow;
use eframe::egui;
use roof_sketch::gui::SketchApp;
use roof_sketch::logging;
use roof_sketch::settings::{SurfaceSettings, SETTINGS_FILE_NAME};
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    let settings = SurfaceSettings::load(SETTINGS_FILE_NAME)?;
    logging::init(
        settings.debug_logging,
        settings.log_file.as_ref().map(PathBuf::from),
    );
    tracing::info!(
        width = settings.width,
        height = settings.height,
        "starting roof sketch"
    );

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([settings.width as f32 + 40.0, settings.height as f32 + 120.0])
            .with_min_inner_size([320.0, 240.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Roof Sketch",
        native_options,
        Box::new(move |_cc| Box::new(SketchApp::new(&settings))),
    )
    .map_err(|err| anyhow!("run sketch window: {err}"))
}
