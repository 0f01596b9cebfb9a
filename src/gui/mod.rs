mod canvas_panel;

pub use canvas_panel::CanvasPanel;

use crate::draw::{
    DrawingSurface, SurfaceController, SurfaceEvent, SurfaceMessage, UploadOutcome,
};
use crate::settings::SurfaceSettings;
use eframe::egui;
use egui_toast::{Toast, ToastKind, ToastOptions, Toasts};
use std::path::PathBuf;
use std::sync::mpsc::Sender;

const TOAST_SECONDS: f64 = 3.0;

/// Desktop host for the drawing surface: the trigger buttons, an image
/// upload field (or files dropped onto the window) and the canvas.
pub struct SketchApp {
    sender: Sender<SurfaceMessage>,
    controller: SurfaceController,
    canvas: CanvasPanel,
    upload_path: String,
    toasts: Toasts,
}

impl SketchApp {
    pub fn new(settings: &SurfaceSettings) -> Self {
        let (sender, controller) = SurfaceController::with_channel(DrawingSurface::new(settings));
        Self {
            sender,
            controller,
            canvas: CanvasPanel::default(),
            upload_path: String::new(),
            toasts: Toasts::new().anchor(egui::Align2::RIGHT_TOP, [10.0, 10.0]),
        }
    }

    pub fn surface(&self) -> &DrawingSurface {
        self.controller.surface()
    }

    pub fn controller_mut(&mut self) -> &mut SurfaceController {
        &mut self.controller
    }

    pub fn post(&self, message: SurfaceMessage) {
        if self.sender.send(message).is_err() {
            tracing::error!("surface message channel closed");
        }
    }

    /// Only the first dropped file is used, like a single-file picker.
    pub fn handle_dropped_files(&mut self, files: Vec<egui::DroppedFile>) {
        let Some(file) = files.into_iter().next() else {
            return;
        };
        if let Some(path) = file.path {
            self.upload_path = path.display().to_string();
            self.post(SurfaceMessage::UploadFile(path));
        } else if let Some(bytes) = file.bytes {
            self.post(SurfaceMessage::Upload(Some(bytes.to_vec())));
        }
    }

    /// Runs one event-loop turn over everything queued so far and reports
    /// the results as toasts.
    pub fn pump(&mut self) {
        for event in self.controller.pump() {
            self.report(event);
        }
    }

    fn report(&mut self, event: SurfaceEvent) {
        match event {
            SurfaceEvent::Exported(exported) => self.toast(
                ToastKind::Success,
                format!("Saved {}", exported.path.display()),
            ),
            SurfaceEvent::Upload(UploadOutcome::DecodeFailed) => {
                self.toast(ToastKind::Error, "Could not read that image".to_string())
            }
            SurfaceEvent::Failed(message) => {
                self.toast(ToastKind::Error, format!("Failed: {message}"))
            }
            _ => {}
        }
    }

    fn toast(&mut self, kind: ToastKind, text: String) {
        self.toasts.add(Toast {
            text: text.into(),
            kind,
            options: ToastOptions::default().duration_in_seconds(TOAST_SECONDS),
        });
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Start Drawing").clicked() {
                self.post(SurfaceMessage::Enable);
            }
            if ui.button("Stop Drawing").clicked() {
                self.post(SurfaceMessage::Disable);
            }
            if ui.button("Clear").clicked() {
                self.post(SurfaceMessage::Clear);
            }
            if ui.button("Export as Image").clicked() {
                self.post(SurfaceMessage::Export);
            }
            ui.separator();
            ui.label("Image");
            ui.text_edit_singleline(&mut self.upload_path);
            if ui.button("Upload").clicked() {
                let path = self.upload_path.trim();
                if path.is_empty() {
                    self.post(SurfaceMessage::Upload(None));
                } else {
                    self.post(SurfaceMessage::UploadFile(PathBuf::from(path)));
                }
            }
        });
    }
}

impl eframe::App for SketchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if !dropped.is_empty() {
            self.handle_dropped_files(dropped);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Draw Your Roof");
            self.toolbar(ui);
            let size = self.controller.surface().size();
            for message in self.canvas.ui(ui, size) {
                self.post(message);
            }
        });

        let before = self.controller.surface().revision();
        self.pump();
        self.canvas
            .sync_texture(ctx, self.controller.surface_mut());
        // The canvas was painted before this turn's changes landed.
        if self.controller.surface().revision() != before || self.controller.uploads_in_flight() > 0
        {
            ctx.request_repaint();
        }
        self.toasts.show(ctx);
    }
}
