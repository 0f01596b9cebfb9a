use crate::draw::input::TraceInput;
use crate::draw::messages::{SurfaceEvent, SurfaceMessage};
use crate::draw::model::{Color, Point, PointSequence, StrokeStyle};
use crate::draw::render::{self, DirtyRect, RenderMode};
use crate::draw::save::{self, ExportedImage};
use crate::draw::state::DrawingState;
use crate::draw::upload::{self, UploadOutcome};
use crate::settings::SurfaceSettings;
use anyhow::Result;
use image::RgbaImage;
use std::path::Path;

/// The drawing widget: drawing flags, captured points and the bitmap they
/// are rendered onto.
///
/// The bitmap is absent while the surface is unmounted; rendering, export
/// and upload are silent no-ops then, while point capture keeps working.
#[derive(Debug, Clone)]
pub struct DrawingSurface {
    width: u32,
    height: u32,
    style: StrokeStyle,
    background: Color,
    render_mode: RenderMode,
    export_dir: Option<String>,
    input: TraceInput,
    bitmap: Option<RgbaImage>,
    revision: u64,
    dirty: Option<DirtyRect>,
    /// Set when the bitmap was repainted under the polyline.
    polyline_stale: bool,
}

impl DrawingSurface {
    pub fn new(settings: &SurfaceSettings) -> Self {
        let mut surface = Self::unmounted(settings);
        surface.mount();
        surface
    }

    pub fn unmounted(settings: &SurfaceSettings) -> Self {
        let mut settings = settings.clone();
        settings.sanitize();
        Self {
            width: settings.width,
            height: settings.height,
            style: settings.stroke_style(),
            background: settings.background,
            render_mode: settings.render_mode,
            export_dir: settings.export_dir,
            input: TraceInput::default(),
            bitmap: None,
            revision: 0,
            dirty: None,
            polyline_stale: false,
        }
    }

    pub fn mount(&mut self) {
        if self.bitmap.is_some() {
            return;
        }
        let mut bitmap = RgbaImage::new(self.width, self.height);
        render::fill_background(&mut bitmap, self.background);
        render::stroke_polyline(&mut bitmap, self.input.points().as_slice(), self.style);
        self.bitmap = Some(bitmap);
        self.mark_full_change();
        tracing::debug!(width = self.width, height = self.height, "surface mounted");
    }

    pub fn unmount(&mut self) {
        self.bitmap = None;
        self.dirty = None;
        tracing::debug!("surface unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.bitmap.is_some()
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn state(&self) -> DrawingState {
        self.input.state()
    }

    pub fn points(&self) -> &PointSequence {
        self.input.points()
    }

    pub fn bitmap(&self) -> Option<&RgbaImage> {
        self.bitmap.as_ref()
    }

    pub fn stroke_style(&self) -> StrokeStyle {
        self.style
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    /// Bumped on every bitmap change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Region changed since the last call, already clamped to the surface.
    pub fn take_dirty(&mut self) -> Option<DirtyRect> {
        self.dirty.take()
    }

    pub fn enable_drawing(&mut self) {
        self.input.enable_drawing();
    }

    pub fn disable_drawing(&mut self) {
        self.input.disable_drawing();
    }

    pub fn pointer_press(&mut self, point: Point) -> bool {
        let captured = self.input.handle_press(point);
        if captured {
            self.render();
        }
        captured
    }

    pub fn pointer_move(&mut self, point: Point) -> bool {
        let captured = self.input.handle_move(point);
        if captured {
            self.render();
        }
        captured
    }

    pub fn pointer_release(&mut self) {
        self.input.handle_release();
    }

    /// Strokes the point sequence per the render mode. Does not clear the
    /// bitmap first; an empty sequence leaves it untouched. After an upload
    /// the whole polyline is stroked once, whatever the mode.
    pub fn render(&mut self) {
        let Some(bitmap) = self.bitmap.as_mut() else {
            return;
        };
        let mode = if self.polyline_stale {
            RenderMode::FullRedraw
        } else {
            self.render_mode
        };
        let dirty = render::render_after_append(bitmap, self.input.points(), self.style, mode);
        if !self.input.points().is_empty() {
            self.polyline_stale = false;
        }
        if let Some(rect) = dirty {
            self.mark_changed(rect);
        }
    }

    pub fn clear(&mut self) {
        if let Some(bitmap) = self.bitmap.as_mut() {
            render::fill_background(bitmap, self.background);
            self.mark_full_change();
        }
        self.input.clear_points();
        self.polyline_stale = false;
        tracing::debug!("surface cleared");
    }

    /// PNG bytes of the current bitmap, `None` while unmounted.
    pub fn encode_png(&self) -> Result<Option<Vec<u8>>> {
        self.bitmap.as_ref().map(save::encode_png).transpose()
    }

    /// Writes the bitmap to `drawing.png` in the configured download folder.
    pub fn export_image(&self) -> Result<Option<ExportedImage>> {
        if self.bitmap.is_none() {
            return Ok(None);
        }
        let dir = save::resolve_export_dir(self.export_dir.as_deref())?;
        self.export_to(&dir)
    }

    pub fn export_to(&self, output_dir: &Path) -> Result<Option<ExportedImage>> {
        let Some(bitmap) = self.bitmap.as_ref() else {
            return Ok(None);
        };
        let exported = save::download_png(bitmap, output_dir)?;
        tracing::info!(path = %exported.path.display(), bytes = exported.byte_len, "drawing exported");
        Ok(Some(exported))
    }

    /// Decodes `file` and replaces the bitmap with it, stretched to the
    /// surface size. A failed decode leaves the bitmap untouched. The point
    /// sequence is kept.
    pub fn upload_image(&mut self, file: Option<&[u8]>) -> UploadOutcome {
        let Some(bytes) = file else {
            return UploadOutcome::NoFile;
        };
        if self.bitmap.is_none() {
            return UploadOutcome::Unavailable;
        }
        match upload::decode_image(bytes) {
            Ok(decoded) => self.apply_decoded(&decoded),
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "ignoring undecodable upload");
                UploadOutcome::DecodeFailed
            }
        }
    }

    /// Blanks the bitmap and draws `decoded` stretched over all of it.
    pub fn apply_decoded(&mut self, decoded: &RgbaImage) -> UploadOutcome {
        let Some(bitmap) = self.bitmap.as_mut() else {
            return UploadOutcome::Unavailable;
        };
        let stretched = upload::stretch_to_surface(decoded, self.width, self.height);
        render::fill_background(bitmap, self.background);
        image::imageops::overlay(bitmap, &stretched, 0, 0);
        self.polyline_stale = !self.input.points().is_empty();
        self.mark_full_change();
        tracing::info!(
            source_width = decoded.width(),
            source_height = decoded.height(),
            "upload applied"
        );
        UploadOutcome::Applied
    }

    /// Applies one message synchronously. `UploadFile` reads and decodes on
    /// the calling thread; [`crate::draw::controller::SurfaceController`]
    /// moves that work off the loop.
    pub fn dispatch(&mut self, message: SurfaceMessage) -> Result<SurfaceEvent> {
        let event = match message {
            SurfaceMessage::Press(point) => captured_event(self.pointer_press(point), point),
            SurfaceMessage::Move(point) => captured_event(self.pointer_move(point), point),
            SurfaceMessage::Release => {
                self.pointer_release();
                SurfaceEvent::Applied
            }
            SurfaceMessage::Enable => {
                self.enable_drawing();
                SurfaceEvent::Applied
            }
            SurfaceMessage::Disable => {
                self.disable_drawing();
                SurfaceEvent::Applied
            }
            SurfaceMessage::Clear => {
                self.clear();
                SurfaceEvent::Cleared
            }
            SurfaceMessage::Export => match self.export_image()? {
                Some(exported) => SurfaceEvent::Exported(exported),
                None => SurfaceEvent::ExportSkipped,
            },
            SurfaceMessage::Upload(bytes) => {
                SurfaceEvent::Upload(self.upload_image(bytes.as_deref()))
            }
            SurfaceMessage::UploadFile(path) => match upload::read_and_decode(&path) {
                Ok(decoded) => SurfaceEvent::Upload(self.apply_decoded(&decoded)),
                Err(err) => {
                    tracing::warn!(error = %format!("{err:#}"), "ignoring unreadable upload");
                    SurfaceEvent::Upload(UploadOutcome::DecodeFailed)
                }
            },
        };
        Ok(event)
    }

    fn mark_full_change(&mut self) {
        self.mark_changed(DirtyRect::full(self.width, self.height));
    }

    fn mark_changed(&mut self, rect: DirtyRect) {
        self.revision = self.revision.wrapping_add(1);
        let merged = self.dirty.map_or(rect, |dirty| dirty.union(rect));
        self.dirty = merged.clamp(self.width, self.height);
    }
}

fn captured_event(captured: bool, point: Point) -> SurfaceEvent {
    if captured {
        SurfaceEvent::PointCaptured(point)
    } else {
        SurfaceEvent::Applied
    }
}
