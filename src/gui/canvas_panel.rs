use crate::draw::model::Point;
use crate::draw::render::DirtyRect;
use crate::draw::{DrawingSurface, SurfaceMessage};
use eframe::egui::{self, Color32, Pos2, Rect, Sense, Stroke, TextureHandle, TextureOptions};
use image::RgbaImage;

/// Shows the surface bitmap and turns pointer input over it into messages.
#[derive(Default)]
pub struct CanvasPanel {
    texture: Option<TextureHandle>,
    texture_revision: Option<u64>,
}

impl CanvasPanel {
    /// Uploads bitmap changes to the GPU texture. Only the dirty region is
    /// re-sent once the texture exists.
    pub fn sync_texture(&mut self, ctx: &egui::Context, surface: &mut DrawingSurface) {
        let dirty = surface.take_dirty();
        if self.texture_revision == Some(surface.revision()) && self.texture.is_some() {
            return;
        }
        let Some(bitmap) = surface.bitmap() else {
            self.texture = None;
            self.texture_revision = None;
            return;
        };

        match (self.texture.as_mut(), dirty) {
            (Some(texture), Some(rect)) => {
                texture.set_partial(
                    [rect.x as usize, rect.y as usize],
                    region_image(bitmap, rect),
                    TextureOptions::NEAREST,
                );
            }
            (Some(texture), None) => {
                texture.set(full_image(bitmap), TextureOptions::NEAREST);
            }
            (None, _) => {
                self.texture =
                    Some(ctx.load_texture("surface", full_image(bitmap), TextureOptions::NEAREST));
            }
        }
        self.texture_revision = Some(surface.revision());
    }

    /// Paints the surface and returns the pointer messages for this frame in
    /// press, move, release order.
    pub fn ui(&self, ui: &mut egui::Ui, size: (u32, u32)) -> Vec<SurfaceMessage> {
        let display = egui::vec2(size.0 as f32, size.1 as f32);
        let (response, painter) = ui.allocate_painter(display, Sense::drag());
        let rect = response.rect;

        painter.rect_filled(rect, 0.0, Color32::WHITE);
        if let Some(texture) = &self.texture {
            painter.image(
                texture.id(),
                rect,
                Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(1.0, 1.0)),
                Color32::WHITE,
            );
        }
        painter.rect_stroke(rect, 0.0, Stroke::new(1.0, Color32::BLACK));

        let frame = ui.input(|i| PointerFrame {
            pressed: i.pointer.primary_pressed(),
            press_origin: i.pointer.press_origin(),
            moving: i.pointer.is_moving(),
            hover: i.pointer.hover_pos(),
            released: i.pointer.primary_released(),
        });
        pointer_messages(rect, frame)
    }
}

/// The pointer input of one frame that matters to the canvas.
#[derive(Debug, Clone, Copy, Default)]
struct PointerFrame {
    pressed: bool,
    press_origin: Option<Pos2>,
    moving: bool,
    hover: Option<Pos2>,
    released: bool,
}

fn pointer_messages(rect: Rect, frame: PointerFrame) -> Vec<SurfaceMessage> {
    let to_surface = |pos: Pos2| Point::new(pos.x - rect.min.x, pos.y - rect.min.y);

    let mut messages = Vec::new();
    if frame.pressed {
        if let Some(origin) = frame.press_origin.filter(|pos| rect.contains(*pos)) {
            messages.push(SurfaceMessage::Press(to_surface(origin)));
        }
    }
    if frame.moving {
        if let Some(pos) = frame.hover.filter(|pos| rect.contains(*pos)) {
            messages.push(SurfaceMessage::Move(to_surface(pos)));
        }
    }
    // Released anywhere in the window, not only over the canvas, so a drag
    // that leaves the canvas does not keep tracing on re-entry.
    if frame.released {
        messages.push(SurfaceMessage::Release);
    }
    messages
}

fn full_image(bitmap: &RgbaImage) -> egui::ColorImage {
    let size = [bitmap.width() as usize, bitmap.height() as usize];
    egui::ColorImage::from_rgba_unmultiplied(size, bitmap.as_raw())
}

fn region_image(bitmap: &RgbaImage, rect: DirtyRect) -> egui::ColorImage {
    let region = image::imageops::crop_imm(
        bitmap,
        rect.x as u32,
        rect.y as u32,
        rect.width as u32,
        rect.height as u32,
    )
    .to_image();
    full_image(&region)
}
