use crate::draw::model::{Color, Point, PointSequence, StrokeStyle};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// How the polyline is brought up to date after a point is appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Stroke only the newest segment (or the first point as a dot).
    #[default]
    Incremental,
    /// Stroke the whole polyline again over the existing bitmap.
    FullRedraw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl DirtyRect {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width: width as i32,
            height: height as i32,
        }
    }

    pub fn from_points(a: (i32, i32), b: (i32, i32), pad: i32) -> Self {
        let min_x = a.0.min(b.0).saturating_sub(pad);
        let max_x = a.0.max(b.0).saturating_add(pad);
        let min_y = a.1.min(b.1).saturating_sub(pad);
        let max_y = a.1.max(b.1).saturating_add(pad);
        Self {
            x: min_x,
            y: min_y,
            width: max_x.saturating_sub(min_x).saturating_add(1).max(1),
            height: max_y.saturating_sub(min_y).saturating_add(1).max(1),
        }
    }

    fn right(self) -> i32 {
        self.x.saturating_add(self.width)
    }

    fn bottom(self) -> i32 {
        self.y.saturating_add(self.height)
    }

    pub fn union(self, other: DirtyRect) -> DirtyRect {
        let min_x = self.x.min(other.x);
        let min_y = self.y.min(other.y);
        let max_x = self.right().max(other.right());
        let max_y = self.bottom().max(other.bottom());
        DirtyRect {
            x: min_x,
            y: min_y,
            width: max_x.saturating_sub(min_x).max(1),
            height: max_y.saturating_sub(min_y).max(1),
        }
    }

    pub fn clamp(self, width: u32, height: u32) -> Option<DirtyRect> {
        let max_w = i32::try_from(width).unwrap_or(i32::MAX);
        let max_h = i32::try_from(height).unwrap_or(i32::MAX);
        let x0 = self.x.clamp(0, max_w);
        let y0 = self.y.clamp(0, max_h);
        let x1 = self.right().clamp(0, max_w);
        let y1 = self.bottom().clamp(0, max_h);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(DirtyRect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }
}

/// Brings the bitmap up to date after the last point of `points` was
/// appended. An empty sequence leaves the bitmap untouched.
pub fn render_after_append(
    img: &mut RgbaImage,
    points: &PointSequence,
    style: StrokeStyle,
    mode: RenderMode,
) -> Option<DirtyRect> {
    match mode {
        RenderMode::FullRedraw => stroke_polyline(img, points.as_slice(), style),
        RenderMode::Incremental => match points.last_segment() {
            Some((start, end)) => stroke_segment(img, start, end, style),
            None => points.last().and_then(|only| stroke_dot(img, only, style)),
        },
    }
}

/// Strokes the connected polyline through `points` in order. A single point
/// becomes a dot of the stroke width.
pub fn stroke_polyline(
    img: &mut RgbaImage,
    points: &[Point],
    style: StrokeStyle,
) -> Option<DirtyRect> {
    match points {
        [] => None,
        [only] => stroke_dot(img, *only, style),
        _ => points
            .windows(2)
            .filter_map(|pair| stroke_segment(img, pair[0], pair[1], style))
            .reduce(DirtyRect::union),
    }
}

pub fn stroke_dot(img: &mut RgbaImage, point: Point, style: StrokeStyle) -> Option<DirtyRect> {
    stroke_segment(img, point, point, style)
}

pub fn stroke_segment(
    img: &mut RgbaImage,
    start: Point,
    end: Point,
    style: StrokeStyle,
) -> Option<DirtyRect> {
    let (width, height) = img.dimensions();
    let stroke_width = style.width.max(1);
    let radius = (stroke_width.saturating_sub(1) / 2) as i32;
    let (start, end) = clip_to_surface(start, end, width, height, radius)?;
    let dirty = DirtyRect::from_points(start, end, radius).clamp(width, height)?;

    if radius == 0 {
        draw_segment_thin(img, start, end, style.color);
    } else {
        draw_segment_capsule(img, start, end, radius, style.color, dirty);
    }
    Some(dirty)
}

/// Clips the segment to the surface grown by the stroke radius plus a small
/// margin and rounds the ends to pixels. `None` when nothing is left.
fn clip_to_surface(
    start: Point,
    end: Point,
    width: u32,
    height: u32,
    radius: i32,
) -> Option<((i32, i32), (i32, i32))> {
    let coords = [start.x, start.y, end.x, end.y];
    if coords.iter().any(|c| !c.is_finite()) {
        return None;
    }
    let margin = f64::from(radius) + 2.0;
    let (min_x, min_y) = (-margin, -margin);
    let max_x = f64::from(width) - 1.0 + margin;
    let max_y = f64::from(height) - 1.0 + margin;

    // Liang-Barsky in f64 so far-away ends keep sub-pixel precision.
    let (x0, y0) = (f64::from(start.x), f64::from(start.y));
    let (x1, y1) = (f64::from(end.x), f64::from(end.y));
    let (dx, dy) = (x1 - x0, y1 - y0);
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    for (p, q) in [
        (-dx, x0 - min_x),
        (dx, max_x - x0),
        (-dy, y0 - min_y),
        (dy, max_y - y0),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            if t > t1 {
                return None;
            }
            t0 = t0.max(t);
        } else {
            if t < t0 {
                return None;
            }
            t1 = t1.min(t);
        }
    }

    let at = |t: f64| {
        if t <= 0.0 {
            (x0, y0)
        } else if t >= 1.0 {
            (x1, y1)
        } else {
            (x0 + t * dx, y0 + t * dy)
        }
    };
    let to_pixel = |(x, y): (f64, f64)| (x.round() as i32, y.round() as i32);
    Some((to_pixel(at(t0)), to_pixel(at(t1))))
}

pub fn fill_background(img: &mut RgbaImage, color: Color) {
    let px = image::Rgba::from(color);
    for pixel in img.pixels_mut() {
        *pixel = px;
    }
}

// Bresenham; every covered pixel is visited exactly once.
fn draw_segment_thin(img: &mut RgbaImage, start: (i32, i32), end: (i32, i32), color: Color) {
    let (mut x0, mut y0) = start;
    let (x1, y1) = end;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        blend_pixel(img, x0, y0, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

fn draw_segment_capsule(
    img: &mut RgbaImage,
    start: (i32, i32),
    end: (i32, i32),
    radius: i32,
    color: Color,
    clip: DirtyRect,
) {
    let radius_sq = (radius * radius) as f32;
    for y in clip.y..(clip.y + clip.height) {
        for x in clip.x..(clip.x + clip.width) {
            if point_segment_distance_sq((x, y), start, end) <= radius_sq {
                blend_pixel(img, x, y, color);
            }
        }
    }
}

fn point_segment_distance_sq(point: (i32, i32), start: (i32, i32), end: (i32, i32)) -> f32 {
    let px = point.0 as f32;
    let py = point.1 as f32;
    let ax = start.0 as f32;
    let ay = start.1 as f32;
    let bx = end.0 as f32;
    let by = end.1 as f32;
    let abx = bx - ax;
    let aby = by - ay;
    let len_sq = abx * abx + aby * aby;
    let t = if len_sq <= f32::EPSILON {
        0.0
    } else {
        (((px - ax) * abx + (py - ay) * aby) / len_sq).clamp(0.0, 1.0)
    };
    let cx = ax + abx * t;
    let cy = ay + aby * t;
    let dx = px - cx;
    let dy = py - cy;
    dx * dx + dy * dy
}

/// Source-over blend of an unpremultiplied color onto one pixel. Writes
/// outside the bitmap are dropped.
fn blend_pixel(img: &mut RgbaImage, x: i32, y: i32, color: Color) {
    if color.a == 0 || x < 0 || y < 0 || x >= img.width() as i32 || y >= img.height() as i32 {
        return;
    }
    let (x, y) = (x as u32, y as u32);
    if color.is_opaque() {
        img.put_pixel(x, y, color.into());
        return;
    }

    let dst = img.get_pixel(x, y).0;
    let src_a = color.a as f32 / 255.0;
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= f32::EPSILON {
        return;
    }
    let blend = |src: u8, dst: u8| {
        ((src as f32 * src_a + dst as f32 * dst_a * (1.0 - src_a)) / out_a)
            .round()
            .clamp(0.0, 255.0) as u8
    };
    img.put_pixel(
        x,
        y,
        image::Rgba([
            blend(color.r, dst[0]),
            blend(color.g, dst[1]),
            blend(color.b, dst[2]),
            (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
        ]),
    );
}
