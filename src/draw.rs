//! Raster helpers for the selection outline, inset border, and connector lines.

use image::{Rgba, RgbaImage, imageops};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut, draw_polygon_mut,
};
use serde::{Deserialize, Serialize};

use crate::geometry::{PixelRect, Point};

/// How a connector line is broken up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineStyle {
    /// A filled dot every `gap` pixels.
    Dotted,
    /// Alternating solid spans of `gap` pixels, giving rectangular dashes.
    #[default]
    Rectangled,
}

/// Draws a dashed line from `start` to `end` onto `image`.
///
/// Sample points are taken every `gap` pixels from `start`, stopping short of
/// `end`. With [`LineStyle::Rectangled`] every other span between consecutive
/// samples is filled; with [`LineStyle::Dotted`] each sample gets a disc of
/// radius `thickness`. Pixels outside the image are clipped.
pub fn draw_dashed_line(
    image: &mut RgbaImage,
    start: Point,
    end: Point,
    color: Rgba<u8>,
    thickness: u32,
    gap: u32,
    style: LineStyle,
) {
    let samples = dash_samples(start, end, gap);
    if samples.is_empty() {
        return;
    }

    match style {
        LineStyle::Dotted => {
            let radius = thickness.max(1) as i32;
            for p in &samples {
                draw_filled_circle_mut(image, (p.x, p.y), radius, color);
            }
        }
        LineStyle::Rectangled => {
            for (i, pair) in samples.windows(2).enumerate() {
                if i % 2 == 0 {
                    draw_thick_segment(image, pair[0], pair[1], color, thickness);
                }
            }
        }
    }
}

/// Points spaced `gap` pixels apart along the line, rounded to the pixel grid.
pub fn dash_samples(start: Point, end: Point, gap: u32) -> Vec<Point> {
    let (sx, sy) = start.as_f32();
    let (ex, ey) = end.as_f32();
    let dist = ((ex - sx).powi(2) + (ey - sy).powi(2)).sqrt();
    if gap == 0 || dist < f32::EPSILON {
        return Vec::new();
    }

    let mut samples = Vec::with_capacity((dist / gap as f32) as usize + 1);
    let mut i = 0.0_f32;
    while i < dist {
        let r = i / dist;
        let x = (sx * (1.0 - r) + ex * r + 0.5).floor() as i32;
        let y = (sy * (1.0 - r) + ey * r + 0.5).floor() as i32;
        samples.push(Point::new(x, y));
        i += gap as f32;
    }
    samples
}

/// Draws a solid segment `thickness` pixels wide.
pub fn draw_thick_segment(
    image: &mut RgbaImage,
    start: Point,
    end: Point,
    color: Rgba<u8>,
    thickness: u32,
) {
    let (sx, sy) = start.as_f32();
    let (ex, ey) = end.as_f32();
    let (dx, dy) = (ex - sx, ey - sy);
    let len = (dx * dx + dy * dy).sqrt();

    if thickness <= 1 || len < 1.0 {
        draw_line_segment_mut(image, (sx, sy), (ex, ey), color);
        return;
    }

    // Offset perpendicular to the segment by half the thickness on each side.
    let half = thickness as f32 / 2.0;
    let (nx, ny) = (-dy / len * half, dx / len * half);
    let corner = |x: f32, y: f32| imageproc::point::Point::new(x.round() as i32, y.round() as i32);
    let quad = [
        corner(sx + nx, sy + ny),
        corner(ex + nx, ey + ny),
        corner(ex - nx, ey - ny),
        corner(sx - nx, sy - ny),
    ];

    if quad[0] == quad[3] {
        draw_line_segment_mut(image, (sx, sy), (ex, ey), color);
    } else {
        draw_polygon_mut(image, &quad, color);
    }
}

/// Outlines `rect` with a stroke of `thickness` pixels centred on its edges.
pub fn draw_rect_outline(image: &mut RgbaImage, rect: PixelRect, color: Rgba<u8>, thickness: u32) {
    let thickness = thickness.max(1) as i32;
    let (x, y) = (rect.x as i32, rect.y as i32);
    let (w, h) = (rect.width as i32, rect.height as i32);

    for i in 0..thickness {
        let d = i - thickness / 2;
        let (rw, rh) = (w - 2 * d, h - 2 * d);
        if rw <= 0 || rh <= 0 {
            continue;
        }
        let ring = imageproc::rect::Rect::at(x + d, y + d).of_size(rw as u32, rh as u32);
        draw_hollow_rect_mut(image, ring, color);
    }
}

/// Builds a `width` x `height` tile of `color` with `image` pasted `margin`
/// pixels in from the top-left. Content past the tile edge is cut off.
pub fn frame_with_border(
    image: &RgbaImage,
    width: u32,
    height: u32,
    margin: u32,
    color: Rgba<u8>,
) -> RgbaImage {
    let mut framed = RgbaImage::from_pixel(width, height, color);
    imageops::replace(&mut framed, image, i64::from(margin), i64::from(margin));
    framed
}
