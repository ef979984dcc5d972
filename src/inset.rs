//! Magnified inset placement.
//!
//! Given a selection on an image, a target corner, a zoom ratio and a
//! connector mode, [`plan_inset`] works out where the enlarged crop goes and
//! which rectangle corners get linked to which inset corners.
//! [`render_inset`] then produces the pixels. Both are pure: the source image
//! is only ever read.

use std::fmt;
use std::str::FromStr;

use image::{Rgba, RgbaImage, imageops};
use serde::{Deserialize, Serialize};

use crate::draw::{LineStyle, draw_dashed_line, draw_rect_outline, frame_with_border};
use crate::error::InsetError;
use crate::geometry::Anchor::{BottomLeft as BL, BottomRight as BR, TopLeft as TL, TopRight as TR};
use crate::geometry::{Anchor, PixelRect, Point, Segment};

pub const MIN_ZOOM_RATIO: f32 = 1.0;
pub const MAX_ZOOM_RATIO: f32 = 5.0;
pub const MAX_ZOOM_VALUE: u32 = 100;
const ZOOM_STEPS_PER_UNIT: f32 = 25.0;

/// Canvas corner the inset is drawn into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    LeftUp,
    RightUp,
    #[default]
    LeftBottom,
    RightBottom,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::LeftUp,
        Corner::RightUp,
        Corner::LeftBottom,
        Corner::RightBottom,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Corner::LeftUp => "Left Up",
            Corner::RightUp => "Right Up",
            Corner::LeftBottom => "Left Bottom",
            Corner::RightBottom => "Right Bottom",
        }
    }

    /// Top-left position of a `width` x `height` block flush with this corner.
    fn origin(self, canvas: (u32, u32), block: (u32, u32)) -> (u32, u32) {
        let right = canvas.0.saturating_sub(block.0);
        let bottom = canvas.1.saturating_sub(block.1);
        match self {
            Corner::LeftUp => (0, 0),
            Corner::RightUp => (right, 0),
            Corner::LeftBottom => (0, bottom),
            Corner::RightBottom => (right, bottom),
        }
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Corner {
    type Err = InsetError;

    /// Accepts the short codes (`LU`, `RB`, ...) and the spelled-out names in
    /// any case, separated by spaces, dashes, or underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "lu" | "leftup" | "topleft" => Ok(Corner::LeftUp),
            "ru" | "rightup" | "topright" => Ok(Corner::RightUp),
            "lb" | "leftbottom" | "bottomleft" => Ok(Corner::LeftBottom),
            "rb" | "rightbottom" | "bottomright" => Ok(Corner::RightBottom),
            _ => Err(InsetError::UnsupportedCorner(s.to_string())),
        }
    }
}

/// Which pair of connector lines links the selection to the inset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Diagonal,
    BottomLine,
    SideLine,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Diagonal, Mode::BottomLine, Mode::SideLine];

    pub fn label(self) -> &'static str {
        match self {
            Mode::Diagonal => "Diagonal",
            Mode::BottomLine => "Bottom line",
            Mode::SideLine => "Side line",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Mode {
    type Err = InsetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "diagonal" | "diag" | "mode1" | "1" => Ok(Mode::Diagonal),
            "bottomline" | "bottom" | "mode2" | "2" => Ok(Mode::BottomLine),
            "sideline" | "side" | "mode3" | "3" => Ok(Mode::SideLine),
            _ => Err(InsetError::UnsupportedMode(s.to_string())),
        }
    }
}

/// Magnification factor in `[1.0, 5.0]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct ZoomRatio(f32);

impl ZoomRatio {
    pub fn new(ratio: f32) -> Self {
        if ratio.is_nan() {
            return Self(MIN_ZOOM_RATIO);
        }
        Self(ratio.clamp(MIN_ZOOM_RATIO, MAX_ZOOM_RATIO))
    }

    /// Maps a slider position in `[0, 100]` to `value / 25 + 1`.
    pub fn from_slider(value: u32) -> Self {
        Self::new(value.min(MAX_ZOOM_VALUE) as f32 / ZOOM_STEPS_PER_UNIT + 1.0)
    }

    /// Slider position that shows this ratio.
    pub fn slider_value(self) -> u32 {
        (((self.0 - 1.0) * ZOOM_STEPS_PER_UNIT).round() as u32).min(MAX_ZOOM_VALUE)
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for ZoomRatio {
    fn default() -> Self {
        Self(MIN_ZOOM_RATIO)
    }
}

impl fmt::Display for ZoomRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// One connector: a corner of the selection joined to a corner of the inset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub from: Anchor,
    pub to: Anchor,
}

/// Connector pair used for one (corner, mode) combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectorRule {
    pub corner: Corner,
    pub mode: Mode,
    pub links: [Link; 2],
}

const fn rule(corner: Corner, mode: Mode, a: (Anchor, Anchor), b: (Anchor, Anchor)) -> ConnectorRule {
    ConnectorRule {
        corner,
        mode,
        links: [Link { from: a.0, to: a.1 }, Link { from: b.0, to: b.1 }],
    }
}

/// Every (corner, mode) pair and the connectors it draws.
///
/// For the top corners the bottom/side modes mirror the bottom-corner rows
/// vertically, so the lines always leave from the edge facing the inset.
pub const CONNECTOR_TABLE: [ConnectorRule; 12] = [
    rule(Corner::LeftUp, Mode::Diagonal, (BL, BL), (TR, TR)),
    rule(Corner::LeftUp, Mode::BottomLine, (TL, BL), (TR, BR)),
    rule(Corner::LeftUp, Mode::SideLine, (TL, TR), (BL, BR)),
    rule(Corner::RightUp, Mode::Diagonal, (TL, TL), (BR, BR)),
    rule(Corner::RightUp, Mode::BottomLine, (TL, BL), (TR, BR)),
    rule(Corner::RightUp, Mode::SideLine, (TR, TL), (BR, BL)),
    rule(Corner::LeftBottom, Mode::Diagonal, (TL, TL), (BR, BR)),
    rule(Corner::LeftBottom, Mode::BottomLine, (BL, TL), (BR, TR)),
    rule(Corner::LeftBottom, Mode::SideLine, (TL, TR), (BL, BR)),
    rule(Corner::RightBottom, Mode::Diagonal, (BL, BL), (TR, TR)),
    rule(Corner::RightBottom, Mode::BottomLine, (BL, TL), (BR, TR)),
    rule(Corner::RightBottom, Mode::SideLine, (BR, BL), (TR, TL)),
];

/// Looks up the connector pair for `corner` and `mode`.
pub fn connector_rule(corner: Corner, mode: Mode) -> &'static ConnectorRule {
    let index = corner_index(corner) * Mode::ALL.len() + mode_index(mode);
    &CONNECTOR_TABLE[index]
}

fn corner_index(corner: Corner) -> usize {
    match corner {
        Corner::LeftUp => 0,
        Corner::RightUp => 1,
        Corner::LeftBottom => 2,
        Corner::RightBottom => 3,
    }
}

fn mode_index(mode: Mode) -> usize {
    match mode {
        Mode::Diagonal => 0,
        Mode::BottomLine => 1,
        Mode::SideLine => 2,
    }
}

/// Drawing parameters shared by every inset.
#[derive(Debug, Clone)]
pub struct InsetStyle {
    /// Border width around the inset; the outline and connectors use half of it.
    pub margin: u32,
    pub color: Rgba<u8>,
    pub dash_gap: u32,
    pub line_style: LineStyle,
    pub filter: imageops::FilterType,
}

impl InsetStyle {
    pub fn line_thickness(&self) -> u32 {
        line_thickness(self.margin)
    }
}

/// Outline and connector width for a border of `margin` pixels.
pub fn line_thickness(margin: u32) -> u32 {
    (margin / 2).max(1)
}

impl Default for InsetStyle {
    fn default() -> Self {
        Self {
            margin: 5,
            color: Rgba([255, 0, 0, 255]),
            dash_gap: 10,
            line_style: LineStyle::Rectangled,
            filter: imageops::FilterType::Triangle,
        }
    }
}

/// Geometry of one rendered inset.
#[derive(Debug, Clone, PartialEq)]
pub struct InsetLayout {
    /// Selection being magnified, normalized and clipped.
    pub source: PixelRect,
    /// Where the bordered inset lands on the canvas.
    pub region: PixelRect,
    /// Size of the magnified crop inside the border.
    pub scaled: (u32, u32),
    /// Border width actually used, at most half the shorter canvas edge.
    pub margin: u32,
    /// Ratio actually used, after shrinking to fit the canvas.
    pub ratio: ZoomRatio,
    pub corner: Corner,
    pub mode: Mode,
    pub connectors: [Segment; 2],
}

/// Pixels produced for an [`InsetLayout`].
#[derive(Debug, Clone)]
pub struct InsetRender {
    /// The source with outline, inset and connectors drawn on.
    pub image: RgbaImage,
    /// The bordered, magnified crop on its own.
    pub inset: RgbaImage,
    pub layout: InsetLayout,
}

/// Works out where the magnified crop of `source` goes on a `width` x `height` canvas.
///
/// The ratio is reduced when the bordered inset would not fit on the canvas;
/// if even an unmagnified inset is too large it is clamped to the canvas.
/// A margin wider than half the shorter canvas edge is reduced to that.
pub fn plan_inset(
    width: u32,
    height: u32,
    source: PixelRect,
    corner: Corner,
    mode: Mode,
    ratio: ZoomRatio,
    margin: u32,
) -> Result<InsetLayout, InsetError> {
    if !source.is_valid() || width == 0 || height == 0 {
        return Err(InsetError::EmptySelection { width, height });
    }

    let max_margin = width.min(height) / 2;
    let margin = if margin > max_margin {
        log::warn!("border margin {margin} does not fit a {width}x{height} canvas, using {max_margin}");
        max_margin
    } else {
        margin
    };
    let border = 2 * margin;

    let room_w = width.saturating_sub(border).max(1);
    let room_h = height.saturating_sub(border).max(1);
    let fit = (room_w as f32 / source.width as f32).min(room_h as f32 / source.height as f32);

    let ratio = if ratio.get() > fit {
        log::warn!(
            "zoom ratio {ratio} does not fit a {}x{} selection on {width}x{height}, using {:.2}",
            source.width,
            source.height,
            fit.max(MIN_ZOOM_RATIO)
        );
        ZoomRatio::new(fit)
    } else {
        ratio
    };

    let scaled_w = ((ratio.get() * source.width as f32) as u32).clamp(1, room_w);
    let scaled_h = ((ratio.get() * source.height as f32) as u32).clamp(1, room_h);
    let inset_w = scaled_w.saturating_add(border).min(width);
    let inset_h = scaled_h.saturating_add(border).min(height);

    let (x, y) = corner.origin((width, height), (inset_w, inset_h));
    let region = PixelRect::new(x, y, inset_w, inset_h);

    let rule = connector_rule(corner, mode);
    let connectors = rule
        .links
        .map(|link| Segment::new(source.anchor(link.from), region.anchor(link.to)));

    Ok(InsetLayout {
        source,
        region,
        scaled: (scaled_w, scaled_h),
        margin,
        ratio,
        corner,
        mode,
        connectors,
    })
}

/// Renders `layout` on top of a copy of `original`.
pub fn render_inset(original: &RgbaImage, layout: &InsetLayout, style: &InsetStyle) -> InsetRender {
    let mut image = original.clone();
    let thickness = line_thickness(layout.margin);
    draw_rect_outline(&mut image, layout.source, style.color, thickness);

    let src = layout.source;
    let crop = imageops::crop_imm(original, src.x, src.y, src.width, src.height).to_image();
    let (scaled_w, scaled_h) = layout.scaled;
    let magnified = imageops::resize(&crop, scaled_w, scaled_h, style.filter);
    let region = layout.region;
    let inset = frame_with_border(&magnified, region.width, region.height, layout.margin, style.color);

    imageops::replace(
        &mut image,
        &inset,
        i64::from(layout.region.x),
        i64::from(layout.region.y),
    );

    for segment in &layout.connectors {
        draw_dashed_line(
            &mut image,
            segment.start,
            segment.end,
            style.color,
            thickness,
            style.dash_gap,
            style.line_style,
        );
    }

    InsetRender {
        image,
        inset,
        layout: layout.clone(),
    }
}

/// Plans and renders an inset in one go.
pub fn compute_inset(
    original: &RgbaImage,
    source: PixelRect,
    corner: Corner,
    mode: Mode,
    ratio: ZoomRatio,
    style: &InsetStyle,
) -> Result<InsetRender, InsetError> {
    let (width, height) = original.dimensions();
    let layout = plan_inset(width, height, source, corner, mode, ratio, style.margin)?;
    Ok(render_inset(original, &layout, style))
}

/// Parses `corner` and `mode` names and computes the inset.
pub fn compute_inset_named(
    original: &RgbaImage,
    source: PixelRect,
    corner: &str,
    mode: &str,
    ratio: ZoomRatio,
    style: &InsetStyle,
) -> Result<InsetRender, InsetError> {
    let corner: Corner = corner.parse()?;
    let mode: Mode = mode.parse()?;
    compute_inset(original, source, corner, mode, ratio, style)
}

/// Endpoints of a connector as plain tuples.
pub fn segment_points(segment: &Segment) -> ((i32, i32), (i32, i32)) {
    let Segment { start, end } = *segment;
    let (Point { x: sx, y: sy }, Point { x: ex, y: ey }) = (start, end);
    ((sx, sy), (ex, ey))
}
