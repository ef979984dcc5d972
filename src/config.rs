use std::path::Path;

use image::{Rgba, imageops::FilterType};
use serde::{Deserialize, Serialize};

use crate::draw::LineStyle;
use crate::error::CanvasError;
use crate::inset::{Corner, InsetStyle, Mode};

const DEFAULT_MARGIN: u32 = 5;
const DEFAULT_DASH_GAP: u32 = 10;
const DEFAULT_HIGHLIGHT: [u8; 4] = [255, 0, 0, 255];
/// Longer edge of the working image in the desktop viewer.
pub const GUI_RESOLUTION: u32 = 720;

/// Resampling filter used when magnifying the selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeFilter {
    Nearest,
    #[default]
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Settings for a [`crate::canvas::MagCanvas`] session.
///
/// Every field has a default, so a JSON file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Longer edge the loaded image is resized to; `None` keeps native size.
    pub resolution: Option<u32>,
    /// Inset border width in pixels.
    pub margin: u32,
    /// RGBA colour of the outline, border and connectors.
    pub highlight: [u8; 4],
    /// Spacing between connector dash samples.
    pub dash_gap: u32,
    pub line_style: LineStyle,
    pub filter: ResizeFilter,
    /// Initial corner selection.
    pub corner: Corner,
    /// Initial connector mode.
    pub mode: Mode,
    /// Initial zoom slider position, `0..=100`.
    pub zoom_value: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            resolution: None,
            margin: DEFAULT_MARGIN,
            highlight: DEFAULT_HIGHLIGHT,
            dash_gap: DEFAULT_DASH_GAP,
            line_style: LineStyle::Rectangled,
            filter: ResizeFilter::Triangle,
            corner: Corner::LeftBottom,
            mode: Mode::Diagonal,
            zoom_value: 0,
        }
    }
}

impl CanvasConfig {
    /// Defaults for the desktop viewer: the image is fitted to [`GUI_RESOLUTION`].
    pub fn for_gui() -> Self {
        Self {
            resolution: Some(GUI_RESOLUTION),
            ..Self::default()
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self, CanvasError> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|source| CanvasError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn inset_style(&self) -> InsetStyle {
        InsetStyle {
            margin: self.margin,
            color: Rgba(self.highlight),
            dash_gap: self.dash_gap,
            line_style: self.line_style,
            filter: self.filter.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: CanvasConfig =
            serde_json::from_str(r#"{ "margin": 8, "corner": "RightUp", "filter": "lanczos3" }"#)
                .unwrap();
        assert_eq!(config.margin, 8);
        assert_eq!(config.corner, Corner::RightUp);
        assert_eq!(config.filter, ResizeFilter::Lanczos3);
        assert_eq!(config.dash_gap, DEFAULT_DASH_GAP);
        assert_eq!(config.mode, Mode::Diagonal);
        assert_eq!(config.resolution, None);
    }

    #[test]
    fn style_follows_config() {
        let config = CanvasConfig {
            margin: 9,
            highlight: [0, 255, 0, 255],
            ..CanvasConfig::default()
        };
        let style = config.inset_style();
        assert_eq!(style.margin, 9);
        assert_eq!(style.line_thickness(), 4);
        assert_eq!(style.color, Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = CanvasConfig::from_json_file(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, CanvasError::Io(_)));
    }
}
