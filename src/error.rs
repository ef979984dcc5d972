use std::path::PathBuf;

/// Errors raised while planning or rendering an inset.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InsetError {
    #[error("the corner {0:?} is not available")]
    UnsupportedCorner(String),

    #[error("the connector mode {0:?} is not available")]
    UnsupportedMode(String),

    #[error("selection is empty on a {width}x{height} canvas")]
    EmptySelection { width: u32, height: u32 },
}

/// Errors surfaced by a [`crate::canvas::MagCanvas`] session.
#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Inset(#[from] InsetError),

    #[error("failed to read config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no image loaded")]
    NoImage,
}
