//! Selection magnifier for images: draw a rectangle, get an enlarged copy of
//! it in a corner of the canvas linked by dashed connector lines.

pub mod canvas;
pub mod config;
pub mod draw;
pub mod error;
pub mod geometry;
pub mod gui_app;
pub mod inset;
pub mod io;
pub mod sample;
pub mod selection;

pub use canvas::{CanvasEvent, MagCanvas, SkipReason, UpdateOutcome};
pub use config::CanvasConfig;
pub use error::{CanvasError, InsetError};
pub use geometry::{PixelRect, Point, Rectangle};
pub use inset::{Corner, Mode, ZoomRatio};

/// Sets up `env_logger`, defaulting to `info` unless `RUST_LOG` says otherwise.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
