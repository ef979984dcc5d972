pub mod controls;
pub mod editor;
pub mod iced_ui;
pub mod loader;

pub use iced_ui::run_iced_app;
