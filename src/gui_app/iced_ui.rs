use std::path::PathBuf;

use bytesize::ByteSize;
use iced::widget::image::Handle;
use iced::widget::{Canvas, column, container, image as image_view, row, stack, text};
use iced::{Color, Element, Length, Size, Task, Theme, window};
use image::{DynamicImage, RgbaImage};

use super::controls::{self, CoordField, CoordFields, PanelState};
use super::editor::{EditorLayer, PointerEvent};
use super::loader::{self, SavedFile};
use crate::canvas::{MagCanvas, UpdateOutcome};
use crate::config::CanvasConfig;
use crate::error::CanvasError;
use crate::inset::{Corner, Mode, ZoomRatio};
use crate::io::SourceImage;
use crate::sample::sample_pattern;

const SAMPLE_SIZE: (u32, u32) = (640, 480);

pub fn run_iced_app(initial: Option<PathBuf>, config: CanvasConfig) -> iced::Result {
    let view_edge = config.resolution.unwrap_or(crate::config::GUI_RESOLUTION) as f32;
    iced::application("Inset Lens", LensApp::update, LensApp::view)
        .theme(LensApp::theme)
        .window(window::Settings {
            size: Size::new(view_edge * 2.0 + 340.0, view_edge + 80.0),
            ..Default::default()
        })
        .run_with(move || LensApp::new(initial, config))
}

struct LensApp {
    canvas: MagCanvas,
    original_handle: Option<Handle>,
    display_handle: Option<Handle>,
    outline_color: Color,
    coords: CoordFields,
    ratio_text: String,
    status_text: String,
    last_loaded: Option<PathBuf>,
    is_busy: bool,
}

#[derive(Debug, Clone)]
pub enum Message {
    LoadPressed,
    FilePicked(Option<PathBuf>),
    ImageLoaded(Result<SourceImage, String>),
    SavePressed,
    SaveTargetPicked(Option<PathBuf>),
    Saved(Result<SavedFile, String>),
    ClearPressed,
    Pointer(PointerEvent),
    CornerSelected(Corner),
    ModeSelected(Mode),
    CoordInput(CoordField, String),
    ApplyCoordinates,
    RatioInput(String),
    ApplyRatio,
    ZoomChanged(u32),
}

fn image_frame<'a>(title: &'a str, body: Element<'a, Message>) -> Element<'a, Message> {
    column![
        text(title).size(12),
        container(body)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_| container::Style {
                background: Some(Color::from_rgb8(24, 24, 24).into()),
                ..Default::default()
            }),
    ]
    .spacing(4)
    .padding(8)
    .width(Length::FillPortion(1))
    .into()
}

fn handle_of(image: &RgbaImage) -> Handle {
    let (width, height) = image.dimensions();
    Handle::from_rgba(width, height, image.as_raw().clone())
}

impl LensApp {
    fn new(initial: Option<PathBuf>, config: CanvasConfig) -> (Self, Task<Message>) {
        let [r, g, b, a] = config.highlight;
        let outline_color = Color::from_rgba8(r, g, b, a as f32 / 255.0);
        let ratio_text = ZoomRatio::from_slider(config.zoom_value).to_string();

        let mut app = LensApp {
            canvas: MagCanvas::new(config),
            original_handle: None,
            display_handle: None,
            outline_color,
            coords: CoordFields::default(),
            ratio_text,
            status_text: "Load an image to begin".to_string(),
            last_loaded: None,
            is_busy: false,
        };

        let task = match initial {
            Some(path) => {
                app.is_busy = true;
                app.status_text = format!("Loading {}...", path.display());
                Task::perform(loader::load_image_task(path), Message::ImageLoaded)
            }
            None => {
                let (w, h) = SAMPLE_SIZE;
                let sample = DynamicImage::ImageRgba8(sample_pattern(w, h));
                app.install(SourceImage::from_image(sample));
                app.status_text = "Showing the sample pattern. Drag a rectangle on the left.".to_string();
                Task::none()
            }
        };

        (app, task)
    }

    fn install(&mut self, source: SourceImage) {
        let (width, height) = self.canvas.install(source);
        self.original_handle = self.canvas.original().map(handle_of);
        self.display_handle = self.canvas.image().map(handle_of);
        self.coords = CoordFields::default();
        self.status_text = format!("Image {width} x {height}");
    }

    fn refresh_display(&mut self) {
        self.display_handle = self.canvas.image().map(handle_of);
    }

    fn apply_outcome(&mut self, result: Result<UpdateOutcome, CanvasError>) {
        match result {
            Ok(UpdateOutcome::Rendered(layout)) => {
                self.refresh_display();
                let region = layout.region;
                self.status_text = format!(
                    "Inset {} x {} at ({}, {}), ratio {:.2}",
                    region.width, region.height, region.x, region.y, layout.ratio
                );
            }
            Ok(UpdateOutcome::Skipped(reason)) => {
                self.status_text = format!("Not updated: {reason}");
            }
            Err(err) => {
                self.status_text = format!("Failed to draw inset: {err}");
            }
        }
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::LoadPressed => {
                if self.is_busy {
                    return Task::none();
                }
                Task::perform(loader::pick_image(), Message::FilePicked)
            }
            Message::FilePicked(Some(path)) => {
                self.is_busy = true;
                self.status_text = format!("Loading {}...", path.display());
                Task::perform(loader::load_image_task(path), Message::ImageLoaded)
            }
            Message::FilePicked(None) | Message::SaveTargetPicked(None) => Task::none(),
            Message::ImageLoaded(Ok(source)) => {
                self.is_busy = false;
                self.last_loaded = source.path.clone();
                self.install(source);
                if let Some(path) = &self.last_loaded {
                    self.status_text = format!("Loaded {}", path.display());
                }
                Task::none()
            }
            Message::ImageLoaded(Err(error)) => {
                self.is_busy = false;
                self.status_text = format!("Failed to load image: {error}");
                Task::none()
            }
            Message::SavePressed => {
                if self.is_busy || self.canvas.image().is_none() {
                    return Task::none();
                }
                let stem = self
                    .last_loaded
                    .as_ref()
                    .and_then(|p| p.file_stem())
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "sample".to_string());
                Task::perform(
                    loader::pick_save_target(format!("{stem}_inset.png")),
                    Message::SaveTargetPicked,
                )
            }
            Message::SaveTargetPicked(Some(path)) => match self.canvas.export() {
                Ok(exported) => {
                    self.is_busy = true;
                    self.status_text = format!("Saving {}...", path.display());
                    Task::perform(loader::save_image_task(path, exported), Message::Saved)
                }
                Err(err) => {
                    self.status_text = format!("Nothing to save: {err}");
                    Task::none()
                }
            },
            Message::Saved(Ok(file)) => {
                self.is_busy = false;
                log::info!("saved {} ({} bytes)", file.path.display(), file.bytes);
                self.status_text = format!("Saved {} ({})", file.path.display(), ByteSize(file.bytes));
                Task::none()
            }
            Message::Saved(Err(error)) => {
                self.is_busy = false;
                self.status_text = format!("Failed to save image: {error}");
                Task::none()
            }
            Message::ClearPressed => {
                self.canvas.reset();
                self.refresh_display();
                self.status_text = "Inset cleared".to_string();
                Task::none()
            }
            Message::Pointer(event) => {
                match event {
                    PointerEvent::Pressed(at) => self.canvas.pointer_pressed(at),
                    PointerEvent::Moved(to) => {
                        if self.canvas.pointer_moved(to)
                            && let Some(rect) = self.canvas.visible_rectangle()
                        {
                            self.coords = CoordFields::from_rect(rect);
                        }
                    }
                    PointerEvent::Released(at) => {
                        let result = self.canvas.pointer_released(at);
                        if let Some(rect) = self.canvas.rectangle() {
                            self.coords = CoordFields::from_rect(rect);
                        }
                        self.apply_outcome(result);
                    }
                }
                Task::none()
            }
            Message::CornerSelected(corner) => {
                let result = self.canvas.set_corner(corner);
                self.apply_outcome(result);
                Task::none()
            }
            Message::ModeSelected(mode) => {
                let result = self.canvas.set_mode(mode);
                self.apply_outcome(result);
                Task::none()
            }
            Message::CoordInput(field, value) => {
                self.coords.set(field, value);
                Task::none()
            }
            Message::ApplyCoordinates => {
                match self.coords.parse() {
                    Ok(rect) => {
                        let result = self.canvas.set_rectangle(rect);
                        self.apply_outcome(result);
                    }
                    Err(err) => self.status_text = err,
                }
                Task::none()
            }
            Message::RatioInput(value) => {
                self.ratio_text = value;
                Task::none()
            }
            Message::ApplyRatio => {
                match self.ratio_text.trim().parse::<f32>() {
                    Ok(value) => {
                        let result = self.canvas.set_zoom_ratio(ZoomRatio::new(value));
                        self.ratio_text = self.canvas.zoom_ratio().to_string();
                        self.apply_outcome(result);
                    }
                    Err(_) => {
                        self.status_text = format!("Ratio must be a number, got {:?}", self.ratio_text);
                    }
                }
                Task::none()
            }
            Message::ZoomChanged(value) => {
                let result = self.canvas.update_image(value);
                self.ratio_text = self.canvas.zoom_ratio().to_string();
                self.apply_outcome(result);
                Task::none()
            }
        }
    }

    fn view(&self) -> Element<'_, Message> {
        row![self.editor_section(), self.show_section(), self.controls_section()]
            .spacing(8)
            .height(Length::Fill)
            .into()
    }

    fn editor_section(&self) -> Element<'_, Message> {
        let body: Element<'_, Message> = match (&self.original_handle, self.canvas.dimensions()) {
            (Some(handle), Some((width, height))) => {
                let w = Length::Fixed(width as f32);
                let h = Length::Fixed(height as f32);
                let layer = EditorLayer {
                    outline: self.canvas.visible_rectangle(),
                    color: self.outline_color,
                };
                stack![
                    image_view(handle.clone()).width(w).height(h),
                    Canvas::new(layer).width(w).height(h),
                ]
                .into()
            }
            _ => text("No image loaded").size(14).into(),
        };
        image_frame("Editor", body)
    }

    fn show_section(&self) -> Element<'_, Message> {
        let body: Element<'_, Message> = match (&self.display_handle, self.canvas.dimensions()) {
            (Some(handle), Some((width, height))) => image_view(handle.clone())
                .width(Length::Fixed(width as f32))
                .height(Length::Fixed(height as f32))
                .into(),
            _ => text("Nothing to show").size(14).into(),
        };
        image_frame("Result", body)
    }

    fn controls_section(&self) -> Element<'_, Message> {
        controls::panel(PanelState {
            corner: self.canvas.corner(),
            mode: self.canvas.mode(),
            zoom_value: self.canvas.zoom_value(),
            coords: &self.coords,
            ratio_text: &self.ratio_text,
            status: &self.status_text,
            is_busy: self.is_busy,
            has_image: self.canvas.image().is_some(),
        })
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}
