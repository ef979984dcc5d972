//! Editing session: the loaded image, the selection, and the rendered inset.
//!
//! [`MagCanvas`] owns every piece of state the control panel and the two
//! image views share. Front-ends call its operations and either read the
//! returned [`UpdateOutcome`] or [`MagCanvas::subscribe`] to its events.

use std::path::{Path, PathBuf};

use image::{DynamicImage, RgbaImage};

use crate::config::CanvasConfig;
use crate::error::CanvasError;
use crate::geometry::{Point, Rectangle};
use crate::inset::{Corner, InsetLayout, InsetStyle, Mode, ZoomRatio, compute_inset, MAX_ZOOM_VALUE};
use crate::io::{self, SourceImage};
use crate::selection::{SelectionPhase, SelectionState};

/// Why a recomputation left the display as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoImage,
    NoSelection,
    /// Start and end point are the same.
    Degenerate,
    /// Start and end share a row or a column.
    Flat,
    /// The rectangle has no area inside the image.
    OutsideImage,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            SkipReason::NoImage => "no image loaded",
            SkipReason::NoSelection => "no rectangle selected",
            SkipReason::Degenerate => "the same start and end point, pass",
            SkipReason::Flat => "the rectangle has no width or height",
            SkipReason::OutsideImage => "the rectangle lies outside the image",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Rendered(InsetLayout),
    Skipped(SkipReason),
}

/// Notifications delivered to subscribers, in the order things happen.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    ImageLoaded { width: u32, height: u32 },
    SelectionChanged(Rectangle),
    InsetRendered(InsetLayout),
    Skipped(SkipReason),
    Reset,
    Saved { path: PathBuf, bytes: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&CanvasEvent)>;

pub struct MagCanvas {
    config: CanvasConfig,
    style: InsetStyle,
    source: Option<SourceImage>,
    // Clean copy at working resolution; every render starts from it.
    original: Option<RgbaImage>,
    display: Option<RgbaImage>,
    selection: SelectionState,
    corner: Corner,
    mode: Mode,
    zoom_value: u32,
    last_layout: Option<InsetLayout>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl MagCanvas {
    pub fn new(config: CanvasConfig) -> Self {
        Self {
            style: config.inset_style(),
            corner: config.corner,
            mode: config.mode,
            zoom_value: config.zoom_value.min(MAX_ZOOM_VALUE),
            config,
            source: None,
            original: None,
            display: None,
            selection: SelectionState::default(),
            last_layout: None,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Session opened on an in-memory image.
    pub fn with_image(config: CanvasConfig, image: DynamicImage) -> Self {
        let mut canvas = Self::new(config);
        canvas.install(SourceImage::from_image(image));
        canvas
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    // ---------------------------------------------------------------------
    // Observers
    // ---------------------------------------------------------------------

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&CanvasEvent) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn emit(&mut self, event: CanvasEvent) {
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }

    // ---------------------------------------------------------------------
    // Image lifecycle
    // ---------------------------------------------------------------------

    /// Decodes `path` and makes it the current image. Returns the working size.
    pub fn load(&mut self, path: &Path) -> Result<(u32, u32), CanvasError> {
        let source = io::read_image(path)?;
        Ok(self.install(source))
    }

    /// Replaces the current image with an already decoded one.
    ///
    /// The selection is cleared; corner, mode and zoom are kept.
    pub fn install(&mut self, source: SourceImage) -> (u32, u32) {
        let working = io::working_image(&source, self.config.resolution);
        let (width, height) = working.dimensions();

        self.display = Some(working.clone());
        self.original = Some(working);
        self.source = Some(source);
        self.selection.clear();
        self.last_layout = None;

        self.emit(CanvasEvent::ImageLoaded { width, height });
        (width, height)
    }

    /// Restores the display from the untouched original.
    pub fn reset(&mut self) {
        if let Some(original) = &self.original {
            self.display = Some(original.clone());
        }
        self.last_layout = None;
        self.emit(CanvasEvent::Reset);
    }

    /// The display scaled back to the loaded image's size and pixel format.
    pub fn export(&self) -> Result<DynamicImage, CanvasError> {
        let (Some(source), Some(display)) = (&self.source, &self.display) else {
            return Err(CanvasError::NoImage);
        };
        Ok(io::export_image(display, source.dimensions(), source.color()))
    }

    /// Writes [`Self::export`] to `path`. Returns the encoded size in bytes.
    pub fn save(&mut self, path: &Path) -> Result<u64, CanvasError> {
        let exported = self.export()?;
        let bytes = io::write_image(path, &exported)?;
        self.emit(CanvasEvent::Saved {
            path: path.to_path_buf(),
            bytes,
        });
        Ok(bytes)
    }

    /// The image currently shown, with any inset drawn on it.
    pub fn image(&self) -> Option<&RgbaImage> {
        self.display.as_ref()
    }

    pub fn original(&self) -> Option<&RgbaImage> {
        self.original.as_ref()
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    /// Working-resolution dimensions, if an image is loaded.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.original.as_ref().map(RgbaImage::dimensions)
    }

    pub fn last_layout(&self) -> Option<&InsetLayout> {
        self.last_layout.as_ref()
    }

    // ---------------------------------------------------------------------
    // Selection
    // ---------------------------------------------------------------------

    pub fn selection_phase(&self) -> SelectionPhase {
        self.selection.phase()
    }

    /// Last committed rectangle.
    pub fn rectangle(&self) -> Option<Rectangle> {
        self.selection.committed()
    }

    /// Rectangle to outline in the editor, including one being dragged.
    pub fn visible_rectangle(&self) -> Option<Rectangle> {
        self.selection.visible()
    }

    pub fn previous_point(&self) -> Option<Point> {
        self.selection.visible().map(|r| r.previous)
    }

    pub fn current_point(&self) -> Option<Point> {
        self.selection.visible().map(|r| r.current)
    }

    /// Overwrites both corner points and re-renders.
    pub fn set_rectangle(&mut self, rect: Rectangle) -> Result<UpdateOutcome, CanvasError> {
        self.selection.set_rectangle(rect);
        self.emit(CanvasEvent::SelectionChanged(rect));
        self.render()
    }

    pub fn pointer_pressed(&mut self, at: Point) {
        self.selection.press(at);
    }

    /// Returns whether the dragged rectangle changed.
    pub fn pointer_moved(&mut self, to: Point) -> bool {
        self.selection.drag(to)
    }

    pub fn pointer_released(&mut self, at: Point) -> Result<UpdateOutcome, CanvasError> {
        match self.selection.release(at) {
            Some(rect) => {
                self.emit(CanvasEvent::SelectionChanged(rect));
                self.render()
            }
            None => Ok(UpdateOutcome::Skipped(SkipReason::NoSelection)),
        }
    }

    // ---------------------------------------------------------------------
    // Inset parameters
    // ---------------------------------------------------------------------

    pub fn corner(&self) -> Corner {
        self.corner
    }

    pub fn set_corner(&mut self, corner: Corner) -> Result<UpdateOutcome, CanvasError> {
        self.corner = corner;
        self.render()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) -> Result<UpdateOutcome, CanvasError> {
        self.mode = mode;
        self.render()
    }

    pub fn zoom_value(&self) -> u32 {
        self.zoom_value
    }

    pub fn zoom_ratio(&self) -> ZoomRatio {
        ZoomRatio::from_slider(self.zoom_value)
    }

    /// Stores the slider position (`0..=100`) and re-renders with it.
    pub fn update_image(&mut self, zoom_value: u32) -> Result<UpdateOutcome, CanvasError> {
        self.zoom_value = zoom_value.min(MAX_ZOOM_VALUE);
        self.render()
    }

    /// Sets the zoom from a ratio instead of a slider position.
    pub fn set_zoom_ratio(&mut self, ratio: ZoomRatio) -> Result<UpdateOutcome, CanvasError> {
        self.update_image(ratio.slider_value())
    }

    /// Re-renders the inset from the original with the current settings.
    ///
    /// Skips leave the display untouched. On error nothing is committed.
    pub fn render(&mut self) -> Result<UpdateOutcome, CanvasError> {
        let Some(original) = &self.original else {
            return Ok(self.skip(SkipReason::NoImage));
        };
        let Some(rect) = self.selection.committed() else {
            return Ok(self.skip(SkipReason::NoSelection));
        };
        if rect.is_degenerate() {
            return Ok(self.skip(SkipReason::Degenerate));
        }
        let (dx, dy) = rect.size();
        if dx == 0 || dy == 0 {
            return Ok(self.skip(SkipReason::Flat));
        }
        let (width, height) = original.dimensions();
        let Some(source) = rect.normalized(width, height) else {
            return Ok(self.skip(SkipReason::OutsideImage));
        };

        let rendered = compute_inset(
            original,
            source,
            self.corner,
            self.mode,
            self.zoom_ratio(),
            &self.style,
        )?;

        log::debug!(
            "inset {:?} at {:?} ({}, {}, ratio {})",
            rendered.layout.source,
            rendered.layout.region,
            self.corner,
            self.mode,
            rendered.layout.ratio
        );

        let layout = rendered.layout;
        self.display = Some(rendered.image);
        self.last_layout = Some(layout.clone());
        self.emit(CanvasEvent::InsetRendered(layout.clone()));
        Ok(UpdateOutcome::Rendered(layout))
    }

    fn skip(&mut self, reason: SkipReason) -> UpdateOutcome {
        log::info!("inset not updated: {reason}");
        self.emit(CanvasEvent::Skipped(reason));
        UpdateOutcome::Skipped(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::sample_pattern;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn session() -> MagCanvas {
        MagCanvas::with_image(
            CanvasConfig::default(),
            DynamicImage::ImageRgba8(sample_pattern(200, 200)),
        )
    }

    #[test]
    fn render_without_rectangle_is_skipped() {
        let mut canvas = session();
        assert_eq!(
            canvas.update_image(25).unwrap(),
            UpdateOutcome::Skipped(SkipReason::NoSelection)
        );
        assert_eq!(canvas.zoom_value(), 25);
    }

    #[test]
    fn empty_session_has_nothing_to_render() {
        let mut canvas = MagCanvas::new(CanvasConfig::default());
        assert_eq!(
            canvas.render().unwrap(),
            UpdateOutcome::Skipped(SkipReason::NoImage)
        );
        assert!(matches!(canvas.export(), Err(CanvasError::NoImage)));
    }

    #[test]
    fn pointer_release_renders_inset() {
        let mut canvas = session();
        canvas.pointer_pressed(Point::new(10, 10));
        assert!(canvas.pointer_moved(Point::new(40, 40)));
        let outcome = canvas.pointer_released(Point::new(50, 50)).unwrap();

        let UpdateOutcome::Rendered(layout) = outcome else {
            panic!("expected a render, got {outcome:?}");
        };
        assert_eq!(layout.corner, Corner::LeftBottom);
        assert_ne!(canvas.image(), canvas.original());
    }

    #[test]
    fn corner_change_keeps_rectangle() {
        let mut canvas = session();
        let rect = Rectangle::from_coords(10, 10, 50, 50);
        canvas.set_rectangle(rect).unwrap();
        canvas.set_corner(Corner::RightUp).unwrap();
        assert_eq!(canvas.rectangle(), Some(rect));
        assert_eq!(canvas.last_layout().map(|l| l.corner), Some(Corner::RightUp));
    }

    #[test]
    fn subscribers_see_events_until_unsubscribed() {
        let mut canvas = session();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = canvas.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        canvas.set_rectangle(Rectangle::from_coords(30, 30, 30, 30)).unwrap();
        canvas.reset();
        assert!(canvas.unsubscribe(id));
        canvas.reset();

        let events = seen.borrow();
        assert_eq!(
            *events,
            vec![
                CanvasEvent::SelectionChanged(Rectangle::from_coords(30, 30, 30, 30)),
                CanvasEvent::Skipped(SkipReason::Degenerate),
                CanvasEvent::Reset,
            ]
        );
        assert!(!canvas.unsubscribe(id));
    }
}
