//! Canvas layer over the source image that turns mouse input into selection
//! events and outlines the rectangle being drawn.

use iced::mouse::{self, Cursor};
use iced::widget::canvas::{self, Frame, Geometry, Path, Program, Stroke, event};
use iced::{Color, Rectangle, Size, Theme};

use super::iced_ui::Message;
use crate::geometry::{Point, Rectangle as Selection};

const OUTLINE_WIDTH: f32 = 1.5;

#[derive(Debug, Clone, Copy)]
pub enum PointerEvent {
    Pressed(Point),
    Moved(Point),
    Released(Point),
}

#[derive(Default)]
pub struct DragState {
    dragging: bool,
    /// Last pixel seen during the drag, used when the release has no cursor.
    last: Option<Point>,
}

pub struct EditorLayer {
    pub outline: Option<Selection>,
    pub color: Color,
}

/// Cursor position relative to the layer, floored to whole pixels.
///
/// Positions outside the layer are kept so a drag can leave the image.
fn pixel_at(bounds: Rectangle, cursor: Cursor) -> Option<Point> {
    let global = cursor.position()?;
    Some(Point::new(
        (global.x - bounds.x).floor() as i32,
        (global.y - bounds.y).floor() as i32,
    ))
}

impl Program<Message> for EditorLayer {
    type State = DragState;

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (event::Status, Option<Message>) {
        let canvas::Event::Mouse(mouse_event) = event else {
            return (event::Status::Ignored, None);
        };

        match mouse_event {
            mouse::Event::ButtonPressed(mouse::Button::Left) => {
                if cursor.position_in(bounds).is_none() {
                    return (event::Status::Ignored, None);
                }
                match pixel_at(bounds, cursor) {
                    Some(p) => {
                        state.dragging = true;
                        state.last = Some(p);
                        (
                            event::Status::Captured,
                            Some(Message::Pointer(PointerEvent::Pressed(p))),
                        )
                    }
                    None => (event::Status::Ignored, None),
                }
            }
            mouse::Event::CursorMoved { .. } if state.dragging => match pixel_at(bounds, cursor) {
                Some(p) => {
                    state.last = Some(p);
                    (
                        event::Status::Captured,
                        Some(Message::Pointer(PointerEvent::Moved(p))),
                    )
                }
                None => (event::Status::Captured, None),
            },
            mouse::Event::ButtonReleased(mouse::Button::Left) if state.dragging => {
                state.dragging = false;
                match pixel_at(bounds, cursor).or(state.last.take()) {
                    Some(p) => (
                        event::Status::Captured,
                        Some(Message::Pointer(PointerEvent::Released(p))),
                    ),
                    None => (event::Status::Captured, None),
                }
            }
            _ => (event::Status::Ignored, None),
        }
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &iced::Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());

        if let Some(rect) = self.outline {
            let x1 = rect.previous.x.min(rect.current.x) as f32;
            let y1 = rect.previous.y.min(rect.current.y) as f32;
            let x2 = rect.previous.x.max(rect.current.x) as f32;
            let y2 = rect.previous.y.max(rect.current.y) as f32;
            let path = Path::rectangle(iced::Point::new(x1, y1), Size::new(x2 - x1, y2 - y1));
            frame.stroke(
                &path,
                Stroke::default()
                    .with_color(self.color)
                    .with_width(OUTLINE_WIDTH),
            );
        }

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        _state: &Self::State,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> mouse::Interaction {
        if cursor.is_over(bounds) {
            mouse::Interaction::Crosshair
        } else {
            mouse::Interaction::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer() -> EditorLayer {
        EditorLayer {
            outline: None,
            color: Color::from_rgb(1.0, 0.0, 0.0),
        }
    }

    fn mouse(event: mouse::Event) -> canvas::Event {
        canvas::Event::Mouse(event)
    }

    fn released_at(message: Option<Message>) -> Option<Point> {
        match message {
            Some(Message::Pointer(PointerEvent::Released(p))) => Some(p),
            _ => None,
        }
    }

    #[test]
    fn release_without_cursor_commits_last_drag_point() {
        let layer = layer();
        let bounds = Rectangle::new(iced::Point::new(10.0, 20.0), Size::new(100.0, 80.0));
        let mut state = DragState::default();

        let pressed = Cursor::Available(iced::Point::new(15.0, 25.0));
        layer.update(&mut state, mouse(mouse::Event::ButtonPressed(mouse::Button::Left)), bounds, pressed);

        let moved_to = iced::Point::new(70.0, 60.0);
        layer.update(
            &mut state,
            mouse(mouse::Event::CursorMoved { position: moved_to }),
            bounds,
            Cursor::Available(moved_to),
        );

        let (status, message) = layer.update(
            &mut state,
            mouse(mouse::Event::ButtonReleased(mouse::Button::Left)),
            bounds,
            Cursor::Unavailable,
        );
        assert_eq!(status, event::Status::Captured);
        assert_eq!(released_at(message), Some(Point::new(60, 40)));
        assert!(!state.dragging);
    }

    #[test]
    fn release_with_cursor_uses_its_position() {
        let layer = layer();
        let bounds = Rectangle::new(iced::Point::new(0.0, 0.0), Size::new(50.0, 50.0));
        let mut state = DragState::default();

        let pressed = Cursor::Available(iced::Point::new(5.0, 5.0));
        layer.update(&mut state, mouse(mouse::Event::ButtonPressed(mouse::Button::Left)), bounds, pressed);
        let (_, message) = layer.update(
            &mut state,
            mouse(mouse::Event::ButtonReleased(mouse::Button::Left)),
            bounds,
            Cursor::Available(iced::Point::new(80.5, 12.0)),
        );
        assert_eq!(released_at(message), Some(Point::new(80, 12)));
    }
}
