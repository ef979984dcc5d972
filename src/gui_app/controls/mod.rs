//! Right-hand control panel: file buttons, corner and mode pickers, typed
//! coordinates, and the zoom slider.

use iced::widget::{button, column, container, radio, row, slider, text, text_input};
use iced::{Color, Element, Length};

use super::iced_ui::Message;
use crate::geometry::{Point, Rectangle};
use crate::inset::{Corner, MAX_ZOOM_VALUE, Mode, ZoomRatio};

const PANEL_WIDTH: f32 = 280.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordField {
    X1,
    Y1,
    X2,
    Y2,
}

/// Text typed into the four coordinate inputs.
#[derive(Debug, Clone, Default)]
pub struct CoordFields {
    pub x1: String,
    pub y1: String,
    pub x2: String,
    pub y2: String,
}

impl CoordFields {
    pub fn from_rect(rect: Rectangle) -> Self {
        Self {
            x1: rect.previous.x.to_string(),
            y1: rect.previous.y.to_string(),
            x2: rect.current.x.to_string(),
            y2: rect.current.y.to_string(),
        }
    }

    pub fn set(&mut self, field: CoordField, value: String) {
        match field {
            CoordField::X1 => self.x1 = value,
            CoordField::Y1 => self.y1 = value,
            CoordField::X2 => self.x2 = value,
            CoordField::Y2 => self.y2 = value,
        }
    }

    pub fn parse(&self) -> Result<Rectangle, String> {
        let value = |name: &str, raw: &str| {
            raw.trim()
                .parse::<i32>()
                .map_err(|_| format!("{name} must be a whole number, got {raw:?}"))
        };
        Ok(Rectangle::new(
            Point::new(value("x1", &self.x1)?, value("y1", &self.y1)?),
            Point::new(value("x2", &self.x2)?, value("y2", &self.y2)?),
        ))
    }

    /// Width and height shown beside the inputs, or dashes while unparsable.
    pub fn size_label(&self) -> String {
        match self.parse() {
            Ok(rect) => {
                let (w, h) = rect.size();
                format!("width: {}  height: {}", w.abs(), h.abs())
            }
            Err(_) => "width: -  height: -".to_string(),
        }
    }
}

/// What the panel needs to draw itself.
pub struct PanelState<'a> {
    pub corner: Corner,
    pub mode: Mode,
    pub zoom_value: u32,
    pub coords: &'a CoordFields,
    pub ratio_text: &'a str,
    pub status: &'a str,
    pub is_busy: bool,
    pub has_image: bool,
}

fn legend<'a>(title: &'a str, body: impl Into<Element<'a, Message>>) -> Element<'a, Message> {
    let frame_style = |_: &_| container::Style {
        background: None,
        border: iced::border::Border {
            color: Color::from_rgb8(100, 100, 100),
            width: 1.0,
            radius: 4.0.into(),
        },
        ..Default::default()
    };

    column![
        container(text(format!(" {title} ")).size(12)).style(|_| container::Style {
            background: Some(Color::from_rgb8(32, 32, 32).into()),
            ..Default::default()
        }),
        container(body)
            .padding(10)
            .width(Length::Fill)
            .style(frame_style),
    ]
    .spacing(0)
    .into()
}

fn coord_input<'a>(label: &'a str, value: &'a str, field: CoordField) -> Element<'a, Message> {
    row![
        text(label).size(12).width(Length::Fixed(22.0)),
        text_input("0", value)
            .on_input(move |s| Message::CoordInput(field, s))
            .on_submit(Message::ApplyCoordinates)
            .size(12)
            .width(Length::Fill),
    ]
    .spacing(4)
    .align_y(iced::alignment::Vertical::Center)
    .into()
}

pub fn panel<'a>(state: PanelState<'a>) -> Element<'a, Message> {
    let file_button = |label: &'a str, message: Message, enabled: bool| {
        let b = button(text(label).size(13)).width(Length::Fill);
        if enabled && !state.is_busy {
            b.on_press(message)
        } else {
            b
        }
    };

    let files = row![
        file_button("Load", Message::LoadPressed, true),
        file_button("Clear", Message::ClearPressed, state.has_image),
        file_button("Save", Message::SavePressed, state.has_image),
    ]
    .spacing(6);

    let corners = Corner::ALL.iter().fold(column![].spacing(4), |col, corner| {
        col.push(
            radio(corner.label(), *corner, Some(state.corner), Message::CornerSelected)
                .size(14)
                .text_size(12),
        )
    });

    let modes = Mode::ALL.iter().fold(column![].spacing(4), |col, mode| {
        col.push(
            radio(mode.label(), *mode, Some(state.mode), Message::ModeSelected)
                .size(14)
                .text_size(12),
        )
    });

    let fields = state.coords;
    let coords = column![
        row![
            coord_input("x1", &fields.x1, CoordField::X1),
            coord_input("y1", &fields.y1, CoordField::Y1),
        ]
        .spacing(6),
        row![
            coord_input("x2", &fields.x2, CoordField::X2),
            coord_input("y2", &fields.y2, CoordField::Y2),
        ]
        .spacing(6),
        text(fields.size_label()).size(12),
        button(text("Set coordinate").size(12))
            .on_press(Message::ApplyCoordinates)
            .width(Length::Fill),
    ]
    .spacing(6);

    let zoom = column![
        text(format!(
            "Ratio: {}",
            ZoomRatio::from_slider(state.zoom_value)
        ))
        .size(12),
        slider(0..=MAX_ZOOM_VALUE, state.zoom_value, Message::ZoomChanged),
        row![
            text_input("1.00", state.ratio_text)
                .on_input(Message::RatioInput)
                .on_submit(Message::ApplyRatio)
                .size(12)
                .width(Length::Fill),
            button(text("Set ratio").size(12)).on_press(Message::ApplyRatio),
        ]
        .spacing(6),
    ]
    .spacing(8);

    let content = column![
        files,
        legend("Corner", corners),
        legend("Mode", modes),
        legend("Rectangle", coords),
        legend("Zoom", zoom),
        legend("Status", text(state.status).size(12)),
    ]
    .spacing(14)
    .width(Length::Fill);

    container(content)
        .width(Length::Fixed(PANEL_WIDTH))
        .height(Length::Fill)
        .padding(16)
        .style(|_| container::Style {
            background: Some(Color::from_rgb8(32, 32, 32).into()),
            ..Default::default()
        })
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_round_trip_through_rectangle() {
        let rect = Rectangle::from_coords(12, 40, 3, 9);
        let fields = CoordFields::from_rect(rect);
        assert_eq!(fields.parse().unwrap(), rect);
        assert_eq!(fields.size_label(), "width: 9  height: 31");
    }

    #[test]
    fn bad_field_reports_its_name() {
        let mut fields = CoordFields::from_rect(Rectangle::from_coords(0, 0, 1, 1));
        fields.set(CoordField::Y2, "abc".to_string());
        let err = fields.parse().unwrap_err();
        assert!(err.starts_with("y2"), "{err}");
        assert_eq!(fields.size_label(), "width: -  height: -");
    }
}
