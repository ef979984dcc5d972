//! Pointer-driven selection rectangle.

use crate::geometry::{Point, Rectangle};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionPhase {
    /// Nothing drawn yet, or the selection was cleared.
    #[default]
    Idle,
    /// Pointer is down; `current` follows the pointer.
    Dragging,
    /// Both points are fixed and the inset can be rendered.
    Committed,
}

/// Tracks the two corner points of the selection.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    phase: SelectionPhase,
    previous: Point,
    current: Point,
}

impl SelectionState {
    pub fn phase(&self) -> SelectionPhase {
        self.phase
    }

    pub fn is_dragging(&self) -> bool {
        self.phase == SelectionPhase::Dragging
    }

    /// Starts a new rectangle at `at`, dropping any committed one.
    pub fn press(&mut self, at: Point) {
        self.previous = at;
        self.current = at;
        self.phase = SelectionPhase::Dragging;
    }

    /// Moves the free corner. Ignored unless a drag is in progress.
    pub fn drag(&mut self, to: Point) -> bool {
        if !self.is_dragging() {
            return false;
        }
        self.current = to;
        true
    }

    /// Fixes the free corner at `at` and commits the rectangle.
    pub fn release(&mut self, at: Point) -> Option<Rectangle> {
        if !self.is_dragging() {
            return None;
        }
        self.current = at;
        self.phase = SelectionPhase::Committed;
        Some(self.outline())
    }

    /// Overwrites both points, as the coordinate inputs do.
    pub fn set_rectangle(&mut self, rect: Rectangle) {
        self.previous = rect.previous;
        self.current = rect.current;
        self.phase = SelectionPhase::Committed;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// The rectangle the inset is rendered from.
    pub fn committed(&self) -> Option<Rectangle> {
        (self.phase == SelectionPhase::Committed).then(|| self.outline())
    }

    /// The rectangle to outline on screen, including one still being dragged.
    pub fn visible(&self) -> Option<Rectangle> {
        (self.phase != SelectionPhase::Idle).then(|| self.outline())
    }

    fn outline(&self) -> Rectangle {
        Rectangle::new(self.previous, self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_cycle_commits_rectangle() {
        let mut state = SelectionState::default();
        assert_eq!(state.phase(), SelectionPhase::Idle);
        assert_eq!(state.visible(), None);

        state.press(Point::new(10, 20));
        assert!(state.drag(Point::new(30, 40)));
        assert_eq!(state.committed(), None);
        assert_eq!(state.visible(), Some(Rectangle::from_coords(10, 20, 30, 40)));

        let rect = state.release(Point::new(35, 45));
        assert_eq!(rect, Some(Rectangle::from_coords(10, 20, 35, 45)));
        assert_eq!(state.phase(), SelectionPhase::Committed);
    }

    #[test]
    fn moves_without_press_are_ignored() {
        let mut state = SelectionState::default();
        assert!(!state.drag(Point::new(5, 5)));
        assert_eq!(state.release(Point::new(5, 5)), None);
        assert_eq!(state.phase(), SelectionPhase::Idle);
    }

    #[test]
    fn next_press_restarts_drag() {
        let mut state = SelectionState::default();
        state.set_rectangle(Rectangle::from_coords(1, 2, 3, 4));
        assert_eq!(state.phase(), SelectionPhase::Committed);

        state.press(Point::new(7, 7));
        assert_eq!(state.phase(), SelectionPhase::Dragging);
        assert_eq!(state.visible(), Some(Rectangle::from_coords(7, 7, 7, 7)));
    }

    #[test]
    fn clear_returns_to_idle() {
        let mut state = SelectionState::default();
        state.set_rectangle(Rectangle::from_coords(1, 2, 3, 4));
        state.clear();
        assert_eq!(state.committed(), None);
    }
}
