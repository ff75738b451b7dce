use serde::{Deserialize, Serialize};

/// A rectangle in screen pixels, used for monitor work areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Returns true if the point lies inside the rectangle.
    pub fn contains(&self, p: Position) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }
}

/// Top-left corner of the gadget window, persisted in the settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// Horizontal gap between the default gadget position and the work area edge.
pub const DEFAULT_MARGIN_RIGHT: i32 = 60;

/// Vertical gap between the default gadget position and the work area edge.
pub const DEFAULT_MARGIN_BOTTOM: i32 = 90;

/// Returns the default gadget position: bottom-right of the work area.
pub fn default_position(work_area: &Rect, size: i32) -> Position {
    Position {
        x: work_area.right() - size - DEFAULT_MARGIN_RIGHT,
        y: work_area.bottom() - size - DEFAULT_MARGIN_BOTTOM,
    }
}

/// Picks the saved position when it is still on screen, else the default.
///
/// A saved position can become unreachable after a monitor is unplugged,
/// which would leave the gadget invisible.
pub fn initial_position(saved: Option<Position>, work_area: &Rect, size: i32) -> Position {
    match saved {
        Some(p) if work_area.contains(p) => p,
        _ => default_position(work_area, size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_position_is_bottom_right_with_margins() {
        // Arrange
        let area = Rect::new(0, 0, 1920, 1040);

        // Act
        let p = default_position(&area, 120);

        // Assert
        assert_eq!(p, Position { x: 1740, y: 830 });
    }

    #[test]
    fn saved_position_wins_when_on_screen() {
        // Arrange
        let area = Rect::new(0, 0, 1920, 1040);
        let saved = Position { x: 100, y: 200 };

        // Act / Assert
        assert_eq!(initial_position(Some(saved), &area, 120), saved);
    }

    #[test]
    fn off_screen_saved_position_falls_back_to_default() {
        // Arrange
        let area = Rect::new(0, 0, 1920, 1040);
        let saved = Position { x: 4000, y: 200 };

        // Act
        let p = initial_position(Some(saved), &area, 120);

        // Assert
        assert_eq!(p, default_position(&area, 120));
    }
}
