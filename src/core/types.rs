//! # Core Types
//!
//! Plain data shared by the navigation engine, the button tracker and the
//! backend traits. Nothing here talks to a display server.

use std::fmt;

/// Hardware key code as reported by the input source.
pub type KeyCode = u8;

/// Absolute pointer coordinates on a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Both dimensions divided by `divisor` (integer division).
    pub fn divided(self, divisor: u32) -> Self {
        Self::new(self.width / divisor, self.height / divisor)
    }

    pub fn center(self) -> Point {
        Point::new((self.width / 2) as i32, (self.height / 2) as i32)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// One of the eight movement directions.
///
/// The first four target the center of a quadrant of the current window;
/// the last four target the midpoint of an edge between quadrants and only
/// change one axis.
///
/// ```text
///     +-----------+-----------+
///     |  TopLeft  Up  TopRight|
///     +---Left----+---Right---+
///     |BottomLeft Down BottomR|
///     +-----------+-----------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::TopLeft,
        Direction::TopRight,
        Direction::BottomLeft,
        Direction::BottomRight,
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Signed multipliers applied to the horizontal and vertical step.
    pub const fn axis_signs(self) -> (i32, i32) {
        match self {
            Direction::TopLeft => (-1, -1),
            Direction::TopRight => (1, -1),
            Direction::BottomLeft => (-1, 1),
            Direction::BottomRight => (1, 1),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Pixel offset of this direction against a step of `step.width` by `step.height`.
    ///
    /// Moves add this offset, undo subtracts it.
    pub fn offset(self, step: Size) -> (i32, i32) {
        let (mx, my) = self.axis_signs();
        (mx * step.width as i32, my * step.height as i32)
    }
}

/// Mouse buttons the keypad can press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Left,
    Middle,
    Right,
}

impl Button {
    /// Core protocol button number (1 = left, 2 = middle, 3 = right).
    pub const fn number(self) -> u8 {
        match self {
            Button::Left => 1,
            Button::Middle => 2,
            Button::Right => 3,
        }
    }
}
