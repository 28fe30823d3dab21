//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::cell::Cell;
use std::time::{Duration, Instant};

use crate::backend::{PointerDevice, PointerLocation};
use crate::core::clock::Clock;
use crate::core::error::{KpmError, Result};
use crate::core::types::{Button, Point, Size};

/// A pointer command recorded by [`FakeDevice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Point),
    Button(Button, bool),
}

/// In-memory pointer device. Moves update the reported position so
/// subsequent queries see them, like a real display would.
pub struct FakeDevice {
    pub pointer: Point,
    pub screen: usize,
    pub bounds: Size,
    pub commands: Vec<Command>,
    pub bounds_queries: usize,
    /// Name of the primitive that fails on its next call.
    pub fail_on: Option<&'static str>,
}

impl FakeDevice {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pointer: Point::new(0, 0),
            screen: 0,
            bounds: Size::new(width, height),
            commands: Vec::new(),
            bounds_queries: 0,
            fail_on: None,
        }
    }

    pub fn last_move(&self) -> Option<Point> {
        self.commands.iter().rev().find_map(|c| match c {
            Command::Move(p) => Some(*p),
            Command::Button(..) => None,
        })
    }

    pub fn button_commands(&self) -> Vec<(Button, bool)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::Button(b, down) => Some((*b, *down)),
                Command::Move(_) => None,
            })
            .collect()
    }

    fn check(&mut self, op: &'static str) -> Result<()> {
        if self.fail_on == Some(op) {
            self.fail_on = None;
            return Err(KpmError::io(op, "injected failure"));
        }
        Ok(())
    }
}

impl PointerDevice for FakeDevice {
    fn query_pointer(&mut self) -> Result<PointerLocation> {
        self.check("query_pointer")?;
        Ok(PointerLocation {
            point: self.pointer,
            screen: self.screen,
        })
    }

    fn screen_bounds(&mut self, _screen: usize) -> Result<Size> {
        self.check("screen_bounds")?;
        self.bounds_queries += 1;
        Ok(self.bounds)
    }

    fn move_pointer(&mut self, point: Point, _screen: usize) -> Result<()> {
        self.check("move_pointer")?;
        self.pointer = point;
        self.commands.push(Command::Move(point));
        Ok(())
    }

    fn send_button(&mut self, button: Button, down: bool) -> Result<()> {
        self.check("send_button")?;
        self.commands.push(Command::Button(button, down));
        Ok(())
    }
}

/// Clock that only moves when told to.
pub struct ManualClock {
    start: Instant,
    elapsed: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Cell::new(Duration::ZERO),
        }
    }

    pub fn advance_ms(&self, ms: u64) {
        self.elapsed.set(self.elapsed.get() + Duration::from_millis(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed.get()
    }
}
