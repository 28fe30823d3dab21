//! # Navigation Engine
//!
//! Turns direction key presses into absolute pointer targets.
//!
//! ```text
//! depth 0          depth 1          depth 2 ... max_depth      linear
//! ┌───────────┐    ┌─────┐          ┌──┐                       ·→·→·
//! │     ·     │ →  │  ·  │     →    │· │   →  ...          →   fixed step
//! └───────────┘    └─────┘          └──┘
//! full screen      window / 2       window / 4
//! ```
//!
//! Each zoom step moves the pointer by a quarter of the current window
//! toward the chosen quadrant (or edge midpoint) and halves the window.
//! After `max_depth` zoom steps every press moves by a fixed linear step,
//! which can walk past the last window.
//!
//! Undo in the linear phase returns to the last zoom target and leaves the
//! linear phase, but keeps the depth at `max_depth`: the zoom steps are
//! still in the history and the next undo reverses the last of them.
//!
//! A navigation session expires after `move_ttl` of inactivity; the next
//! move then starts over from the center of the screen the pointer is on.
//!
//! Every operation computes its new state into a local copy and commits it
//! only after the pointer move succeeded.

use std::time::{Duration, Instant};

use log::debug;

use crate::backend::PointerDevice;
use crate::core::error::Result;
use crate::core::types::{Direction, Point, Size};

/// Tunables for the navigation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationSettings {
    /// Zoom steps before movement becomes linear.
    pub max_depth: u8,
    /// How many linear steps span the final zoom window.
    pub linear_steps: u32,
    /// Inactivity after which the session is discarded.
    pub move_ttl: Duration,
}

/// One zoom step: the direction taken and the window it subdivided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ZoomStep {
    direction: Direction,
    window: Size,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Session {
    window: Size,
    /// One entry per zoom step; its length is the depth.
    history: Vec<ZoomStep>,
    /// Target of the last zoom step (screen center before the first one).
    anchor: Point,
    /// Set by a linear move, cleared by a zoom step or undo.
    in_linear: bool,
}

impl Session {
    fn fresh(screen: Size) -> Self {
        Self {
            window: screen,
            history: Vec::new(),
            anchor: screen.center(),
            in_linear: false,
        }
    }

    fn depth(&self) -> u8 {
        self.history.len() as u8
    }

    fn expire(&mut self) {
        self.history.clear();
        self.in_linear = false;
    }
}

pub struct Navigator {
    settings: NavigationSettings,
    linear_step: Size,
    session: Session,
    last_move: Instant,
}

impl Navigator {
    /// Creates the engine, seeding the window from the screen the pointer is on.
    ///
    /// The linear step is derived from that screen once and never changes.
    pub fn new(
        device: &mut impl PointerDevice,
        settings: NavigationSettings,
        now: Instant,
    ) -> Result<Self> {
        let location = device.query_pointer()?;
        let mut navigator = Self {
            settings,
            linear_step: Size::default(),
            session: Session::fresh(Size::default()),
            last_move: now,
        };
        navigator.reset(device, location.screen)?;
        let screen = navigator.session.window;
        navigator.linear_step = linear_step_for(screen, settings);
        debug!(
            "Navigator ready: screen {}, max_depth {}, linear step {}",
            screen, settings.max_depth, navigator.linear_step
        );
        Ok(navigator)
    }

    /// Drops the session and restarts from the full bounds of `screen`.
    pub fn reset(&mut self, device: &mut impl PointerDevice, screen: usize) -> Result<()> {
        let bounds = device.screen_bounds(screen)?;
        self.session = Session::fresh(bounds);
        Ok(())
    }

    /// Moves the pointer one step toward `direction`.
    pub fn move_to(
        &mut self,
        device: &mut impl PointerDevice,
        direction: Direction,
        now: Instant,
    ) -> Result<()> {
        let location = device.query_pointer()?;

        let mut next = self.session.clone();
        if self.is_expired(now) {
            next.expire();
        }

        let mut point = location.point;
        if next.depth() == 0 && self.settings.max_depth > 0 {
            next = Session::fresh(device.screen_bounds(location.screen)?);
            point = next.window.center();
        }

        if next.depth() < self.settings.max_depth {
            let (dx, dy) = direction.offset(next.window.divided(4));
            point = point.offset(dx, dy);
            next.history.push(ZoomStep {
                direction,
                window: next.window,
            });
            next.window = next.window.divided(2);
            next.anchor = point;
            next.in_linear = false;
            debug!(
                "Zoom {:?} -> {} (depth {}, window {})",
                direction,
                point,
                next.depth(),
                next.window
            );
        } else {
            let (dx, dy) = direction.offset(self.linear_step);
            point = point.offset(dx, dy);
            next.in_linear = true;
            debug!("Linear {:?} -> {}", direction, point);
        }

        device.move_pointer(point, location.screen)?;
        self.session = next;
        self.last_move = now;
        Ok(())
    }

    /// Backs out of the most recent navigation step.
    ///
    /// In the linear phase this returns to the last zoom target; otherwise it
    /// reverses the last zoom step. Does nothing when there is nothing to
    /// undo or the session has expired.
    pub fn undo(&mut self, device: &mut impl PointerDevice, now: Instant) -> Result<()> {
        if self.is_expired(now) {
            debug!("Undo after expiry, dropping session");
            self.session.expire();
            return Ok(());
        }
        if self.session.depth() == 0 {
            return Ok(());
        }

        let location = device.query_pointer()?;
        let mut next = self.session.clone();
        if next.in_linear {
            next.in_linear = false;
        } else if let Some(step) = next.history.pop() {
            let (dx, dy) = step.direction.offset(next.window.divided(2));
            next.anchor = next.anchor.offset(-dx, -dy);
            next.window = step.window;
        }
        debug!(
            "Undo -> {} (depth {}, window {})",
            next.anchor,
            next.depth(),
            next.window
        );

        device.move_pointer(next.anchor, location.screen)?;
        self.session = next;
        self.last_move = now;
        Ok(())
    }

    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_move) > self.settings.move_ttl
    }

    pub fn depth(&self) -> u8 {
        self.session.depth()
    }

    pub fn window(&self) -> Size {
        self.session.window
    }

    pub fn anchor(&self) -> Point {
        self.session.anchor
    }

    pub fn history(&self) -> Vec<Direction> {
        self.session.history.iter().map(|s| s.direction).collect()
    }

    pub fn linear_step(&self) -> Size {
        self.linear_step
    }

    pub fn in_linear_phase(&self) -> bool {
        self.session.in_linear
    }
}

/// Final zoom window split into `linear_steps`, at least one pixel per axis.
fn linear_step_for(screen: Size, settings: NavigationSettings) -> Size {
    let divisor = (1u32 << settings.max_depth) * settings.linear_steps.max(1);
    Size::new(
        (screen.width / divisor).max(1),
        (screen.height / divisor).max(1),
    )
}
