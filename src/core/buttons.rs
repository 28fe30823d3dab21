//! # Button Press Tracker
//!
//! Turns raw key down/up pairs into mouse button commands.
//!
//! ```text
//!            press / send down
//!   ┌──────┐ ─────────────────────────► ┌──────┐
//!   │ Idle │                            │ Held │
//!   └──────┘ ◄───────────────────────── └──────┘
//!     release <= long_press / send up
//!     any press > long_press / send up
//! ```
//!
//! A quick press and release is a click. Holding a key past `long_press`
//! and releasing it keeps the button down until the next tracked button
//! press, which allows drags longer than key repeat would.
//!
//! Only the release of the held button counts. Releasing any other button
//! key while one is held does nothing, so a tap on another button during a
//! hold does not end it.

use std::time::{Duration, Instant};

use log::debug;

use crate::backend::PointerDevice;
use crate::core::error::Result;
use crate::core::types::Button;

pub struct ButtonTracker {
    long_press: Duration,
    held: Option<(Button, Instant)>,
}

impl ButtonTracker {
    pub fn new(long_press: Duration) -> Self {
        Self {
            long_press,
            held: None,
        }
    }

    /// Currently held button, if a button-down is outstanding.
    pub fn held(&self) -> Option<Button> {
        self.held.map(|(button, _)| button)
    }

    pub fn on_button_event(
        &mut self,
        device: &mut impl PointerDevice,
        button: Button,
        is_press: bool,
        now: Instant,
    ) -> Result<()> {
        let Some((held, pressed_at)) = self.held else {
            if is_press {
                device.send_button(button, true)?;
                self.held = Some((button, now));
                debug!("{button:?} down");
            } else {
                debug!("Ignoring orphan release of {button:?}");
            }
            return Ok(());
        };

        let long = now.saturating_duration_since(pressed_at) > self.long_press;
        match (is_press, long) {
            (true, true) => {
                device.send_button(held, false)?;
                self.held = None;
                debug!("{held:?} up (end of long press)");
            }
            (true, false) => {
                debug!("Ignoring {button:?} press while {held:?} is held");
            }
            (false, _) if button != held => {
                debug!("Ignoring release of {button:?} while {held:?} is held");
            }
            (false, false) => {
                device.send_button(held, false)?;
                self.held = None;
                debug!("{held:?} up (click)");
            }
            (false, true) => {
                debug!("{held:?} stays down (long press)");
            }
        }
        Ok(())
    }
}
