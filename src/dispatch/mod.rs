//! # Dispatcher
//!
//! Blocks for the next key event, classifies it through the [`Keymap`]
//! and hands it to the navigation engine or the button tracker.
//!
//! - direction press → `Navigator::move_to` (releases are ignored)
//! - button press/release → `ButtonTracker::on_button_event`
//! - undo press → `Navigator::undo` (release ignored)
//!
//! Unknown events and unbound keys are logged and skipped. Any error from
//! the engines ends the loop.

pub mod keymap;

use std::time::Duration;

use log::{debug, warn};

use crate::backend::{InputEvent, KeySource, PointerDevice};
use crate::core::buttons::ButtonTracker;
use crate::core::clock::Clock;
use crate::core::error::Result;
use crate::core::navigation::{NavigationSettings, Navigator};
pub use keymap::{KeyAction, Keymap};

pub struct Dispatcher<B, C> {
    backend: B,
    clock: C,
    keymap: Keymap,
    navigator: Navigator,
    buttons: ButtonTracker,
}

impl<B: PointerDevice + KeySource, C: Clock> Dispatcher<B, C> {
    pub fn new(
        mut backend: B,
        clock: C,
        keymap: Keymap,
        navigation: NavigationSettings,
        long_press: Duration,
    ) -> Result<Self> {
        let navigator = Navigator::new(&mut backend, navigation, clock.now())?;
        Ok(Self {
            backend,
            clock,
            keymap,
            navigator,
            buttons: ButtonTracker::new(long_press),
        })
    }

    /// Processes events until one fails, and returns that failure.
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.step()?;
        }
    }

    /// Waits for one event and processes it.
    pub fn step(&mut self) -> Result<()> {
        let event = self.backend.next_event()?;
        self.handle(event)
    }

    pub fn handle(&mut self, event: InputEvent) -> Result<()> {
        let (code, pressed) = match event {
            InputEvent::Key { code, pressed } => (code, pressed),
            InputEvent::Other(description) => {
                warn!("Ignoring unexpected event: {description}");
                return Ok(());
            }
        };

        let Some(action) = self.keymap.classify(code) else {
            let kind = if pressed { "press" } else { "release" };
            warn!("Ignoring {kind} of unbound key code {code}");
            return Ok(());
        };

        let now = self.clock.now();
        match (action, pressed) {
            (KeyAction::Move(direction), true) => {
                self.navigator.move_to(&mut self.backend, direction, now)
            }
            (KeyAction::Button(button), _) => {
                self.buttons
                    .on_button_event(&mut self.backend, button, pressed, now)
            }
            (KeyAction::Undo, true) => self.navigator.undo(&mut self.backend, now),
            (KeyAction::Move(_) | KeyAction::Undo, false) => {
                debug!("Ignoring release of {action:?}");
                Ok(())
            }
        }
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn buttons(&self) -> &ButtonTracker {
        &self.buttons
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}
