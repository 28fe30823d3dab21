//! # Keymap
//!
//! The fixed keypad symbol table, resolved to hardware key codes once at
//! startup.
//!
//! ```text
//!   ┌──────┬──────┬──────┬──────┐
//!   │ Num  │  /   │  *   │  -   │   / * -  left, middle, right button
//!   ├──────┼──────┼──────┼──────┤
//!   │ 7 ↖  │ 8 ↑  │ 9 ↗  │      │
//!   ├──────┼──────┼──────┤      │
//!   │ 4 ←  │ 5 ⟲  │ 6 →  │      │   5  undo
//!   ├──────┼──────┼──────┼──────┤
//!   │ 1 ↙  │ 2 ↓  │ 3 ↘  │ Ent  │   0 Ent .  alternate left, middle, right
//!   ├──────┴──────┼──────┤      │
//!   │     0       │  .   │      │
//!   └─────────────┴──────┴──────┘
//! ```

use log::{debug, warn};

use crate::backend::KeysymLookup;
use crate::core::error::{KpmError, Result};
use crate::core::types::{Button, Direction, KeyCode};

/// Keypad keysyms (see X11/keysymdef.h), NumLock off.
pub mod keysym {
    pub const KP_ENTER: u32 = 0xff8d;
    pub const KP_HOME: u32 = 0xff95;
    pub const KP_LEFT: u32 = 0xff96;
    pub const KP_UP: u32 = 0xff97;
    pub const KP_RIGHT: u32 = 0xff98;
    pub const KP_DOWN: u32 = 0xff99;
    pub const KP_PAGE_UP: u32 = 0xff9a;
    pub const KP_PAGE_DOWN: u32 = 0xff9b;
    pub const KP_END: u32 = 0xff9c;
    pub const KP_BEGIN: u32 = 0xff9d;
    pub const KP_INSERT: u32 = 0xff9e;
    pub const KP_DELETE: u32 = 0xff9f;
    pub const KP_MULTIPLY: u32 = 0xffaa;
    pub const KP_SUBTRACT: u32 = 0xffad;
    pub const KP_DIVIDE: u32 = 0xffaf;
}

pub const DIRECTION_SYMS: [(u32, Direction); 8] = [
    (keysym::KP_HOME, Direction::TopLeft),
    (keysym::KP_UP, Direction::Up),
    (keysym::KP_PAGE_UP, Direction::TopRight),
    (keysym::KP_LEFT, Direction::Left),
    (keysym::KP_RIGHT, Direction::Right),
    (keysym::KP_END, Direction::BottomLeft),
    (keysym::KP_DOWN, Direction::Down),
    (keysym::KP_PAGE_DOWN, Direction::BottomRight),
];

pub const BUTTON_SYMS: [(u32, Button); 3] = [
    (keysym::KP_DIVIDE, Button::Left),
    (keysym::KP_MULTIPLY, Button::Middle),
    (keysym::KP_SUBTRACT, Button::Right),
];

/// Optional second binding per button; skipped when the keyboard lacks it.
pub const ALT_BUTTON_SYMS: [(u32, Button); 3] = [
    (keysym::KP_INSERT, Button::Left),
    (keysym::KP_ENTER, Button::Middle),
    (keysym::KP_DELETE, Button::Right),
];

pub const UNDO_SYM: u32 = keysym::KP_BEGIN;

/// What a key code is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Move(Direction),
    Button(Button),
    Undo,
}

/// Key code to action table.
#[derive(Debug, Clone, Default)]
pub struct Keymap {
    bindings: Vec<(KeyCode, KeyAction)>,
}

impl Keymap {
    /// Resolves the fixed symbol table through `lookup`.
    ///
    /// A primary symbol without a key code is fatal; a missing alternate is
    /// logged and skipped.
    pub fn resolve(lookup: &impl KeysymLookup) -> Result<Self> {
        let mut keymap = Keymap::default();

        let primary = DIRECTION_SYMS
            .iter()
            .map(|&(sym, d)| (sym, KeyAction::Move(d)))
            .chain(BUTTON_SYMS.iter().map(|&(sym, b)| (sym, KeyAction::Button(b))))
            .chain(std::iter::once((UNDO_SYM, KeyAction::Undo)));
        for (sym, action) in primary {
            let code = lookup.keycode_for(sym).ok_or_else(|| {
                KpmError::Init(format!("no key code for keysym {sym:#x} ({action:?})"))
            })?;
            keymap.bind(code, action);
        }

        for &(sym, button) in &ALT_BUTTON_SYMS {
            match lookup.keycode_for(sym) {
                Some(code) => keymap.bind(code, KeyAction::Button(button)),
                None => warn!("No key code for alternate {button:?} keysym {sym:#x}, skipping"),
            }
        }

        Ok(keymap)
    }

    /// Adds a binding; a code already bound keeps its first action.
    pub fn bind(&mut self, code: KeyCode, action: KeyAction) {
        if let Some(existing) = self.classify(code) {
            warn!("Key code {code} already bound to {existing:?}, ignoring {action:?}");
            return;
        }
        debug!("Bound key code {code} to {action:?}");
        self.bindings.push((code, action));
    }

    pub fn classify(&self, code: KeyCode) -> Option<KeyAction> {
        self.bindings
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, action)| *action)
    }

    /// Every bound key code, for grabbing.
    pub fn codes(&self) -> Vec<KeyCode> {
        self.bindings.iter().map(|(c, _)| *c).collect()
    }
}
