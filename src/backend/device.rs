use crate::core::error::Result;
use crate::core::types::{Button, KeyCode, Point, Size};

/// Where the pointer currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerLocation {
    pub point: Point,
    pub screen: usize,
}

/// One event from the input source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key { code: KeyCode, pressed: bool },
    /// Anything the source could not interpret as a key event.
    Other(String),
}

/// Pointer primitives the navigation engine and button tracker call into.
pub trait PointerDevice {
    /// Current pointer coordinates and the screen they belong to.
    fn query_pointer(&mut self) -> Result<PointerLocation>;

    /// Bounding box of `screen`.
    fn screen_bounds(&mut self, screen: usize) -> Result<Size>;

    /// Warps the pointer to an absolute position on `screen`.
    fn move_pointer(&mut self, point: Point, screen: usize) -> Result<()>;

    /// Synthesizes a press (`down == true`) or release of `button`.
    fn send_button(&mut self, button: Button, down: bool) -> Result<()>;
}

/// Blocking source of key events.
pub trait KeySource {
    /// Blocks until the next event arrives.
    fn next_event(&mut self) -> Result<InputEvent>;
}

/// Key symbol resolution and exclusive grabs, used once at startup.
pub trait KeysymLookup {
    /// Key code that produces `keysym`, if any.
    fn keycode_for(&self, keysym: u32) -> Option<KeyCode>;

    /// Grabs `codes` so their events reach us instead of the focused window.
    fn grab_keys(&mut self, codes: &[KeyCode]) -> Result<()>;
}
