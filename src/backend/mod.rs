//! # Backend
//!
//! The window-system boundary. The core only sees the traits in
//! [`device`]; [`x11`] is the one real implementation.

pub mod device;
pub mod x11;

pub use device::{InputEvent, KeySource, KeysymLookup, PointerDevice, PointerLocation};
pub use x11::X11Backend;
