//! # Core Logic
//!
//! The two state machines behind kpmouse. Neither knows about X11; they
//! talk to the display only through [`crate::backend::PointerDevice`].
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │       DISPATCHER        │
//!                    │  key event → KeyAction  │
//!                    └───────────┬─────────────┘
//!                                │
//!              ┌─────────────────┴─────────────────┐
//!              ▼                                   ▼
//!     ┌─────────────────┐                 ┌─────────────────┐
//!     │   Navigator     │                 │  ButtonTracker  │
//!     │ zoom / linear / │                 │ click / long    │
//!     │ undo / expiry   │                 │ press           │
//!     └────────┬────────┘                 └────────┬────────┘
//!              │                                   │
//!              └─────────────► PointerDevice ◄─────┘
//! ```
//!
//! ## Modules
//!
//! - [`navigation`]: the `Navigator`, logarithmic zoom then linear steps
//! - [`buttons`]: the `ButtonTracker`, click vs. long press
//! - [`types`]: `Direction`, `Button`, `Point`, `Size`
//! - [`config`]: layered settings
//! - [`error`]: `KpmError`
//! - [`clock`]: monotonic time source

pub mod buttons;
pub mod clock;
pub mod config;
pub mod error;
pub mod navigation;
pub mod types;
