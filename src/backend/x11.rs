//! # X11 Backend
//!
//! Implements the pointer and key primitives on top of an `x11rb`
//! connection. Buttons are synthesized through the XTEST extension; pointer
//! moves are plain `WarpPointer` requests on the target screen's root.
//!
//! Grabbed keys are released when the backend is dropped.

use log::{debug, info, warn};
use x11rb::connection::{Connection, RequestConnection};
use x11rb::cookie::VoidCookie;
use x11rb::protocol::Event;
use x11rb::protocol::xproto::{
    BUTTON_PRESS_EVENT, BUTTON_RELEASE_EVENT, ChangeWindowAttributesAux, ConnectionExt as _,
    EventMask, GrabMode, ModMask, Window,
};
use x11rb::protocol::xtest::{self, ConnectionExt as _};
use x11rb::rust_connection::RustConnection;

use crate::backend::device::{InputEvent, KeySource, KeysymLookup, PointerDevice, PointerLocation};
use crate::core::error::{KpmError, Result};
use crate::core::types::{Button, KeyCode, Point, Size};

/// Modifier bit for NumLock on virtually every keymap.
const NUM_LOCK_MASK: u16 = 0x10;
/// Shift, Lock, Control and Mod1..Mod5.
const MODIFIER_COMBINATIONS: u16 = 1 << 8;

pub struct X11Backend {
    conn: RustConnection,
    roots: Vec<Window>,
    min_keycode: KeyCode,
    keysyms_per_keycode: usize,
    keysyms: Vec<u32>,
    grabbed: Vec<KeyCode>,
}

impl X11Backend {
    /// Connects to `$DISPLAY`, loads the keyboard mapping and checks for XTEST.
    pub fn connect() -> Result<Self> {
        let (conn, default_screen) = x11rb::connect(None).map_err(KpmError::init)?;

        if conn
            .extension_information(xtest::X11_EXTENSION_NAME)
            .map_err(KpmError::init)?
            .is_none()
        {
            return Err(KpmError::Init(
                "the X server does not support the XTEST extension".to_string(),
            ));
        }

        let setup = conn.setup();
        let roots: Vec<Window> = setup.roots.iter().map(|s| s.root).collect();
        let min_keycode = setup.min_keycode;
        let count = setup.max_keycode - min_keycode + 1;

        let mapping = conn
            .get_keyboard_mapping(min_keycode, count)
            .map_err(KpmError::init)?
            .reply()
            .map_err(KpmError::init)?;

        info!(
            "Connected to X server: {} screen(s), default screen {}, keycodes {}..={}",
            roots.len(),
            default_screen,
            min_keycode,
            setup.max_keycode
        );

        Ok(Self {
            conn,
            roots,
            min_keycode,
            keysyms_per_keycode: usize::from(mapping.keysyms_per_keycode),
            keysyms: mapping.keysyms,
            grabbed: Vec::new(),
        })
    }

    fn root(&self, screen: usize) -> Result<Window> {
        self.roots.get(screen).copied().ok_or_else(|| {
            KpmError::io("screen lookup", format!("no screen with index {screen}"))
        })
    }
}

impl PointerDevice for X11Backend {
    fn query_pointer(&mut self) -> Result<PointerLocation> {
        let root = self.root(0)?;
        let reply = self
            .conn
            .query_pointer(root)
            .map_err(|e| KpmError::io("query_pointer", e))?
            .reply()
            .map_err(|e| KpmError::io("query_pointer", e))?;

        // The reply's root tells which screen the pointer is actually on.
        let screen = self
            .roots
            .iter()
            .position(|r| *r == reply.root)
            .unwrap_or(0);

        Ok(PointerLocation {
            point: Point::new(i32::from(reply.root_x), i32::from(reply.root_y)),
            screen,
        })
    }

    fn screen_bounds(&mut self, screen: usize) -> Result<Size> {
        let s = self.conn.setup().roots.get(screen).ok_or_else(|| {
            KpmError::io("screen_bounds", format!("no screen with index {screen}"))
        })?;
        Ok(Size::new(
            u32::from(s.width_in_pixels),
            u32::from(s.height_in_pixels),
        ))
    }

    fn move_pointer(&mut self, point: Point, screen: usize) -> Result<()> {
        let root = self.root(screen)?;
        let x = point.x.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16;
        let y = point.y.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16;
        self.conn
            .warp_pointer(x11rb::NONE, root, 0, 0, 0, 0, x, y)
            .map_err(|e| KpmError::io("move_pointer", e))?
            .check()
            .map_err(|e| KpmError::io("move_pointer", e))
    }

    fn send_button(&mut self, button: Button, down: bool) -> Result<()> {
        let kind = if down {
            BUTTON_PRESS_EVENT
        } else {
            BUTTON_RELEASE_EVENT
        };
        self.conn
            .xtest_fake_input(kind, button.number(), x11rb::CURRENT_TIME, x11rb::NONE, 0, 0, 0)
            .map_err(|e| KpmError::io("send_button", e))?
            .check()
            .map_err(|e| KpmError::io("send_button", e))
    }
}

impl KeySource for X11Backend {
    fn next_event(&mut self) -> Result<InputEvent> {
        let event = self
            .conn
            .wait_for_event()
            .map_err(|e| KpmError::io("wait_for_event", e))?;
        Ok(match event {
            Event::KeyPress(ev) => InputEvent::Key {
                code: ev.detail,
                pressed: true,
            },
            Event::KeyRelease(ev) => InputEvent::Key {
                code: ev.detail,
                pressed: false,
            },
            Event::Error(err) => InputEvent::Other(format!("X error: {err:?}")),
            other => InputEvent::Other(format!("{other:?}")),
        })
    }
}

impl KeysymLookup for X11Backend {
    fn keycode_for(&self, keysym: u32) -> Option<KeyCode> {
        if self.keysyms_per_keycode == 0 {
            return None;
        }
        self.keysyms
            .chunks(self.keysyms_per_keycode)
            .position(|syms| syms.contains(&keysym))
            .and_then(|i| u8::try_from(i).ok())
            .map(|i| self.min_keycode + i)
    }

    fn grab_keys(&mut self, codes: &[KeyCode]) -> Result<()> {
        let mut cookies: Vec<VoidCookie<'_, RustConnection>> = Vec::new();
        for &root in &self.roots {
            for mask in 0..MODIFIER_COMBINATIONS {
                if mask & NUM_LOCK_MASK != 0 {
                    continue;
                }
                for &code in codes {
                    let cookie = self
                        .conn
                        .grab_key(
                            false,
                            root,
                            ModMask::from(mask),
                            code,
                            GrabMode::ASYNC,
                            GrabMode::ASYNC,
                        )
                        .map_err(KpmError::init)?;
                    cookies.push(cookie);
                }
            }
            let events = ChangeWindowAttributesAux::new()
                .event_mask(EventMask::KEY_PRESS | EventMask::KEY_RELEASE);
            cookies.push(
                self.conn
                    .change_window_attributes(root, &events)
                    .map_err(KpmError::init)?,
            );
        }
        debug!("Sent {} grab requests", cookies.len());
        for cookie in cookies {
            cookie
                .check()
                .map_err(|e| KpmError::Init(format!("key grab refused: {e}")))?;
        }
        self.grabbed.extend_from_slice(codes);
        info!("Grabbed {} key(s) on {} screen(s)", codes.len(), self.roots.len());
        Ok(())
    }
}

impl Drop for X11Backend {
    fn drop(&mut self) {
        for &root in &self.roots {
            for &code in &self.grabbed {
                if let Err(e) = self.conn.ungrab_key(code, root, ModMask::ANY) {
                    warn!("Failed to release grab on keycode {code}: {e}");
                }
            }
        }
        let _ = self.conn.flush();
    }
}
