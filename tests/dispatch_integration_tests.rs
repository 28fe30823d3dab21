use kpmouse::backend::{InputEvent, KeySource, KeysymLookup, PointerDevice, PointerLocation};
use kpmouse::core::clock::Clock;
use kpmouse::core::error::{KpmError, Result};
use kpmouse::core::navigation::NavigationSettings;
use kpmouse::core::types::{Button, KeyCode, Point, Size};
use kpmouse::dispatch::keymap::{self, keysym};
use kpmouse::dispatch::{Dispatcher, Keymap};
use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

// ============================================================================
// Helper Types
// ============================================================================

const LONG_PRESS_MS: u64 = 600;
const TTL_MS: u64 = 4000;

/// One scripted input step.
enum Step {
    Press(u32),
    Release(u32),
    /// Advance the shared clock before the next event.
    Wait(u64),
    Noise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cmd {
    Move(Point),
    Button(Button, bool),
}

/// Clock whose time is shared with the scripted backend.
#[derive(Clone)]
struct SharedClock {
    start: Instant,
    elapsed: Rc<Cell<Duration>>,
}

impl Clock for SharedClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed.get()
    }
}

/// Backend that replays a script and records pointer commands.
struct ScriptedBackend {
    script: VecDeque<Step>,
    elapsed: Rc<Cell<Duration>>,
    pointer: Point,
    commands: Vec<Cmd>,
    fail_moves: bool,
}

/// Keysym → key code: every keysym in the table gets its low byte.
fn code(sym: u32) -> KeyCode {
    (sym & 0xff) as KeyCode
}

impl KeysymLookup for ScriptedBackend {
    fn keycode_for(&self, keysym: u32) -> Option<KeyCode> {
        Some(code(keysym))
    }

    fn grab_keys(&mut self, _codes: &[KeyCode]) -> Result<()> {
        Ok(())
    }
}

impl PointerDevice for ScriptedBackend {
    fn query_pointer(&mut self) -> Result<PointerLocation> {
        Ok(PointerLocation {
            point: self.pointer,
            screen: 0,
        })
    }

    fn screen_bounds(&mut self, _screen: usize) -> Result<Size> {
        Ok(Size::new(1920, 1080))
    }

    fn move_pointer(&mut self, point: Point, _screen: usize) -> Result<()> {
        if self.fail_moves {
            return Err(KpmError::io("move_pointer", "display gone"));
        }
        self.pointer = point;
        self.commands.push(Cmd::Move(point));
        Ok(())
    }

    fn send_button(&mut self, button: Button, down: bool) -> Result<()> {
        self.commands.push(Cmd::Button(button, down));
        Ok(())
    }
}

impl KeySource for ScriptedBackend {
    fn next_event(&mut self) -> Result<InputEvent> {
        loop {
            match self.script.pop_front() {
                Some(Step::Wait(ms)) => {
                    self.elapsed
                        .set(self.elapsed.get() + Duration::from_millis(ms));
                }
                Some(Step::Press(sym)) => {
                    return Ok(InputEvent::Key {
                        code: code(sym),
                        pressed: true,
                    });
                }
                Some(Step::Release(sym)) => {
                    return Ok(InputEvent::Key {
                        code: code(sym),
                        pressed: false,
                    });
                }
                Some(Step::Noise) => return Ok(InputEvent::Other("MappingNotify".to_string())),
                None => return Err(KpmError::io("wait_for_event", "script exhausted")),
            }
        }
    }
}

fn dispatcher(script: Vec<Step>) -> Dispatcher<ScriptedBackend, SharedClock> {
    dispatcher_with(script, false)
}

fn dispatcher_with(
    script: Vec<Step>,
    fail_moves: bool,
) -> Dispatcher<ScriptedBackend, SharedClock> {
    let elapsed = Rc::new(Cell::new(Duration::ZERO));
    let backend = ScriptedBackend {
        script: script.into(),
        elapsed: Rc::clone(&elapsed),
        pointer: Point::new(0, 0),
        commands: Vec::new(),
        fail_moves,
    };
    let clock = SharedClock {
        start: Instant::now(),
        elapsed,
    };
    let keymap = Keymap::resolve(&backend).unwrap();
    Dispatcher::new(
        backend,
        clock,
        keymap,
        NavigationSettings {
            max_depth: 4,
            linear_steps: 5,
            move_ttl: Duration::from_millis(TTL_MS),
        },
        Duration::from_millis(LONG_PRESS_MS),
    )
    .unwrap()
}

/// Runs the script to exhaustion and returns the recorded commands.
fn run(script: Vec<Step>) -> (Vec<Cmd>, Dispatcher<ScriptedBackend, SharedClock>) {
    let mut d = dispatcher(script);
    let err = d.run().unwrap_err();
    assert!(err.to_string().contains("script exhausted"), "{err}");
    (d.backend().commands.clone(), d)
}

// ============================================================================
// Navigation
// ============================================================================

#[test]
fn test_top_left_press_then_undo() {
    let (cmds, d) = run(vec![
        Step::Press(keysym::KP_HOME),
        Step::Release(keysym::KP_HOME),
        Step::Press(keymap::UNDO_SYM),
        Step::Release(keymap::UNDO_SYM),
    ]);
    assert_eq!(
        cmds,
        vec![Cmd::Move(Point::new(480, 270)), Cmd::Move(Point::new(960, 540))]
    );
    assert_eq!(d.navigator().depth(), 0);
    assert_eq!(d.navigator().window(), Size::new(1920, 1080));
}

#[test]
fn test_direction_releases_do_not_move() {
    let (cmds, _) = run(vec![
        Step::Release(keysym::KP_UP),
        Step::Release(keysym::KP_DOWN),
        Step::Release(keymap::UNDO_SYM),
    ]);
    assert!(cmds.is_empty());
}

#[test]
fn test_zoom_into_linear_phase() {
    let mut script = Vec::new();
    for _ in 0..5 {
        script.push(Step::Press(keysym::KP_RIGHT));
        script.push(Step::Release(keysym::KP_RIGHT));
    }
    let (cmds, d) = run(script);
    assert_eq!(cmds.len(), 5);
    assert_eq!(d.navigator().depth(), 4);
    assert!(d.navigator().in_linear_phase());

    // 960 + 480 + 240 + 120 + 60, then one linear step of 1920 / 16 / 5
    assert_eq!(cmds[3], Cmd::Move(Point::new(1860, 540)));
    assert_eq!(cmds[4], Cmd::Move(Point::new(1884, 540)));
}

#[test]
fn test_pause_longer_than_ttl_restarts_navigation() {
    let (cmds, d) = run(vec![
        Step::Press(keysym::KP_HOME),
        Step::Press(keysym::KP_HOME),
        Step::Wait(TTL_MS + 1),
        Step::Press(keysym::KP_PAGE_DOWN),
    ]);
    assert_eq!(cmds.last(), Some(&Cmd::Move(Point::new(1440, 810))));
    assert_eq!(d.navigator().depth(), 1);
}

#[test]
fn test_unbound_keys_and_noise_are_ignored() {
    let (cmds, _) = run(vec![
        Step::Noise,
        Step::Press(0x0061), // 'a'
        Step::Press(keysym::KP_DOWN),
    ]);
    assert_eq!(cmds, vec![Cmd::Move(Point::new(960, 810))]);
}

#[test]
fn test_move_failure_stops_the_loop() {
    let mut d = dispatcher_with(
        vec![Step::Press(keysym::KP_HOME), Step::Press(keysym::KP_HOME)],
        true,
    );
    let err = d.run().unwrap_err();
    assert!(matches!(err, KpmError::Io { operation: "move_pointer", .. }));
    assert_eq!(d.navigator().depth(), 0);
    // the second press was never read
    assert_eq!(d.backend().script.len(), 1);
}

// ============================================================================
// Buttons
// ============================================================================

#[test]
fn test_quick_press_is_click() {
    let (cmds, d) = run(vec![
        Step::Press(keysym::KP_DIVIDE),
        Step::Wait(80),
        Step::Release(keysym::KP_DIVIDE),
    ]);
    assert_eq!(
        cmds,
        vec![
            Cmd::Button(Button::Left, true),
            Cmd::Button(Button::Left, false)
        ]
    );
    assert_eq!(d.buttons().held(), None);
}

#[test]
fn test_alternate_binding_clicks_same_button() {
    let (cmds, _) = run(vec![
        Step::Press(keysym::KP_DELETE),
        Step::Release(keysym::KP_DELETE),
    ]);
    assert_eq!(
        cmds,
        vec![
            Cmd::Button(Button::Right, true),
            Cmd::Button(Button::Right, false)
        ]
    );
}

#[test]
fn test_long_press_drag() {
    let (cmds, d) = run(vec![
        Step::Press(keysym::KP_DIVIDE),
        Step::Wait(LONG_PRESS_MS + 50),
        Step::Release(keysym::KP_DIVIDE),
        // drag while the button stays down
        Step::Press(keysym::KP_HOME),
        Step::Release(keysym::KP_HOME),
        Step::Press(keysym::KP_MULTIPLY),
        Step::Release(keysym::KP_MULTIPLY),
    ]);
    assert_eq!(
        cmds,
        vec![
            Cmd::Button(Button::Left, true),
            Cmd::Move(Point::new(480, 270)),
            Cmd::Button(Button::Left, false),
        ]
    );
    assert_eq!(d.buttons().held(), None);
}

#[test]
fn test_double_press_within_threshold_sends_nothing_extra() {
    let (cmds, d) = run(vec![
        Step::Press(keysym::KP_SUBTRACT),
        Step::Wait(100),
        Step::Press(keysym::KP_SUBTRACT),
    ]);
    assert_eq!(cmds, vec![Cmd::Button(Button::Right, true)]);
    assert_eq!(d.buttons().held(), Some(Button::Right));
}
