/// Input state tracker.
///
/// Tracks which keys are currently held down, so movement continues while
/// a key stays pressed and jump can be read as a held state (the session
/// does its own edge detection for the initial jump impulse).
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't
/// support it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, poll};

use crate::domain::player::FrameInput;

/// After this duration without a Press/Repeat event, consider the key
/// released. Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Raw key events collected during drain, for meta-key handling.
    raw_events: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.raw_events.push(key);

                match key.kind {
                    KeyEventKind::Release if self.honor_release => {
                        self.last_active.remove(&key.code);
                    }
                    KeyEventKind::Release => {
                        // Rely on timeout-based expiry instead.
                    }
                    _ => {
                        self.last_active.insert(key.code, Instant::now());
                    }
                }
            }
        }

        // Expire keys that timed out (terminals without Release events).
        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    /// The held movement keys, folded into one per-tick snapshot.
    pub fn frame_input(&self) -> FrameInput {
        FrameInput {
            left: self.any_held(&[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')]),
            right: self.any_held(&[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')]),
            jump: self.any_held(&[
                KeyCode::Char(' '),
                KeyCode::Up,
                KeyCode::Char('w'),
                KeyCode::Char('W'),
            ]),
        }
    }

    /// Esc or Q this frame (checked on raw events, not the held map, so a
    /// quick tap is never missed).
    pub fn quit_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.kind != KeyEventKind::Release
                && matches!(k.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q'))
        })
    }

    /// Check if any raw event this frame has Ctrl+C.
    pub fn ctrl_c_pressed(&self) -> bool {
        use crossterm::event::KeyModifiers;
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| {
            self.last_active
                .get(c)
                .map(|t| t.elapsed() < HOLD_TIMEOUT)
                .unwrap_or(false)
        })
    }
}
