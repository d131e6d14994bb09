//! Terminal key mapping
//!
//! Translates crossterm key events into game commands. Terminals that do not
//! report key releases get them synthesized from a timeout.

use crate::input::{Command, HeldKey};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Without release events, a key is considered released once no repeat
/// arrived for this long
pub const KEY_TIMEOUT_MS: u64 = 600;

/// Step applied by the repeat-delay keys
pub const REPEAT_DELAY_STEP_MS: u64 = 10;

/// What a key press asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Game(Command),
    /// Shorten the repeat delay
    Faster,
    /// Lengthen the repeat delay
    Slower,
    ResetHighScore,
    /// Flip whether the help screen shows at startup
    ToggleHelp,
    Quit,
}

/// Map a key press to an action
pub fn map_key(key: &KeyEvent) -> Option<KeyAction> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(KeyAction::Quit);
    }

    let action = match normalize_key(key.code) {
        KeyCode::Left => KeyAction::Game(Command::Left),
        KeyCode::Right => KeyAction::Game(Command::Right),
        KeyCode::Down => KeyAction::Game(Command::SoftDrop),
        KeyCode::Up => KeyAction::Game(Command::RotateCW),
        KeyCode::Enter => KeyAction::Game(Command::Pause),
        KeyCode::Char('r') => KeyAction::Game(Command::Restart),
        KeyCode::Char('f') => KeyAction::Game(Command::UseAbility),
        KeyCode::Char('+') | KeyCode::Char('=') => KeyAction::Faster,
        KeyCode::Char('-') => KeyAction::Slower,
        KeyCode::Char('s') => KeyAction::ResetHighScore,
        KeyCode::Char('h') => KeyAction::ToggleHelp,
        KeyCode::Esc | KeyCode::Char('q') => KeyAction::Quit,
        _ => return None,
    };
    Some(action)
}

/// The held key a key code releases, if any
pub fn held_key_for(code: KeyCode) -> Option<HeldKey> {
    match code {
        KeyCode::Left => Some(HeldKey::Left),
        KeyCode::Right => Some(HeldKey::Right),
        KeyCode::Down => Some(HeldKey::SoftDrop),
        _ => None,
    }
}

/// Synthesizes releases for terminals that only report presses
#[derive(Debug, Clone, Default)]
pub struct ReleaseTimeout {
    last_seen: [Option<u64>; 3],
}

impl ReleaseTimeout {
    fn slot(key: HeldKey) -> usize {
        match key {
            HeldKey::Left => 0,
            HeldKey::Right => 1,
            HeldKey::SoftDrop => 2,
        }
    }

    /// Record a press or terminal auto-repeat of `key`
    pub fn seen(&mut self, key: HeldKey, now: u64) {
        self.last_seen[Self::slot(key)] = Some(now);
    }

    /// Keys whose events stopped arriving; they are forgotten once reported
    pub fn expired(&mut self, now: u64) -> Vec<HeldKey> {
        let mut released = Vec::new();
        for key in HeldKey::ALL {
            let slot = &mut self.last_seen[Self::slot(key)];
            if slot.is_some_and(|seen| now.saturating_sub(seen) > KEY_TIMEOUT_MS) {
                *slot = None;
                released.push(key);
            }
        }
        released
    }

    pub fn clear(&mut self) {
        self.last_seen = [None; 3];
    }
}

/// Normalize key codes for consistent handling
fn normalize_key(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}
