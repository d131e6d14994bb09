//! Player commands and held-key auto-repeat
//!
//! A held movement key fires once on press, then again after an initial
//! delay, then at the configured repeat rate until released.

/// Smallest allowed repeat delay in milliseconds
pub const MIN_REPEAT_DELAY_MS: u64 = 50;
/// Largest allowed repeat delay in milliseconds
pub const MAX_REPEAT_DELAY_MS: u64 = 300;
/// Default repeat delay in milliseconds
pub const DEFAULT_REPEAT_DELAY_MS: u64 = 100;
/// Default wait before a held key starts repeating
pub const DEFAULT_INITIAL_MOVE_DELAY_MS: u64 = 1000;

/// Clamp a repeat delay into the allowed range
pub fn clamp_repeat_delay(ms: u64) -> u64 {
    ms.clamp(MIN_REPEAT_DELAY_MS, MAX_REPEAT_DELAY_MS)
}

/// Commands the game core accepts, produced by an input adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Left,
    Right,
    SoftDrop,
    RotateCW,
    Pause,
    Restart,
    UseAbility,
}

/// Keys that auto-repeat while held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeldKey {
    Left,
    Right,
    SoftDrop,
}

impl HeldKey {
    /// Polling order
    pub const ALL: [HeldKey; 3] = [HeldKey::Left, HeldKey::Right, HeldKey::SoftDrop];

    /// Translation (dx, dy) this key applies to the active piece
    pub fn offset(self) -> (i32, i32) {
        match self {
            HeldKey::Left => (-1, 0),
            HeldKey::Right => (1, 0),
            HeldKey::SoftDrop => (0, 1),
        }
    }

    fn index(self) -> usize {
        match self {
            HeldKey::Left => 0,
            HeldKey::Right => 1,
            HeldKey::SoftDrop => 2,
        }
    }
}

impl Command {
    /// The repeating key behind this command, if any
    pub fn held_key(self) -> Option<HeldKey> {
        match self {
            Command::Left => Some(HeldKey::Left),
            Command::Right => Some(HeldKey::Right),
            Command::SoftDrop => Some(HeldKey::SoftDrop),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct KeyPressState {
    /// Time of the last accepted move (or of the press itself)
    last_move: u64,
    /// Still waiting for the first repeat after the press
    awaiting_first_repeat: bool,
}

/// Held-key repeat timing
#[derive(Debug, Clone)]
pub struct KeyRepeat {
    keys: [Option<KeyPressState>; 3],
    initial_delay: u64,
    repeat_delay: u64,
}

impl Default for KeyRepeat {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_MOVE_DELAY_MS, DEFAULT_REPEAT_DELAY_MS)
    }
}

impl KeyRepeat {
    pub fn new(initial_delay_ms: u64, repeat_delay_ms: u64) -> Self {
        Self {
            keys: [None; 3],
            initial_delay: initial_delay_ms,
            repeat_delay: clamp_repeat_delay(repeat_delay_ms),
        }
    }

    pub fn repeat_delay(&self) -> u64 {
        self.repeat_delay
    }

    pub fn initial_delay(&self) -> u64 {
        self.initial_delay
    }

    /// Set the repeat delay, clamped to [50, 300] ms; returns the value used
    pub fn set_repeat_delay(&mut self, ms: u64) -> u64 {
        self.repeat_delay = clamp_repeat_delay(ms);
        self.repeat_delay
    }

    /// Mark a key held as of `now`. The caller performs the press move itself.
    ///
    /// Returns false if the key was already held (terminal auto-repeat), in
    /// which case nothing changes.
    pub fn press(&mut self, key: HeldKey, now: u64) -> bool {
        let slot = &mut self.keys[key.index()];
        if slot.is_some() {
            return false;
        }
        *slot = Some(KeyPressState {
            last_move: now,
            awaiting_first_repeat: true,
        });
        true
    }

    pub fn release(&mut self, key: HeldKey) {
        self.keys[key.index()] = None;
    }

    pub fn is_held(&self, key: HeldKey) -> bool {
        self.keys[key.index()].is_some()
    }

    /// Release every key
    pub fn clear(&mut self) {
        self.keys = [None; 3];
    }

    /// Collect the keys due to fire at `now`, in polling order.
    ///
    /// A key that fires has its timer reset to `now` whether or not the
    /// caller's move succeeds.
    pub fn poll(&mut self, now: u64) -> Vec<HeldKey> {
        let (initial, repeat) = (self.initial_delay, self.repeat_delay);
        let mut due = Vec::new();

        for key in HeldKey::ALL {
            let Some(state) = &mut self.keys[key.index()] else {
                continue;
            };
            let threshold = if state.awaiting_first_repeat {
                initial
            } else {
                repeat
            };
            if now.saturating_sub(state.last_move) > threshold {
                state.last_move = now;
                state.awaiting_first_repeat = false;
                due.push(key);
            }
        }

        due
    }
}
