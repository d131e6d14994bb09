//! Core game state and logic

use crate::grid::Grid;
use crate::input::{
    Command, DEFAULT_INITIAL_MOVE_DELAY_MS, DEFAULT_REPEAT_DELAY_MS, HeldKey, KeyRepeat,
};
use crate::piece::Piece;
use crate::score::{INITIAL_FALLING_SPEED_MS, Score};
use crate::tetromino::TetrominoType;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

/// Rows removed by the row-crush ability
pub const ROW_CRUSH_ROWS: usize = 3;
/// Cooldown between row-crush uses
pub const ROW_CRUSH_COOLDOWN_MS: u64 = 45_000;

/// Tunables handed to a game at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    /// Wait before a held key starts repeating
    pub initial_move_delay_ms: u64,
    /// Interval between repeats of a held key, clamped to [50, 300]
    pub repeat_delay_ms: u64,
    /// Falling speed at game start
    pub initial_falling_speed_ms: u64,
    pub row_crush_cooldown_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial_move_delay_ms: DEFAULT_INITIAL_MOVE_DELAY_MS,
            repeat_delay_ms: DEFAULT_REPEAT_DELAY_MS,
            initial_falling_speed_ms: INITIAL_FALLING_SPEED_MS,
            row_crush_cooldown_ms: ROW_CRUSH_COOLDOWN_MS,
        }
    }
}

/// Game state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Active,
    Paused,
    GameOver,
}

/// What happened when a piece locked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockEvent {
    pub lines_cleared: u32,
    pub points: u64,
    pub sped_up: bool,
    /// The promoted piece did not fit and the game ended
    pub topped_out: bool,
}

/// Read-only view of a game for the presentation layer
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub grid: Grid,
    pub current_piece: Piece,
    pub next_piece: Piece,
    pub score: u64,
    pub total_lines: u32,
    pub falling_speed_ms: u64,
    pub repeat_delay_ms: u64,
    pub cooldown_remaining_ms: u64,
    pub paused: bool,
    pub game_over: bool,
}

/// The main game struct
pub struct Game {
    /// Settled blocks
    grid: Grid,
    /// Falling piece
    current_piece: Piece,
    /// Preview piece, promoted on the next lock
    next_piece: Piece,
    score: Score,
    state: GameState,
    /// Time of the last automatic fall step
    last_fall: u64,
    /// Time of the last successful row-crush; None means available
    last_row_crush: Option<u64>,
    keys: KeyRepeat,
    config: GameConfig,
    rng: ChaCha8Rng,
}

impl Game {
    /// Start a new game at `now`
    pub fn new(config: GameConfig, now: u64) -> Self {
        Self::with_seed(config, rand::random(), now)
    }

    /// Start a new game with a fixed piece seed
    pub fn with_seed(config: GameConfig, seed: u64, now: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let current_piece = Piece::new(TetrominoType::random(&mut rng));
        let next_piece = Piece::new(TetrominoType::random(&mut rng));

        Self {
            grid: Grid::new(),
            current_piece,
            next_piece,
            score: Score::with_falling_speed(config.initial_falling_speed_ms),
            state: GameState::Active,
            last_fall: now,
            last_row_crush: None,
            keys: KeyRepeat::new(config.initial_move_delay_ms, config.repeat_delay_ms),
            config,
            rng,
        }
    }

    /// Throw away the current game and start over
    pub fn reset(&mut self, now: u64) {
        self.grid = Grid::new();
        self.current_piece = self.spawn();
        self.next_piece = self.spawn();
        self.score = Score::with_falling_speed(self.config.initial_falling_speed_ms);
        self.state = GameState::Active;
        self.last_fall = now;
        self.last_row_crush = None;
        self.keys.clear();
        info!("game reset");
    }

    fn spawn(&mut self) -> Piece {
        Piece::new(TetrominoType::random(&mut self.rng))
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.state == GameState::Paused
    }

    pub fn is_game_over(&self) -> bool {
        self.state == GameState::GameOver
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn current_piece(&self) -> &Piece {
        &self.current_piece
    }

    pub fn next_piece(&self) -> &Piece {
        &self.next_piece
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn falling_speed_ms(&self) -> u64 {
        self.score.falling_speed_ms
    }

    pub fn repeat_delay_ms(&self) -> u64 {
        self.keys.repeat_delay()
    }

    /// Milliseconds until row-crush is available again
    pub fn cooldown_remaining_ms(&self, now: u64) -> u64 {
        match self.last_row_crush {
            Some(used) => self
                .config
                .row_crush_cooldown_ms
                .saturating_sub(now.saturating_sub(used)),
            None => 0,
        }
    }

    /// Copy out everything a renderer needs
    pub fn snapshot(&self, now: u64) -> Snapshot {
        Snapshot {
            grid: self.grid.clone(),
            current_piece: self.current_piece.clone(),
            next_piece: self.next_piece.clone(),
            score: self.score.points,
            total_lines: self.score.total_lines,
            falling_speed_ms: self.score.falling_speed_ms,
            repeat_delay_ms: self.keys.repeat_delay(),
            cooldown_remaining_ms: self.cooldown_remaining_ms(now),
            paused: self.is_paused(),
            game_over: self.is_game_over(),
        }
    }

    /// Apply a player command; returns whether it had an effect
    pub fn apply(&mut self, command: Command, now: u64) -> bool {
        match (self.state, command) {
            (_, Command::Restart) => {
                self.reset(now);
                true
            }
            (GameState::GameOver, _) => false,
            (_, Command::Pause) => {
                self.toggle_pause();
                true
            }
            (GameState::Paused, _) => false,
            (GameState::Active, Command::RotateCW) => self.rotate_piece(),
            (GameState::Active, Command::UseAbility) => self.use_special_ability(now),
            (GameState::Active, Command::Left | Command::Right | Command::SoftDrop) => {
                match command.held_key() {
                    Some(key) => self.press_key(key, now),
                    None => false,
                }
            }
        }
    }

    /// Switch between Active and Paused; no effect once the game is over
    pub fn toggle_pause(&mut self) {
        self.state = match self.state {
            GameState::Active => GameState::Paused,
            GameState::Paused => GameState::Active,
            GameState::GameOver => return,
        };
        // Release events may be lost while paused
        self.keys.clear();
        debug!(state = ?self.state, "pause toggled");
    }

    /// Mark a movement key held and move once immediately.
    ///
    /// Returns whether the immediate move happened.
    pub fn press_key(&mut self, key: HeldKey, now: u64) -> bool {
        if self.state != GameState::Active || !self.keys.press(key, now) {
            return false;
        }
        self.move_piece(key)
    }

    pub fn release_key(&mut self, key: HeldKey) {
        self.keys.release(key);
    }

    pub fn is_key_held(&self, key: HeldKey) -> bool {
        self.keys.is_held(key)
    }

    /// Change the repeat delay; returns the clamped value in effect
    pub fn set_repeat_delay(&mut self, ms: u64) -> u64 {
        let applied = self.keys.set_repeat_delay(ms);
        self.config.repeat_delay_ms = applied;
        applied
    }

    /// Shift the active piece one step
    pub fn move_piece(&mut self, direction: HeldKey) -> bool {
        if self.state != GameState::Active {
            return false;
        }
        let (dx, dy) = direction.offset();
        self.current_piece.try_move(&self.grid, dx, dy)
    }

    pub fn soft_drop_tick(&mut self) -> bool {
        self.move_piece(HeldKey::SoftDrop)
    }

    /// Returns whether the rotation applied
    pub fn rotate_piece(&mut self) -> bool {
        if self.state != GameState::Active {
            return false;
        }
        self.current_piece.rotate(&self.grid)
    }

    /// Crush the bottom rows if the cooldown has passed and there is
    /// something to crush. Returns whether the ability fired.
    pub fn use_special_ability(&mut self, now: u64) -> bool {
        if self.state != GameState::Active || self.cooldown_remaining_ms(now) > 0 {
            return false;
        }
        if !self.grid.bottom_rows_occupied(ROW_CRUSH_ROWS) {
            return false;
        }

        self.grid.clear_bottom_rows(ROW_CRUSH_ROWS);
        self.score.add_row_crush();
        self.last_row_crush = Some(now);
        info!(score = self.score.points, "row-crush used");
        true
    }

    /// Advance the game to `now` (call every frame)
    pub fn update(&mut self, now: u64) -> Option<LockEvent> {
        if self.state != GameState::Active {
            return None;
        }

        for key in self.keys.poll(now) {
            self.move_piece(key);
        }

        if now.saturating_sub(self.last_fall) <= self.score.falling_speed_ms {
            return None;
        }
        self.last_fall = now;

        if self.current_piece.try_move(&self.grid, 0, 1) {
            return None;
        }
        Some(self.lock_piece())
    }

    /// Settle the current piece, clear rows and promote the preview piece
    fn lock_piece(&mut self) -> LockEvent {
        let upcoming = self.spawn();
        let promoted = std::mem::replace(&mut self.next_piece, upcoming);
        let locked = std::mem::replace(&mut self.current_piece, promoted);

        locked.lock_into(&mut self.grid);
        let lines_cleared = self.grid.clear_full_rows() as u32;
        let (points, sped_up) = self.score.add_clear(lines_cleared);
        debug!(
            kind = locked.kind.name(),
            x = locked.x,
            y = locked.y,
            lines_cleared,
            "piece locked"
        );
        if sped_up {
            info!(falling_speed_ms = self.score.falling_speed_ms, "speed up");
        }

        let topped_out = !self.current_piece.is_valid_at(&self.grid, 0, 0);
        if topped_out {
            self.state = GameState::GameOver;
            self.keys.clear();
            info!(score = self.score.points, lines = self.score.total_lines, "game over");
        }

        LockEvent {
            lines_cleared,
            points,
            sped_up,
            topped_out,
        }
    }
}
