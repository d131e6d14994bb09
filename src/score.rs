//! Scoring and difficulty progression

/// Falling speed at the start of a game, ms per automatic step
pub const INITIAL_FALLING_SPEED_MS: u64 = 500;
/// Falling speed never drops below this
pub const MIN_FALLING_SPEED_MS: u64 = 100;
/// How much faster each speed-up makes the fall
pub const SPEED_UP_STEP_MS: u64 = 50;
/// Lines needed for one speed-up
pub const LINES_PER_SPEED_UP: u32 = 10;
/// Flat award for a successful row-crush
pub const ROW_CRUSH_POINTS: u64 = 100;

/// Points for clearing `lines` rows in one lock: `50 * (2^n - 1)`
pub fn line_clear_points(lines: u32) -> u64 {
    if lines == 0 {
        return 0;
    }
    50 * ((1u64 << lines) - 1)
}

/// Score and speed tracking for one game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Score {
    /// Current score
    pub points: u64,
    /// Lines cleared since the last speed-up
    pub lines_since_speed_up: u32,
    /// Lines cleared over the whole game
    pub total_lines: u32,
    /// Milliseconds per automatic downward step
    pub falling_speed_ms: u64,
}

impl Default for Score {
    fn default() -> Self {
        Self::new()
    }
}

impl Score {
    pub fn new() -> Self {
        Self::with_falling_speed(INITIAL_FALLING_SPEED_MS)
    }

    pub fn with_falling_speed(falling_speed_ms: u64) -> Self {
        Self {
            points: 0,
            lines_since_speed_up: 0,
            total_lines: 0,
            falling_speed_ms,
        }
    }

    /// Award points for a lock that cleared `lines` rows and advance the
    /// speed-up counter. Returns the points awarded and whether the game
    /// sped up.
    pub fn add_clear(&mut self, lines: u32) -> (u64, bool) {
        let points = line_clear_points(lines);
        self.points += points;
        self.total_lines += lines;
        self.lines_since_speed_up += lines;

        // One speed-up per lock at most; the remainder carries over
        let sped_up = self.lines_since_speed_up >= LINES_PER_SPEED_UP;
        if sped_up {
            self.falling_speed_ms = self
                .falling_speed_ms
                .saturating_sub(SPEED_UP_STEP_MS)
                .max(MIN_FALLING_SPEED_MS);
            self.lines_since_speed_up -= LINES_PER_SPEED_UP;
        }

        (points, sped_up)
    }

    /// Award the flat row-crush bonus
    pub fn add_row_crush(&mut self) {
        self.points += ROW_CRUSH_POINTS;
    }
}
