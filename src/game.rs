//! Core game state and logic

use std::time::Duration;

use crate::board::{BOARD_WIDTH, Board};
use crate::piece::Piece;
use crate::score::Score;
use crate::spawner::Spawner;

/// Ticks longer than this are discarded wholesale: the host was
/// suspended, and applying the stale delta would slam the piece down
/// several rows at once.
const STALE_TICK: Duration = Duration::from_millis(1000);

/// Game state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Paused,
    Running,
    GameOver,
}

/// Input actions the game can process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    SoftDrop,
    HardDrop,
    Rotate,
    Pause,
    Quit,
}

/// The game engine: board, active piece pair, score, and the
/// pause/running/game-over state machine. All mutation happens through
/// the operations below; the renderer only reads.
pub struct Game {
    board: Board,
    current: Piece,
    next: Piece,
    spawner: Spawner,
    score: Score,
    state: GameState,
    /// Time accumulated toward the next gravity step
    drop_accum: Duration,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Create a new game, paused, with a fresh piece pair
    pub fn new() -> Self {
        Self::with_spawner(Spawner::new())
    }

    /// Create a new game with a seeded spawner (for tests and replays)
    pub fn with_seed(seed: u64) -> Self {
        Self::with_spawner(Spawner::with_seed(seed))
    }

    fn with_spawner(mut spawner: Spawner) -> Self {
        let current = Piece::new(spawner.next());
        let next = Piece::new(spawner.next());
        Self {
            board: Board::new(),
            current,
            next,
            spawner,
            score: Score::new(),
            state: GameState::Paused,
            drop_accum: Duration::ZERO,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_piece(&self) -> &Piece {
        &self.current
    }

    pub fn next_piece(&self) -> &Piece {
        &self.next
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.state == GameState::Paused
    }

    pub fn is_over(&self) -> bool {
        self.state == GameState::GameOver
    }

    /// Process a driver action
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::MoveLeft => self.move_left(),
            Action::MoveRight => self.move_right(),
            Action::SoftDrop => {
                self.move_down();
            }
            Action::HardDrop => self.hard_drop(),
            Action::Rotate => self.rotate(),
            Action::Pause => self.toggle_pause(),
            // Quitting is the driver's business, not game state
            Action::Quit => {}
        }
    }

    /// Pause/resume. From game over this first resets to a fresh game,
    /// then resumes it.
    pub fn toggle_pause(&mut self) {
        if self.state == GameState::GameOver {
            self.reset();
        }
        if self.state == GameState::Running {
            self.state = GameState::Paused;
            tracing::debug!("paused");
        } else {
            // Resuming: zero the accumulator so the first gravity step
            // waits a full interval instead of firing off stale time.
            self.drop_accum = Duration::ZERO;
            self.state = GameState::Running;
            tracing::debug!("running");
        }
    }

    /// Start over: empty board, zeroed counters, fresh current piece.
    /// The pending next piece is promoted, as on any other spawn.
    fn reset(&mut self) {
        self.board = Board::new();
        self.score = Score::new();
        self.drop_accum = Duration::ZERO;
        self.state = GameState::Paused;
        self.spawn_next();
        tracing::info!("game reset");
    }

    /// Advance time. Gravity performs one downward step each time the
    /// accumulator exceeds the level's drop interval.
    pub fn tick(&mut self, elapsed: Duration) {
        if self.state != GameState::Running {
            return;
        }
        if elapsed > STALE_TICK {
            tracing::debug!(?elapsed, "discarding stale tick");
            return;
        }
        self.drop_accum += elapsed;
        if self.drop_accum > self.score.drop_interval() {
            self.move_down();
            self.drop_accum = Duration::ZERO;
        }
    }

    /// Move the piece one column left; reverted silently on collision
    pub fn move_left(&mut self) {
        if self.state == GameState::Running {
            self.current.move_left(&self.board);
        }
    }

    /// Move the piece one column right; reverted silently on collision
    pub fn move_right(&mut self) {
        if self.state == GameState::Running {
            self.current.move_right(&self.board);
        }
    }

    /// One row of gravity. Returns whether the piece is still falling;
    /// false means it just locked into the board and a new piece spawned.
    pub fn move_down(&mut self) -> bool {
        if self.state != GameState::Running {
            return false;
        }
        if self.current.move_down(&self.board) {
            return true;
        }
        self.lock_and_spawn();
        false
    }

    /// Drop straight to the floor and lock, all within this call
    pub fn hard_drop(&mut self) {
        if self.state != GameState::Running {
            return;
        }
        self.current.drop_to_floor(&self.board);
        self.lock_and_spawn();
    }

    /// Rotate the piece clockwise; discarded silently on collision
    pub fn rotate(&mut self) {
        if self.state == GameState::Running {
            self.current.rotate(&self.board);
        }
    }

    /// The piece has landed: merge it, clear and score any full rows,
    /// and bring in the next piece.
    fn lock_and_spawn(&mut self) {
        self.board.merge(&self.current);
        let cleared = self.board.clear_full_rows();
        if cleared > 0 {
            self.score.add_clear(cleared);
            tracing::debug!(
                cleared,
                points = self.score.points,
                level = self.score.level,
                "rows cleared"
            );
        }
        self.spawn_next();
    }

    /// Promote the next piece, centered at the top of the board, and
    /// draw a replacement. A spawn that immediately collides ends the
    /// game.
    fn spawn_next(&mut self) {
        let mut piece = std::mem::replace(&mut self.next, Piece::new(self.spawner.next()));
        piece.x = ((BOARD_WIDTH - piece.mask.side()) / 2) as i32;
        piece.y = 0;
        self.current = piece;

        if self.board.collides(&self.current) {
            self.state = GameState::GameOver;
            tracing::info!(
                points = self.score.points,
                lines = self.score.lines,
                "game over"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BOARD_HEIGHT, Cell};
    use crate::tetromino::TetrominoType;

    /// A running game with a known current piece and an empty board
    fn running_game_with(kind: TetrominoType) -> Game {
        let mut game = Game::with_seed(0);
        game.toggle_pause();
        game.current = Piece::new(kind);
        game
    }

    fn fill_row_except(game: &mut Game, row: usize, gap: usize) {
        for col in 0..BOARD_WIDTH {
            if col != gap {
                game.board.set(row, col, Cell::Filled(TetrominoType::J));
            }
        }
    }

    #[test]
    fn test_new_game_starts_paused() {
        let game = Game::with_seed(1);
        assert_eq!(game.state(), GameState::Paused);
        assert_eq!(game.score().points, 0);
        assert_eq!(game.score().level, 1);
        assert!(game.board().is_empty());
    }

    #[test]
    fn test_toggle_pause_flips_state() {
        let mut game = Game::with_seed(1);
        game.toggle_pause();
        assert_eq!(game.state(), GameState::Running);
        game.toggle_pause();
        assert_eq!(game.state(), GameState::Paused);
    }

    #[test]
    fn test_moves_ignored_while_paused() {
        let mut game = Game::with_seed(1);
        let x = game.current_piece().x;
        let y = game.current_piece().y;
        game.move_left();
        game.move_right();
        game.rotate();
        game.hard_drop();
        assert!(!game.move_down());
        assert_eq!(game.current_piece().x, x);
        assert_eq!(game.current_piece().y, y);
        assert!(game.board().is_empty());
    }

    #[test]
    fn test_move_left_right() {
        let mut game = running_game_with(TetrominoType::T);
        let x = game.current_piece().x;
        game.move_left();
        assert_eq!(game.current_piece().x, x - 1);
        game.move_right();
        game.move_right();
        assert_eq!(game.current_piece().x, x + 1);
    }

    #[test]
    fn test_move_down_reports_airborne() {
        let mut game = running_game_with(TetrominoType::O);
        // 18 free rows below an O at the top
        for _ in 0..17 {
            assert!(game.move_down());
        }
        assert!(game.move_down());
        // Now resting on the floor: the next step locks and spawns
        assert!(!game.move_down());
        assert!(!game.board().is_empty());
    }

    #[test]
    fn test_hard_drop_lands_o_on_floor() {
        let mut game = running_game_with(TetrominoType::O);
        game.current.x = 4;
        game.hard_drop();

        for row in [18, 19] {
            for col in [4, 5] {
                assert_eq!(
                    game.board().get(row, col),
                    Some(Cell::Filled(TetrominoType::O))
                );
            }
        }
        assert_eq!(game.score().points, 0);
        assert_eq!(game.state(), GameState::Running);
    }

    #[test]
    fn test_vertical_i_completes_bottom_row() {
        let mut game = running_game_with(TetrominoType::I);
        fill_row_except(&mut game, BOARD_HEIGHT - 1, 5);

        // Rotate to the vertical form (occupies mask column 2) and line
        // it up over the gap in column 5.
        game.rotate();
        game.current.x = 3;
        game.hard_drop();

        assert_eq!(game.score().lines, 1);
        assert_eq!(game.score().points, 40);
        assert_eq!(game.score().level, 1);
        // The cleared row compacted away; the I's remainder slid down
        assert_eq!(
            game.board().get(BOARD_HEIGHT as i32 - 1, 5),
            Some(Cell::Filled(TetrominoType::I))
        );
    }

    #[test]
    fn test_four_rows_in_one_merge() {
        let mut game = running_game_with(TetrominoType::I);
        for row in (BOARD_HEIGHT - 4)..BOARD_HEIGHT {
            fill_row_except(&mut game, row, 7);
        }
        game.rotate();
        game.current.x = 5; // vertical I sits in mask column 2 -> board column 7
        game.hard_drop();

        assert_eq!(game.score().lines, 4);
        assert_eq!(game.score().points, 1200);
        assert!(game.board().is_empty());
    }

    #[test]
    fn test_scoring_uses_level_before_update() {
        let mut game = running_game_with(TetrominoType::I);
        game.score.lines = 9;
        fill_row_except(&mut game, BOARD_HEIGHT - 1, 5);
        game.rotate();
        game.current.x = 3;
        game.hard_drop();

        // The tenth line advances to level 2, but pays out at level 1
        assert_eq!(game.score().level, 2);
        assert_eq!(game.score().points, 40);
    }

    /// Fill the two spawn rows except the rightmost column: every
    /// centered spawn collides, but neither row is clearable.
    fn block_spawn_rows(game: &mut Game) {
        fill_row_except(game, 0, BOARD_WIDTH - 1);
        fill_row_except(game, 1, BOARD_WIDTH - 1);
    }

    #[test]
    fn test_blocked_spawn_ends_game() {
        let mut game = running_game_with(TetrominoType::O);
        block_spawn_rows(&mut game);
        game.current.y = 5;
        game.hard_drop();

        assert_eq!(game.state(), GameState::GameOver);
    }

    #[test]
    fn test_game_over_freezes_everything_but_toggle() {
        let mut game = running_game_with(TetrominoType::O);
        block_spawn_rows(&mut game);
        game.current.y = 5;
        game.hard_drop();
        assert!(game.is_over());

        let snapshot = game.board().rows().clone();
        game.move_left();
        game.move_right();
        game.rotate();
        game.hard_drop();
        game.tick(Duration::from_millis(5000));
        game.tick(Duration::from_millis(500));
        assert_eq!(game.board().rows(), &snapshot);
        assert!(game.is_over());
    }

    #[test]
    fn test_toggle_after_game_over_resets_and_resumes() {
        let mut game = running_game_with(TetrominoType::O);
        block_spawn_rows(&mut game);
        game.score.points = 999;
        game.current.y = 5;
        game.hard_drop();
        assert!(game.is_over());

        game.toggle_pause();
        assert_eq!(game.state(), GameState::Running);
        assert!(game.board().is_empty());
        assert_eq!(game.score().points, 0);
        assert_eq!(game.score().lines, 0);
        assert_eq!(game.score().level, 1);
        // The fresh current piece is centered at the top
        assert_eq!(game.current_piece().y, 0);
    }

    #[test]
    fn test_tick_accumulates_to_one_drop() {
        let mut game = running_game_with(TetrominoType::T);
        let y = game.current_piece().y;

        // Under the 1000ms level-1 interval: no movement yet
        game.tick(Duration::from_millis(600));
        assert_eq!(game.current_piece().y, y);
        // Crossing it: exactly one row
        game.tick(Duration::from_millis(600));
        assert_eq!(game.current_piece().y, y + 1);
        // Accumulator was reset, so another short tick does nothing
        game.tick(Duration::from_millis(600));
        assert_eq!(game.current_piece().y, y + 1);
    }

    #[test]
    fn test_stale_tick_is_discarded() {
        let mut game = running_game_with(TetrominoType::T);
        let y = game.current_piece().y;
        game.tick(Duration::from_millis(5000));
        assert_eq!(game.current_piece().y, y);
        // And it did not leak into the accumulator either
        game.tick(Duration::from_millis(600));
        assert_eq!(game.current_piece().y, y);
    }

    #[test]
    fn test_resume_clears_stale_accumulator() {
        let mut game = running_game_with(TetrominoType::T);
        game.tick(Duration::from_millis(900));
        game.toggle_pause();
        game.toggle_pause();
        let y = game.current_piece().y;
        // Without the reset this 200ms tick would cross the interval
        game.tick(Duration::from_millis(200));
        assert_eq!(game.current_piece().y, y);
    }

    #[test]
    fn test_spawn_centers_by_mask_width() {
        let mut game = running_game_with(TetrominoType::T);
        game.next = Piece::new(TetrominoType::O);
        game.current.y = 5;
        game.hard_drop();
        // O mask is 2 wide: (10 - 2) / 2 = 4
        assert_eq!(game.current_piece().kind, TetrominoType::O);
        assert_eq!(game.current_piece().x, 4);
        assert_eq!(game.current_piece().y, 0);
    }

    #[test]
    fn test_tick_ignored_while_paused() {
        let mut game = Game::with_seed(3);
        let y = game.current_piece().y;
        game.tick(Duration::from_millis(800));
        game.tick(Duration::from_millis(800));
        assert_eq!(game.current_piece().y, y);
    }
}
