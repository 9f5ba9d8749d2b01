use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;

/// Running totals across every board of a session.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    /// Pairs unlocked on the current board
    pub pairs_unlocked: u32,
    /// Pairs unlocked since the session started
    pub total_pairs: u32,
    pub wins: u32,
    pub losses: u32,
    pub boards_started: u32,
}

impl Scoreboard {
    fn board_started(&mut self) {
        self.pairs_unlocked = 0;
        self.boards_started += 1;
    }
}

impl BoardListener for Scoreboard {
    fn on_unlocked_pair(&mut self, _board: &Board) {
        self.pairs_unlocked += 1;
        self.total_pairs += 1;
    }

    fn on_game_over(&mut self, board: &Board) {
        self.losses += 1;
        log::info!(
            "Game over after {} pairs with {} pieces left",
            self.pairs_unlocked,
            board.occupied_count()
        );
    }

    fn on_win(&mut self, _board: &Board) {
        self.wins += 1;
        log::info!("Board cleared after {} pairs", self.pairs_unlocked);
    }
}

/// One player, one board at a time, restarting per [`RestartPolicy`].
#[derive(Debug)]
pub struct SinglePlayer {
    config: GameConfig,
    board: Board,
    stats: Scoreboard,
    restart: Option<Wait>,
    seeds: SmallRng,
}

impl SinglePlayer {
    pub fn new(config: GameConfig) -> Result<Self> {
        config.validate()?;

        let mut stats = Scoreboard::default();
        stats.board_started();
        Ok(Self {
            board: Board::new_validated(config.board, config.timings, config.seed),
            seeds: SmallRng::seed_from_u64(config.seed),
            config,
            stats,
            restart: None,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn stats(&self) -> &Scoreboard {
        &self.stats
    }

    /// Steps the current board by one frame.
    ///
    /// `delta_ms` is clamped to `max_frame_delta_ms`. Reports done only when
    /// the board has ended and the policy is [`RestartPolicy::Never`].
    pub fn advance(&mut self, delta_ms: f64) -> Progress {
        let delta_ms = clamp_delta(delta_ms, self.config.max_frame_delta_ms);
        if !self.board.advance(&mut self.stats, delta_ms).is_done() {
            return Progress::Running;
        }

        let RestartPolicy::AfterDelay { delay_ms } = self.config.restart else {
            return Progress::Done;
        };
        let restart_due = match &mut self.restart {
            Some(wait) => wait.tick(delta_ms).is_done(),
            None => {
                let mut wait = Wait::new(delay_ms);
                let due = wait.tick(0.0).is_done();
                self.restart = Some(wait);
                due
            }
        };
        if restart_due {
            self.start_next_board();
        }
        Progress::Running
    }

    pub fn pick(&mut self, index: SlotIndex) -> PickOutcome {
        let outcome = self.board.pick(index);
        if !outcome.has_update() {
            log::trace!("Ignored pick of slot {index} in {:?}", self.board.phase());
        }
        outcome
    }

    pub fn draw(&self, renderer: &mut dyn Renderer) {
        self.board.draw(renderer);
    }

    fn start_next_board(&mut self) {
        let seed = self.seeds.random();
        log::debug!("Restarting after {:?}", self.board.phase());

        self.board = Board::new_validated(self.config.board, self.config.timings, seed);
        self.stats.board_started();
        self.restart = None;
    }
}
