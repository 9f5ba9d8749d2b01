use serde::{Deserialize, Serialize};

use super::*;

/// Public view of where the gameflow currently is.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardPhase {
    Populating,
    AwaitingPick,
    Comparing,
    Resolving,
    Won,
    GameOver,
}

impl BoardPhase {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::GameOver)
    }
}

impl Default for BoardPhase {
    fn default() -> Self {
        Self::Populating
    }
}

#[derive(Debug)]
enum Phase {
    Populating {
        intro: Wait,
        stagger: Option<Wait>,
        placed: usize,
    },
    AwaitingPick,
    Comparing {
        wait: Wait,
    },
    Resolving {
        settle: Wait,
    },
    Won,
    GameOver,
}

impl Phase {
    const fn public(&self) -> BoardPhase {
        match self {
            Self::Populating { .. } => BoardPhase::Populating,
            Self::AwaitingPick => BoardPhase::AwaitingPick,
            Self::Comparing { .. } => BoardPhase::Comparing,
            Self::Resolving { .. } => BoardPhase::Resolving,
            Self::Won => BoardPhase::Won,
            Self::GameOver => BoardPhase::GameOver,
        }
    }
}

/// Top-level board timeline: populate, then pick/compare/resolve until the
/// board is won or full.
///
/// Valid transitions:
/// - Populating -> AwaitingPick
/// - AwaitingPick -> Comparing
/// - Comparing -> Resolving
/// - Comparing -> Won
/// - Comparing -> GameOver
/// - Resolving -> AwaitingPick
#[derive(Debug)]
pub(super) struct GameFlow {
    phase: Phase,
}

impl GameFlow {
    pub(super) fn new(timings: &Timings) -> Self {
        Self {
            phase: Phase::Populating {
                intro: Wait::new(timings.intro),
                stagger: None,
                placed: 0,
            },
        }
    }

    #[cfg(test)]
    pub(super) fn awaiting_pick() -> Self {
        Self {
            phase: Phase::AwaitingPick,
        }
    }

    pub(super) fn phase(&self) -> BoardPhase {
        self.phase.public()
    }

    pub(super) fn accepts_pick(&self) -> bool {
        matches!(self.phase, Phase::AwaitingPick)
    }

    fn enter(&mut self, phase: Phase) {
        log::debug!("Gameflow {:?} -> {:?}", self.phase.public(), phase.public());
        self.phase = phase;
    }

    /// Applies the outcome of the pending comparison.
    fn resolve(&mut self, board: &mut BoardState) -> Progress {
        let Some((index, picked_color, queued_color)) = board.pending_pair() else {
            log::warn!("Nothing left to compare, waiting for a new pick");
            board.picked = None;
            self.enter(Phase::AwaitingPick);
            return Progress::Running;
        };

        if picked_color == queued_color {
            log::debug!("Slot {index} matches queued color {queued_color}");
            board.remove_piece(index);
            board.picked = None;
            board.events.push(BoardEvent::UnlockedPair);

            if board.occupied_count() < 2 {
                board.events.push(BoardEvent::Won);
                self.enter(Phase::Won);
                return Progress::Done;
            }
        } else {
            log::debug!(
                "Slot {index} ({picked_color}) does not match queued color {queued_color}"
            );
            let Some(slot) = board.least_central_free_slot() else {
                board.picked = None;
                board.events.push(BoardEvent::GameOver);
                self.enter(Phase::GameOver);
                return Progress::Done;
            };
            board.settle_queued(slot);
            board.release_pick();
        }

        let settle = board.timings.settle;
        board.spawn_queued(&[picked_color, queued_color], settle);
        self.enter(Phase::Resolving {
            settle: Wait::new(settle),
        });
        Progress::Running
    }
}

impl Timeline<BoardState> for GameFlow {
    fn advance(&mut self, board: &mut BoardState, delta_ms: f64) -> Progress {
        match &mut self.phase {
            Phase::Populating {
                intro,
                stagger,
                placed,
            } => {
                if !intro.tick(delta_ms).is_done() {
                    return Progress::Running;
                }
                if let Some(wait) = stagger.as_mut() {
                    if !wait.tick(delta_ms).is_done() {
                        return Progress::Running;
                    }
                }

                if board.place_new_piece().is_none() {
                    log::warn!("Board filled up before population finished");
                }
                *placed += 1;

                if *placed >= board.config.initial_fill() {
                    board.spawn_queued(&[], 0.0);
                    self.enter(Phase::AwaitingPick);
                } else {
                    *stagger = Some(Wait::new(board.timings.populate_stagger));
                }
                Progress::Running
            }
            Phase::AwaitingPick => {
                if board.pending_pair().is_some() {
                    board.reveal_queued();
                    self.enter(Phase::Comparing {
                        wait: Wait::new(board.timings.compare),
                    });
                }
                Progress::Running
            }
            Phase::Comparing { wait } => {
                if wait.tick(delta_ms).is_done() {
                    self.resolve(board)
                } else {
                    Progress::Running
                }
            }
            Phase::Resolving { settle } => {
                if settle.tick(delta_ms).is_done() {
                    self.enter(Phase::AwaitingPick);
                }
                Progress::Running
            }
            Phase::Won | Phase::GameOver => Progress::Done,
        }
    }
}
