//! Timing and game-state engine for a cloaked-pairs memory game.
//!
//! A board of hidden pieces is matched, one pick at a time, against a single
//! queued piece. Everything with a duration (cloak fades, movement, board
//! population, turn resolution) is a [`Timeline`] stepped from one per-frame
//! delta, so the whole engine is single-threaded and deterministic for a seed.
//! Rendering, input capture and the frame pump live outside this crate and talk
//! to it through [`Renderer`], [`SinglePlayer::pick`] and [`SinglePlayer::advance`].

pub use board::*;
pub use clock::*;
pub use config::*;
pub use error::*;
pub use mode::*;
pub use piece::*;
pub use render::*;
pub use timeline::*;
pub use types::*;

mod board;
mod clock;
mod config;
mod error;
mod mode;
mod piece;
mod render;
mod timeline;
mod types;

/// Signal returned by every timeline advance.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Progress {
    Running,
    Done,
}

impl Progress {
    pub const fn from_done(done: bool) -> Self {
        if done { Self::Done } else { Self::Running }
    }

    pub const fn is_done(self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Outcome of a pick request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PickOutcome {
    /// Ignored: empty or out-of-range slot, a pick already pending, or the
    /// board not waiting for one.
    NoChange,
    Picked,
}

impl PickOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Picked => true,
        }
    }
}
