use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Board must be at least 1x1")]
    InvalidBoardSize,
    #[error("Palette must contain at least one color")]
    EmptyPalette,
    #[error("Fill ratio must be within (0, 1]")]
    InvalidFillRatio,
    #[error("Fill ratio leaves the board empty, no piece could ever be queued")]
    EmptyInitialFill,
    #[error("Duration `{0}` must be finite and non-negative")]
    InvalidDuration(&'static str),
    #[error("Layout distances must be finite and non-negative")]
    InvalidLayout,
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GameError>;
