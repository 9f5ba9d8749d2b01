use serde::{Deserialize, Serialize};

use crate::*;

/// Grid shape, palette and world-space layout of a board.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub width: u8,
    pub height: u8,
    pub num_colors: u8,
    /// Share of the slots filled during population, rounded down.
    pub fill_ratio: f64,
    /// World-space distance between neighboring slot centers.
    pub spacing: f64,
    /// How far above its slot a freshly placed piece starts its drop.
    pub drop_height: f64,
}

impl BoardConfig {
    pub const fn slot_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn initial_fill(&self) -> usize {
        (self.slot_count() as f64 * self.fill_ratio).floor() as usize
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(GameError::InvalidBoardSize);
        }
        if self.num_colors == 0 {
            return Err(GameError::EmptyPalette);
        }
        if !(self.fill_ratio > 0.0 && self.fill_ratio <= 1.0) {
            return Err(GameError::InvalidFillRatio);
        }
        if self.initial_fill() == 0 {
            return Err(GameError::EmptyInitialFill);
        }
        for distance in [self.spacing, self.drop_height] {
            if !distance.is_finite() || distance < 0.0 {
                return Err(GameError::InvalidLayout);
            }
        }
        Ok(())
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: 4,
            height: 4,
            num_colors: 10,
            fill_ratio: 0.75,
            spacing: 2.5,
            drop_height: 4.0,
        }
    }
}

/// Durations of every gameplay beat, in milliseconds.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// Pause before the first piece is placed.
    pub intro: f64,
    pub populate_stagger: f64,
    pub drop_in: f64,
    pub reveal: f64,
    pub cloak: f64,
    /// Time the player gets to compare both revealed pieces.
    pub compare: f64,
    /// Time placement tweens get before the next piece is queued.
    pub settle: f64,
    pub move_piece: f64,
    /// An untouched queued piece hides itself after this long.
    pub queue_hide_after: f64,
}

impl Timings {
    pub fn validate(&self) -> Result<()> {
        let named = [
            ("intro", self.intro),
            ("populate_stagger", self.populate_stagger),
            ("drop_in", self.drop_in),
            ("reveal", self.reveal),
            ("cloak", self.cloak),
            ("compare", self.compare),
            ("settle", self.settle),
            ("move_piece", self.move_piece),
            ("queue_hide_after", self.queue_hide_after),
        ];
        for (name, duration) in named {
            if !duration.is_finite() || duration < 0.0 {
                return Err(GameError::InvalidDuration(name));
            }
        }
        Ok(())
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            intro: 1000.0,
            populate_stagger: 100.0,
            drop_in: 300.0,
            reveal: 250.0,
            cloak: 250.0,
            compare: 1000.0,
            settle: 500.0,
            move_piece: 500.0,
            queue_hide_after: 10_000.0,
        }
    }
}

/// What the coordinator does once a board reaches win or game over.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RestartPolicy {
    /// Keep the finished board around.
    Never,
    /// Keep showing the finished board for a while, then start a fresh one.
    AfterDelay { delay_ms: f64 },
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self::AfterDelay { delay_ms: 2000.0 }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub board: BoardConfig,
    pub timings: Timings,
    pub seed: u64,
    /// Upper bound for a single frame delta, to avoid catch-up jumps after a stall.
    pub max_frame_delta_ms: f64,
    pub restart: RestartPolicy,
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.board.validate()?;
        self.timings.validate()?;
        if !self.max_frame_delta_ms.is_finite() || self.max_frame_delta_ms < 0.0 {
            return Err(GameError::InvalidDuration("max_frame_delta_ms"));
        }
        if let RestartPolicy::AfterDelay { delay_ms } = self.restart {
            if !delay_ms.is_finite() || delay_ms < 0.0 {
                return Err(GameError::InvalidDuration("restart.delay_ms"));
            }
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board: BoardConfig::default(),
            timings: Timings::default(),
            seed: 0,
            max_frame_delta_ms: 100.0,
            restart: RestartPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = GameConfig::default();

        config.validate().unwrap();
        assert_eq!(config.board.slot_count(), 16);
        assert_eq!(config.board.initial_fill(), 12);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = GameConfig::from_json(
            r#"{ "board": { "width": 5 }, "seed": 42, "restart": "Never" }"#,
        )
        .unwrap();

        assert_eq!(config.board.width, 5);
        assert_eq!(config.board.height, 4);
        assert_eq!(config.board.initial_fill(), 15);
        assert_eq!(config.seed, 42);
        assert_eq!(config.restart, RestartPolicy::Never);
        assert_eq!(config.timings, Timings::default());
    }

    #[test]
    fn restart_delay_parses_from_json() {
        let config =
            GameConfig::from_json(r#"{ "restart": { "AfterDelay": { "delay_ms": 250.0 } } }"#)
                .unwrap();

        assert_eq!(config.restart, RestartPolicy::AfterDelay { delay_ms: 250.0 });
    }

    #[test]
    fn validate_rejects_bad_values() {
        let empty_board = GameConfig::from_json(r#"{ "board": { "height": 0 } }"#);
        assert!(matches!(empty_board, Err(GameError::InvalidBoardSize)));

        let no_colors = GameConfig::from_json(r#"{ "board": { "num_colors": 0 } }"#);
        assert!(matches!(no_colors, Err(GameError::EmptyPalette)));

        let sparse = GameConfig::from_json(
            r#"{ "board": { "width": 1, "height": 1, "fill_ratio": 0.5 } }"#,
        );
        assert!(matches!(sparse, Err(GameError::EmptyInitialFill)));

        let negative = GameConfig::from_json(r#"{ "timings": { "compare": -1.0 } }"#);
        assert!(matches!(negative, Err(GameError::InvalidDuration("compare"))));

        let garbage = GameConfig::from_json("{ nope");
        assert!(matches!(garbage, Err(GameError::Config(_))));
    }
}
