use serde::{Deserialize, Serialize};

use crate::*;

/// Drawing collaborator, told every frame what to draw "now".
pub trait Renderer {
    /// A sphere showing the piece color.
    fn draw_revealed(&mut self, color: ColorId, position: Coord3);

    /// The opaque shell around a piece, `cloak_factor` in `(0, 1]`.
    fn draw_cloak(&mut self, position: Coord3, cloak_factor: f64);
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    Revealed { color: ColorId, position: Coord3 },
    Cloak { position: Coord3, cloak_factor: f64 },
}

/// Renderer that records draw calls, for headless drivers and tests.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn revealed_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::Revealed { .. }))
            .count()
    }

    pub fn cloak_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::Cloak { .. }))
            .count()
    }
}

impl Renderer for DrawList {
    fn draw_revealed(&mut self, color: ColorId, position: Coord3) {
        self.commands.push(DrawCommand::Revealed { color, position });
    }

    fn draw_cloak(&mut self, position: Coord3, cloak_factor: f64) {
        self.commands.push(DrawCommand::Cloak {
            position,
            cloak_factor,
        });
    }
}
