use serde::{Deserialize, Serialize};

use super::*;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PieceSnapshot {
    pub color: ColorId,
    pub position: Coord3,
    pub cloak_factor: f64,
}

impl From<&Piece> for PieceSnapshot {
    fn from(piece: &Piece) -> Self {
        Self {
            color: piece.color(),
            position: piece.position(),
            cloak_factor: piece.cloak_factor(),
        }
    }
}

/// Serializable copy of a board at one instant, for persistence and replay checks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub phase: BoardPhase,
    pub width: u8,
    pub height: u8,
    /// One entry per slot, in slot index order.
    pub slots: Vec<Option<PieceSnapshot>>,
    pub queued: Option<PieceSnapshot>,
    pub picked: Option<SlotIndex>,
}

impl BoardSnapshot {
    pub fn from_board(board: &Board) -> Self {
        let layout = board.layout();
        Self {
            phase: board.phase(),
            width: layout.width(),
            height: layout.height(),
            slots: (0..layout.slot_count())
                .map(|index| board.piece_at(index).map(PieceSnapshot::from))
                .collect(),
            queued: board.queued_piece().map(PieceSnapshot::from),
            picked: board.picked_index(),
        }
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
