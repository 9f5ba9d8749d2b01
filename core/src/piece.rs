use serde::{Deserialize, Serialize};

use crate::*;

/// The part of a piece its animations are allowed to touch.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PieceState {
    pub position: Coord3,
    /// 0 is fully revealed, 1 fully hidden. Always within `[0, 1]`.
    pub cloak_factor: f64,
}

/// A single colored piece, either resident in a board slot or queued.
#[derive(Debug)]
pub struct Piece {
    color: ColorId,
    state: PieceState,
    animation: Sequence<PieceState>,
}

impl Piece {
    /// A fully cloaked piece at `position`.
    pub fn new(color: ColorId, position: Coord3) -> Self {
        Self {
            color,
            state: PieceState {
                position,
                cloak_factor: 1.0,
            },
            animation: Sequence::new(),
        }
    }

    pub fn color(&self) -> ColorId {
        self.color
    }

    pub fn position(&self) -> Coord3 {
        self.state.position
    }

    pub fn cloak_factor(&self) -> f64 {
        self.state.cloak_factor
    }

    pub fn state(&self) -> PieceState {
        self.state
    }

    pub fn is_animating(&self) -> bool {
        !self.animation.is_empty()
    }

    /// Appends `timeline` behind whatever is already running or queued.
    pub fn queue_animation(&mut self, timeline: impl Timeline<PieceState> + 'static) {
        self.animation.push(timeline);
    }

    /// Drops every running and queued animation. Position and cloak keep their
    /// last computed values.
    pub fn cancel_animations(&mut self) {
        self.animation.clear();
    }

    pub fn advance(&mut self, delta_ms: f64) -> Progress {
        self.animation.advance(&mut self.state, delta_ms)
    }

    /// Queues a fade to hidden (`true`) or revealed (`false`).
    pub fn set_cloaked(&mut self, cloaked: bool, duration_ms: f64) {
        self.queue_animation(cloak_transition(cloaked, duration_ms));
    }

    pub fn move_to(&mut self, position: Coord3, duration_ms: f64, easing: Easing) {
        self.queue_animation(move_transition(position, duration_ms, easing));
    }

    /// Both parts render while a fade is in progress, which makes them cross-fade.
    pub fn draw(&self, renderer: &mut dyn Renderer) {
        let PieceState {
            position,
            cloak_factor,
        } = self.state;

        if cloak_factor < 1.0 {
            renderer.draw_revealed(self.color, position);
        }
        if cloak_factor > 0.0 {
            renderer.draw_cloak(position, cloak_factor);
        }
    }
}

/// Fade from whatever the cloak factor is when the transition starts.
pub fn cloak_transition(cloaked: bool, duration_ms: f64) -> impl Timeline<PieceState> {
    let target = if cloaked { 1.0 } else { 0.0 };
    let mut from = None;

    Tween::new(duration_ms, Easing::Linear, move |state: &mut PieceState, t| {
        let start = *from.get_or_insert(state.cloak_factor);
        state.cloak_factor = lerp(start, target, t).clamp(0.0, 1.0);
    })
}

/// Move from wherever the piece is when the transition starts.
pub fn move_transition(
    target: Coord3,
    duration_ms: f64,
    easing: Easing,
) -> impl Timeline<PieceState> {
    let mut from = None;

    Tween::new(duration_ms, easing, move |state: &mut PieceState, t| {
        let start = *from.get_or_insert(state.position);
        state.position = start.lerp(target, t);
    })
}
