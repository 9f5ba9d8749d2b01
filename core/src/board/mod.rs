use ndarray::Array2;
use rand::prelude::*;

use crate::*;
use flow::GameFlow;

pub use flow::BoardPhase;
pub use layout::*;
pub use snapshot::*;

mod colors;
mod flow;
mod layout;
mod snapshot;

/// A grid slot, which exists whether or not a piece sits in it.
#[derive(Debug)]
pub enum Slot {
    Empty,
    Occupied(Piece),
}

impl Slot {
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub const fn piece(&self) -> Option<&Piece> {
        match self {
            Self::Empty => None,
            Self::Occupied(piece) => Some(piece),
        }
    }

    pub fn piece_mut(&mut self) -> Option<&mut Piece> {
        match self {
            Self::Empty => None,
            Self::Occupied(piece) => Some(piece),
        }
    }

    pub fn take(&mut self) -> Option<Piece> {
        match core::mem::take(self) {
            Self::Empty => None,
            Self::Occupied(piece) => Some(piece),
        }
    }
}

impl Default for Slot {
    fn default() -> Self {
        Self::Empty
    }
}

/// Receives board outcomes. Calls happen at the end of the frame that produced
/// them, in the order they occurred.
pub trait BoardListener {
    fn on_unlocked_pair(&mut self, _board: &Board) {}

    fn on_game_over(&mut self, _board: &Board) {}

    fn on_win(&mut self, _board: &Board) {}
}

impl BoardListener for () {}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum BoardEvent {
    UnlockedPair,
    Won,
    GameOver,
}

/// Everything the gameflow timeline mutates.
#[derive(Debug)]
struct BoardState {
    config: BoardConfig,
    timings: Timings,
    layout: GridLayout,
    /// Indexed `[(y, x)]`, so the standard layout iterates in slot index order.
    grid: Array2<Slot>,
    queued: Option<Piece>,
    picked: Option<SlotIndex>,
    rng: SmallRng,
    events: Vec<BoardEvent>,
}

impl BoardState {
    fn new(config: BoardConfig, timings: Timings, seed: u64) -> Self {
        let shape = (usize::from(config.height), usize::from(config.width));
        Self {
            config,
            timings,
            layout: GridLayout::new(&config),
            grid: Array2::from_shape_fn(shape, |_| Slot::Empty),
            queued: None,
            picked: None,
            rng: SmallRng::seed_from_u64(seed),
            events: Vec::new(),
        }
    }

    fn slot(&self, index: SlotIndex) -> Option<&Slot> {
        let (x, y) = self.layout.index_to_xy(index)?;
        self.grid.get((y, x))
    }

    fn slot_mut(&mut self, index: SlotIndex) -> Option<&mut Slot> {
        let (x, y) = self.layout.index_to_xy(index)?;
        self.grid.get_mut((y, x))
    }

    fn piece(&self, index: SlotIndex) -> Option<&Piece> {
        self.slot(index).and_then(Slot::piece)
    }

    fn piece_mut(&mut self, index: SlotIndex) -> Option<&mut Piece> {
        self.slot_mut(index).and_then(Slot::piece_mut)
    }

    fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.grid.iter().filter_map(Slot::piece)
    }

    fn occupied_count(&self) -> usize {
        self.pieces().count()
    }

    fn free_slots(&self) -> Vec<SlotIndex> {
        self.layout
            .placement_order()
            .into_iter()
            .filter(|&index| self.slot(index).is_some_and(Slot::is_empty))
            .collect()
    }

    fn least_central_free_slot(&self) -> Option<SlotIndex> {
        self.free_slots().last().copied()
    }

    /// Slot, picked color and queued color, when both pieces are present.
    fn pending_pair(&self) -> Option<(SlotIndex, ColorId, ColorId)> {
        let index = self.picked?;
        let picked = self.piece(index)?;
        let queued = self.queued.as_ref()?;
        Some((index, picked.color(), queued.color()))
    }

    /// Drops a random palette color into the most central free slot.
    fn place_new_piece(&mut self) -> Option<SlotIndex> {
        let color = colors::random_palette_color(&mut self.rng, self.config.num_colors);
        let index = self.free_slots().first().copied()?;

        let mut piece = Piece::new(color, self.layout.spawn_position(index));
        piece.move_to(
            self.layout.slot_position(index),
            self.timings.drop_in,
            Easing::OutCubic,
        );
        log::trace!("Placed color {color} at slot {index}");

        *self.slot_mut(index)? = Slot::Occupied(piece);
        Some(index)
    }

    fn remove_piece(&mut self, index: SlotIndex) -> Option<Piece> {
        self.slot_mut(index).and_then(Slot::take)
    }

    /// Replaces the queued piece with a new one whose color is on the board.
    ///
    /// The newcomer waits `lead_in_ms`, reveals itself, and hides again if
    /// left untouched.
    fn spawn_queued(&mut self, exclude: &[ColorId], lead_in_ms: f64) {
        let present = colors::present_colors(self.pieces());
        let Some(color) = colors::choose_color(&mut self.rng, &present, exclude) else {
            unreachable!("a piece is only queued while the board holds pieces");
        };
        log::trace!("Queued color {color} from {present:?}, excluding {exclude:?}");

        let Timings {
            reveal,
            cloak,
            queue_hide_after,
            ..
        } = self.timings;

        let mut piece = Piece::new(color, self.layout.queue_position());
        piece.queue_animation(Wait::new(lead_in_ms));
        piece.set_cloaked(false, reveal);
        piece.queue_animation(Wait::new(queue_hide_after));
        piece.set_cloaked(true, cloak);
        self.queued = Some(piece);
    }

    fn reveal_queued(&mut self) {
        let reveal = self.timings.reveal;
        if let Some(queued) = &mut self.queued {
            queued.cancel_animations();
            queued.set_cloaked(false, reveal);
        }
    }

    /// Moves the queued piece into `index` for good.
    fn settle_queued(&mut self, index: SlotIndex) {
        let Some(mut piece) = self.queued.take() else {
            return;
        };
        piece.queue_animation(
            Parallel::new()
                .with(move_transition(
                    self.layout.slot_position(index),
                    self.timings.move_piece,
                    Easing::InOutCubic,
                ))
                .with(cloak_transition(true, self.timings.cloak)),
        );
        if let Some(slot) = self.slot_mut(index) {
            *slot = Slot::Occupied(piece);
        }
    }

    /// Clears the pick, cloaking the picked piece back if it is still on the board.
    fn release_pick(&mut self) {
        let cloak = self.timings.cloak;
        if let Some(index) = self.picked.take() {
            if let Some(piece) = self.piece_mut(index) {
                piece.set_cloaked(true, cloak);
            }
        }
    }

    /// Steps every live piece; runs after the gameflow so this frame's
    /// additions are included and removals are not.
    fn advance_pieces(&mut self, delta_ms: f64) {
        for slot in self.grid.iter_mut() {
            if let Slot::Occupied(piece) = slot {
                piece.advance(delta_ms);
            }
        }
        if let Some(queued) = &mut self.queued {
            queued.advance(delta_ms);
        }
    }
}

/// Grid of pieces plus the queued piece, driven by its gameflow timeline.
///
/// Advancing a board (as a [`Timeline`] over its [`BoardListener`]) steps the
/// gameflow first and every piece second, all with the same delta, then
/// reports this frame's outcomes to the listener. It reports done once the
/// board is won or lost; pieces keep animating if it is advanced further.
#[derive(Debug)]
pub struct Board {
    state: BoardState,
    flow: GameFlow,
}

impl Board {
    pub fn new(config: BoardConfig, timings: Timings, seed: u64) -> Result<Self> {
        config.validate()?;
        timings.validate()?;
        Ok(Self::new_validated(config, timings, seed))
    }

    /// `config` and `timings` must already have passed validation.
    pub(crate) fn new_validated(config: BoardConfig, timings: Timings, seed: u64) -> Self {
        log::debug!(
            "New {}x{} board with {} colors, seed {seed}",
            config.width,
            config.height,
            config.num_colors
        );
        Self {
            state: BoardState::new(config, timings, seed),
            flow: GameFlow::new(&timings),
        }
    }

    pub fn from_config(config: &GameConfig) -> Result<Self> {
        Self::new(config.board, config.timings, config.seed)
    }

    pub fn phase(&self) -> BoardPhase {
        self.flow.phase()
    }

    pub fn is_finished(&self) -> bool {
        self.phase().is_finished()
    }

    pub fn config(&self) -> &BoardConfig {
        &self.state.config
    }

    pub fn layout(&self) -> &GridLayout {
        &self.state.layout
    }

    pub fn slot_count(&self) -> usize {
        self.state.layout.slot_count()
    }

    pub fn index_to_coord(&self, index: SlotIndex) -> Option<Coord2> {
        self.state.layout.index_to_coord(index)
    }

    pub fn coord_to_index(&self, coord: Coord2) -> Option<SlotIndex> {
        self.state.layout.coord_to_index(coord)
    }

    pub fn piece_at(&self, index: SlotIndex) -> Option<&Piece> {
        self.state.piece(index)
    }

    pub fn queued_piece(&self) -> Option<&Piece> {
        self.state.queued.as_ref()
    }

    pub fn picked_index(&self) -> Option<SlotIndex> {
        self.state.picked
    }

    pub fn picked_piece(&self) -> Option<&Piece> {
        self.state.picked.and_then(|index| self.state.piece(index))
    }

    pub fn occupied_count(&self) -> usize {
        self.state.occupied_count()
    }

    /// Free slots, most central first. The last entry is where a mismatched
    /// queued piece goes.
    pub fn free_slot_order(&self) -> Vec<SlotIndex> {
        self.state.free_slots()
    }

    /// Selects the piece in slot `index` and reveals it once any move it is
    /// still making has finished.
    pub fn pick(&mut self, index: SlotIndex) -> PickOutcome {
        if !self.flow.accepts_pick() || self.state.picked.is_some() || self.state.queued.is_none()
        {
            return PickOutcome::NoChange;
        }

        let reveal = self.state.timings.reveal;
        let Some(piece) = self.state.piece_mut(index) else {
            return PickOutcome::NoChange;
        };
        piece.set_cloaked(false, reveal);
        log::debug!("Picked slot {index} with color {}", piece.color());

        self.state.picked = Some(index);
        PickOutcome::Picked
    }

    pub fn draw(&self, renderer: &mut dyn Renderer) {
        for piece in self.state.pieces() {
            piece.draw(renderer);
        }
        if let Some(queued) = &self.state.queued {
            queued.draw(renderer);
        }
    }

    fn dispatch_events<L>(&self, events: Vec<BoardEvent>, listener: &mut L)
    where
        L: BoardListener + ?Sized,
    {
        for event in events {
            match event {
                BoardEvent::UnlockedPair => listener.on_unlocked_pair(self),
                BoardEvent::Won => listener.on_win(self),
                BoardEvent::GameOver => listener.on_game_over(self),
            }
        }
    }
}

impl<L: BoardListener + ?Sized> Timeline<L> for Board {
    fn advance(&mut self, listener: &mut L, delta_ms: f64) -> Progress {
        let progress = self.flow.advance(&mut self.state, delta_ms);
        self.state.advance_pieces(delta_ms);

        let events = core::mem::take(&mut self.state.events);
        self.dispatch_events(events, listener);
        progress
    }
}

#[cfg(test)]
impl Board {
    /// A board already waiting for a pick, with `colors` laid out by slot index.
    fn with_pieces(config: BoardConfig, colors: &[Option<ColorId>], queued: ColorId) -> Self {
        let timings = Timings::default();
        let mut state = BoardState::new(config, timings, 99);

        for (index, color) in colors.iter().enumerate() {
            if let Some(color) = *color {
                let piece = Piece::new(color, state.layout.slot_position(index));
                *state.slot_mut(index).unwrap() = Slot::Occupied(piece);
            }
        }
        let mut queued = Piece::new(queued, state.layout.queue_position());
        queued.set_cloaked(false, timings.reveal);
        state.queued = Some(queued);

        Self {
            state,
            flow: GameFlow::awaiting_pick(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f64 = 16.0;

    #[derive(Debug, Default)]
    struct Recorder {
        unlocked: usize,
        wins: usize,
        game_overs: usize,
        occupied_at_unlock: Vec<usize>,
    }

    impl BoardListener for Recorder {
        fn on_unlocked_pair(&mut self, board: &Board) {
            self.unlocked += 1;
            self.occupied_at_unlock.push(board.occupied_count());
        }

        fn on_game_over(&mut self, _board: &Board) {
            self.game_overs += 1;
        }

        fn on_win(&mut self, _board: &Board) {
            self.wins += 1;
        }
    }

    fn populated_board(seed: u64) -> Board {
        let mut board = Board::new(BoardConfig::default(), Timings::default(), seed).unwrap();
        for _ in 0..10_000 {
            if board.phase() != BoardPhase::Populating {
                break;
            }
            board.advance(&mut (), FRAME);
        }
        board
    }

    fn board_4x4(colors: &[Option<ColorId>], queued: ColorId) -> Board {
        let mut padded = colors.to_vec();
        padded.resize(16, None);
        Board::with_pieces(BoardConfig::default(), &padded, queued)
    }

    /// Pick, then run the comparison to its resolution.
    /// Pick, then step whole frames until the comparison has resolved.
    fn resolve_in_frames(board: &mut Board, recorder: &mut Recorder, index: SlotIndex) {
        assert_eq!(board.pick(index), PickOutcome::Picked);
        for _ in 0..1000 {
            if board.phase() == BoardPhase::Resolving {
                return;
            }
            board.advance(recorder, FRAME);
        }
        panic!("comparison never resolved");
    }

    fn pick_and_compare(board: &mut Board, recorder: &mut Recorder, index: SlotIndex) -> Progress {
        assert_eq!(board.pick(index), PickOutcome::Picked);
        board.advance(recorder, 0.0);
        assert_eq!(board.phase(), BoardPhase::Comparing);
        board.advance(recorder, Timings::default().compare)
    }

    #[test]
    fn population_fills_three_quarters_from_the_center() {
        let board = populated_board(1);

        assert_eq!(board.phase(), BoardPhase::AwaitingPick);
        assert_eq!(board.occupied_count(), 12);

        let order = board.layout().placement_order();
        assert!(order[..12].iter().all(|&index| board.piece_at(index).is_some()));
        assert!(order[12..].iter().all(|&index| board.piece_at(index).is_none()));

        for index in 0..board.slot_count() {
            if let Some(piece) = board.piece_at(index) {
                assert!(piece.color() < board.config().num_colors);
            }
        }
    }

    #[test]
    fn first_queued_color_is_on_the_board() {
        for seed in 0..20 {
            let board = populated_board(seed);
            let queued = board.queued_piece().unwrap().color();

            assert!(
                (0..16).any(|index| board.piece_at(index).is_some_and(|p| p.color() == queued)),
                "seed {seed}"
            );
        }
    }

    #[test]
    fn population_waits_for_intro_then_staggers() {
        let mut board = Board::new(BoardConfig::default(), Timings::default(), 3).unwrap();

        board.advance(&mut (), 999.0);
        assert_eq!(board.occupied_count(), 0);
        assert!(board.queued_piece().is_none());

        board.advance(&mut (), 1.0);
        assert_eq!(board.occupied_count(), 1);
        board.advance(&mut (), 50.0);
        assert_eq!(board.occupied_count(), 1);
        board.advance(&mut (), 50.0);
        assert_eq!(board.occupied_count(), 2);
    }

    #[test]
    fn placed_pieces_drop_into_their_slots() {
        let mut board = populated_board(5);
        for _ in 0..100 {
            board.advance(&mut (), FRAME);
        }

        for index in 0..16 {
            if let Some(piece) = board.piece_at(index) {
                assert_eq!(piece.position(), board.layout().slot_position(index));
            }
        }
    }

    #[test]
    fn pick_ignores_invalid_requests() {
        let mut populating = Board::new(BoardConfig::default(), Timings::default(), 0).unwrap();
        assert_eq!(populating.pick(10), PickOutcome::NoChange);

        let mut board = board_4x4(&[Some(1), None, Some(2)], 1);
        assert_eq!(board.pick(1), PickOutcome::NoChange);
        assert_eq!(board.pick(16), PickOutcome::NoChange);
        assert_eq!(board.picked_index(), None);

        assert_eq!(board.pick(2), PickOutcome::Picked);
        assert_eq!(board.pick(0), PickOutcome::NoChange);
        assert_eq!(board.picked_index(), Some(2));
    }

    #[test]
    fn pick_reveals_the_picked_piece() {
        let mut board = board_4x4(&[Some(1), Some(2)], 2);

        board.pick(0);
        board.advance(&mut (), Timings::default().reveal);

        assert_eq!(board.picked_piece().unwrap().cloak_factor(), 0.0);
    }

    #[test]
    fn match_empties_the_picked_slot() {
        let mut board = board_4x4(&[Some(1), Some(2), Some(1)], 1);
        let mut recorder = Recorder::default();

        let progress = pick_and_compare(&mut board, &mut recorder, 0);

        assert_eq!(progress, Progress::Running);
        assert!(board.piece_at(0).is_none());
        assert_eq!(board.occupied_count(), 2);
        assert_eq!(board.picked_index(), None);
        assert_eq!(recorder.unlocked, 1);
        assert_eq!(recorder.occupied_at_unlock, vec![2]);
        assert_eq!(board.phase(), BoardPhase::Resolving);

        // Both 1 and the previous queued color are excluded, leaving 2.
        assert_eq!(board.queued_piece().unwrap().color(), 2);

        board.advance(&mut recorder, Timings::default().settle);
        assert_eq!(board.phase(), BoardPhase::AwaitingPick);
        assert_eq!(recorder.unlocked, 1);
    }

    #[test]
    fn mismatch_moves_queued_piece_to_least_central_free_slot() {
        let mut board = board_4x4(&[None, Some(3), Some(4)], 5);
        let mut recorder = Recorder::default();
        let target = *board.free_slot_order().last().unwrap();

        pick_and_compare(&mut board, &mut recorder, 1);

        let placed = board.piece_at(target).unwrap();
        assert_eq!(placed.color(), 5);
        assert_eq!(board.occupied_count(), 3);
        assert_eq!(board.picked_index(), None);
        assert_eq!(recorder.unlocked, 0);

        // 3 (picked) and 5 (previous queued) are excluded when possible.
        assert_eq!(board.queued_piece().unwrap().color(), 4);

        let timings = Timings::default();
        board.advance(&mut recorder, timings.move_piece.max(timings.cloak));
        let placed = board.piece_at(target).unwrap();
        assert_eq!(placed.position(), board.layout().slot_position(target));
        assert_eq!(placed.cloak_factor(), 1.0);
        assert_eq!(board.piece_at(1).unwrap().cloak_factor(), 1.0);
    }

    #[test]
    fn full_board_mismatch_is_game_over() {
        let mut colors = vec![Some(0); 16];
        colors[7] = Some(1);
        let mut board = board_4x4(&colors, 2);
        let mut recorder = Recorder::default();

        let progress = pick_and_compare(&mut board, &mut recorder, 7);

        assert_eq!(progress, Progress::Done);
        assert_eq!(board.phase(), BoardPhase::GameOver);
        assert_eq!(recorder.game_overs, 1);
        assert_eq!(board.queued_piece().unwrap().color(), 2);

        for _ in 0..100 {
            assert!(board.advance(&mut recorder, FRAME).is_done());
        }
        assert_eq!(recorder.game_overs, 1);
        assert_eq!(board.occupied_count(), 16);
        assert_eq!(board.queued_piece().unwrap().color(), 2);
        assert_eq!(board.pick(0), PickOutcome::NoChange);
    }

    #[test]
    fn last_pair_wins() {
        let mut board = board_4x4(&[Some(4), Some(5)], 4);
        let mut recorder = Recorder::default();

        let progress = pick_and_compare(&mut board, &mut recorder, 0);

        assert_eq!(progress, Progress::Done);
        assert_eq!(board.phase(), BoardPhase::Won);
        assert_eq!(recorder.unlocked, 1);
        assert_eq!(recorder.wins, 1);
        assert_eq!(board.occupied_count(), 1);
        assert_eq!(board.queued_piece().unwrap().color(), 4);

        board.advance(&mut recorder, 10_000.0);
        assert_eq!(recorder.wins, 1);
    }

    #[test]
    fn lone_matching_piece_wins_with_empty_board() {
        let mut board = board_4x4(&[Some(6)], 6);
        let mut recorder = Recorder::default();

        let progress = pick_and_compare(&mut board, &mut recorder, 0);

        assert_eq!(progress, Progress::Done);
        assert_eq!(board.phase(), BoardPhase::Won);
        assert_eq!(recorder.unlocked, 1);
        assert_eq!(recorder.wins, 1);
        assert_eq!(board.occupied_count(), 0);

        // Still the revealed original, not a fresh hidden one.
        let queued = board.queued_piece().unwrap();
        assert_eq!(queued.color(), 6);
        assert_eq!(queued.cloak_factor(), 0.0);

        board.advance(&mut recorder, 10_000.0);
        assert_eq!(recorder.wins, 1);
    }

    #[test]
    fn picked_piece_finishes_its_drop() {
        let mut board = populated_board(1);
        let index = board.layout().placement_order()[11];
        let target = board.layout().slot_position(index);
        assert!(board.piece_at(index).unwrap().position().z > 0.0);

        assert_eq!(board.pick(index), PickOutcome::Picked);
        for _ in 0..50 {
            board.advance(&mut (), FRAME);
        }

        assert_eq!(board.phase(), BoardPhase::Comparing);
        let piece = board.piece_at(index).unwrap();
        assert_eq!(piece.position(), target);
        assert_eq!(piece.cloak_factor(), 0.0);
    }

    #[test]
    fn requeued_piece_stays_hidden_while_board_settles() {
        let timings = Timings::default();
        let reveal_frames = (timings.reveal / FRAME).ceil() as usize;
        let cases = [
            ([Some(1), Some(2), Some(1)], 1),
            ([Some(3), Some(4), None], 5),
        ];

        for (colors, queued) in cases {
            let mut board = board_4x4(&colors, queued);
            let mut recorder = Recorder::default();
            resolve_in_frames(&mut board, &mut recorder, 0);

            for _ in 0..reveal_frames {
                board.advance(&mut recorder, FRAME);
            }
            let requeued = board.queued_piece().unwrap();
            assert_eq!(requeued.position(), board.layout().queue_position());
            assert_eq!(requeued.cloak_factor(), 1.0, "queued {queued}");

            for _ in 0..50 {
                board.advance(&mut recorder, FRAME);
            }
            assert_eq!(board.queued_piece().unwrap().cloak_factor(), 0.0, "queued {queued}");
        }
    }

    #[test]
    fn untouched_queued_piece_hides_itself() {
        let mut board = populated_board(11);
        let timings = Timings::default();

        board.advance(&mut (), timings.reveal);
        assert_eq!(board.queued_piece().unwrap().cloak_factor(), 0.0);

        board.advance(&mut (), timings.queue_hide_after);
        board.advance(&mut (), timings.cloak);
        assert_eq!(board.queued_piece().unwrap().cloak_factor(), 1.0);
    }

    #[test]
    fn same_seed_replays_identically() {
        let a = populated_board(42);
        let b = populated_board(42);

        assert_eq!(BoardSnapshot::from_board(&a), BoardSnapshot::from_board(&b));
        assert_eq!(a.free_slot_order(), b.free_slot_order());
        assert_eq!(a.free_slot_order(), a.free_slot_order());
    }

    #[test]
    fn draw_covers_board_and_queued_pieces() {
        let mut board = board_4x4(&[Some(1), Some(2), None, Some(3)], 1);
        board.advance(&mut (), Timings::default().reveal / 2.0);
        let mut list = DrawList::new();

        board.draw(&mut list);

        // Three hidden board pieces, plus the queued piece mid-reveal.
        assert_eq!(list.cloak_count(), 4);
        assert_eq!(list.revealed_count(), 1);
    }
}
