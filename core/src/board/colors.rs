use rand::prelude::*;
use smallvec::SmallVec;

use crate::*;

pub(crate) type ColorSet = SmallVec<[ColorId; 16]>;

/// Distinct colors of `pieces`, sorted so sampling only depends on the rng.
pub(crate) fn present_colors<'a>(pieces: impl IntoIterator<Item = &'a Piece>) -> ColorSet {
    let mut colors: ColorSet = pieces.into_iter().map(Piece::color).collect();
    colors.sort_unstable();
    colors.dedup();
    colors
}

pub(crate) fn random_palette_color(rng: &mut impl Rng, num_colors: u8) -> ColorId {
    rng.random_range(0..num_colors.max(1))
}

/// Picks one of `present`, avoiding `exclude` unless that leaves nothing.
///
/// `None` only when `present` is empty.
pub(crate) fn choose_color(
    rng: &mut impl Rng,
    present: &[ColorId],
    exclude: &[ColorId],
) -> Option<ColorId> {
    let preferred: ColorSet = present
        .iter()
        .copied()
        .filter(|color| !exclude.contains(color))
        .collect();

    let candidates = if preferred.is_empty() {
        log::trace!("Every present color is excluded, falling back to {present:?}");
        present
    } else {
        preferred.as_slice()
    };
    candidates.choose(rng).copied()
}
