use serde::{Deserialize, Serialize};

use crate::*;

/// Added to the grid center before measuring, so no two slots are equidistant.
const CENTER_OFFSET: Coord2 = Coord2::new(0.167, 0.017);

/// Maps slot indices to grid coordinates and world-space positions.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    width: u8,
    height: u8,
    spacing: f64,
    drop_height: f64,
}

impl GridLayout {
    pub fn new(config: &BoardConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            spacing: config.spacing,
            drop_height: config.drop_height,
        }
    }

    pub const fn width(&self) -> u8 {
        self.width
    }

    pub const fn height(&self) -> u8 {
        self.height
    }

    pub const fn slot_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// `(x, y)` of a slot, `None` when out of range.
    pub fn index_to_xy(&self, index: SlotIndex) -> Option<(usize, usize)> {
        let width = usize::from(self.width);
        (index < self.slot_count()).then(|| (index % width, index / width))
    }

    pub fn xy_to_index(&self, x: usize, y: usize) -> Option<SlotIndex> {
        let (width, height) = (usize::from(self.width), usize::from(self.height));
        (x < width && y < height).then(|| x + y * width)
    }

    pub fn index_to_coord(&self, index: SlotIndex) -> Option<Coord2> {
        self.index_to_xy(index).map(|(x, y)| Coord2::new(x as f64, y as f64))
    }

    pub fn coord_to_index(&self, coord: Coord2) -> Option<SlotIndex> {
        if coord.x < 0.0 || coord.y < 0.0 {
            return None;
        }
        self.xy_to_index(coord.x as usize, coord.y as usize)
    }

    /// Geometric center of the grid, in grid coordinates.
    pub fn center(&self) -> Coord2 {
        Coord2::new(
            (f64::from(self.width) - 1.0) / 2.0,
            (f64::from(self.height) - 1.0) / 2.0,
        )
    }

    /// Every slot index, most central first.
    ///
    /// Computed fresh on each call. Slots are ordered by distance from the
    /// offset center, then by angle around it, then by index, which is a total
    /// order for any grid size.
    pub fn placement_order(&self) -> Vec<SlotIndex> {
        let center = self.center() + CENTER_OFFSET;
        let mut keyed: Vec<(f64, f64, SlotIndex)> = (0..self.slot_count())
            .filter_map(|index| {
                let offset = self.index_to_coord(index)? - center;
                Some((offset.length(), offset.angle(), index))
            })
            .collect();

        keyed.sort_by(|a, b| {
            a.0.total_cmp(&b.0)
                .then(a.1.total_cmp(&b.1))
                .then(a.2.cmp(&b.2))
        });
        keyed.into_iter().map(|(_, _, index)| index).collect()
    }

    /// World-space center of a slot; the grid is centered on the origin with row 0 on top.
    pub fn slot_position(&self, index: SlotIndex) -> Coord3 {
        let coord = self.index_to_coord(index).unwrap_or(Coord2::ZERO);
        let offset = coord - self.center();
        Coord3::new(offset.x * self.spacing, -offset.y * self.spacing, 0.0)
    }

    /// Where a newly placed piece starts its drop into `index`.
    pub fn spawn_position(&self, index: SlotIndex) -> Coord3 {
        self.slot_position(index) + Coord3::new(0.0, 0.0, self.drop_height)
    }

    /// Home of the queued piece, centered above the top row.
    pub fn queue_position(&self) -> Coord3 {
        let top = (f64::from(self.height) - 1.0) / 2.0;
        Coord3::new(0.0, (top + 1.5) * self.spacing, 0.0)
    }
}
