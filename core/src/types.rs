use core::ops::{Add, Mul, Neg, Sub};
use serde::{Deserialize, Serialize};

/// Palette slot identifying the hidden color of a piece.
pub type ColorId = u8;

/// Linear index into the board grid, `x + y * width`.
pub type SlotIndex = usize;

/// Linear interpolation that lands exactly on both endpoints.
pub fn lerp(from: f64, to: f64, factor: f64) -> f64 {
    from * (1.0 - factor) + to * factor
}

/// Two-dimensional coordinates, used for grid positions.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Coord2 {
    pub x: f64,
    pub y: f64,
}

impl Coord2 {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector in the same direction, or zero for a zero vector.
    pub fn normalized(self) -> Self {
        let length = self.length();
        if length > 0.0 {
            self.scaled(1.0 / length)
        } else {
            Self::ZERO
        }
    }

    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }

    /// Angle of the vector in radians, measured from the positive x axis.
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    pub fn lerp(self, to: Self, factor: f64) -> Self {
        Self::new(lerp(self.x, to.x, factor), lerp(self.y, to.y, factor))
    }
}

impl Add for Coord2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Coord2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Coord2 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        self.scaled(rhs)
    }
}

impl Neg for Coord2 {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.scaled(-1.0)
    }
}

/// Three-dimensional coordinates, used for world-space piece positions.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Coord3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Coord3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit vector in the same direction, or zero for a zero vector.
    pub fn normalized(self) -> Self {
        let length = self.length();
        if length > 0.0 {
            self.scaled(1.0 / length)
        } else {
            Self::ZERO
        }
    }

    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }

    pub fn lerp(self, to: Self, factor: f64) -> Self {
        Self::new(
            lerp(self.x, to.x, factor),
            lerp(self.y, to.y, factor),
            lerp(self.z, to.z, factor),
        )
    }
}

impl Add for Coord3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Coord3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Coord3 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        self.scaled(rhs)
    }
}

impl Neg for Coord3 {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.scaled(-1.0)
    }
}

impl From<Coord2> for Coord3 {
    fn from(coord: Coord2) -> Self {
        Self::new(coord.x, coord.y, 0.0)
    }
}
