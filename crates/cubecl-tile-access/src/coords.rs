use derive_more::{Add, AddAssign, Display, Sub, SubAssign};
use serde::{Deserialize, Serialize};

/// Index type used for logical coordinates.
pub type Index = i32;
/// Long index type used for strides and offsets, which may not fit in 32 bits.
pub type LongIndex = i64;

/// Logical coordinate in a pitch-linear tensor.
///
/// The contiguous axis is the one with unit stride in memory, the strided axis
/// is the one separated by the leading dimension.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Add,
    AddAssign,
    Sub,
    SubAssign,
    Display,
    Serialize,
    Deserialize,
)]
#[display("({contiguous}, {strided})")]
pub struct PitchLinearCoord {
    pub contiguous: Index,
    pub strided: Index,
}

/// Extent of a pitch-linear tensor, in elements along each axis.
pub type TensorExtent = PitchLinearCoord;

impl PitchLinearCoord {
    pub const ORIGIN: Self = Self::new(0, 0);

    pub const fn new(contiguous: Index, strided: Index) -> Self {
        Self {
            contiguous,
            strided,
        }
    }

    /// Component along the given rank.
    pub fn at(&self, rank: AdvanceRank) -> Index {
        match rank {
            AdvanceRank::Contiguous => self.contiguous,
            AdvanceRank::Strided => self.strided,
        }
    }

    /// Mutable component along the given rank.
    pub fn at_mut(&mut self, rank: AdvanceRank) -> &mut Index {
        match rank {
            AdvanceRank::Contiguous => &mut self.contiguous,
            AdvanceRank::Strided => &mut self.strided,
        }
    }

    /// Component-wise product with a shape.
    pub fn scaled(&self, shape: PitchLinearShape) -> Self {
        Self::new(
            self.contiguous * shape.contiguous as Index,
            self.strided * shape.strided as Index,
        )
    }

    /// Whether the coordinate lies in `[0, extent.contiguous) x [0, extent.strided)`.
    pub fn is_within(&self, extent: TensorExtent) -> bool {
        self.contiguous >= 0
            && self.strided >= 0
            && self.contiguous < extent.contiguous
            && self.strided < extent.strided
    }
}

/// Static shape of a pitch-linear tile or access pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[display("{contiguous}x{strided}")]
pub struct PitchLinearShape {
    pub contiguous: u32,
    pub strided: u32,
}

impl PitchLinearShape {
    pub const fn new(contiguous: u32, strided: u32) -> Self {
        Self {
            contiguous,
            strided,
        }
    }

    /// Number of points in the shape.
    pub const fn count(&self) -> u32 {
        self.contiguous * self.strided
    }

    pub fn at(&self, rank: AdvanceRank) -> u32 {
        match rank {
            AdvanceRank::Contiguous => self.contiguous,
            AdvanceRank::Strided => self.strided,
        }
    }
}

/// Axis along which successive tile-to-tile jumps are taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdvanceRank {
    /// Rank 0.
    Contiguous,
    /// Rank 1.
    Strided,
}

impl AdvanceRank {
    /// The other axis, which is the only one checked in steady state.
    pub fn other(self) -> Self {
        match self {
            AdvanceRank::Contiguous => AdvanceRank::Strided,
            AdvanceRank::Strided => AdvanceRank::Contiguous,
        }
    }

    /// Unit tile step along this rank.
    pub fn unit(self) -> PitchLinearCoord {
        match self {
            AdvanceRank::Contiguous => PitchLinearCoord::new(1, 0),
            AdvanceRank::Strided => PitchLinearCoord::new(0, 1),
        }
    }
}

/// Logical matrix coordinate.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Add,
    AddAssign,
    Sub,
    SubAssign,
    Display,
    Serialize,
    Deserialize,
)]
#[display("[{row}, {column}]")]
pub struct MatrixCoord {
    pub row: Index,
    pub column: Index,
}

impl MatrixCoord {
    pub const ORIGIN: Self = Self::new(0, 0);

    pub const fn new(row: Index, column: Index) -> Self {
        Self { row, column }
    }
}

/// Static shape of a matrix tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[display("{rows}x{columns}")]
pub struct MatrixShape {
    pub rows: u32,
    pub columns: u32,
}

impl MatrixShape {
    pub const fn new(rows: u32, columns: u32) -> Self {
        Self { rows, columns }
    }
}

/// Matrix axis along which a matrix-level iterator advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatrixAxis {
    Row,
    Column,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coords_are_component_wise() {
        let a = PitchLinearCoord::new(3, 4);
        let b = PitchLinearCoord::new(1, 2);

        assert_eq!(a + b, PitchLinearCoord::new(4, 6));
        assert_eq!(a - b, PitchLinearCoord::new(2, 2));
        assert_eq!(a.scaled(PitchLinearShape::new(8, 2)), PitchLinearCoord::new(24, 8));
        assert_eq!(a.to_string(), "(3, 4)");
    }

    #[test]
    fn within_extent_is_half_open() {
        let extent = TensorExtent::new(4, 2);

        assert!(PitchLinearCoord::new(3, 1).is_within(extent));
        assert!(!PitchLinearCoord::new(4, 1).is_within(extent));
        assert!(!PitchLinearCoord::new(0, 2).is_within(extent));
        assert!(!PitchLinearCoord::new(-1, 0).is_within(extent));
    }
}
