use serde::{Deserialize, Serialize};

use crate::{
    access::TileAccessDesc,
    coords::{AdvanceRank, LongIndex, PitchLinearCoord},
};

/// Strides of a rank-2 affine tensor, in elements.
///
/// A pitch-linear tensor is the special case `contiguous == 1`, with `strided` being the
/// leading dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AffineStride {
    pub contiguous: LongIndex,
    pub strided: LongIndex,
}

impl AffineStride {
    pub const fn new(contiguous: LongIndex, strided: LongIndex) -> Self {
        Self {
            contiguous,
            strided,
        }
    }

    pub const fn pitch_linear(leading_dimension: LongIndex) -> Self {
        Self::new(1, leading_dimension)
    }

    /// Element offset of a coordinate.
    pub fn offset(&self, coord: PitchLinearCoord) -> LongIndex {
        coord.contiguous as LongIndex * self.contiguous + coord.strided as LongIndex * self.strided
    }
}

/// Precomputed byte increments between successive accesses and tiles.
///
/// Built once per tensor shape; every iterator over that tensor holds a copy, so that
/// stepping through a tile costs one addition per access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileAccessParams {
    /// Stride of the tensor, in elements.
    pub stride: AffineStride,
    /// Bits of one element.
    pub element_bits: u32,
    /// From one access of a vector to the next.
    pub inc_vector: LongIndex,
    /// From one vector to the next along the contiguous axis.
    pub inc_contiguous: LongIndex,
    /// From the first vector of a strided iteration to the first vector of the next one.
    pub inc_strided: LongIndex,
    /// From the last vector of a strided iteration to the first vector of the next one.
    pub inc_next_strided: LongIndex,
    /// From the last access of a tile to the first access of the next tile.
    pub inc_next: LongIndex,
    /// From the first access of a tile to the first access of the next tile.
    pub inc_advance: LongIndex,
}

impl TileAccessParams {
    pub fn new(stride: AffineStride, desc: TileAccessDesc) -> Self {
        let bytes = |elements: LongIndex| elements * desc.element_bits as LongIndex / 8;

        let iterations = desc.threadmap_iterations;
        let delta = desc.threadmap_delta;
        let shape = desc.threadblock_shape;

        let inc_contiguous = bytes(stride.contiguous * delta.contiguous as LongIndex);
        let inc_strided = bytes(stride.strided * delta.strided as LongIndex);
        let inc_next_strided =
            inc_strided - (iterations.contiguous as LongIndex - 1) * inc_contiguous;

        let inc_advance = match desc.advance_rank {
            AdvanceRank::Strided => bytes(shape.strided as LongIndex * stride.strided),
            AdvanceRank::Contiguous => bytes(shape.contiguous as LongIndex * stride.contiguous),
        };

        let inc_next = inc_advance
            - (iterations.contiguous as LongIndex - 1) * inc_contiguous
            - (iterations.strided as LongIndex - 1) * inc_strided;

        Self {
            stride,
            element_bits: desc.element_bits,
            inc_vector: bytes(desc.access_elements as LongIndex * stride.contiguous),
            inc_contiguous,
            inc_strided,
            inc_next_strided,
            inc_next,
            inc_advance,
        }
    }

    /// Params for a pitch-linear tensor with the given leading dimension.
    pub fn pitch_linear(leading_dimension: LongIndex, desc: TileAccessDesc) -> Self {
        Self::new(AffineStride::pitch_linear(leading_dimension), desc)
    }

    /// Byte size of a number of elements.
    pub fn bytes(&self, elements: LongIndex) -> LongIndex {
        elements * self.element_bits as LongIndex / 8
    }

    /// Byte offset of a coordinate.
    pub fn byte_offset(&self, coord: PitchLinearCoord) -> LongIndex {
        self.bytes(self.stride.offset(coord))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::PitchLinearShape;
    use pretty_assertions::assert_eq;

    fn desc(rank: AdvanceRank) -> TileAccessDesc {
        TileAccessDesc {
            element_bits: 16,
            advance_rank: rank,
            threadblock_shape: PitchLinearShape::new(64, 32),
            threadmap_iterations: PitchLinearShape::new(2, 4),
            threadmap_delta: PitchLinearShape::new(32, 8),
            access_elements: 4,
        }
    }

    #[test]
    fn pitch_linear_increments_along_strided() {
        let params = TileAccessParams::pitch_linear(100, desc(AdvanceRank::Strided));

        assert_eq!(params.inc_contiguous, 64);
        assert_eq!(params.inc_strided, 1600);
        assert_eq!(params.inc_next_strided, 1600 - 64);
        assert_eq!(params.inc_advance, 32 * 100 * 2);
        assert_eq!(params.inc_next, 6400 - 64 - 3 * 1600);
    }

    #[test]
    fn pitch_linear_increments_along_contiguous() {
        let params = TileAccessParams::pitch_linear(100, desc(AdvanceRank::Contiguous));

        assert_eq!(params.inc_advance, 128);
        assert_eq!(params.inc_next, 128 - 64 - 3 * 1600);
    }

    #[test]
    fn affine_offset_uses_both_strides() {
        let stride = AffineStride::new(3, 50);
        let params = TileAccessParams::new(stride, desc(AdvanceRank::Strided));

        assert_eq!(stride.offset(PitchLinearCoord::new(2, 1)), 56);
        assert_eq!(params.byte_offset(PitchLinearCoord::new(2, 1)), 112);
        assert_eq!(params.inc_vector, 24);
        assert_eq!(params.inc_contiguous, 3 * 32 * 2);
    }
}
