use core::fmt::Debug;

use crate::coords::{Index, LongIndex, PitchLinearCoord, TensorExtent};

/// Maps a pitch-linear coordinate to an element offset that is not affine in the
/// coordinate.
pub trait Permute: Clone + Debug {
    /// Element offset of `coord`.
    fn offset(&self, coord: PitchLinearCoord) -> LongIndex;
}

/// How the iterator turns its cursor into an address, chosen once at construction.
#[derive(Debug, Clone)]
pub enum Addressing<'a, P: Permute = NoPermute> {
    /// Pointer arithmetic with precomputed increments.
    Direct,
    /// Strided coordinates are looked up in an index array, e.g. gathered rows.
    Gathered(&'a [Index]),
    /// Coordinates go through a permutation function.
    Permuted(P),
}

impl<'a> Addressing<'a, NoPermute> {
    pub fn direct() -> Self {
        Addressing::Direct
    }

    /// Strided coordinates are looked up in `indices`.
    pub fn gathered(indices: &'a [Index]) -> Self {
        Addressing::Gathered(indices)
    }
}

impl<P: Permute> Addressing<'_, P> {
    /// Whether the address is affine in the cursor.
    pub fn is_direct(&self) -> bool {
        matches!(self, Addressing::Direct)
    }
}

/// Identity permutation of a pitch-linear tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoPermute {
    stride: LongIndex,
}

impl NoPermute {
    pub fn new(stride: LongIndex) -> Self {
        Self { stride }
    }
}

impl Permute for NoPermute {
    fn offset(&self, coord: PitchLinearCoord) -> LongIndex {
        coord.strided as LongIndex * self.stride + coord.contiguous as LongIndex
    }
}

/// Caller-supplied permutation function, invoked once per resolved address.
#[derive(Clone)]
pub struct FnPermute<F>(pub F);

impl<F> Debug for FnPermute<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("FnPermute")
    }
}

impl<F> Permute for FnPermute<F>
where
    F: Fn(PitchLinearCoord) -> LongIndex + Clone,
{
    fn offset(&self, coord: PitchLinearCoord) -> LongIndex {
        (self.0)(coord)
    }
}

/// Row-major `[M, N]` matrix viewed as `[M / D1, D1, D2, N / D2]` and permuted by
/// `[0, 2, 1, 3]`.
///
/// The strided axis is the row, the contiguous axis the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tensor4DPermute0213 {
    d1: Index,
    d2: Index,
    d3: Index,
    stride: LongIndex,
}

impl Tensor4DPermute0213 {
    pub fn new(d1: Index, d2: Index, extent: TensorExtent, stride: LongIndex) -> Self {
        Self {
            d1,
            d2,
            d3: extent.contiguous / d2,
            stride: stride * d1 as LongIndex / d2 as LongIndex,
        }
    }
}

impl Permute for Tensor4DPermute0213 {
    fn offset(&self, coord: PitchLinearCoord) -> LongIndex {
        // [i, j, k, l] -> [i, k, j, l]
        let l = coord.contiguous % self.d3;
        let k = coord.contiguous / self.d3;
        let j = coord.strided % self.d1;
        let i = coord.strided / self.d1;

        let row = k + i * self.d2;
        let column = l + j * self.d3;
        row as LongIndex * self.stride + column as LongIndex
    }
}

/// Inverse of [Tensor4DPermute0213]: the coordinates address the permuted tensor and
/// the offsets land in the original one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InverseTensor4DPermute0213 {
    d1: Index,
    d2: Index,
    d3: Index,
    stride: LongIndex,
}

impl InverseTensor4DPermute0213 {
    /// `extent` and `stride` describe the permuted tensor.
    pub fn new(d1: Index, d2: Index, extent: TensorExtent, stride: LongIndex) -> Self {
        Self {
            d1,
            d2,
            d3: extent.contiguous / d1,
            stride: stride * d2 as LongIndex / d1 as LongIndex,
        }
    }
}

impl Permute for InverseTensor4DPermute0213 {
    fn offset(&self, coord: PitchLinearCoord) -> LongIndex {
        // [i, k, j, l] -> [i, j, k, l]
        let l = coord.contiguous % self.d3;
        let j = coord.contiguous / self.d3;
        let k = coord.strided % self.d2;
        let i = coord.strided / self.d2;

        let row = j + i * self.d1;
        let column = l + k * self.d3;
        row as LongIndex * self.stride + column as LongIndex
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permute_0213_moves_inner_blocks() {
        // [M, N] = [4, 6] as [2, 2, 3, 2], permuted to [2, 3, 2, 2] stored as [6, 4].
        let permute = Tensor4DPermute0213::new(2, 3, TensorExtent::new(6, 4), 6);

        // Row 1, column 2: i = 0, j = 1, k = 1, l = 0 -> permuted [0, 1, 1, 0].
        assert_eq!(permute.offset(PitchLinearCoord::new(2, 1)), 4 + 2);
        assert_eq!(permute.offset(PitchLinearCoord::new(0, 0)), 0);
    }

    #[test]
    fn inverse_undoes_permute_0213() {
        let (rows, columns) = (4, 6);
        let forward = Tensor4DPermute0213::new(2, 3, TensorExtent::new(columns, rows), columns as LongIndex);
        // Permuted tensor is [6, 4].
        let inverse = InverseTensor4DPermute0213::new(2, 3, TensorExtent::new(4, 6), 4);

        for row in 0..rows {
            for column in 0..columns {
                let permuted = forward.offset(PitchLinearCoord::new(column, row));
                let coord = PitchLinearCoord::new((permuted % 4) as Index, (permuted / 4) as Index);
                assert_eq!(
                    inverse.offset(coord),
                    (row * columns + column) as LongIndex
                );
            }
        }
    }

    #[test]
    fn fn_permute_calls_the_closure() {
        let permute = FnPermute(|coord: PitchLinearCoord| {
            coord.contiguous as LongIndex * 10 + coord.strided as LongIndex
        });

        assert_eq!(permute.offset(PitchLinearCoord::new(3, 1)), 31);
        assert_eq!(NoPermute::new(8).offset(PitchLinearCoord::new(3, 1)), 11);
    }
}
