use alloc::format;

use crate::{
    access::{AffineStride, TileAccessConfig},
    coords::{
        AdvanceRank, Index, LongIndex, MatrixAxis, MatrixCoord, MatrixShape, PitchLinearCoord,
        PitchLinearShape, TensorExtent,
    },
    element::Element,
    error::TileSetupError,
    layout::MatrixLayout,
    thread_map::ThreadMap,
};

/// Column-major storage where groups of `K` columns are interleaved, so that the `K`
/// elements of a row within a group are contiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnMajorInterleaved<const K: u32> {
    /// Elements between two consecutive column groups.
    pub leading_dimension: LongIndex,
}

impl<const K: u32> ColumnMajorInterleaved<K> {
    pub fn new(leading_dimension: LongIndex) -> Self {
        Self { leading_dimension }
    }
}

impl<const K: u32> MatrixLayout for ColumnMajorInterleaved<K> {
    fn stride(&self) -> AffineStride {
        AffineStride::pitch_linear(self.leading_dimension)
    }

    fn advance_rank(axis: MatrixAxis) -> AdvanceRank {
        match axis {
            MatrixAxis::Row => AdvanceRank::Contiguous,
            MatrixAxis::Column => AdvanceRank::Strided,
        }
    }

    fn shape(shape: MatrixShape) -> PitchLinearShape {
        PitchLinearShape::new(shape.rows * K, shape.columns / K)
    }

    fn to_pitch_linear(coord: MatrixCoord) -> PitchLinearCoord {
        let k = K as Index;
        PitchLinearCoord::new(coord.row * k + coord.column % k, coord.column / k)
    }

    fn to_matrix(coord: PitchLinearCoord) -> MatrixCoord {
        let k = K as Index;
        MatrixCoord::new(coord.contiguous / k, coord.strided * k + coord.contiguous % k)
    }

    /// Only whole column groups are covered, a trailing partial group is dropped.
    fn extent(extent: MatrixCoord) -> TensorExtent {
        let k = K as Index;
        TensorExtent::new(extent.row * k, extent.column / k)
    }

    fn check_extent(extent: MatrixCoord) -> Result<(), TileSetupError> {
        check_interleave(K, extent.column as u32, "matrix columns")
    }

    fn tile_offset(tile_offset: MatrixCoord) -> PitchLinearCoord {
        PitchLinearCoord::new(tile_offset.row, tile_offset.column)
    }

    fn tile_config<E: Element, TM: ThreadMap>(
        shape: MatrixShape,
        axis: MatrixAxis,
        thread_map: TM,
        access_elements: u32,
    ) -> Result<TileAccessConfig<E, TM>, TileSetupError> {
        check_interleave(K, shape.columns, "tile columns")?;
        TileAccessConfig::new(Self::shape(shape), Self::advance_rank(axis), thread_map, access_elements)
    }
}

/// Row-major storage where groups of `K` rows are interleaved, so that the `K` elements
/// of a column within a group are contiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowMajorInterleaved<const K: u32> {
    /// Elements between two consecutive row groups.
    pub leading_dimension: LongIndex,
}

impl<const K: u32> RowMajorInterleaved<K> {
    pub fn new(leading_dimension: LongIndex) -> Self {
        Self { leading_dimension }
    }
}

impl<const K: u32> MatrixLayout for RowMajorInterleaved<K> {
    fn stride(&self) -> AffineStride {
        AffineStride::pitch_linear(self.leading_dimension)
    }

    fn advance_rank(axis: MatrixAxis) -> AdvanceRank {
        match axis {
            MatrixAxis::Row => AdvanceRank::Strided,
            MatrixAxis::Column => AdvanceRank::Contiguous,
        }
    }

    fn shape(shape: MatrixShape) -> PitchLinearShape {
        PitchLinearShape::new(shape.columns * K, shape.rows / K)
    }

    fn to_pitch_linear(coord: MatrixCoord) -> PitchLinearCoord {
        let k = K as Index;
        PitchLinearCoord::new(coord.column * k + coord.row % k, coord.row / k)
    }

    fn to_matrix(coord: PitchLinearCoord) -> MatrixCoord {
        let k = K as Index;
        MatrixCoord::new(coord.strided * k + coord.contiguous % k, coord.contiguous / k)
    }

    /// Only whole row groups are covered, a trailing partial group is dropped.
    fn extent(extent: MatrixCoord) -> TensorExtent {
        let k = K as Index;
        TensorExtent::new(extent.column * k, extent.row / k)
    }

    fn check_extent(extent: MatrixCoord) -> Result<(), TileSetupError> {
        check_interleave(K, extent.row as u32, "matrix rows")
    }

    fn tile_offset(tile_offset: MatrixCoord) -> PitchLinearCoord {
        PitchLinearCoord::new(tile_offset.column, tile_offset.row)
    }

    fn tile_config<E: Element, TM: ThreadMap>(
        shape: MatrixShape,
        axis: MatrixAxis,
        thread_map: TM,
        access_elements: u32,
    ) -> Result<TileAccessConfig<E, TM>, TileSetupError> {
        check_interleave(K, shape.rows, "tile rows")?;
        TileAccessConfig::new(Self::shape(shape), Self::advance_rank(axis), thread_map, access_elements)
    }
}

fn check_interleave(k: u32, size: u32, axis: &str) -> Result<(), TileSetupError> {
    if k == 0 || size % k != 0 {
        return Err(TileSetupError::InvalidConfig(format!(
            "{size} {axis} cannot be interleaved by {k}"
        )));
    }
    Ok(())
}
