use crate::{
    access::{AffineStride, TileAccessDesc, TileAccessParams},
    coords::{AdvanceRank, LongIndex, MatrixAxis, MatrixCoord, MatrixShape, PitchLinearCoord, PitchLinearShape},
    layout::MatrixLayout,
};

/// Pitch-linear storage, used directly by the canonical iterator.
#[derive(new, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PitchLinear {
    /// Elements between two consecutive strided positions.
    pub leading_dimension: LongIndex,
}

impl PitchLinear {
    pub fn stride(&self) -> AffineStride {
        AffineStride::pitch_linear(self.leading_dimension)
    }

    pub fn params(&self, desc: TileAccessDesc) -> TileAccessParams {
        TileAccessParams::new(self.stride(), desc)
    }
}

/// Column-major storage: rows are contiguous.
#[derive(new, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnMajor {
    /// Elements between two consecutive columns.
    pub leading_dimension: LongIndex,
}

impl MatrixLayout for ColumnMajor {
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
        PitchLinearShape::new(shape.rows, shape.columns)
    }

    fn to_pitch_linear(coord: MatrixCoord) -> PitchLinearCoord {
        PitchLinearCoord::new(coord.row, coord.column)
    }

    fn to_matrix(coord: PitchLinearCoord) -> MatrixCoord {
        MatrixCoord::new(coord.contiguous, coord.strided)
    }
}

/// Row-major storage: columns are contiguous.
#[derive(new, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowMajor {
    /// Elements between two consecutive rows.
    pub leading_dimension: LongIndex,
}

impl MatrixLayout for RowMajor {
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
        PitchLinearShape::new(shape.columns, shape.rows)
    }

    fn to_pitch_linear(coord: MatrixCoord) -> PitchLinearCoord {
        PitchLinearCoord::new(coord.column, coord.row)
    }

    fn to_matrix(coord: PitchLinearCoord) -> MatrixCoord {
        MatrixCoord::new(coord.strided, coord.contiguous)
    }
}
