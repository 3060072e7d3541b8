use crate::{
    access::AffineStride,
    coords::{AdvanceRank, LongIndex, MatrixAxis, MatrixCoord, MatrixShape, PitchLinearCoord, PitchLinearShape},
    layout::{ColumnMajor, MatrixLayout, RowMajor},
};

/// Column-major orientation with arbitrary row and column strides.
#[derive(new, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AffineRank2ColumnMajor {
    pub row_stride: LongIndex,
    pub column_stride: LongIndex,
}

impl MatrixLayout for AffineRank2ColumnMajor {
    fn stride(&self) -> AffineStride {
        AffineStride::new(self.row_stride, self.column_stride)
    }

    fn advance_rank(axis: MatrixAxis) -> AdvanceRank {
        ColumnMajor::advance_rank(axis)
    }

    fn shape(shape: MatrixShape) -> PitchLinearShape {
        ColumnMajor::shape(shape)
    }

    fn to_pitch_linear(coord: MatrixCoord) -> PitchLinearCoord {
        ColumnMajor::to_pitch_linear(coord)
    }

    fn to_matrix(coord: PitchLinearCoord) -> MatrixCoord {
        ColumnMajor::to_matrix(coord)
    }
}

/// Row-major orientation with arbitrary row and column strides.
#[derive(new, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AffineRank2RowMajor {
    pub row_stride: LongIndex,
    pub column_stride: LongIndex,
}

impl MatrixLayout for AffineRank2RowMajor {
    fn stride(&self) -> AffineStride {
        AffineStride::new(self.column_stride, self.row_stride)
    }

    fn advance_rank(axis: MatrixAxis) -> AdvanceRank {
        RowMajor::advance_rank(axis)
    }

    fn shape(shape: MatrixShape) -> PitchLinearShape {
        RowMajor::shape(shape)
    }

    fn to_pitch_linear(coord: MatrixCoord) -> PitchLinearCoord {
        RowMajor::to_pitch_linear(coord)
    }

    fn to_matrix(coord: PitchLinearCoord) -> MatrixCoord {
        RowMajor::to_matrix(coord)
    }
}
