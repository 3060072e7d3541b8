use alloc::string::String;

use thiserror::Error;

use crate::coords::{Index, PitchLinearCoord, PitchLinearShape};

/// Errors that can occur while setting up a tile access configuration.
///
/// All geometry is checked once when the configuration is built. Iterators built from a
/// validated configuration never check it again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TileSetupError {
    /// The thread map cannot distribute the tile over its threads.
    #[error("Invalid thread map: {reason}")]
    InvalidThreadMap { reason: String },

    /// The vector implied by the thread map cannot be split into accesses.
    #[error(
        "Vectors implied by the thread map ({elements_per_access} elements) must be divisible by the access width ({access_elements} elements)"
    )]
    IndivisibleVector {
        elements_per_access: u32,
        access_elements: u32,
    },

    /// An access is not a whole number of bytes.
    #[error("An access of {access_elements} elements of {element_bits} bits is not byte aligned")]
    SubByteAccess {
        access_elements: u32,
        element_bits: u32,
    },

    /// More predicates than fit in the fixed predicate word array.
    #[error("Too many predicates: {count} requested, at most {max} supported")]
    TooManyPredicates { count: u32, max: u32 },

    /// The thread map does not cover the tile shape.
    #[error("Thread map covers {thread_map} but the tile is {tile}")]
    ShapeMismatch {
        tile: PitchLinearShape,
        thread_map: PitchLinearShape,
    },

    /// A thread of the thread map starts or ends outside the tile.
    #[error("Thread {thread} accesses {first} to {last}, outside the {tile} tile")]
    ThreadOutsideTile {
        thread: u32,
        first: PitchLinearCoord,
        last: PitchLinearCoord,
        tile: PitchLinearShape,
    },

    /// The contiguous extent of a tensor is not a whole number of accesses.
    #[error("Contiguous extent {contiguous} is not a multiple of the access width {access_elements}")]
    MisalignedExtent {
        contiguous: Index,
        access_elements: u32,
    },

    /// Any other rejected configuration.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl TileSetupError {
    pub(crate) fn thread_map(reason: impl Into<String>) -> Self {
        Self::InvalidThreadMap {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_values() {
        let err = TileSetupError::TooManyPredicates { count: 80, max: 64 };
        assert_eq!(
            err.to_string(),
            "Too many predicates: 80 requested, at most 64 supported"
        );

        let err = TileSetupError::ShapeMismatch {
            tile: PitchLinearShape::new(64, 8),
            thread_map: PitchLinearShape::new(32, 8),
        };
        assert_eq!(
            err.to_string(),
            "Thread map covers 32x8 but the tile is 64x8"
        );
    }
}
