use alloc::format;

use crate::{
    coords::{Index, PitchLinearCoord, PitchLinearShape},
    error::TileSetupError,
    thread_map::ThreadMap,
};

/// Threads are striped along the contiguous axis first, then wrap to the next strided row.
///
/// When there are more threads than vectors along the contiguous axis, each thread
/// handles a single contiguous vector and iterates along the strided axis only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PitchLinearStripminedThreadMap {
    shape: PitchLinearShape,
    threads: u32,
    elements_per_access: u32,
    iterations: PitchLinearShape,
    delta: PitchLinearShape,
}

impl PitchLinearStripminedThreadMap {
    pub fn new(
        shape: PitchLinearShape,
        threads: u32,
        elements_per_access: u32,
    ) -> Result<Self, TileSetupError> {
        if threads == 0 || elements_per_access == 0 || shape.count() == 0 {
            return Err(TileSetupError::thread_map(
                "threads, elements per access and the tile shape must be positive",
            ));
        }
        if shape.contiguous % elements_per_access != 0 {
            return Err(TileSetupError::thread_map(format!(
                "contiguous extent {} is not divisible by the vector width {elements_per_access}",
                shape.contiguous
            )));
        }

        let vectors_contiguous = shape.contiguous / elements_per_access;

        let (iterations, delta) = if threads >= vectors_contiguous {
            if threads % vectors_contiguous != 0 {
                return Err(TileSetupError::thread_map(format!(
                    "{threads} threads cannot be split over {vectors_contiguous} contiguous vectors"
                )));
            }
            let rows_per_pass = threads / vectors_contiguous;
            if shape.strided % rows_per_pass != 0 {
                return Err(TileSetupError::thread_map(format!(
                    "strided extent {} is not divisible by {rows_per_pass} rows per pass",
                    shape.strided
                )));
            }
            (
                PitchLinearShape::new(1, shape.strided / rows_per_pass),
                PitchLinearShape::new(1, rows_per_pass),
            )
        } else {
            if vectors_contiguous % threads != 0 {
                return Err(TileSetupError::thread_map(format!(
                    "{vectors_contiguous} contiguous vectors cannot be split over {threads} threads"
                )));
            }
            (
                PitchLinearShape::new(vectors_contiguous / threads, shape.strided),
                PitchLinearShape::new(threads * elements_per_access, 1),
            )
        };

        Ok(Self {
            shape,
            threads,
            elements_per_access,
            iterations,
            delta,
        })
    }
}

impl ThreadMap for PitchLinearStripminedThreadMap {
    fn shape(&self) -> PitchLinearShape {
        self.shape
    }

    fn threads(&self) -> u32 {
        self.threads
    }

    fn elements_per_access(&self) -> u32 {
        self.elements_per_access
    }

    fn iterations(&self) -> PitchLinearShape {
        self.iterations
    }

    fn delta(&self) -> PitchLinearShape {
        self.delta
    }

    fn initial_offset(&self, thread_id: u32) -> PitchLinearCoord {
        let vectors_contiguous = self.shape.contiguous / self.elements_per_access;
        PitchLinearCoord::new(
            ((thread_id % vectors_contiguous) * self.elements_per_access) as Index,
            (thread_id / vectors_contiguous) as Index,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn more_threads_than_vectors_iterates_along_strided() {
        let map =
            PitchLinearStripminedThreadMap::new(PitchLinearShape::new(32, 8), 16, 4).unwrap();

        assert_eq!(map.iterations(), PitchLinearShape::new(1, 4));
        assert_eq!(map.delta(), PitchLinearShape::new(1, 2));
        assert_eq!(map.initial_offset(0), PitchLinearCoord::new(0, 0));
        assert_eq!(map.initial_offset(9), PitchLinearCoord::new(4, 1));
    }

    #[test]
    fn fewer_threads_than_vectors_iterates_along_contiguous() {
        let map = PitchLinearStripminedThreadMap::new(PitchLinearShape::new(128, 2), 32, 1).unwrap();

        assert_eq!(map.iterations(), PitchLinearShape::new(4, 2));
        assert_eq!(map.delta(), PitchLinearShape::new(32, 1));
        assert_eq!(map.initial_offset(31), PitchLinearCoord::new(31, 0));
    }

    #[test]
    fn rejects_more_rows_per_pass_than_the_tile_has() {
        // 16 threads over 4 single-element columns would start threads on rows 2 and 3.
        let err = PitchLinearStripminedThreadMap::new(PitchLinearShape::new(4, 2), 16, 1);
        assert!(matches!(err, Err(TileSetupError::InvalidThreadMap { .. })));

        let map = PitchLinearStripminedThreadMap::new(PitchLinearShape::new(4, 4), 16, 1).unwrap();
        assert_eq!(map.iterations(), PitchLinearShape::new(1, 1));
        assert_eq!(map.initial_offset(15), PitchLinearCoord::new(3, 3));
    }

    #[test]
    fn rejects_uneven_vector_width() {
        let err = PitchLinearStripminedThreadMap::new(PitchLinearShape::new(30, 4), 4, 4);
        assert!(matches!(err, Err(TileSetupError::InvalidThreadMap { .. })));
    }
}
