use core::marker::PhantomData;

use alloc::format;

use crate::{
    access::{MAX_PREDICATE_WORDS, PREDICATES_PER_WORD},
    config::Logger,
    coords::{AdvanceRank, Index, PitchLinearCoord, PitchLinearShape, TensorExtent},
    element::Element,
    error::TileSetupError,
    thread_map::ThreadMap,
};

/// Geometry shared by every thread iterating over tiles of one tensor.
///
/// This is the configuration-time contract of the tile access iterator: it is
/// validated once by [TileAccessConfig::new] and then copied into every iterator.
#[derive(Debug, Clone, Copy)]
pub struct TileAccessConfig<E: Element, TM: ThreadMap> {
    shape: PitchLinearShape,
    advance_rank: AdvanceRank,
    thread_map: TM,
    access_elements: u32,
    accesses_per_vector: u32,
    predicate_count: u32,
    _element: PhantomData<E>,
}

/// Non-generic description of a tile access pattern, used to derive increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileAccessDesc {
    pub element_bits: u32,
    pub advance_rank: AdvanceRank,
    pub threadblock_shape: PitchLinearShape,
    pub threadmap_iterations: PitchLinearShape,
    pub threadmap_delta: PitchLinearShape,
    pub access_elements: u32,
}

impl<E: Element, TM: ThreadMap> TileAccessConfig<E, TM> {
    /// Validates the geometry of a tile of `shape` split by `thread_map` into accesses of
    /// `access_elements` elements, advancing along `advance_rank`.
    pub fn new(
        shape: PitchLinearShape,
        advance_rank: AdvanceRank,
        thread_map: TM,
        access_elements: u32,
    ) -> Result<Self, TileSetupError> {
        let elements_per_access = thread_map.elements_per_access();

        if access_elements == 0 || elements_per_access % access_elements != 0 {
            return Err(TileSetupError::IndivisibleVector {
                elements_per_access,
                access_elements,
            });
        }

        if (access_elements * E::BITS) % 8 != 0 {
            return Err(TileSetupError::SubByteAccess {
                access_elements,
                element_bits: E::BITS,
            });
        }

        if thread_map.shape() != shape {
            return Err(TileSetupError::ShapeMismatch {
                tile: shape,
                thread_map: thread_map.shape(),
            });
        }

        let iterations = thread_map.iterations();
        if iterations.count() == 0 {
            return Err(TileSetupError::InvalidConfig(format!(
                "thread map yields no iterations for tile {shape}"
            )));
        }

        let delta = thread_map.delta();
        let span = PitchLinearCoord::new(
            ((iterations.contiguous - 1) * delta.contiguous) as Index,
            ((iterations.strided - 1) * delta.strided) as Index,
        );
        for thread in 0..thread_map.threads() {
            let first = thread_map.initial_offset(thread);
            let last = first + span;

            let inside = first.contiguous >= 0
                && first.strided >= 0
                && last.contiguous + elements_per_access as Index <= shape.contiguous as Index
                && last.strided < shape.strided as Index;

            if !inside {
                return Err(TileSetupError::ThreadOutsideTile {
                    thread,
                    first,
                    last,
                    tile: shape,
                });
            }
        }

        let accesses_per_vector = elements_per_access / access_elements;
        let predicate_count = iterations.count() * accesses_per_vector;
        let max = MAX_PREDICATE_WORDS as u32 * PREDICATES_PER_WORD;

        if predicate_count > max {
            return Err(TileSetupError::TooManyPredicates {
                count: predicate_count,
                max,
            });
        }

        Logger::log_basic(|| {
            format!(
                "Tile access config: tile {shape}, advance {advance_rank:?}, {} threads, \
                 iterations {iterations}, delta {}, {accesses_per_vector} accesses of {access_elements} x {} bits per vector",
                thread_map.threads(),
                thread_map.delta(),
                E::BITS,
            )
        });

        Ok(Self {
            shape,
            advance_rank,
            thread_map,
            access_elements,
            accesses_per_vector,
            predicate_count,
            _element: PhantomData,
        })
    }

    pub fn shape(&self) -> PitchLinearShape {
        self.shape
    }

    pub fn advance_rank(&self) -> AdvanceRank {
        self.advance_rank
    }

    pub fn thread_map(&self) -> &TM {
        &self.thread_map
    }

    /// Elements moved by one access.
    pub fn access_elements(&self) -> u32 {
        self.access_elements
    }

    /// Accesses needed to cover one vector implied by the thread map.
    pub fn accesses_per_vector(&self) -> u32 {
        self.accesses_per_vector
    }

    /// Accesses, and therefore predicates, per tile and per thread.
    pub fn predicate_count(&self) -> u32 {
        self.predicate_count
    }

    /// Number of predicate words in use.
    pub fn predicate_word_count(&self) -> usize {
        self.predicate_count.div_ceil(PREDICATES_PER_WORD) as usize
    }

    /// Checks that `extent` can be traversed with exact predicates.
    ///
    /// A predicate only guards the first element of an access. When the contiguous extent is
    /// not a multiple of the access width, the last valid access of a row also reads past it.
    pub fn check_extent(&self, extent: TensorExtent) -> Result<(), TileSetupError> {
        if extent.contiguous % self.access_elements as Index != 0 {
            return Err(TileSetupError::MisalignedExtent {
                contiguous: extent.contiguous,
                access_elements: self.access_elements,
            });
        }
        Ok(())
    }

    pub fn desc(&self) -> TileAccessDesc {
        TileAccessDesc {
            element_bits: E::BITS,
            advance_rank: self.advance_rank,
            threadblock_shape: self.shape,
            threadmap_iterations: self.thread_map.iterations(),
            threadmap_delta: self.thread_map.delta(),
            access_elements: self.access_elements,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thread_map::PitchLinearStripminedThreadMap;

    /// Stripmined map whose threads all start one row further down.
    #[derive(Debug, Clone, Copy)]
    struct ShiftedDown(PitchLinearStripminedThreadMap);

    impl ThreadMap for ShiftedDown {
        fn shape(&self) -> PitchLinearShape {
            self.0.shape()
        }

        fn threads(&self) -> u32 {
            self.0.threads()
        }

        fn elements_per_access(&self) -> u32 {
            self.0.elements_per_access()
        }

        fn iterations(&self) -> PitchLinearShape {
            self.0.iterations()
        }

        fn delta(&self) -> PitchLinearShape {
            self.0.delta()
        }

        fn initial_offset(&self, thread_id: u32) -> PitchLinearCoord {
            self.0.initial_offset(thread_id) + PitchLinearCoord::new(0, 1)
        }
    }

    fn map(shape: PitchLinearShape, threads: u32, width: u32) -> PitchLinearStripminedThreadMap {
        PitchLinearStripminedThreadMap::new(shape, threads, width).unwrap()
    }

    #[test]
    fn counts_predicates_per_vector_access() {
        let shape = PitchLinearShape::new(64, 8);
        let config =
            TileAccessConfig::<f32, _>::new(shape, AdvanceRank::Strided, map(shape, 32, 4), 2)
                .unwrap();

        // Four strided iterations of one vector, each split in two accesses.
        assert_eq!(config.accesses_per_vector(), 2);
        assert_eq!(config.predicate_count(), 8);
        assert_eq!(config.predicate_word_count(), 1);
    }

    #[test]
    fn rejects_indivisible_access_width() {
        let shape = PitchLinearShape::new(64, 8);
        let err = TileAccessConfig::<f32, _>::new(shape, AdvanceRank::Strided, map(shape, 32, 4), 3);

        assert_eq!(
            err.unwrap_err(),
            TileSetupError::IndivisibleVector {
                elements_per_access: 4,
                access_elements: 3
            }
        );
    }

    #[test]
    fn rejects_too_many_predicates() {
        let shape = PitchLinearShape::new(128, 64);
        let err = TileAccessConfig::<f32, _>::new(shape, AdvanceRank::Strided, map(shape, 32, 1), 1);

        assert!(matches!(
            err,
            Err(TileSetupError::TooManyPredicates { count: 256, max: 64 })
        ));
    }

    #[test]
    fn rejects_mismatched_thread_map() {
        let err = TileAccessConfig::<f32, _>::new(
            PitchLinearShape::new(64, 8),
            AdvanceRank::Contiguous,
            map(PitchLinearShape::new(32, 8), 32, 1),
            1,
        );

        assert!(matches!(err, Err(TileSetupError::ShapeMismatch { .. })));
    }

    #[test]
    fn rejects_threads_leaving_the_tile() {
        let shape = PitchLinearShape::new(32, 8);
        assert!(
            TileAccessConfig::<f32, _>::new(shape, AdvanceRank::Strided, map(shape, 8, 4), 4).is_ok()
        );

        let err = TileAccessConfig::<f32, _>::new(
            shape,
            AdvanceRank::Strided,
            ShiftedDown(map(shape, 8, 4)),
            4,
        );

        // Thread 0 starts on row 1 and its last access lands on row 8.
        assert_eq!(
            err.unwrap_err(),
            TileSetupError::ThreadOutsideTile {
                thread: 0,
                first: PitchLinearCoord::new(0, 1),
                last: PitchLinearCoord::new(0, 8),
                tile: shape,
            }
        );
    }

    #[test]
    fn extent_must_be_a_whole_number_of_accesses() {
        let shape = PitchLinearShape::new(32, 8);
        let config =
            TileAccessConfig::<f32, _>::new(shape, AdvanceRank::Strided, map(shape, 8, 4), 2).unwrap();

        assert!(config.check_extent(TensorExtent::new(18, 5)).is_ok());
        assert_eq!(
            config.check_extent(TensorExtent::new(17, 5)),
            Err(TileSetupError::MisalignedExtent {
                contiguous: 17,
                access_elements: 2
            })
        );
    }
}
