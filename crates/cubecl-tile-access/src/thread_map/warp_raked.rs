use alloc::format;

use crate::{
    coords::{Index, PitchLinearCoord, PitchLinearShape},
    error::TileSetupError,
    thread_map::ThreadMap,
};

/// Warps rake over the tile: the threads of one warp are arranged as
/// `warp_thread_arrangement` and warps are interleaved along the strided axis first.
///
/// Along the strided axis, warp `w` owns rows `w * arrangement.strided` of every group of
/// `warps_strided * arrangement.strided` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PitchLinearWarpRakedThreadMap {
    shape: PitchLinearShape,
    threads: u32,
    elements_per_access: u32,
    warp_thread_arrangement: PitchLinearShape,
    warp_arrangement: PitchLinearShape,
    iterations: PitchLinearShape,
}

impl PitchLinearWarpRakedThreadMap {
    pub fn new(
        shape: PitchLinearShape,
        threads: u32,
        warp_thread_arrangement: PitchLinearShape,
        elements_per_access: u32,
    ) -> Result<Self, TileSetupError> {
        let warp_size = warp_thread_arrangement.count();
        if warp_size == 0 || elements_per_access == 0 || threads == 0 {
            return Err(TileSetupError::thread_map(
                "warp arrangement, threads and elements per access must be positive",
            ));
        }
        if threads % warp_size != 0 {
            return Err(TileSetupError::thread_map(format!(
                "{threads} threads is not a whole number of {warp_size}-thread warps"
            )));
        }
        if shape.contiguous % elements_per_access != 0 {
            return Err(TileSetupError::thread_map(format!(
                "contiguous extent {} is not divisible by the vector width {elements_per_access}",
                shape.contiguous
            )));
        }

        let accesses = PitchLinearShape::new(shape.contiguous / elements_per_access, shape.strided);
        if accesses.contiguous % warp_thread_arrangement.contiguous != 0
            || accesses.strided % warp_thread_arrangement.strided != 0
        {
            return Err(TileSetupError::thread_map(format!(
                "tile of {accesses} accesses cannot be raked by a {warp_thread_arrangement} warp"
            )));
        }

        let warp_access_iterations = PitchLinearShape::new(
            accesses.contiguous / warp_thread_arrangement.contiguous,
            accesses.strided / warp_thread_arrangement.strided,
        );
        let warp_count = threads / warp_size;

        let warps_strided = if warp_access_iterations.strided >= warp_count {
            warp_count
        } else {
            warp_access_iterations.strided
        };
        let warps_contiguous = if warp_count > warp_access_iterations.strided {
            warp_count / warps_strided
        } else {
            1
        };

        if warp_access_iterations.contiguous % warps_contiguous != 0
            || warp_access_iterations.strided % warps_strided != 0
        {
            return Err(TileSetupError::thread_map(format!(
                "{warp_count} warps cannot evenly cover {warp_access_iterations} warp iterations"
            )));
        }

        let iterations = PitchLinearShape::new(
            warp_access_iterations.contiguous / warps_contiguous,
            warp_access_iterations.strided / warps_strided,
        );

        Ok(Self {
            shape,
            threads,
            elements_per_access,
            warp_thread_arrangement,
            warp_arrangement: PitchLinearShape::new(warps_contiguous, warps_strided),
            iterations,
        })
    }

    pub fn warp_arrangement(&self) -> PitchLinearShape {
        self.warp_arrangement
    }
}

impl ThreadMap for PitchLinearWarpRakedThreadMap {
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
        PitchLinearShape::new(
            self.warp_thread_arrangement.contiguous * self.elements_per_access,
            self.warp_thread_arrangement.strided * self.warp_arrangement.strided,
        )
    }

    fn initial_offset(&self, thread_id: u32) -> PitchLinearCoord {
        let arrangement = self.warp_thread_arrangement;
        let warp_id = thread_id / arrangement.count();
        let lane_id = thread_id % arrangement.count();

        let warp_footprint = PitchLinearShape::new(
            arrangement.contiguous * self.iterations.contiguous,
            arrangement.strided,
        );
        let warp_offset = PitchLinearCoord::new(
            (warp_id % self.warp_arrangement.contiguous) as Index,
            (warp_id / self.warp_arrangement.contiguous) as Index,
        );
        let lane_offset = PitchLinearCoord::new(
            (lane_id % arrangement.contiguous) as Index,
            (lane_id / arrangement.contiguous) as Index,
        );

        let in_vectors = warp_offset.scaled(warp_footprint) + lane_offset;
        PitchLinearCoord::new(
            in_vectors.contiguous * self.elements_per_access as Index,
            in_vectors.strided,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warps_interleave_along_strided() {
        // 64x16 tile of f16 with 8-wide accesses, 64 threads as two 8x4 warps.
        let map = PitchLinearWarpRakedThreadMap::new(
            PitchLinearShape::new(64, 16),
            64,
            PitchLinearShape::new(8, 4),
            8,
        )
        .unwrap();

        assert_eq!(map.warp_arrangement(), PitchLinearShape::new(1, 2));
        assert_eq!(map.iterations(), PitchLinearShape::new(1, 2));
        // Each warp covers 4 rows, then skips the 4 rows of the other warp.
        assert_eq!(map.delta(), PitchLinearShape::new(64, 8));
        assert_eq!(map.initial_offset(0), PitchLinearCoord::new(0, 0));
        assert_eq!(map.initial_offset(9), PitchLinearCoord::new(8, 1));
        assert_eq!(map.initial_offset(32), PitchLinearCoord::new(0, 4));
        assert_eq!(map.initial_offset(63), PitchLinearCoord::new(56, 7));
    }

    #[test]
    fn rejects_partial_warps() {
        let map = PitchLinearWarpRakedThreadMap::new(
            PitchLinearShape::new(64, 16),
            48,
            PitchLinearShape::new(8, 4),
            8,
        );
        assert!(matches!(map, Err(TileSetupError::InvalidThreadMap { .. })));
    }

    #[test]
    fn contiguous_warps_split_the_row() {
        // 4 warps over a 128x4 tile: one strided warp iteration, so warps go side by side.
        let map = PitchLinearWarpRakedThreadMap::new(
            PitchLinearShape::new(128, 4),
            128,
            PitchLinearShape::new(8, 4),
            4,
        )
        .unwrap();

        assert_eq!(map.warp_arrangement(), PitchLinearShape::new(4, 1));
        assert_eq!(map.iterations(), PitchLinearShape::new(1, 1));
        assert_eq!(map.initial_offset(32), PitchLinearCoord::new(32, 0));
        assert_eq!(map.initial_offset(127), PitchLinearCoord::new(124, 3));
    }
}
