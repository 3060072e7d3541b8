use core::fmt::Debug;

use crate::coords::{PitchLinearCoord, PitchLinearShape};

/// Assigns each participating thread a set of accesses inside a pitch-linear tile.
///
/// A thread visits `iterations().count()` vectors of `elements_per_access()` elements,
/// starting at [ThreadMap::initial_offset] and stepping by [ThreadMap::delta] between
/// iterations along each axis.
pub trait ThreadMap: Copy + Debug + Send + Sync {
    /// Tile shape covered by all threads together.
    fn shape(&self) -> PitchLinearShape;

    /// Number of participating threads.
    fn threads(&self) -> u32;

    /// Elements in one vector access.
    fn elements_per_access(&self) -> u32;

    /// Number of iterations along each axis.
    fn iterations(&self) -> PitchLinearShape;

    /// Coordinate delta between two consecutive iterations, in elements.
    fn delta(&self) -> PitchLinearShape;

    /// Offset of the first access of `thread_id` within the tile.
    fn initial_offset(&self, thread_id: u32) -> PitchLinearCoord;
}
