use alloc::format;

use crate::{
    access::TileAccessConfig,
    config::Logger,
    coords::{AdvanceRank, Index, PitchLinearCoord, PitchLinearShape, TensorExtent},
    element::Element,
    thread_map::ThreadMap,
};

/// Used bits in each byte of a predicate word.
pub const PREDICATES_PER_BYTE: u32 = 4;
/// Used bits in each predicate word.
pub const PREDICATES_PER_WORD: u32 = 4 * PREDICATES_PER_BYTE;
/// Fixed number of words in a [PredicateMask].
pub const MAX_PREDICATE_WORDS: usize = 4;

/// Packed validity bits, one per access of a tile.
///
/// Predicate `i` lives in word `i / 16`, byte `(i % 16) / 4`, bit `i % 4` of that byte.
/// The upper four bits of every byte are never set by the iterator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PredicateMask {
    pub words: [u32; MAX_PREDICATE_WORDS],
}

impl PredicateMask {
    pub const fn new(words: [u32; MAX_PREDICATE_WORDS]) -> Self {
        Self { words }
    }

    /// Word index and bit position of predicate `index`.
    pub const fn bit_position(index: u32) -> (usize, u32) {
        let word = index / PREDICATES_PER_WORD;
        let residual = index % PREDICATES_PER_WORD;
        let byte = residual / PREDICATES_PER_BYTE;
        let bit = residual % PREDICATES_PER_BYTE;
        (word as usize, byte * 8 + bit)
    }

    pub fn get(&self, index: u32) -> bool {
        let (word, bit) = Self::bit_position(index);
        self.words[word] & (1u32 << bit) != 0
    }

    pub fn set(&mut self, index: u32, value: bool) {
        let (word, bit) = Self::bit_position(index);
        self.words[word] |= (value as u32) << bit;
    }

    /// Number of set predicates.
    pub fn count_valid(&self) -> u32 {
        self.words.iter().map(|word| word.count_ones()).sum()
    }
}

/// Position of the current access within the current tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TileCursor {
    pub vector: u32,
    pub contiguous: u32,
    pub strided: u32,
}

/// Which counter wrapped during a cursor increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorStep {
    /// Next access of the same vector.
    Vector,
    /// Next vector along the contiguous axis.
    Contiguous,
    /// First vector of the next strided iteration.
    Strided,
    /// All accesses of the tile were visited, the cursor is back at the start.
    Tile,
}

/// Static access pattern of one thread, extracted from a [TileAccessConfig].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccessGeometry {
    pub shape: PitchLinearShape,
    pub advance_rank: AdvanceRank,
    pub iterations: PitchLinearShape,
    pub delta: PitchLinearShape,
    pub accesses_per_vector: u32,
    pub access_elements: u32,
}

impl AccessGeometry {
    pub fn from_config<E: Element, TM: ThreadMap>(config: &TileAccessConfig<E, TM>) -> Self {
        let thread_map = config.thread_map();
        Self {
            shape: config.shape(),
            advance_rank: config.advance_rank(),
            iterations: thread_map.iterations(),
            delta: thread_map.delta(),
            accesses_per_vector: config.accesses_per_vector(),
            access_elements: config.access_elements(),
        }
    }

    /// Number of accesses per tile.
    pub fn access_count(&self) -> u32 {
        self.iterations.count() * self.accesses_per_vector
    }

    /// Flat predicate index of a cursor.
    pub fn predicate_index(&self, cursor: TileCursor) -> u32 {
        cursor.vector
            + self.accesses_per_vector
                * (cursor.contiguous + self.iterations.contiguous * cursor.strided)
    }

    /// Coordinate of a cursor relative to the thread's first access.
    pub fn iteration_coord(&self, cursor: TileCursor) -> PitchLinearCoord {
        PitchLinearCoord::new(
            (cursor.contiguous * self.delta.contiguous + cursor.vector * self.access_elements)
                as Index,
            (cursor.strided * self.delta.strided) as Index,
        )
    }

    /// Cursor for a flat access index.
    pub fn cursor_at(&self, index: u32) -> TileCursor {
        let residual = index / self.accesses_per_vector;
        TileCursor {
            vector: index % self.accesses_per_vector,
            contiguous: residual % self.iterations.contiguous,
            strided: residual / self.iterations.contiguous,
        }
    }
}

/// Per-thread validity state of a tile access iterator.
///
/// The mask is recomputed only twice: once for the residue tile at construction, and
/// once when entering steady state. In between, validity of the current access is read
/// from the mask at the cursor.
#[derive(Debug, Clone)]
pub struct PredicateState {
    geometry: AccessGeometry,
    mask: PredicateMask,
    extent: TensorExtent,
    thread_offset: PitchLinearCoord,
    residue_offset: PitchLinearCoord,
    cursor: TileCursor,
    recomputations: u32,
}

impl PredicateState {
    /// Creates an empty state for a tensor of the given extent. All predicates are cleared
    /// until [PredicateState::initialize] is called.
    pub fn new(geometry: AccessGeometry, extent: TensorExtent) -> Self {
        Self {
            geometry,
            mask: PredicateMask::default(),
            extent,
            thread_offset: PitchLinearCoord::ORIGIN,
            residue_offset: PitchLinearCoord::ORIGIN,
            cursor: TileCursor::default(),
            recomputations: 0,
        }
    }

    /// Places the thread at `threadblock_offset + thread_origin`, computes the residue and
    /// the predicates of the residue tile, and resets the cursor.
    pub fn initialize(
        &mut self,
        thread_origin: PitchLinearCoord,
        threadblock_offset: PitchLinearCoord,
    ) {
        let rank = self.geometry.advance_rank;
        let tile = self.geometry.shape.at(rank) as Index;

        let mut residue_size = (self.extent.at(rank) - threadblock_offset.at(rank)) % tile;
        if residue_size == 0 {
            residue_size = tile;
        }

        let mut residue_offset = PitchLinearCoord::ORIGIN;
        *residue_offset.at_mut(rank) = residue_size;

        let mut residue_extent = self.extent;
        *residue_extent.at_mut(rank) =
            Index::min(threadblock_offset.at(rank) + residue_size, self.extent.at(rank));

        self.residue_offset = residue_offset;
        self.thread_offset = threadblock_offset + thread_origin;

        self.recompute(residue_extent, false);
        self.set_iteration_index(0);
    }

    /// Recomputes every predicate against `extent`.
    ///
    /// Outside steady state both axes are checked. In steady state only the axis that is
    /// not advanced is checked.
    pub fn recompute(&mut self, extent: TensorExtent, steady_state: bool) {
        let geometry = self.geometry;
        let mut mask = PredicateMask::default();

        for index in 0..geometry.access_count() {
            let cursor = geometry.cursor_at(index);
            let coord = self.thread_offset + geometry.iteration_coord(cursor);

            let guard = if steady_state {
                let axis = geometry.advance_rank.other();
                coord.at(axis) < extent.at(axis)
            } else {
                coord.strided < extent.strided && coord.contiguous < extent.contiguous
            };

            mask.set(geometry.predicate_index(cursor), guard);
        }

        self.mask = mask;
        self.recomputations += 1;

        Logger::log_full(|| {
            format!(
                "Predicates recomputed for thread at {} against {extent} (steady state: {steady_state}): {}/{} valid",
                self.thread_offset,
                mask.count_valid(),
                geometry.access_count(),
            )
        });
    }

    /// Moves the thread past the residue tile and recomputes the steady-state predicates
    /// against the full tensor extent.
    pub fn enter_steady_state(&mut self) {
        self.thread_offset += self.residue_offset;
        self.recompute(self.extent, true);
    }

    /// Current mask.
    pub fn get(&self) -> PredicateMask {
        self.mask
    }

    /// Overrides the mask.
    pub fn set(&mut self, mask: PredicateMask) {
        self.mask = mask;
    }

    /// Clears every predicate if `enable`, does nothing otherwise.
    pub fn clear(&mut self, enable: bool) {
        if enable {
            self.mask = PredicateMask::default();
        }
    }

    /// Sets every predicate.
    pub fn enable_all(&mut self) {
        self.mask = PredicateMask::new([u32::MAX; MAX_PREDICATE_WORDS]);
    }

    /// Whether the access at the cursor is valid.
    pub fn valid_at_cursor(&self) -> bool {
        self.mask.get(self.geometry.predicate_index(self.cursor))
    }

    /// Overrides the cursor from a flat access index.
    pub fn set_iteration_index(&mut self, index: u32) {
        self.cursor = self.geometry.cursor_at(index);
    }

    /// Moves the cursor to the next access, wrapping back to the start of the tile.
    pub fn advance_cursor(&mut self) -> CursorStep {
        let geometry = &self.geometry;
        let cursor = &mut self.cursor;

        cursor.vector += 1;
        if cursor.vector < geometry.accesses_per_vector {
            return CursorStep::Vector;
        }

        cursor.vector = 0;
        cursor.contiguous += 1;
        if cursor.contiguous < geometry.iterations.contiguous {
            return CursorStep::Contiguous;
        }

        cursor.contiguous = 0;
        cursor.strided += 1;
        if cursor.strided < geometry.iterations.strided {
            return CursorStep::Strided;
        }

        cursor.strided = 0;
        CursorStep::Tile
    }

    /// Logical coordinate of the current access.
    pub fn access_coord(&self) -> PitchLinearCoord {
        self.thread_offset + self.geometry.iteration_coord(self.cursor)
    }

    pub fn cursor(&self) -> TileCursor {
        self.cursor
    }

    pub fn geometry(&self) -> &AccessGeometry {
        &self.geometry
    }

    pub fn extent(&self) -> TensorExtent {
        self.extent
    }

    /// Coordinate of the thread's first access in the current phase.
    pub fn thread_offset(&self) -> PitchLinearCoord {
        self.thread_offset
    }

    /// Offset from the start of the residue tile to the first steady-state tile.
    pub fn residue_offset(&self) -> PitchLinearCoord {
        self.residue_offset
    }

    /// Number of times the mask was computed from the extent.
    pub fn recompute_count(&self) -> u32 {
        self.recomputations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(rank: AdvanceRank) -> AccessGeometry {
        AccessGeometry {
            shape: PitchLinearShape::new(8, 4),
            advance_rank: rank,
            iterations: PitchLinearShape::new(2, 2),
            delta: PitchLinearShape::new(4, 2),
            accesses_per_vector: 2,
            access_elements: 2,
        }
    }

    #[test]
    fn bit_layout_uses_four_bits_per_byte() {
        assert_eq!(PredicateMask::bit_position(0), (0, 0));
        assert_eq!(PredicateMask::bit_position(3), (0, 3));
        assert_eq!(PredicateMask::bit_position(4), (0, 8));
        assert_eq!(PredicateMask::bit_position(15), (0, 27));
        assert_eq!(PredicateMask::bit_position(16), (1, 0));
        assert_eq!(PredicateMask::bit_position(37), (2, 9));
    }

    #[test]
    fn predicate_index_orders_vector_contiguous_strided() {
        let geometry = geometry(AdvanceRank::Strided);
        let cursor = TileCursor {
            vector: 1,
            contiguous: 1,
            strided: 1,
        };

        assert_eq!(geometry.predicate_index(cursor), 1 + 2 * (1 + 2));
        assert_eq!(geometry.cursor_at(7), cursor);
        assert_eq!(geometry.iteration_coord(cursor), PitchLinearCoord::new(6, 2));
    }

    #[test]
    fn residue_tile_checks_both_axes() {
        let mut state = PredicateState::new(geometry(AdvanceRank::Strided), TensorExtent::new(6, 7));
        state.initialize(PitchLinearCoord::ORIGIN, PitchLinearCoord::ORIGIN);

        // Residue along strided is 7 % 4 = 3: rows 0 and 2 are in, columns 0..6.
        assert_eq!(state.residue_offset(), PitchLinearCoord::new(0, 3));
        for index in 0..8 {
            let cursor = geometry(AdvanceRank::Strided).cursor_at(index);
            let coord = geometry(AdvanceRank::Strided).iteration_coord(cursor);
            assert_eq!(state.get().get(index), coord.contiguous < 6 && coord.strided < 3);
        }
        assert_eq!(state.recompute_count(), 1);
    }

    #[test]
    fn steady_state_checks_only_the_other_axis() {
        let mut state = PredicateState::new(geometry(AdvanceRank::Strided), TensorExtent::new(6, 7));
        state.initialize(PitchLinearCoord::ORIGIN, PitchLinearCoord::ORIGIN);
        state.enter_steady_state();

        assert_eq!(state.thread_offset(), PitchLinearCoord::new(0, 3));
        // Contiguous column 6 and 7 are out, every strided row is in.
        assert_eq!(state.get().count_valid(), 6);
        assert_eq!(state.recompute_count(), 2);
    }

    #[test]
    fn clear_is_conditional() {
        let mut state = PredicateState::new(geometry(AdvanceRank::Strided), TensorExtent::new(8, 8));
        state.initialize(PitchLinearCoord::ORIGIN, PitchLinearCoord::ORIGIN);
        let mask = state.get();

        state.clear(false);
        assert_eq!(state.get(), mask);
        state.clear(true);
        assert_eq!(state.get(), PredicateMask::default());
        assert!(!state.valid_at_cursor());
        state.enable_all();
        assert!(state.valid_at_cursor());
    }

    #[test]
    fn cursor_wraps_in_order() {
        let mut state = PredicateState::new(geometry(AdvanceRank::Strided), TensorExtent::new(8, 8));
        let steps: alloc::vec::Vec<_> = (0..8).map(|_| state.advance_cursor()).collect();

        assert_eq!(
            steps,
            [
                CursorStep::Vector,
                CursorStep::Contiguous,
                CursorStep::Vector,
                CursorStep::Strided,
                CursorStep::Vector,
                CursorStep::Contiguous,
                CursorStep::Vector,
                CursorStep::Tile,
            ]
        );
        assert_eq!(state.cursor(), TileCursor::default());
    }
}
