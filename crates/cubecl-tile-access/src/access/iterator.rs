use core::marker::PhantomData;

use alloc::format;

use crate::{
    access::{
        AccessGeometry, Addressing, CursorStep, NoPermute, Permute, PredicateMask,
        PredicateState, TileAccessConfig, TileAccessParams, TileCursor,
    },
    config::{Logger, ValidationConfig},
    coords::{AdvanceRank, Index, LongIndex, PitchLinearCoord, PitchLinearShape, TensorExtent},
    element::Element,
    thread_map::ThreadMap,
};

/// Traversal phase of a [PredicatedTileAccessIterator].
///
/// The only transition is `Residue -> Steady`, taken at the first tile boundary crossing or
/// the first [PredicatedTileAccessIterator::add_tile_offset]. Predicates are recomputed on
/// that transition and never again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TilePhase {
    /// The first tile, possibly partial along the advance rank.
    Residue,
    /// Every following tile, full along the advance rank.
    Steady,
}

/// Per-thread iterator over the accesses of a sequence of tiles of a pitch-linear tensor.
///
/// Kernel loops call [valid](Self::valid), then [get](Self::get), then
/// [advance](Self::advance), once per access. Addresses are byte offsets relative to the
/// start of the tensor storage.
#[derive(Debug, Clone)]
pub struct PredicatedTileAccessIterator<'a, E: Element, P: Permute = NoPermute> {
    params: TileAccessParams,
    predicates: PredicateState,
    addressing: Addressing<'a, P>,
    /// Byte offset of the tensor origin.
    base: LongIndex,
    /// Byte offset of the current vector, maintained by additions only.
    pointer: LongIndex,
    /// Coordinate of the thread's first access in the current tile.
    tile_coord: PitchLinearCoord,
    phase: TilePhase,
    _element: PhantomData<E>,
}

impl<'a, E: Element, P: Permute> PredicatedTileAccessIterator<'a, E, P> {
    /// Creates the iterator of `thread_id` for the tile at `threadblock_offset`.
    ///
    /// `base` is the byte offset of the tensor origin and `extent` the logical size of the
    /// tensor, in elements.
    pub fn new<TM: ThreadMap>(
        config: &TileAccessConfig<E, TM>,
        params: TileAccessParams,
        base: LongIndex,
        extent: TensorExtent,
        thread_id: u32,
        threadblock_offset: PitchLinearCoord,
        addressing: Addressing<'a, P>,
    ) -> Self {
        let thread_origin = config.thread_map().initial_offset(thread_id);

        let mut predicates = PredicateState::new(AccessGeometry::from_config(config), extent);
        predicates.initialize(thread_origin, threadblock_offset);

        let tile_coord = predicates.thread_offset();
        let pointer = base + params.byte_offset(tile_coord);

        Logger::log_basic(|| {
            format!(
                "Tile access iterator for thread {thread_id}: tile at {threadblock_offset}, \
                 first access at {tile_coord}, residue {} in extent {extent}",
                predicates.residue_offset(),
            )
        });

        Self {
            params,
            predicates,
            addressing,
            base,
            pointer,
            tile_coord,
            phase: TilePhase::Residue,
            _element: PhantomData,
        }
    }

    /// Creates the iterator of `thread_id` for the tile at the origin of the tensor.
    pub fn at_origin<TM: ThreadMap>(
        config: &TileAccessConfig<E, TM>,
        params: TileAccessParams,
        base: LongIndex,
        extent: TensorExtent,
        thread_id: u32,
        addressing: Addressing<'a, P>,
    ) -> Self {
        Self::new(
            config,
            params,
            base,
            extent,
            thread_id,
            PitchLinearCoord::ORIGIN,
            addressing,
        )
    }

    /// Byte address of the current access.
    ///
    /// With direct addressing the address is always returned, and the caller checks
    /// [valid](Self::valid) before dereferencing it. Gathered and permuted addresses are only
    /// resolved for valid accesses.
    pub fn get(&self) -> Option<LongIndex> {
        match &self.addressing {
            Addressing::Direct => Some(
                self.pointer + self.predicates.cursor().vector as LongIndex * self.params.inc_vector,
            ),
            Addressing::Gathered(indices) => {
                if !self.valid() {
                    return None;
                }
                let coord = self.coord();
                let row = *indices.get(usize::try_from(coord.strided).ok()?)?;
                let stride = self.params.stride;
                let elements = coord.contiguous as LongIndex * stride.contiguous
                    + row as LongIndex * stride.strided;

                Some(self.base + self.params.bytes(elements))
            }
            Addressing::Permuted(permute) => {
                if !self.valid() {
                    return None;
                }
                Some(self.base + self.params.bytes(permute.offset(self.coord())))
            }
        }
    }

    /// Whether the current access is in bounds.
    pub fn valid(&self) -> bool {
        self.predicates.valid_at_cursor()
    }

    /// Moves to the next access, and to the next tile along the advance rank after the last
    /// access of a tile.
    pub fn advance(&mut self) {
        match self.predicates.advance_cursor() {
            CursorStep::Vector => {}
            CursorStep::Contiguous => self.pointer += self.params.inc_contiguous,
            CursorStep::Strided => self.pointer += self.params.inc_next_strided,
            CursorStep::Tile => match self.phase {
                TilePhase::Residue => {
                    // Back to the start of the residue tile, the residue correction follows.
                    self.pointer += self.params.inc_next - self.params.inc_advance;
                    self.add_tile_offset(self.advance_rank().unit());
                }
                TilePhase::Steady => {
                    let rank = self.advance_rank();
                    let step = self.shape().at(rank) as Index;
                    self.pointer += self.params.inc_next;
                    *self.tile_coord.at_mut(rank) += step;
                }
            },
        }
    }

    /// Moves by whole tiles.
    ///
    /// From the residue tile, one step along the advance rank lands on the first full tile,
    /// so `tile_offset` counts the residue tile as one. Offsets are expected to be
    /// non-negative along the advance rank: steady-state predicates are not checked along
    /// that axis.
    pub fn add_tile_offset(&mut self, tile_offset: PitchLinearCoord) {
        let rank = self.advance_rank();
        let shape = self.shape();

        match self.phase {
            TilePhase::Residue => {
                self.predicates.enter_steady_state();

                let residue = self.predicates.residue_offset();
                let tiles = (tile_offset - rank.unit()).scaled(shape);

                self.pointer += self.params.byte_offset(residue + tiles);
                self.tile_coord = self.predicates.thread_offset() + tiles;
                self.phase = TilePhase::Steady;

                Logger::log_full(|| {
                    format!(
                        "Tile access iterator entered steady state at {} after a residue of {residue}",
                        self.tile_coord
                    )
                });
            }
            TilePhase::Steady => {
                if tile_offset.at(rank) <= 0 && ValidationConfig::strict_tile_order() {
                    log::warn!(
                        "Tile offset {tile_offset} does not move forward along {rank:?}, \
                         steady-state predicates along that axis are stale"
                    );
                }

                let tiles = tile_offset.scaled(shape);
                self.pointer += self.params.byte_offset(tiles);
                self.tile_coord += tiles;
            }
        }
    }

    /// Overrides the cursor from a flat access index within the current tile.
    pub fn set_iteration_index(&mut self, index: u32) {
        let tile_pointer = self.pointer_at_tile_start();
        self.predicates.set_iteration_index(index);

        let cursor = self.predicates.cursor();
        self.pointer = tile_pointer
            + cursor.contiguous as LongIndex * self.params.inc_contiguous
            + cursor.strided as LongIndex * self.params.inc_strided;
    }

    /// Shifts every address by a number of elements.
    pub fn add_pointer_offset(&mut self, elements: LongIndex) {
        let bytes = self.params.bytes(elements);
        self.base += bytes;
        self.pointer += bytes;
    }

    /// Clears every predicate if `enable`, does nothing otherwise.
    pub fn clear_mask(&mut self, enable: bool) {
        self.predicates.clear(enable);
    }

    /// Sets every predicate.
    pub fn enable_mask(&mut self) {
        self.predicates.enable_all();
    }

    pub fn set_mask(&mut self, mask: PredicateMask) {
        self.predicates.set(mask);
    }

    pub fn get_mask(&self) -> PredicateMask {
        self.predicates.get()
    }

    pub fn predicates(&self) -> &PredicateState {
        &self.predicates
    }

    pub fn params(&self) -> &TileAccessParams {
        &self.params
    }

    pub fn phase(&self) -> TilePhase {
        self.phase
    }

    pub fn cursor(&self) -> TileCursor {
        self.predicates.cursor()
    }

    /// Logical coordinate of the current access.
    pub fn coord(&self) -> PitchLinearCoord {
        self.tile_coord + self.predicates.geometry().iteration_coord(self.cursor())
    }

    pub fn thread_offset(&self) -> PitchLinearCoord {
        self.predicates.thread_offset()
    }

    pub fn residue_offset(&self) -> PitchLinearCoord {
        self.predicates.residue_offset()
    }

    pub fn advance_rank(&self) -> AdvanceRank {
        self.predicates.geometry().advance_rank
    }

    pub fn shape(&self) -> PitchLinearShape {
        self.predicates.geometry().shape
    }

    /// Number of accesses per tile.
    pub fn access_count(&self) -> u32 {
        self.predicates.geometry().access_count()
    }

    fn pointer_at_tile_start(&self) -> LongIndex {
        let cursor = self.predicates.cursor();
        self.pointer
            - cursor.contiguous as LongIndex * self.params.inc_contiguous
            - cursor.strided as LongIndex * self.params.inc_strided
    }
}
