use core::{fmt::Debug, marker::PhantomData};

use crate::{
    access::{
        AffineStride, Addressing, NoPermute, Permute, PredicateMask, PredicatedTileAccessIterator,
        TileAccessConfig, TileAccessDesc, TileAccessParams,
    },
    coords::{
        AdvanceRank, LongIndex, MatrixAxis, MatrixCoord, MatrixShape, PitchLinearCoord,
        PitchLinearShape, TensorExtent,
    },
    element::Element,
    error::TileSetupError,
    thread_map::ThreadMap,
};

/// Operations shared by the canonical pitch-linear iterator and every layout adapter.
pub trait TileAccess {
    /// Coordinate type of tile offsets and logical positions.
    type Coord: Copy + Debug;

    /// Byte address of the current access, see [PredicatedTileAccessIterator::get].
    fn get(&self) -> Option<LongIndex>;
    /// Whether the current access is in bounds.
    fn valid(&self) -> bool;
    /// Moves to the next access.
    fn advance(&mut self);
    /// Moves by whole tiles.
    fn add_tile_offset(&mut self, tile_offset: Self::Coord);
    fn set_iteration_index(&mut self, index: u32);
    fn add_pointer_offset(&mut self, elements: LongIndex);
    fn clear_mask(&mut self, enable: bool);
    fn enable_mask(&mut self);
    fn set_mask(&mut self, mask: PredicateMask);
    fn get_mask(&self) -> PredicateMask;
    /// Logical coordinate of the current access.
    fn coord(&self) -> Self::Coord;
    /// Number of accesses per tile.
    fn access_count(&self) -> u32;
    /// Elements moved by one access.
    fn access_elements(&self) -> u32;
}

impl<E: Element, P: Permute> TileAccess for PredicatedTileAccessIterator<'_, E, P> {
    type Coord = PitchLinearCoord;

    fn get(&self) -> Option<LongIndex> {
        self.get()
    }

    fn valid(&self) -> bool {
        self.valid()
    }

    fn advance(&mut self) {
        self.advance()
    }

    fn add_tile_offset(&mut self, tile_offset: PitchLinearCoord) {
        self.add_tile_offset(tile_offset)
    }

    fn set_iteration_index(&mut self, index: u32) {
        self.set_iteration_index(index)
    }

    fn add_pointer_offset(&mut self, elements: LongIndex) {
        self.add_pointer_offset(elements)
    }

    fn clear_mask(&mut self, enable: bool) {
        self.clear_mask(enable)
    }

    fn enable_mask(&mut self) {
        self.enable_mask()
    }

    fn set_mask(&mut self, mask: PredicateMask) {
        self.set_mask(mask)
    }

    fn get_mask(&self) -> PredicateMask {
        self.get_mask()
    }

    fn coord(&self) -> PitchLinearCoord {
        self.coord()
    }

    fn access_count(&self) -> u32 {
        self.access_count()
    }

    fn access_elements(&self) -> u32 {
        self.predicates().geometry().access_elements
    }
}

/// Maps a matrix layout onto the canonical pitch-linear representation.
///
/// Implementations only reorder or rescale coordinates. They never change how accesses
/// are enumerated or validated.
pub trait MatrixLayout: Copy + Debug {
    /// Pitch-linear stride of the storage.
    fn stride(&self) -> AffineStride;

    /// Pitch-linear axis that a matrix axis maps to.
    fn advance_rank(axis: MatrixAxis) -> AdvanceRank;

    /// Pitch-linear shape of a matrix tile.
    fn shape(shape: MatrixShape) -> PitchLinearShape;

    /// Pitch-linear position of an element or threadblock offset.
    fn to_pitch_linear(coord: MatrixCoord) -> PitchLinearCoord;

    /// Pitch-linear extent of a matrix of `extent` rows and columns.
    fn extent(extent: MatrixCoord) -> TensorExtent {
        Self::to_pitch_linear(extent)
    }

    /// Rejects matrix extents that [MatrixLayout::extent] cannot represent exactly.
    fn check_extent(_extent: MatrixCoord) -> Result<(), TileSetupError> {
        Ok(())
    }

    /// Inverse of [MatrixLayout::to_pitch_linear] for element positions.
    fn to_matrix(coord: PitchLinearCoord) -> MatrixCoord;

    /// Pitch-linear tile offset of a matrix tile offset.
    fn tile_offset(tile_offset: MatrixCoord) -> PitchLinearCoord {
        Self::to_pitch_linear(tile_offset)
    }

    /// Validates the pitch-linear config of a matrix tile.
    fn tile_config<E: Element, TM: ThreadMap>(
        shape: MatrixShape,
        axis: MatrixAxis,
        thread_map: TM,
        access_elements: u32,
    ) -> Result<TileAccessConfig<E, TM>, TileSetupError> {
        TileAccessConfig::new(
            Self::shape(shape),
            Self::advance_rank(axis),
            thread_map,
            access_elements,
        )
    }

    fn params(&self, desc: TileAccessDesc) -> TileAccessParams {
        TileAccessParams::new(self.stride(), desc)
    }
}

/// Tile access iterator over a matrix stored with layout `L`.
///
/// Every operation is delegated to one canonical [PredicatedTileAccessIterator] after
/// mapping coordinates with `L`.
#[derive(Debug, Clone)]
pub struct MatrixTileAccessIterator<'a, L: MatrixLayout, E: Element, P: Permute = NoPermute> {
    inner: PredicatedTileAccessIterator<'a, E, P>,
    _layout: PhantomData<L>,
}

impl<'a, L: MatrixLayout, E: Element, P: Permute> MatrixTileAccessIterator<'a, L, E, P> {
    /// Creates the iterator of `thread_id` for the tile at `threadblock_offset`.
    ///
    /// `config` is the pitch-linear config, usually built by [MatrixLayout::tile_config].
    pub fn new<TM: ThreadMap>(
        config: &TileAccessConfig<E, TM>,
        params: TileAccessParams,
        base: LongIndex,
        extent: MatrixCoord,
        thread_id: u32,
        threadblock_offset: MatrixCoord,
        addressing: Addressing<'a, P>,
    ) -> Self {
        let extent = L::extent(extent);

        Self {
            inner: PredicatedTileAccessIterator::new(
                config,
                params,
                base,
                extent,
                thread_id,
                L::to_pitch_linear(threadblock_offset),
                addressing,
            ),
            _layout: PhantomData,
        }
    }

    pub fn at_origin<TM: ThreadMap>(
        config: &TileAccessConfig<E, TM>,
        params: TileAccessParams,
        base: LongIndex,
        extent: MatrixCoord,
        thread_id: u32,
        addressing: Addressing<'a, P>,
    ) -> Self {
        Self::new(
            config,
            params,
            base,
            extent,
            thread_id,
            MatrixCoord::ORIGIN,
            addressing,
        )
    }

    /// The canonical iterator everything is delegated to.
    pub fn inner(&self) -> &PredicatedTileAccessIterator<'a, E, P> {
        &self.inner
    }
}

impl<L: MatrixLayout, E: Element, P: Permute> TileAccess for MatrixTileAccessIterator<'_, L, E, P> {
    type Coord = MatrixCoord;

    fn get(&self) -> Option<LongIndex> {
        self.inner.get()
    }

    fn valid(&self) -> bool {
        self.inner.valid()
    }

    fn advance(&mut self) {
        self.inner.advance()
    }

    fn add_tile_offset(&mut self, tile_offset: MatrixCoord) {
        self.inner.add_tile_offset(L::tile_offset(tile_offset))
    }

    fn set_iteration_index(&mut self, index: u32) {
        self.inner.set_iteration_index(index)
    }

    fn add_pointer_offset(&mut self, elements: LongIndex) {
        self.inner.add_pointer_offset(elements)
    }

    fn clear_mask(&mut self, enable: bool) {
        self.inner.clear_mask(enable)
    }

    fn enable_mask(&mut self) {
        self.inner.enable_mask()
    }

    fn set_mask(&mut self, mask: PredicateMask) {
        self.inner.set_mask(mask)
    }

    fn get_mask(&self) -> PredicateMask {
        self.inner.get_mask()
    }

    fn coord(&self) -> MatrixCoord {
        L::to_matrix(self.inner.coord())
    }

    fn access_count(&self) -> u32 {
        self.inner.access_count()
    }

    fn access_elements(&self) -> u32 {
        TileAccess::access_elements(&self.inner)
    }
}
