#![cfg_attr(not(feature = "std"), no_std)]

//! Predicated tile access for tiled matrix kernels.
//!
//! A [PredicatedTileAccessIterator](access::PredicatedTileAccessIterator) walks the accesses
//! a thread makes over a sequence of tiles of a 2D tensor. It yields byte addresses and
//! a validity predicate for each access, so that tensors whose extent is not a multiple of
//! the tile shape can be streamed without per-access bound checks in the hot loop.
//!
//! Everything is expressed in a canonical pitch-linear space (a contiguous and a strided
//! axis). The [layout] module maps row-major, column-major, affine and interleaved matrix
//! layouts onto it.

extern crate alloc;

#[macro_use]
extern crate derive_new;

/// Tile access configuration, predicates, increments and the canonical iterator.
pub mod access;
/// Global configuration and logging.
pub mod config;
/// Logical coordinates and shapes.
pub mod coords;
/// Element types and their bit width.
pub mod element;
/// Host drivers loading and storing fragments.
pub mod fragment;
/// Matrix layout adapters.
pub mod layout;
/// Host tensor views.
pub mod tensor;
/// Thread to access mapping policies.
pub mod thread_map;

mod error;

pub use error::*;
