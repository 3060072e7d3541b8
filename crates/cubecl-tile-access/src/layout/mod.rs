mod affine;
mod base;
mod interleaved;
mod matrix;

pub use affine::*;
pub use base::*;
pub use interleaved::*;
pub use matrix::*;
