mod base;
mod stripmined;
mod warp_raked;

pub use base::*;
pub use stripmined::*;
pub use warp_raked::*;
