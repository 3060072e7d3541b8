mod addressing;
mod config;
mod iterator;
mod params;
mod predicates;

pub use addressing::*;
pub use config::*;
pub use iterator::*;
pub use params::*;
pub use predicates::*;
