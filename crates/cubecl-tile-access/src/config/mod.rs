mod base;
mod logger;
mod validation;

pub use base::*;
pub use logger::*;
pub use validation::*;
