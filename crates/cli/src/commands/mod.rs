pub mod lift;

pub use lift::*;
