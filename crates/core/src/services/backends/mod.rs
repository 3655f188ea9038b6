pub mod clang;
pub mod ghidra;
pub mod uwin_lift;

pub use clang::UwinClang;
pub use ghidra::GhidraHeadless;
pub use uwin_lift::UwinLift;
