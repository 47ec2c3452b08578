pub mod errors;
pub mod aligner;
pub mod alignment;
pub mod io;
pub mod gc;

pub use aligner::{global_align, local_align, GlobalAligner, LocalAligner, ScoringModel};
pub use alignment::{AlignmentResult, AlignmentStats, GAP_SYMBOL};
pub use errors::AlignError;
