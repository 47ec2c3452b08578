use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::aligner::AlignerState;

#[derive(Debug, Error)]
pub enum AlignError {
    /// An aligner step was requested before the step it depends on completed
    #[error("Can't {operation} while the aligner is {state}!")]
    InvalidState {
        operation: &'static str,
        state: AlignerState,
    },

    /// The scoring parameters are degenerate
    #[error("Invalid scoring model: {0}")]
    Configuration(String),

    /// The sequence is too long to be scored with 32-bit integers
    #[error("Sequence of length {0} is too long to align!")]
    SequenceTooLong(usize),

    /// Scores along a path of `length` columns could leave the 32-bit range
    #[error("Sequences with {length} combined bases can't be scored with column scores up to {max_column}!")]
    ScoreOverflow { length: usize, max_column: u32 },

    /// The gap symbol is reserved for aligned output
    #[error("Input sequence {sequence} contains the gap symbol at position {position}")]
    GapInInput { sequence: usize, position: usize },

    /// Two aligned sequences were expected to have the same length
    #[error("Aligned sequences must have equal length ({0} != {1})")]
    UnequalLength(usize, usize),

    /// A back-pointer led outside of the alignment matrix
    #[error("Traceback reached cell ({row}, {col}) without a predecessor!")]
    BrokenTraceback { row: usize, col: usize },

    /// The FASTA file did not contain a single record
    #[error("No sequences found in {0:?}")]
    NoSequences(PathBuf),

    /// Error variant when we couldn't read from a file
    #[error("Could not read from file {path:?}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Other IO errors
    #[error(transparent)]
    Io(#[from] io::Error),
}
