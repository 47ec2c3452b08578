pub mod fasta;
pub mod view;

pub use fasta::{load_first_sequence, open_fasta, read_sequences, write_aligned_pair, SequenceRecord};
pub use view::AlignmentView;
