pub mod matrix;
pub mod scoring;
pub mod span;

use std::fmt::{Display, Formatter};
use std::marker::PhantomData;

use tracing::{debug, debug_span, trace};

use crate::alignment::{AlignmentResult, GAP_SYMBOL};
use crate::errors::AlignError;
use matrix::{AlignmentMatrix, Cell, Origin};
pub use scoring::ScoringModel;
pub use span::{AlignmentSpan, CellPos, Global, Local};

/// Lifecycle of a [`PairwiseAligner`]. Steps can't be skipped.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AlignerState {
    /// No sequences loaded
    Empty,

    /// Matrix allocated and boundary row/column set
    Initialized,

    /// All cells computed
    Filled,

    /// Alignment reconstructed, matrix released
    TracedBack,
}

impl Display for AlignerState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Empty => "empty",
            Self::Initialized => "initialized",
            Self::Filled => "filled",
            Self::TracedBack => "traced back",
        };

        f.write_str(name)
    }
}

/// Dynamic programming pairwise aligner, generic over global or local span.
///
/// One alignment runs `initialize` -> `fill` -> `traceback`, or all three at
/// once with [`PairwiseAligner::align`]. The matrix lives only for the
/// duration of one alignment and is dropped after traceback. Calling
/// `initialize` again starts over with a fresh matrix.
pub struct PairwiseAligner<S> {
    scoring: ScoringModel,
    seq1: Vec<u8>,
    seq2: Vec<u8>,
    matrix: Option<AlignmentMatrix>,
    best: Cell,
    best_pos: CellPos,
    state: AlignerState,
    span: PhantomData<S>,
}

pub type GlobalAligner = PairwiseAligner<Global>;
pub type LocalAligner = PairwiseAligner<Local>;

impl<S> PairwiseAligner<S>
where
    S: AlignmentSpan,
{
    pub fn new(scoring: ScoringModel) -> Self {
        Self {
            scoring,
            seq1: Vec::new(),
            seq2: Vec::new(),
            matrix: None,
            best: Cell::default(),
            best_pos: CellPos::default(),
            state: AlignerState::Empty,
            span: PhantomData,
        }
    }

    pub fn scoring(&self) -> &ScoringModel {
        &self.scoring
    }

    pub fn state(&self) -> AlignerState {
        self.state
    }

    /// The DP matrix, available between `initialize` and `traceback`.
    pub fn matrix(&self) -> Option<&AlignmentMatrix> {
        self.matrix.as_ref()
    }

    /// Run all steps and return the reconstructed alignment.
    pub fn align<Seq1, Seq2>(&mut self, seq1: &Seq1, seq2: &Seq2) -> Result<AlignmentResult, AlignError>
    where
        Seq1: AsRef<[u8]> + ?Sized,
        Seq2: AsRef<[u8]> + ?Sized,
    {
        let span = debug_span!("align", mode = S::NAME);
        let _enter = span.enter();

        self.initialize(seq1.as_ref(), seq2.as_ref())?;
        self.fill()?;
        self.traceback()
    }

    /// Load two sequences, allocate the matrix and set its boundary.
    pub fn initialize(&mut self, seq1: &[u8], seq2: &[u8]) -> Result<(), AlignError> {
        // Drop any state left over from an earlier alignment first
        self.matrix = None;
        self.state = AlignerState::Empty;

        for (seq_no, seq) in [(1, seq1), (2, seq2)] {
            if i32::try_from(seq.len()).is_err() {
                return Err(AlignError::SequenceTooLong(seq.len()));
            }

            if let Some(position) = seq.iter().position(|&c| c == GAP_SYMBOL) {
                return Err(AlignError::GapInInput { sequence: seq_no, position });
            }
        }

        // Every cell and candidate score is bounded by the path length times
        // the largest column score in magnitude
        let length = seq1.len() + seq2.len();
        let max_column = self.scoring.max_column_magnitude();
        let fits = (length as u64)
            .checked_mul(u64::from(max_column))
            .is_some_and(|bound| bound <= i32::MAX as u64);

        if !fits {
            return Err(AlignError::ScoreOverflow { length, max_column });
        }

        let mut matrix = AlignmentMatrix::new(seq1.len(), seq2.len())?;
        debug!(rows = matrix.rows(), cols = matrix.cols(), "Allocated alignment matrix");

        let gap = self.scoring.gap_penalty();
        for j in 1..matrix.cols() {
            matrix.set(0, j, S::boundary(j, gap, Origin::Left));
        }

        for i in 1..matrix.rows() {
            matrix.set(i, 0, S::boundary(i, gap, Origin::Up));
        }

        self.seq1 = seq1.to_vec();
        self.seq2 = seq2.to_vec();
        self.matrix = Some(matrix);
        self.best = Cell::default();
        self.best_pos = CellPos::default();
        self.state = AlignerState::Initialized;

        Ok(())
    }

    /// Compute all inner cells in row-major order.
    pub fn fill(&mut self) -> Result<(), AlignError> {
        let Some(matrix) = self.matrix.as_mut().filter(|_| self.state == AlignerState::Initialized) else {
            return Err(AlignError::InvalidState { operation: "fill the matrix", state: self.state });
        };

        let gap = self.scoring.gap_penalty();
        for i in 1..matrix.rows() {
            for j in 1..matrix.cols() {
                let diag = matrix.get(i - 1, j - 1).score
                    + self.scoring.substitution(self.seq1[i - 1], self.seq2[j - 1]);
                let up = matrix.get(i - 1, j).score + gap;
                let left = matrix.get(i, j - 1).score + gap;

                let cell = S::close_cell(diag, up, left);
                matrix.set(i, j, cell);

                // Strictly greater, so the first cell in scan order wins ties
                if S::TRACK_BEST && cell.score > self.best.score {
                    self.best = cell;
                    self.best_pos = CellPos::new(i, j);
                }
            }
        }

        if S::TRACK_BEST {
            trace!(score = self.best.score, row = self.best_pos.row, col = self.best_pos.col, "Best local cell");
        }

        self.state = AlignerState::Filled;

        Ok(())
    }

    /// Walk the back-pointers from the span's start cell and build the
    /// aligned sequences. Releases the matrix.
    pub fn traceback(&mut self) -> Result<AlignmentResult, AlignError> {
        if self.state != AlignerState::Filled {
            return Err(AlignError::InvalidState { operation: "trace back", state: self.state });
        }

        let Some(matrix) = self.matrix.take() else {
            return Err(AlignError::InvalidState { operation: "trace back", state: AlignerState::Empty });
        };

        let start = S::traceback_start(&matrix, self.best_pos);
        let score = matrix.get(start.row, start.col).score;

        let mut pos = start;
        let mut aligned1 = Vec::with_capacity(start.row + start.col);
        let mut aligned2 = Vec::with_capacity(start.row + start.col);

        loop {
            let cell = matrix.get(pos.row, pos.col);
            if S::is_traceback_end(cell, pos) {
                break;
            }

            match cell.origin {
                Origin::Diagonal if pos.row > 0 && pos.col > 0 => {
                    aligned1.push(self.seq1[pos.row - 1]);
                    aligned2.push(self.seq2[pos.col - 1]);
                    pos.row -= 1;
                    pos.col -= 1;
                },
                Origin::Up if pos.row > 0 => {
                    aligned1.push(self.seq1[pos.row - 1]);
                    aligned2.push(GAP_SYMBOL);
                    pos.row -= 1;
                },
                Origin::Left if pos.col > 0 => {
                    aligned1.push(GAP_SYMBOL);
                    aligned2.push(self.seq2[pos.col - 1]);
                    pos.col -= 1;
                },
                _ => return Err(AlignError::BrokenTraceback { row: pos.row, col: pos.col }),
            }
        }

        // Built from the end cell backwards
        aligned1.reverse();
        aligned2.reverse();

        debug!(score, length = aligned1.len(), "Traceback done");
        self.state = AlignerState::TracedBack;

        Ok(AlignmentResult::new(
            aligned1,
            aligned2,
            score,
            pos.row..start.row,
            pos.col..start.col,
        ))
    }
}

impl<S> Default for PairwiseAligner<S>
where
    S: AlignmentSpan,
{
    fn default() -> Self {
        Self::new(ScoringModel::default())
    }
}

/// Needleman-Wunsch alignment of `seq1` and `seq2`.
pub fn global_align<Seq1, Seq2>(seq1: &Seq1, seq2: &Seq2, scoring: &ScoringModel) -> Result<AlignmentResult, AlignError>
where
    Seq1: AsRef<[u8]> + ?Sized,
    Seq2: AsRef<[u8]> + ?Sized,
{
    GlobalAligner::new(*scoring).align(seq1, seq2)
}

/// Smith-Waterman alignment of `seq1` and `seq2`.
pub fn local_align<Seq1, Seq2>(seq1: &Seq1, seq2: &Seq2, scoring: &ScoringModel) -> Result<AlignmentResult, AlignError>
where
    Seq1: AsRef<[u8]> + ?Sized,
    Seq2: AsRef<[u8]> + ?Sized,
{
    LocalAligner::new(*scoring).align(seq1, seq2)
}


#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::matrix::{Cell, Origin};
    use super::{global_align, local_align, AlignerState, GlobalAligner, LocalAligner, ScoringModel};
    use crate::alignment::{AlignmentStats, GAP_SYMBOL};
    use crate::errors::AlignError;

    fn random_seq(rng: &mut StdRng, max_len: usize) -> Vec<u8> {
        let len = rng.gen_range(0..=max_len);
        (0..len).map(|_| b"ACGT"[rng.gen_range(0..4)]).collect()
    }

    /// Score of an alignment recomputed column by column
    fn column_score(scoring: &ScoringModel, aligned1: &[u8], aligned2: &[u8]) -> i32 {
        aligned1.iter()
            .zip(aligned2)
            .map(|(&a, &b)| scoring.column(a, b))
            .sum()
    }

    fn ungapped(aligned: &[u8]) -> Vec<u8> {
        aligned.iter().copied().filter(|&c| c != GAP_SYMBOL).collect()
    }

    #[test]
    fn test_global_identical() {
        let result = global_align("ACGT", "ACGT", &ScoringModel::default()).unwrap();

        assert_eq!(result.aligned1(), b"ACGT");
        assert_eq!(result.aligned2(), b"ACGT");
        assert_eq!(result.score(), 4);
        assert_eq!(result.matches(), 4);
        assert_eq!(result.mismatches(), 0);
        assert_eq!(result.gaps(), 0);
    }

    #[test]
    fn test_global_with_gap() {
        let result = global_align("ACGT", "AGT", &ScoringModel::default()).unwrap();

        assert_eq!(result.aligned1(), b"ACGT");
        assert_eq!(result.aligned2(), b"A-GT");
        assert_eq!(result.score(), 1);
        assert_eq!(result.matches(), 3);
        assert_eq!(result.gaps(), 1);
        assert_eq!(result.seq1_range(), 0..4);
        assert_eq!(result.seq2_range(), 0..3);
    }

    #[test]
    fn test_global_empty() {
        let result = global_align("", "", &ScoringModel::default()).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.score(), 0);
        assert_eq!(result.percent_identity(), 0.0);

        let result = global_align("", "ACG", &ScoringModel::default()).unwrap();
        assert_eq!(result.aligned1(), b"---");
        assert_eq!(result.aligned2(), b"ACG");
        assert_eq!(result.score(), -6);
        assert_eq!(result.gaps(), 3);

        let result = global_align("AC", "", &ScoringModel::default()).unwrap();
        assert_eq!(result.aligned1(), b"AC");
        assert_eq!(result.aligned2(), b"--");
        assert_eq!(result.score(), -4);
    }

    #[test]
    fn test_global_boundary() {
        let mut aligner = GlobalAligner::default();
        aligner.initialize(b"ACG", b"AC").unwrap();

        let matrix = aligner.matrix().unwrap();
        assert_eq!(matrix.get(0, 0), Cell::new(0, Origin::None));
        assert_eq!(matrix.get(0, 2), Cell::new(-4, Origin::Left));
        assert_eq!(matrix.get(3, 0), Cell::new(-6, Origin::Up));
    }

    #[test]
    fn test_local_embedded() {
        let result = local_align("TTTACGTTTT", "ACGT", &ScoringModel::default()).unwrap();

        assert_eq!(result.aligned1(), b"ACGT");
        assert_eq!(result.aligned2(), b"ACGT");
        assert_eq!(result.score(), 4);
        assert_eq!(result.seq1_range(), 3..7);
        assert_eq!(result.seq2_range(), 0..4);
    }

    #[test]
    fn test_local_dissimilar() {
        let result = local_align("AAAA", "TTTT", &ScoringModel::default()).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.score(), 0);
        assert_eq!(result.aligned1(), b"");
        assert_eq!(result.aligned2(), b"");

        let result = local_align("", "ACGT", &ScoringModel::default()).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.score(), 0);
    }

    #[test]
    fn test_local_first_maximum_wins() {
        // Both "AC" occurrences score 2, the one found first in row-major order is reported
        let result = local_align("ACTTAC", "AC", &ScoringModel::default()).unwrap();
        assert_eq!(result.score(), 2);
        assert_eq!(result.seq1_range(), 0..2);
    }

    #[test]
    fn test_local_with_gap() {
        let scoring = ScoringModel::new(2, -1, -1).unwrap();
        let result = local_align("GGACGTACGG", "TTACTACTT", &scoring).unwrap();

        assert_eq!(result.score(), column_score(&scoring, result.aligned1(), result.aligned2()));
        assert!(result.gaps() > 0);
        assert_eq!(ungapped(result.aligned1()), b"GGACGTACGG"[result.seq1_range()].to_vec());
        assert_eq!(ungapped(result.aligned2()), b"TTACTACTT"[result.seq2_range()].to_vec());
    }

    #[test]
    fn test_state_machine() {
        let mut aligner = LocalAligner::default();
        assert_eq!(aligner.state(), AlignerState::Empty);

        assert!(matches!(aligner.fill(), Err(AlignError::InvalidState { state: AlignerState::Empty, .. })));
        assert!(matches!(aligner.traceback(), Err(AlignError::InvalidState { .. })));

        aligner.initialize(b"ACGT", b"CG").unwrap();
        assert_eq!(aligner.state(), AlignerState::Initialized);
        assert!(matches!(aligner.traceback(), Err(AlignError::InvalidState { state: AlignerState::Initialized, .. })));

        aligner.fill().unwrap();
        assert_eq!(aligner.state(), AlignerState::Filled);
        assert!(matches!(aligner.fill(), Err(AlignError::InvalidState { state: AlignerState::Filled, .. })));

        let result = aligner.traceback().unwrap();
        assert_eq!(aligner.state(), AlignerState::TracedBack);
        assert!(aligner.matrix().is_none());
        assert_eq!(result.aligned1(), b"CG");

        // The aligner can be reused for a new pair
        let result = aligner.align("GGG", "GG").unwrap();
        assert_eq!(result.score(), 2);
    }

    #[test]
    fn test_gap_symbol_rejected() {
        let mut aligner = GlobalAligner::default();
        let err = aligner.align("AC-T", "ACT").unwrap_err();
        assert!(matches!(err, AlignError::GapInInput { sequence: 1, position: 2 }));
        assert_eq!(aligner.state(), AlignerState::Empty);
    }

    #[test]
    fn test_score_range_checked() {
        let huge_gap = ScoringModel::new(1, -1, -2_000_000_000).unwrap();
        let err = global_align("AA", "", &huge_gap).unwrap_err();
        assert!(matches!(err, AlignError::ScoreOverflow { length: 2, max_column: 2_000_000_000 }));

        let huge_match = ScoringModel::new(2_000_000_000, -1, -1).unwrap();
        let err = local_align("AA", "AA", &huge_match).unwrap_err();
        assert!(matches!(err, AlignError::ScoreOverflow { length: 4, .. }));

        let mut aligner = GlobalAligner::new(huge_gap);
        assert!(aligner.initialize(b"AA", b"").is_err());
        assert_eq!(aligner.state(), AlignerState::Empty);
        assert!(aligner.matrix().is_none());

        // Right at the edge of the range still aligns exactly
        let edge = ScoringModel::new(1, -1, -1_000_000_000).unwrap();
        let result = global_align("AA", "", &edge).unwrap();
        assert_eq!(result.score(), -2_000_000_000);
        assert_eq!(result.aligned2(), b"--");

        let err = local_align("A", "A", &ScoringModel::new(i32::MAX, -1, -1).unwrap()).unwrap_err();
        assert!(matches!(err, AlignError::ScoreOverflow { length: 2, .. }));
    }

    #[test]
    fn test_random_global_properties() {
        let mut rng = StdRng::seed_from_u64(31);
        let scoring = ScoringModel::default();

        for _ in 0..200 {
            let a = random_seq(&mut rng, 40);
            let b = random_seq(&mut rng, 40);

            let result = global_align(&a, &b, &scoring).unwrap();
            assert_eq!(result.aligned1().len(), result.aligned2().len());
            assert_eq!(ungapped(result.aligned1()), a);
            assert_eq!(ungapped(result.aligned2()), b);
            assert_eq!(result.score(), column_score(&scoring, result.aligned1(), result.aligned2()));

            let swapped = global_align(&b, &a, &scoring).unwrap();
            assert_eq!(result.score(), swapped.score());

            let stats = AlignmentStats::from_aligned(result.aligned1(), result.aligned2()).unwrap();
            assert_eq!(&stats, result.stats());

            let own = global_align(&a, &a, &scoring).unwrap();
            assert_eq!(own.score(), a.len() as i32 * scoring.match_score());
            assert_eq!(own.gaps(), 0);
            assert_eq!(own.mismatches(), 0);
        }
    }

    #[test]
    fn test_random_local_properties() {
        let mut rng = StdRng::seed_from_u64(7);
        let scoring = ScoringModel::new(2, -3, -2).unwrap();

        for _ in 0..200 {
            let a = random_seq(&mut rng, 40);
            let b = random_seq(&mut rng, 40);

            let result = local_align(&a, &b, &scoring).unwrap();
            assert!(result.score() >= 0);
            assert_eq!(result.aligned1().len(), result.aligned2().len());
            assert_eq!(result.score(), column_score(&scoring, result.aligned1(), result.aligned2()));
            assert_eq!(ungapped(result.aligned1()), a[result.seq1_range()].to_vec());
            assert_eq!(ungapped(result.aligned2()), b[result.seq2_range()].to_vec());

            let swapped = local_align(&b, &a, &scoring).unwrap();
            assert_eq!(result.score(), swapped.score());

            let global = global_align(&a, &b, &scoring).unwrap();
            assert!(result.score() >= global.score());
        }
    }
}
