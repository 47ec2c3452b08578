use std::fmt::{Display, Formatter};
use std::ops::Range;

use itertools::Itertools;
use serde::{Serialize, Serializer};

use crate::errors::AlignError;

/// Placeholder inserted into aligned output, never valid in input sequences
pub const GAP_SYMBOL: u8 = b'-';

/// Kind of a single alignment column
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum AlignOp {
    Match,
    Mismatch,

    /// Symbol of the second sequence against a gap
    Insertion,

    /// Symbol of the first sequence against a gap
    Deletion,
}

impl AlignOp {
    pub fn classify(a: u8, b: u8) -> Self {
        if a == GAP_SYMBOL {
            Self::Insertion
        } else if b == GAP_SYMBOL {
            Self::Deletion
        } else if a == b {
            Self::Match
        } else {
            Self::Mismatch
        }
    }

    pub fn is_gap(&self) -> bool {
        matches!(self, Self::Insertion | Self::Deletion)
    }

    /// Extended CIGAR operation character
    pub fn cigar_char(&self) -> char {
        match self {
            Self::Match => '=',
            Self::Mismatch => 'X',
            Self::Insertion => 'I',
            Self::Deletion => 'D',
        }
    }

    fn match_line_char(&self) -> u8 {
        match self {
            Self::Match => b'|',
            Self::Mismatch => b'*',
            Self::Insertion | Self::Deletion => b' ',
        }
    }
}

/// Column counts of an alignment
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AlignmentStats {
    pub matches: usize,
    pub mismatches: usize,
    pub gaps: usize,
}

impl AlignmentStats {
    /// Count the columns of two aligned sequences.
    pub fn from_aligned(aligned1: &[u8], aligned2: &[u8]) -> Result<Self, AlignError> {
        if aligned1.len() != aligned2.len() {
            return Err(AlignError::UnequalLength(aligned1.len(), aligned2.len()));
        }

        Ok(Self::count(aligned1, aligned2))
    }

    fn count(aligned1: &[u8], aligned2: &[u8]) -> Self {
        let mut stats = Self::default();
        for (&a, &b) in aligned1.iter().zip(aligned2) {
            match AlignOp::classify(a, b) {
                AlignOp::Match => stats.matches += 1,
                AlignOp::Mismatch => stats.mismatches += 1,
                AlignOp::Insertion | AlignOp::Deletion => stats.gaps += 1,
            }
        }

        stats
    }

    pub fn alignment_length(&self) -> usize {
        self.matches + self.mismatches + self.gaps
    }

    /// Share of `count` in the alignment length, 0 for an empty alignment.
    pub fn percentage(&self, count: usize) -> f64 {
        let length = self.alignment_length();
        if length == 0 {
            return 0.0;
        }

        count as f64 / length as f64 * 100.0
    }

    pub fn percent_identity(&self) -> f64 {
        self.percentage(self.matches)
    }
}

fn bytes_as_str<B, S>(bytes: &B, serializer: S) -> Result<S::Ok, S::Error>
where
    B: AsRef<[u8]>,
    S: Serializer,
{
    serializer.serialize_str(&String::from_utf8_lossy(bytes.as_ref()))
}

/// Two equal-length aligned sequences with their score.
///
/// `seq1_range` and `seq2_range` give the part of each input covered by the
/// alignment; for global alignments that is the whole sequence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AlignmentResult {
    #[serde(serialize_with = "bytes_as_str")]
    aligned1: Vec<u8>,

    #[serde(serialize_with = "bytes_as_str")]
    aligned2: Vec<u8>,

    score: i32,
    stats: AlignmentStats,
    seq1_range: Range<usize>,
    seq2_range: Range<usize>,
}

impl AlignmentResult {
    pub(crate) fn new(
        aligned1: Vec<u8>,
        aligned2: Vec<u8>,
        score: i32,
        seq1_range: Range<usize>,
        seq2_range: Range<usize>,
    ) -> Self {
        debug_assert_eq!(aligned1.len(), aligned2.len());
        let stats = AlignmentStats::count(&aligned1, &aligned2);

        Self {
            aligned1,
            aligned2,
            score,
            stats,
            seq1_range,
            seq2_range,
        }
    }

    pub fn aligned1(&self) -> &[u8] {
        &self.aligned1
    }

    pub fn aligned2(&self) -> &[u8] {
        &self.aligned2
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn stats(&self) -> &AlignmentStats {
        &self.stats
    }

    pub fn matches(&self) -> usize {
        self.stats.matches
    }

    pub fn mismatches(&self) -> usize {
        self.stats.mismatches
    }

    pub fn gaps(&self) -> usize {
        self.stats.gaps
    }

    pub fn len(&self) -> usize {
        self.aligned1.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aligned1.is_empty()
    }

    pub fn percent_identity(&self) -> f64 {
        self.stats.percent_identity()
    }

    pub fn seq1_range(&self) -> Range<usize> {
        self.seq1_range.clone()
    }

    pub fn seq2_range(&self) -> Range<usize> {
        self.seq2_range.clone()
    }

    pub fn operations(&self) -> impl Iterator<Item = AlignOp> + '_ {
        self.aligned1.iter()
            .zip(&self.aligned2)
            .map(|(&a, &b)| AlignOp::classify(a, b))
    }

    /// Run-length encoded operations, e.g. `2=1D1=`.
    pub fn cigar(&self) -> String {
        self.operations()
            .dedup_with_count()
            .map(|(count, op)| format!("{count}{}", op.cigar_char()))
            .collect()
    }

    /// `|` for matches, `*` for mismatches and a space for gaps
    pub fn match_line(&self) -> Vec<u8> {
        self.operations()
            .map(|op| op.match_line_char())
            .collect()
    }
}

impl Display for AlignmentResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\n{}\n{}",
            String::from_utf8_lossy(&self.aligned1),
            String::from_utf8_lossy(&self.match_line()),
            String::from_utf8_lossy(&self.aligned2),
        )
    }
}


#[cfg(test)]
mod tests {
    use super::{AlignOp, AlignmentResult, AlignmentStats};
    use crate::errors::AlignError;

    fn result(aligned1: &str, aligned2: &str, score: i32) -> AlignmentResult {
        let len = aligned1.len();
        AlignmentResult::new(aligned1.into(), aligned2.into(), score, 0..len, 0..len)
    }

    #[test]
    fn test_classify() {
        assert_eq!(AlignOp::classify(b'A', b'A'), AlignOp::Match);
        assert_eq!(AlignOp::classify(b'A', b'G'), AlignOp::Mismatch);
        assert_eq!(AlignOp::classify(b'-', b'G'), AlignOp::Insertion);
        assert_eq!(AlignOp::classify(b'A', b'-'), AlignOp::Deletion);
        assert_eq!(AlignOp::classify(b'-', b'-'), AlignOp::Insertion);
    }

    #[test]
    fn test_stats() {
        let stats = AlignmentStats::from_aligned(b"ACGT-ACGT-ACGT", b"ACGTAACGTAACTT").unwrap();
        assert_eq!(stats.matches, 11);
        assert_eq!(stats.mismatches, 1);
        assert_eq!(stats.gaps, 2);
        assert_eq!(stats.alignment_length(), 14);
        assert!((stats.percent_identity() - 78.571).abs() < 0.001);

        let empty = AlignmentStats::from_aligned(b"", b"").unwrap();
        assert_eq!(empty.percent_identity(), 0.0);
        assert_eq!(empty.percentage(empty.gaps), 0.0);

        assert!(matches!(
            AlignmentStats::from_aligned(b"ACG", b"AC"),
            Err(AlignError::UnequalLength(3, 2))
        ));
    }

    #[test]
    fn test_cigar_and_match_line() {
        let aln = result("AC-GTT", "ACAGT-", 0);
        assert_eq!(aln.cigar(), "2=1I2=1D");
        assert_eq!(aln.match_line(), b"|| || ");

        let aln = result("ACCT", "AGCT", 2);
        assert_eq!(aln.cigar(), "1=1X2=");
        assert_eq!(format!("{aln}"), "ACCT\n|*||\nAGCT");

        assert_eq!(result("", "", 0).cigar(), "");
    }

    #[test]
    fn test_serialize() {
        let aln = result("A-GT", "ACGT", 1);
        let json = serde_json::to_value(&aln).unwrap();

        assert_eq!(json["aligned1"], "A-GT");
        assert_eq!(json["aligned2"], "ACGT");
        assert_eq!(json["score"], 1);
        assert_eq!(json["stats"]["gaps"], 1);
        assert_eq!(json["seq1_range"]["end"], 4);
    }
}
