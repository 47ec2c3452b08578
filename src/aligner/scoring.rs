use serde::Serialize;

use crate::alignment::GAP_SYMBOL;
use crate::errors::AlignError;

pub const DEFAULT_MATCH: i32 = 1;
pub const DEFAULT_MISMATCH: i32 = -1;
pub const DEFAULT_GAP: i32 = -2;

/// Match/mismatch scores with a linear gap penalty.
///
/// Every gap position costs `gap_penalty`; there is no separate gap-open cost.
/// Scores are maximized, so the penalty is zero or negative.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScoringModel {
    match_score: i32,
    mismatch_score: i32,
    gap_penalty: i32,
}

impl ScoringModel {
    /// Create a new scoring model.
    ///
    /// Fails with [`AlignError::Configuration`] if a match does not score
    /// strictly better than a mismatch, or if gaps would be rewarded.
    pub fn new(match_score: i32, mismatch_score: i32, gap_penalty: i32) -> Result<Self, AlignError> {
        if match_score <= mismatch_score {
            return Err(AlignError::Configuration(format!(
                "match score ({match_score}) must be greater than mismatch score ({mismatch_score})"
            )));
        }

        if gap_penalty > 0 {
            return Err(AlignError::Configuration(format!(
                "gap penalty ({gap_penalty}) must be zero or negative"
            )));
        }

        Ok(Self {
            match_score,
            mismatch_score,
            gap_penalty,
        })
    }

    #[inline]
    pub fn match_score(&self) -> i32 {
        self.match_score
    }

    #[inline]
    pub fn mismatch_score(&self) -> i32 {
        self.mismatch_score
    }

    #[inline]
    pub fn gap_penalty(&self) -> i32 {
        self.gap_penalty
    }

    /// Largest magnitude any single column can contribute to a score.
    pub fn max_column_magnitude(&self) -> u32 {
        [self.match_score, self.mismatch_score, self.gap_penalty]
            .into_iter()
            .map(i32::unsigned_abs)
            .max()
            .unwrap_or(0)
    }

    /// Score of aligning symbol `a` against symbol `b`.
    #[inline]
    pub fn substitution(&self, a: u8, b: u8) -> i32 {
        if a == b && a != GAP_SYMBOL {
            self.match_score
        } else {
            self.mismatch_score
        }
    }

    /// Score of a single aligned column, gaps included.
    pub fn column(&self, a: u8, b: u8) -> i32 {
        if a == GAP_SYMBOL || b == GAP_SYMBOL {
            self.gap_penalty
        } else {
            self.substitution(a, b)
        }
    }
}

impl Default for ScoringModel {
    fn default() -> Self {
        Self {
            match_score: DEFAULT_MATCH,
            mismatch_score: DEFAULT_MISMATCH,
            gap_penalty: DEFAULT_GAP,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::ScoringModel;
    use crate::errors::AlignError;

    #[test]
    fn test_default_scores() {
        let scoring = ScoringModel::default();

        assert_eq!(scoring.substitution(b'A', b'A'), 1);
        assert_eq!(scoring.substitution(b'A', b'C'), -1);
        assert_eq!(scoring.gap_penalty(), -2);

        // The gap marker never counts as a match, not even against itself
        assert_eq!(scoring.substitution(b'-', b'-'), -1);
        assert_eq!(scoring.column(b'-', b'A'), -2);
        assert_eq!(scoring.column(b'G', b'G'), 1);
    }

    #[test]
    fn test_max_column_magnitude() {
        assert_eq!(ScoringModel::default().max_column_magnitude(), 2);
        assert_eq!(ScoringModel::new(5, -4, -3).unwrap().max_column_magnitude(), 5);
        assert_eq!(ScoringModel::new(1, -1, i32::MIN).unwrap().max_column_magnitude(), 1 << 31);
    }

    #[test]
    fn test_custom_scores() {
        let scoring = ScoringModel::new(5, -4, -10).unwrap();
        assert_eq!(scoring.substitution(b'T', b'T'), 5);
        assert_eq!(scoring.substitution(b'T', b'G'), -4);
        assert_eq!(scoring.column(b'T', b'-'), -10);

        assert!(ScoringModel::new(1, -1, 0).is_ok());
    }

    #[test]
    fn test_degenerate_scores() {
        assert!(matches!(ScoringModel::new(1, 1, -2), Err(AlignError::Configuration(_))));
        assert!(matches!(ScoringModel::new(-1, 1, -2), Err(AlignError::Configuration(_))));
        assert!(matches!(ScoringModel::new(1, -1, 2), Err(AlignError::Configuration(_))));
    }
}
