//! Score constants for evaluation and search

/// Score constants shared by the evaluator and the search
pub struct Score;

impl Score {
    /// Win by reaching a terminal state at ply 0
    pub const MATE: i32 = 100_000;
    /// Bound larger than any reachable score
    pub const INFINITY: i32 = 1_000_000;
    /// Scores beyond this magnitude encode a forced result
    pub const MATE_THRESHOLD: i32 = Self::MATE - 1_000;

    /// Static value of a decided game, as seen by the evaluator
    pub const DECIDED: i32 = Self::MATE - 100;

    pub const PAWN: i32 = 100;
    pub const QUEEN: i32 = 900;
}

/// Whether a score encodes a forced win or loss
#[inline]
pub fn is_mate_score(score: i32) -> bool {
    score.abs() > Score::MATE_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mate_score_detection() {
        assert!(is_mate_score(Score::MATE - 5));
        assert!(is_mate_score(-(Score::MATE - 5)));
        assert!(is_mate_score(Score::DECIDED));
        assert!(!is_mate_score(Score::QUEEN * 8));
        assert!(!is_mate_score(0));
    }
}
