//! Text rendering of engine scores.
//!
//! Centipawn scores print in pawns with one decimal (`0.3`, `-1.2`); mate
//! scores print as `Mate in N`, with `N` in full moves, negative when the side
//! to move is the one being mated.

use std::fmt;
use crate::search::eval::{is_mate_score, MATE_SCORE};

/// Multi-PV answer for a position with nothing to search.
pub const NO_LEGAL_MOVES: &str = "No legal moves";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    Cp(i32),
    /// Full moves to mate; `0` means the side to move is already mated.
    Mate(i32),
}

impl Score {
    pub fn from_raw(raw: i32) -> Self {
        if !is_mate_score(raw) { return Score::Cp(raw); }
        let n = mate_distance(raw);
        Score::Mate(if raw > 0 { n } else { -n })
    }

    pub fn is_mate(&self) -> bool { matches!(self, Score::Mate(_)) }
}

/// Full moves to mate for a raw mate score. Odd ply counts (the side to move
/// delivers mate) round up.
pub fn mate_distance(raw: i32) -> i32 {
    (MATE_SCORE - raw.abs() + 1).max(0) / 2
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Score::Cp(cp) => f.write_str(&format_pawns(cp)),
            Score::Mate(n) => write!(f, "Mate in {n}"),
        }
    }
}

/// Centipawns as pawns with one decimal, rounded half away from zero.
pub fn format_pawns(cp: i32) -> String {
    let tenths = (cp.unsigned_abs() + 5) / 10;
    let sign = if cp < 0 && tenths != 0 { "-" } else { "" };
    format!("{}{}.{}", sign, tenths / 10, tenths % 10)
}

pub fn format_score(raw: i32) -> String { Score::from_raw(raw).to_string() }

/// One ranked multi-PV line: `"{rank}: {score} pv {moves}"`.
pub fn format_line(rank: usize, raw: i32, pv: &[String]) -> String {
    if pv.is_empty() { return format!("{rank}: {}", format_score(raw)); }
    format!("{rank}: {} pv {}", format_score(raw), pv.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn pawns_round_to_one_decimal() {
        assert_eq!(format_pawns(0), "0.0");
        assert_eq!(format_pawns(34), "0.3");
        assert_eq!(format_pawns(35), "0.4");
        assert_eq!(format_pawns(-120), "-1.2");
        assert_eq!(format_pawns(-4), "0.0");
        assert_eq!(format_pawns(1999), "20.0");
    }

    #[test]
    fn mate_scores_use_move_counts() {
        assert_eq!(format_score(MATE_SCORE - 1), "Mate in 1");
        assert_eq!(format_score(MATE_SCORE - 3), "Mate in 2");
        assert_eq!(format_score(-(MATE_SCORE - 2)), "Mate in -1");
        assert_eq!(format_score(-(MATE_SCORE - 4)), "Mate in -2");
        assert_eq!(format_score(-MATE_SCORE), "Mate in 0");
    }

    #[test]
    fn line_carries_rank_and_pv() {
        let pv = vec!["e2e4".to_string(), "e7e5".to_string()];
        assert_eq!(format_line(1, 25, &pv), "1: 0.3 pv e2e4 e7e5");
        assert_eq!(format_line(3, MATE_SCORE - 1, &[]), "3: Mate in 1");
    }
}
