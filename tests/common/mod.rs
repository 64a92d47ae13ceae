#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

pub const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
// White plays Ra8#.
pub const MATE_IN_ONE: &str = "6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1";
// Black's only move Kh7 allows Rh1#.
pub const MATED_IN_ONE: &str = "7k/5K2/8/8/8/8/8/6R1 b - - 0 1";
pub const CHECKMATED: &str = "R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1";
pub const STALEMATE: &str = "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1";

pub fn tmp_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name)
}

/// Writes a network whose weights are all zero apart from the output bias,
/// so it evaluates every position to `bias` for the side to move.
pub fn write_bias_net(name: &str, input_dim: u32, hidden_dim: u32, bias: f32) -> PathBuf {
    let path = tmp_path(name);
    let mut f = File::create(&path).unwrap();
    f.write_all(b"PIENNUE1").unwrap();
    f.write_all(&1u32.to_le_bytes()).unwrap();
    f.write_all(&input_dim.to_le_bytes()).unwrap();
    f.write_all(&hidden_dim.to_le_bytes()).unwrap();
    f.write_all(&1u32.to_le_bytes()).unwrap();
    // w1, b1, w2
    for _ in 0..(input_dim * hidden_dim + 2 * hidden_dim) { f.write_all(&0f32.to_le_bytes()).unwrap(); }
    f.write_all(&bias.to_le_bytes()).unwrap();
    path
}

/// `-?\d+\.\d`
pub fn is_pawn_string(s: &str) -> bool {
    let body = s.strip_prefix('-').unwrap_or(s);
    let Some((whole, frac)) = body.split_once('.') else { return false; };
    !whole.is_empty() && whole.bytes().all(|b| b.is_ascii_digit())
        && frac.len() == 1 && frac.bytes().all(|b| b.is_ascii_digit())
}

/// `Mate in -?\d+`
pub fn is_mate_string(s: &str) -> bool {
    let Some(n) = s.strip_prefix("Mate in ") else { return false; };
    let digits = n.strip_prefix('-').unwrap_or(n);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Splits `"{rank}: {score} pv {moves}"` into its parts.
pub fn parse_line(line: &str) -> (usize, String, Vec<String>) {
    let (rank, rest) = line.split_once(": ").expect("rank prefix");
    let (score, pv) = match rest.split_once(" pv ") {
        Some((s, pv)) => (s, pv.split_whitespace().map(str::to_string).collect()),
        None => (rest, Vec::new()),
    };
    (rank.parse().expect("numeric rank"), score.to_string(), pv)
}

/// Orders scores for comparison: mates beyond any pawn value, shorter mates first.
pub fn score_key(score: &str) -> f64 {
    if let Some(n) = score.strip_prefix("Mate in ") {
        let n: f64 = n.parse().unwrap();
        if n > 0.0 { 1e6 - n } else { -1e6 - n }
    } else {
        score.parse().unwrap()
    }
}
