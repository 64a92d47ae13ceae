mod common;

use common::{parse_line, score_key, CHECKMATED, MATED_IN_ONE, STALEMATE, STARTPOS};
use piebridge::error::is_error_sentinel;
use piebridge::{Session, NO_LEGAL_MOVES};
use pretty_assertions::assert_eq;

fn ready() -> Session {
    let mut s = Session::default();
    s.init(None, None);
    s
}

#[test]
fn three_ranked_lines_from_startpos() {
    let mut s = ready();
    let text = s.evaluate_multipv(STARTPOS, 3, 3).to_string();
    let lines: Vec<_> = text.lines().map(parse_line).collect();
    assert_eq!(lines.len(), 3, "output was:\n{text}");
    assert_eq!(lines.iter().map(|l| l.0).collect::<Vec<_>>(), vec![1, 2, 3]);
    for w in lines.windows(2) {
        assert!(score_key(&w[0].1) >= score_key(&w[1].1), "lines out of order:\n{text}");
        assert_ne!(w[0].2.first(), w[1].2.first());
    }
    for (_, _, pv) in &lines {
        assert!(!pv.is_empty(), "missing pv:\n{text}");
    }
}

#[test]
fn line_count_is_capped_by_legal_moves() {
    let mut s = ready();
    let text = s.evaluate_multipv(MATED_IN_ONE, 3, 5).to_string();
    let lines: Vec<_> = text.lines().map(parse_line).collect();
    assert_eq!(lines.len(), 1, "output was:\n{text}");
    let (rank, score, pv) = &lines[0];
    assert_eq!(*rank, 1);
    assert_eq!(score, "Mate in -1");
    assert_eq!(pv.first().map(String::as_str), Some("h8h7"));
}

#[test]
fn never_more_lines_than_moves() {
    // White's king has three moves
    let fen = "k7/8/8/8/8/8/8/K7 w - - 0 1";
    let mut s = ready();
    let text = s.evaluate_multipv(fen, 2, 10).to_string();
    assert_eq!(text.lines().count(), 3, "output was:\n{text}");
}

#[test]
fn finished_games_report_no_legal_moves() {
    let mut s = ready();
    assert_eq!(s.evaluate_multipv(CHECKMATED, 3, 3), NO_LEGAL_MOVES);
    assert_eq!(s.evaluate_multipv(STALEMATE, 3, 3), NO_LEGAL_MOVES);
}

#[test]
fn invalid_requests_give_error_sentinels() {
    let mut s = ready();
    assert!(is_error_sentinel(s.evaluate_multipv(STARTPOS, 3, 0)));
    assert!(is_error_sentinel(s.evaluate_multipv(STARTPOS, 0, 3)));
    assert!(is_error_sentinel(s.evaluate_multipv("8/8/8 w - - 0 1", 3, 3)));
}

#[test]
fn single_line_agrees_with_evaluate() {
    let mut s = ready();
    let single = s.evaluate(common::MATE_IN_ONE, 3).to_string();
    let text = s.evaluate_multipv(common::MATE_IN_ONE, 3, 1).to_string();
    let (_, score, pv) = parse_line(&text);
    assert_eq!(score, single);
    assert_eq!(pv, vec!["a1a8".to_string()]);
}
