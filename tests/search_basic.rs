use cozy_chess::Board;
use piebridge::search::alphabeta::{SearchParams, Searcher};
use piebridge::search::eval::MATE_SCORE;

#[test]
fn eval_material_startpos_is_zeroish() {
    use piebridge::search::eval::material_eval_cp;
    let cp = material_eval_cp(&Board::default());
    assert!(cp.abs() < 5, "startpos material not near zero: {cp}");
}

#[test]
fn search_returns_legal_move_startpos() {
    let b = Board::default();
    let mut searcher = Searcher::default();
    let res = searcher.search_depth(&b, 1);
    assert!(res.bestmove().is_some(), "no move found at depth 1");
    assert_eq!(res.lines.len(), 1);
}

#[test]
fn search_prefers_winning_queen_capture() {
    // Qe2xd2 wins a queen
    let b = Board::from_fen("k7/8/8/8/8/8/3qQ3/7K w - - 0 1", false).expect("valid fen");
    let mut searcher = Searcher::default();
    let res = searcher.search_depth(&b, 2);
    assert_eq!(res.bestmove(), Some("e2d2"));
}

#[test]
fn search_finds_back_rank_mate() {
    let b = Board::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1", false).unwrap();
    let mut searcher = Searcher::default();
    let res = searcher.search_depth(&b, 3);
    let best = res.best().expect("a line");
    assert_eq!(res.bestmove(), Some("a1a8"));
    assert_eq!(best.score, MATE_SCORE - 1);
}

#[test]
fn multipv_lines_are_ranked_and_distinct() {
    let b = Board::default();
    let mut searcher = Searcher::default();
    let p = SearchParams { depth: 3, multipv: 4, ..SearchParams::default() };
    let res = searcher.search_with_params(&b, p);
    assert_eq!(res.lines.len(), 4);
    for w in res.lines.windows(2) {
        assert!(w[0].score >= w[1].score, "lines out of order: {} < {}", w[0].score, w[1].score);
        assert_ne!(w[0].mv, w[1].mv);
    }
    for line in &res.lines {
        assert_eq!(line.pv.first().cloned(), Some(format!("{}", line.mv)));
    }
}

#[test]
fn multipv_request_is_capped_by_legal_moves() {
    // Black has a single legal move
    let b = Board::from_fen("7k/5K2/8/8/8/8/8/6R1 b - - 0 1", false).unwrap();
    let mut searcher = Searcher::default();
    let p = SearchParams { depth: 2, multipv: 8, ..SearchParams::default() };
    let res = searcher.search_with_params(&b, p);
    assert_eq!(res.lines.len(), 1);
    assert_eq!(res.bestmove(), Some("h8h7"));
    assert_eq!(res.lines[0].score, -(MATE_SCORE - 2));
}

#[test]
fn no_lines_without_legal_moves() {
    let b = Board::from_fen("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1", false).unwrap();
    let mut searcher = Searcher::default();
    let res = searcher.search_depth(&b, 3);
    assert!(res.lines.is_empty());
    assert!(res.bestmove().is_none());
}

#[test]
fn tt_exact_after_search() {
    use piebridge::search::tt::Bound;
    let b = Board::default();
    let mut s = Searcher::default();
    s.search_depth(&b, 3);
    let e = s.tt_probe(&b).expect("tt entry missing");
    assert_eq!(e.1, Bound::Exact, "expected exact bound at the root");
    assert!(e.0 >= 3, "expected stored depth >= 3, got {}", e.0);
    s.clear();
    assert!(s.tt_probe(&b).is_none());
}
