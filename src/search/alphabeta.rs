use cozy_chess::{Board, Move, Piece};
use std::sync::Arc;
use crate::board::{legal_moves, uci_move};
use crate::eval::nnue::NetworkSet;
use crate::search::eval::{eval_cp, non_pawn_material, piece_value, DRAW_SCORE, INFINITE, MATE_BOUND, MATE_SCORE, MAX_PLY};
use crate::search::tt::{score_from_tt, score_to_tt, Bound, Entry, Tt};

pub const DEFAULT_HASH_MB: usize = 16;

#[derive(Debug, Clone, Copy)]
pub struct SearchParams {
    pub depth: u32,
    /// Number of root lines to keep exact scores for.
    pub multipv: usize,
    pub use_nullmove: bool,
}

impl Default for SearchParams {
    fn default() -> Self { Self { depth: 1, multipv: 1, use_nullmove: true } }
}

#[derive(Debug, Clone)]
pub struct RootLine {
    pub mv: Move,
    pub score: i32,
    /// UCI moves starting with `mv`.
    pub pv: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    /// Best first. Empty when the root has no legal moves.
    pub lines: Vec<RootLine>,
    pub depth: u32,
    pub nodes: u64,
}

impl SearchResult {
    pub fn best(&self) -> Option<&RootLine> { self.lines.first() }
    pub fn bestmove(&self) -> Option<&str> { self.best().and_then(|l| l.pv.first()).map(|s| s.as_str()) }
}

#[derive(Clone, Copy)]
struct RootMove {
    mv: Move,
    score: i32,
}

pub struct Searcher {
    tt: Tt,
    networks: Arc<NetworkSet>,
    nodes: u64,
    killers: Vec<[Option<Move>; 2]>,
    history: Vec<i32>, // from * 64 + to
    path: Vec<u64>,
    use_nullmove: bool,
}

impl Default for Searcher {
    fn default() -> Self { Self::new(DEFAULT_HASH_MB) }
}

impl Searcher {
    /// `hash_mb == 0` leaves the table unallocated (no caching).
    pub fn new(hash_mb: usize) -> Self {
        Self {
            tt: if hash_mb == 0 { Tt::default() } else { Tt::with_capacity_mb(hash_mb) },
            networks: Arc::new(NetworkSet::default()),
            nodes: 0,
            killers: vec![[None, None]; MAX_PLY as usize + 1],
            history: vec![0; 64 * 64],
            path: Vec::with_capacity(MAX_PLY as usize + 1),
            use_nullmove: true,
        }
    }

    pub fn set_networks(&mut self, networks: Arc<NetworkSet>) { self.networks = networks; }

    pub fn networks(&self) -> &NetworkSet { &self.networks }

    /// Forgets everything learned from earlier searches.
    pub fn clear(&mut self) {
        self.tt.clear();
        self.killers.iter_mut().for_each(|k| *k = [None, None]);
        self.history.iter_mut().for_each(|h| *h = 0);
        self.path.clear();
        self.nodes = 0;
    }

    /// Clears and also frees the transposition table.
    pub fn release(&mut self) {
        self.clear();
        self.tt = Tt::default();
    }

    pub fn nodes(&self) -> u64 { self.nodes }

    pub fn tt_len(&self) -> usize { self.tt.len() }

    pub fn tt_probe(&self, board: &Board) -> Option<(u32, Bound)> {
        self.tt.get(board.hash()).map(|e| (e.depth, e.bound))
    }

    pub fn static_eval(&self, board: &Board) -> i32 {
        self.networks.evaluate(board).unwrap_or_else(|| eval_cp(board))
    }

    pub fn search_depth(&mut self, board: &Board, depth: u32) -> SearchResult {
        self.search_with_params(board, SearchParams { depth, ..SearchParams::default() })
    }

    /// Iterative deepening to `params.depth`, keeping `params.multipv` exact root lines.
    pub fn search_with_params(&mut self, board: &Board, params: SearchParams) -> SearchResult {
        self.nodes = 0;
        self.use_nullmove = params.use_nullmove;
        self.killers.iter_mut().for_each(|k| *k = [None, None]);
        self.path.clear();
        self.path.push(board.hash());

        let mut moves = legal_moves(board);
        if moves.is_empty() { return SearchResult::default(); }
        let tt_move = self.tt.get(board.hash()).and_then(|e| e.best);
        self.order_moves(board, &mut moves, tt_move, 0);
        let mut root: Vec<RootMove> = moves.into_iter().map(|mv| RootMove { mv, score: -INFINITE }).collect();
        let k = params.multipv.clamp(1, root.len());
        let depth = params.depth.max(1);

        for d in 1..=depth {
            self.tt.bump_generation();
            self.search_root(board, d, k, &mut root);
            root.sort_by(|a, b| b.score.cmp(&a.score));
            log::trace!("depth {} best {} score {} nodes {}", d, root[0].mv, root[0].score, self.nodes);
        }

        let best = root[0];
        self.tt.put(Entry { key: board.hash(), depth, score: best.score, best: Some(best.mv), bound: Bound::Exact, gen: 0 });
        let lines = root.iter().take(k)
            .map(|rm| RootLine { mv: rm.mv, score: rm.score, pv: self.extract_pv(board, rm.mv, depth as usize) })
            .collect();
        SearchResult { lines, depth, nodes: self.nodes }
    }

    fn search_root(&mut self, board: &Board, depth: u32, k: usize, root: &mut [RootMove]) {
        let mut searched: Vec<i32> = Vec::with_capacity(root.len());
        for rm in root.iter_mut() {
            // Only the current k-th best has to be beaten; the rest just need a bound.
            let alpha = if searched.len() >= k { kth_best(&searched, k) } else { -INFINITE };
            let mut child = board.clone();
            child.play_unchecked(rm.mv);
            self.path.push(child.hash());
            let score = -self.alphabeta(&child, depth - 1, -INFINITE, -alpha, 1);
            self.path.pop();
            rm.score = score;
            searched.push(score);
        }
    }

    fn alphabeta(&mut self, board: &Board, depth: u32, mut alpha: i32, beta: i32, ply: i32) -> i32 {
        self.nodes += 1;
        if ply >= MAX_PLY { return self.static_eval(board); }
        if board.halfmove_clock() >= 100 || self.is_repetition() { return DRAW_SCORE; }
        let in_check = !board.checkers().is_empty();
        if depth == 0 {
            if in_check && !has_legal_move(board) { return -MATE_SCORE + ply; }
            return self.qsearch(board, alpha, beta, ply);
        }

        // Mate distance pruning
        alpha = alpha.max(-MATE_SCORE + ply);
        let beta = beta.min(MATE_SCORE - ply - 1);
        if alpha >= beta { return alpha; }

        let key = board.hash();
        let tt_entry = self.tt.get(key);
        if let Some(en) = tt_entry {
            if en.depth >= depth {
                let s = score_from_tt(en.score, ply);
                match en.bound {
                    Bound::Exact => return s,
                    Bound::Lower => if s >= beta { return s; },
                    Bound::Upper => if s <= alpha { return s; },
                }
            }
        }

        if self.use_nullmove && depth >= 3 && !in_check && beta < MATE_BOUND
            && non_pawn_material(board, board.side_to_move()) > 0 {
            if let Some(nb) = board.null_move() {
                let r = 2 + depth / 4;
                self.path.push(nb.hash());
                let score = -self.alphabeta(&nb, depth.saturating_sub(1 + r), -beta, -beta + 1, ply + 1);
                self.path.pop();
                if score >= beta && score < MATE_BOUND { return score; }
            }
        }

        let mut moves = legal_moves(board);
        if moves.is_empty() { return if in_check { -MATE_SCORE + ply } else { DRAW_SCORE }; }
        self.order_moves(board, &mut moves, tt_entry.and_then(|e| e.best), ply);

        let orig_alpha = alpha;
        let mut best = -INFINITE;
        let mut best_move = None;
        for m in moves {
            let mut child = board.clone();
            child.play_unchecked(m);
            self.path.push(child.hash());
            let score = -self.alphabeta(&child, depth - 1, -beta, -alpha, ply + 1);
            self.path.pop();
            if score > best { best = score; best_move = Some(m); }
            if best > alpha { alpha = best; }
            if alpha >= beta {
                if !is_capture(board, m) {
                    self.update_killers(ply, m);
                    let h = &mut self.history[m.from as usize * 64 + m.to as usize];
                    *h = h.saturating_add((depth * depth) as i32);
                }
                break;
            }
        }
        let bound = if best <= orig_alpha { Bound::Upper } else if best >= beta { Bound::Lower } else { Bound::Exact };
        self.tt.put(Entry { key, depth, score: score_to_tt(best, ply), best: best_move, bound, gen: 0 });
        best
    }

    fn qsearch(&mut self, board: &Board, mut alpha: i32, beta: i32, ply: i32) -> i32 {
        self.nodes += 1;
        // Stand pat
        let stand = self.static_eval(board);
        if ply >= MAX_PLY || stand >= beta { return stand; }
        if stand > alpha { alpha = stand; }

        let mut caps: Vec<Move> = legal_moves(board).into_iter()
            .filter(|&m| is_capture(board, m) || m.promotion == Some(Piece::Queen))
            .collect();
        caps.sort_by_key(|&m| -mvv_lva(board, m));
        let mut best = stand;
        for m in caps {
            // Delta pruning
            let gain = board.piece_on(m.to).map(piece_value).unwrap_or(0);
            if m.promotion.is_none() && stand + gain + 200 < alpha { continue; }
            let mut child = board.clone();
            child.play_unchecked(m);
            let score = -self.qsearch(&child, -beta, -alpha, ply + 1);
            if score > best { best = score; }
            if score > alpha { alpha = score; }
            if alpha >= beta { break; }
        }
        best
    }

    fn is_repetition(&self) -> bool {
        match self.path.split_last() {
            Some((cur, before)) => before.iter().rev().skip(1).step_by(2).any(|h| h == cur),
            None => false,
        }
    }

    fn order_moves(&self, board: &Board, moves: &mut Vec<Move>, tt_move: Option<Move>, ply: i32) {
        let killers = self.killers.get(ply as usize).copied().unwrap_or([None, None]);
        let mut scored: Vec<(i32, Move)> = moves.iter().map(|&m| {
            let s = if Some(m) == tt_move { 1_000_000 }
                else if is_capture(board, m) { 100_000 + mvv_lva(board, m) }
                else if m.promotion.is_some() { 90_000 }
                else if killers[0] == Some(m) { 80_000 }
                else if killers[1] == Some(m) { 70_000 }
                else { self.history[m.from as usize * 64 + m.to as usize].min(60_000) };
            (s, m)
        }).collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        moves.clear();
        moves.extend(scored.into_iter().map(|(_, m)| m));
    }

    fn update_killers(&mut self, ply: i32, m: Move) {
        let Some(slot) = self.killers.get_mut(ply as usize) else { return; };
        if slot[0] == Some(m) { return; }
        slot[1] = slot[0];
        slot[0] = Some(m);
    }

    /// Follows stored best moves from the position after `first`.
    fn extract_pv(&self, board: &Board, first: Move, max_len: usize) -> Vec<String> {
        let mut pv = vec![uci_move(board, first)];
        let mut b = board.clone();
        b.play_unchecked(first);
        let mut seen = vec![board.hash(), b.hash()];
        while pv.len() < max_len.max(1) {
            let Some(m) = self.tt.get(b.hash()).and_then(|e| e.best) else { break; };
            if !b.is_legal(m) { break; }
            pv.push(uci_move(&b, m));
            b.play_unchecked(m);
            if seen.contains(&b.hash()) { break; }
            seen.push(b.hash());
        }
        pv
    }
}

fn kth_best(scores: &[i32], k: usize) -> i32 {
    let mut sorted = scores.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted[k - 1]
}

fn has_legal_move(board: &Board) -> bool {
    let mut any = false;
    board.generate_moves(|_| { any = true; true });
    any
}

fn is_capture(board: &Board, m: Move) -> bool {
    board.colors(!board.side_to_move()).has(m.to)
}

fn mvv_lva(board: &Board, m: Move) -> i32 {
    let victim = board.piece_on(m.to).map(piece_value).unwrap_or(0);
    let attacker = board.piece_on(m.from).map(piece_value).unwrap_or(0);
    victim * 10 - attacker / 10
}
