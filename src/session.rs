//! The engine session: lifecycle, evaluation requests and the output buffer.
//!
//! A [`Session`] is an owned handle. The C surface in [`crate::ffi`] keeps one
//! behind a process-wide mutex; Rust callers can hold their own.
//!
//! Policies:
//! - `init` on a `Ready` session performs a full reset (networks reloaded,
//!   pool rebuilt, search state cleared).
//! - Evaluating an `Uninitialized` session (never initialised, or after
//!   `cleanup`) returns the `engine not initialized` error sentinel.
//! - Text results live in the session's buffer and are valid until the next
//!   call on the same session.

use std::ffi::{CStr, CString};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use log::{debug, error, info, warn};
use rayon::{ThreadPool, ThreadPoolBuilder};
use crate::board::Position;
use crate::config::BridgeConfig;
use crate::error::{self, BridgeError};
use crate::eval::nnue::{NetTier, NetworkSet, Nnue};
use crate::format::{format_line, Score, NO_LEGAL_MOVES};
use crate::search::alphabeta::{SearchParams, Searcher};

/// The search pool always has exactly this many workers while `Ready`.
pub const SEARCH_THREADS: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Ready,
    ShuttingDown,
}

/// A validated evaluation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub position: String,
    pub depth: u32,
    pub lines: usize,
}

impl Request {
    pub fn new(fen: &str, depth: i32, lines: i32) -> Result<Self, BridgeError> {
        if depth < 1 { return Err(BridgeError::InvalidDepth(depth)); }
        if lines < 1 { return Err(BridgeError::InvalidLineCount(lines)); }
        Ok(Self { position: fen.to_string(), depth: depth as u32, lines: lines as usize })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    Checkmate,
    Stalemate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PvLine {
    /// 1-based.
    pub rank: usize,
    pub score: Score,
    pub raw_score: i32,
    pub pv: Vec<String>,
}

impl PvLine {
    pub fn best_move(&self) -> Option<&str> { self.pv.first().map(|s| s.as_str()) }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    /// Best first; empty when `terminal` is set.
    pub lines: Vec<PvLine>,
    pub terminal: Option<Terminal>,
    pub depth: u32,
    pub nodes: u64,
}

pub struct Session {
    state: SessionState,
    config: BridgeConfig,
    networks: Arc<NetworkSet>,
    pool: Option<ThreadPool>,
    searcher: Searcher,
    output: CString,
}

impl Default for Session {
    fn default() -> Self { Self::new(BridgeConfig::default()) }
}

impl Session {
    /// An uninitialised session; nothing is allocated until `init`.
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            state: SessionState::Uninitialized,
            config: config.sanitized(),
            networks: Arc::new(NetworkSet::default()),
            pool: None,
            searcher: Searcher::new(0),
            output: CString::default(),
        }
    }

    pub fn state(&self) -> SessionState { self.state }

    pub fn is_ready(&self) -> bool { self.state == SessionState::Ready }

    pub fn config(&self) -> &BridgeConfig { &self.config }

    pub fn set_config(&mut self, config: BridgeConfig) { self.config = config.sanitized(); }

    pub fn networks(&self) -> &NetworkSet { &self.networks }

    /// Current worker pool size: 1 while ready, 0 otherwise.
    pub fn threads(&self) -> usize { self.pool.as_ref().map_or(0, |p| p.current_num_threads()) }

    /// Loads the given networks (empty paths are skipped), sizes the pool to
    /// one worker and clears search state. Load failures are logged and leave
    /// the session usable on whatever evaluation remains.
    pub fn init(&mut self, main: Option<&Path>, small: Option<&Path>) {
        if self.is_ready() {
            info!("session already initialized; resetting");
            self.cleanup();
        }
        let mut nets = NetworkSet::default();
        for (tier, path) in [(NetTier::Main, main), (NetTier::Small, small)] {
            let Some(path) = path.filter(|p| !p.as_os_str().is_empty()) else { continue; };
            match Nnue::load(path) {
                Ok(net) => {
                    info!("loaded {} network {} ({}x{})", tier, path.display(), net.meta.input_dim, net.meta.hidden_dim);
                    nets.set(tier, net);
                }
                Err(e) => warn!("{} network {} not loaded: {:#}", tier, path.display(), BridgeError::Network(e)),
            }
        }
        if nets.is_empty() { info!("no network loaded; using classical evaluation"); }
        self.networks = Arc::new(nets);

        self.pool = match ThreadPoolBuilder::new()
            .num_threads(SEARCH_THREADS)
            .thread_name(|i| format!("piebridge-search-{i}"))
            .build()
        {
            Ok(pool) => Some(pool),
            Err(e) => {
                warn!("search pool unavailable, searching on the caller's thread: {e}");
                None
            }
        };

        self.searcher = Searcher::new(self.config.hash_mb);
        self.searcher.set_networks(self.networks.clone());
        self.state = SessionState::Ready;
        debug!("session ready: hash {} MB, max depth {}", self.config.hash_mb, self.config.max_depth);
    }

    /// Stops the pool, drops networks and search state. Safe to call twice.
    pub fn cleanup(&mut self) {
        if self.state == SessionState::Uninitialized { return; }
        self.state = SessionState::ShuttingDown;
        self.pool = None;
        self.searcher.release();
        self.networks = Arc::new(NetworkSet::default());
        self.searcher.set_networks(self.networks.clone());
        self.output = CString::default();
        self.state = SessionState::Uninitialized;
        debug!("session cleaned up");
    }

    /// Searches `fen` to `depth` keeping `lines` ranked lines.
    pub fn analyse(&mut self, fen: &str, depth: i32, lines: i32) -> Result<Analysis, BridgeError> {
        if !self.is_ready() { return Err(BridgeError::NotInitialized); }
        let req = Request::new(fen, depth, lines)?;
        let pos = Position::from_fen(&req.position)?;

        let mut depth = req.depth;
        if depth > self.config.max_depth {
            warn!("depth {} clamped to {}", depth, self.config.max_depth);
            depth = self.config.max_depth;
        }
        let legal = pos.legal_moves_count();
        if legal == 0 {
            let terminal = if pos.is_checkmate() { Terminal::Checkmate } else { Terminal::Stalemate };
            return Ok(Analysis { lines: Vec::new(), terminal: Some(terminal), depth: 0, nodes: 0 });
        }
        let params = SearchParams { depth, multipv: req.lines.min(legal), use_nullmove: self.config.use_nullmove };
        debug!("search depth {} multipv {} fen {}", params.depth, params.multipv, req.position);

        let searcher = &mut self.searcher;
        let board = pos.board();
        let mut job = move || searcher.search_with_params(board, params);
        let res = match &self.pool {
            Some(pool) => pool.install(job),
            None => job(),
        };
        debug!("search done: depth {} nodes {}", res.depth, res.nodes);

        let lines = res.lines.into_iter().enumerate()
            .map(|(i, l)| PvLine { rank: i + 1, score: Score::from_raw(l.score), raw_score: l.score, pv: l.pv })
            .collect();
        Ok(Analysis { lines, terminal: None, depth: res.depth, nodes: res.nodes })
    }

    /// Single best-line evaluation: pawns (`0.3`), `Mate in N`, or an error
    /// sentinel. A checkmated side to move gives `Mate in 0`, stalemate `0.0`.
    pub fn evaluate(&mut self, fen: &str, depth: i32) -> &str {
        self.guarded(|s| {
            let analysis = s.analyse(fen, depth, 1)?;
            match analysis.terminal {
                Some(Terminal::Checkmate) => return Ok(Score::Mate(0).to_string()),
                Some(Terminal::Stalemate) => return Ok(Score::Cp(0).to_string()),
                None => {}
            }
            analysis.lines.first()
                .map(|l| l.score.to_string())
                .ok_or_else(|| BridgeError::Search("no line returned".into()))
        })
    }

    /// Up to `num_lines` ranked lines joined by `\n`, each
    /// `"{rank}: {score} pv {moves}"`; `No legal moves` for finished games.
    pub fn evaluate_multipv(&mut self, fen: &str, depth: i32, num_lines: i32) -> &str {
        self.guarded(|s| {
            let analysis = s.analyse(fen, depth, num_lines)?;
            if analysis.terminal.is_some() { return Ok(NO_LEGAL_MOVES.to_string()); }
            let text: Vec<String> = analysis.lines.iter().map(|l| format_line(l.rank, l.raw_score, &l.pv)).collect();
            Ok(text.join("\n"))
        })
    }

    /// The most recent result, NUL-terminated.
    pub fn output(&self) -> &CStr { &self.output }

    // Every failure, including panics in the engine, ends up as a sentinel.
    fn guarded<F>(&mut self, f: F) -> &str
    where
        F: FnOnce(&mut Self) -> Result<String, BridgeError>,
    {
        let text = match panic::catch_unwind(AssertUnwindSafe(|| f(self))) {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                debug!("evaluation rejected: {e}");
                error::sentinel(&e)
            }
            Err(payload) => {
                error!("evaluation panicked: {}", error::panic_message(payload.as_ref()).unwrap_or("<non-string payload>"));
                self.searcher.clear();
                error::panic_sentinel(payload.as_ref())
            }
        };
        self.set_output(text)
    }

    pub(crate) fn set_output(&mut self, text: String) -> &str {
        self.output = CString::new(text).unwrap_or_else(|e| {
            let mut bytes = e.into_vec();
            bytes.retain(|&b| b != 0);
            CString::new(bytes).unwrap_or_default()
        });
        self.output.to_str().unwrap_or_default()
    }
}
