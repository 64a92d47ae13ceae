// Synchronous C-ABI evaluation bridge over the NNUE + alpha-beta engine
pub mod board;
pub mod config;
pub mod error;
pub mod eval;
pub mod ffi;
pub mod format;
pub mod search;
pub mod session;

pub use config::BridgeConfig;
pub use error::BridgeError;
pub use format::{format_score, Score, NO_LEGAL_MOVES};
pub use session::{Analysis, PvLine, Session, SessionState, Terminal};
