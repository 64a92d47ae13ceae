//! Network-file evaluation used in place of the classical eval when loaded.
pub mod nnue;
