//! Failures inside the bridge and their sentinel strings.
//!
//! Nothing raised below the C boundary crosses it: typed errors render as
//! `Error: <message>`, panics render the same way when their payload is a
//! string and as [`UNKNOWN_ERROR`] otherwise.

use std::any::Any;
use thiserror::Error;

pub const ERROR_PREFIX: &str = "Error: ";
pub const UNKNOWN_ERROR: &str = "Unknown error";

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("engine not initialized")]
    NotInitialized,

    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    #[error("invalid depth {0}, expected at least 1")]
    InvalidDepth(i32),

    #[error("invalid line count {0}, expected at least 1")]
    InvalidLineCount(i32),

    #[error("null {0} argument")]
    NullArgument(&'static str),

    #[error("{0} is not valid UTF-8")]
    InvalidUtf8(&'static str),

    /// Loading a network file failed.
    #[error("network load failed: {0:#}")]
    Network(#[from] anyhow::Error),

    #[error("search failed: {0}")]
    Search(String),
}

/// Descriptive sentinel for a typed failure.
pub fn sentinel(err: &BridgeError) -> String { format!("{ERROR_PREFIX}{err}") }

/// Sentinel for a caught panic payload.
pub fn panic_sentinel(payload: &(dyn Any + Send)) -> String {
    match panic_message(payload) {
        Some(msg) => format!("{ERROR_PREFIX}{msg}"),
        None => UNKNOWN_ERROR.to_string(),
    }
}

pub fn panic_message(payload: &(dyn Any + Send)) -> Option<&str> {
    if let Some(s) = payload.downcast_ref::<&'static str>() { return Some(*s); }
    payload.downcast_ref::<String>().map(|s| s.as_str())
}

/// True for any sentinel this module produces.
pub fn is_error_sentinel(text: &str) -> bool { text.starts_with(ERROR_PREFIX) || text == UNKNOWN_ERROR }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_errors_carry_their_message() {
        let s = sentinel(&BridgeError::InvalidDepth(0));
        assert_eq!(s, "Error: invalid depth 0, expected at least 1");
        assert!(is_error_sentinel(&s));
    }

    #[test]
    fn panic_payloads_map_to_descriptive_or_generic() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_sentinel(boxed.as_ref()), "Error: boom");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("bad square"));
        assert_eq!(panic_sentinel(boxed.as_ref()), "Error: bad square");
        let boxed: Box<dyn Any + Send> = Box::new(17u8);
        assert_eq!(panic_sentinel(boxed.as_ref()), UNKNOWN_ERROR);
    }
}
