//! C entry points.
//!
//! The host links against these symbols. The names and signatures match the
//! native engine library the host app was built against, so the bridge is a
//! drop-in replacement for both its three-function form
//! (`init`/`evaluate_fen`/`cleanup`) and its four-function form
//! (`init`/`evaluate`/`evaluate_multipv`/`cleanup`).
//!
//! One session lives behind a process-wide mutex, so concurrent host calls
//! are serialized. Returned strings point into that session's buffer and stay
//! valid only until the next call into the bridge; copy them before calling
//! again. Never free them.
//!
//! The lock covers the engine, not the returned buffer: it is released before
//! the pointer reaches the caller, so another thread's call can overwrite or
//! free the text before it is copied. Hosts calling from several threads must
//! hold their own lock from the call until the copy is done.
//!
//! `stockfish_init` takes two path arguments. Some host headers declare it as
//! `void stockfish_init(void)`; those hosts must be rebuilt against the
//! two-argument prototype, since calling it with no arguments leaves both
//! pointers as whatever the argument registers hold.

use std::ffi::{c_char, c_int, CStr};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, OnceLock};
use crate::config::{BridgeConfig, LOG_ENV};
use crate::error::{self, BridgeError};
use crate::session::Session;

static SESSION: OnceLock<Mutex<Session>> = OnceLock::new();
// Returned when even the session lock is unusable.
static UNKNOWN_ERROR_C: &CStr = c"Unknown error";

fn session() -> MutexGuard<'static, Session> {
    let m = SESSION.get_or_init(|| Mutex::new(Session::new(BridgeConfig::default())));
    // A panic while the guard is held poisons the lock; the session is still consistent.
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn init_logging() {
    let env = env_logger::Env::default().filter_or(LOG_ENV, "warn");
    // A host that installed its own logger wins.
    let _ = env_logger::Builder::from_env(env).format_timestamp_millis().try_init();
}

/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
unsafe fn opt_str<'a>(ptr: *const c_char, what: &'static str) -> Result<Option<&'a str>, BridgeError> {
    if ptr.is_null() { return Ok(None); }
    CStr::from_ptr(ptr).to_str().map(Some).map_err(|_| BridgeError::InvalidUtf8(what))
}

unsafe fn req_str<'a>(ptr: *const c_char, what: &'static str) -> Result<&'a str, BridgeError> {
    opt_str(ptr, what)?.ok_or(BridgeError::NullArgument(what))
}

fn nonempty_path(s: Option<&str>) -> Option<&Path> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(Path::new)
}

/// Runs `f` against the shared session and hands back a pointer into its
/// output buffer.
fn evaluate_with<F>(f: F) -> *const c_char
where
    F: FnOnce(&mut Session) -> Result<(), BridgeError>,
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut s = session();
        if let Err(e) = f(&mut *s) {
            // Bad arguments are reported through the same buffer.
            s.set_output(error::sentinel(&e));
        }
        s.output().as_ptr()
    }));
    outcome.unwrap_or_else(|payload| {
        log::error!("bridge call panicked: {}", error::panic_message(payload.as_ref()).unwrap_or("<non-string payload>"));
        UNKNOWN_ERROR_C.as_ptr()
    })
}

/// Initializes the engine. Either path may be null or empty to skip that
/// network. Calling it again performs a full reset.
///
/// # Safety
/// Each argument must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn stockfish_init(nnue_path_main: *const c_char, nnue_path_small: *const c_char) {
    init_logging();
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let main = opt_str(nnue_path_main, "main network path").unwrap_or_else(|e| { log::warn!("{e}"); None });
        let small = opt_str(nnue_path_small, "small network path").unwrap_or_else(|e| { log::warn!("{e}"); None });
        let mut s = session();
        s.set_config(BridgeConfig::from_env());
        s.init(nonempty_path(main), nonempty_path(small));
    }));
    if let Err(payload) = result {
        log::error!("init panicked: {}", error::panic_message(payload.as_ref()).unwrap_or("<non-string payload>"));
    }
}

/// Evaluates `fen` to `depth`; returns pawns, `Mate in N` or an error sentinel.
///
/// # Safety
/// `fen` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn stockfish_evaluate(fen: *const c_char, depth: c_int) -> *const c_char {
    evaluate_with(|s| {
        let fen = req_str(fen, "position")?;
        s.evaluate(fen, depth);
        Ok(())
    })
}

/// Same as [`stockfish_evaluate`]; the name used by the three-function surface.
///
/// # Safety
/// See [`stockfish_evaluate`].
#[no_mangle]
pub unsafe extern "C" fn stockfish_evaluate_fen(fen: *const c_char, depth: c_int) -> *const c_char {
    stockfish_evaluate(fen, depth)
}

/// Evaluates the best `num_lines` lines of `fen`, one per text line.
///
/// # Safety
/// `fen` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn stockfish_evaluate_multipv(fen: *const c_char, depth: c_int, num_lines: c_int) -> *const c_char {
    evaluate_with(|s| {
        let fen = req_str(fen, "position")?;
        s.evaluate_multipv(fen, depth, num_lines);
        Ok(())
    })
}

/// Releases the engine. Later evaluations return the not-initialized
/// sentinel until `stockfish_init` is called again.
#[no_mangle]
pub extern "C" fn stockfish_cleanup() {
    let result = panic::catch_unwind(|| session().cleanup());
    if let Err(payload) = result {
        log::error!("cleanup panicked: {}", error::panic_message(payload.as_ref()).unwrap_or("<non-string payload>"));
    }
}
