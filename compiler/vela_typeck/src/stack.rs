//! Stack safety for recursive checking.
//!
//! Realization and inference recurse along the program structure, which is
//! attacker-controlled depth. `stacker` grows the stack instead of
//! overflowing it.

/// Ensure sufficient stack space for recursive operations.
///
/// Grows the stack if remaining space is less than 256KB, allocating up to
/// 2MB.
pub fn ensure_sufficient_stack<R, F: FnOnce() -> R>(f: F) -> R {
    stacker::maybe_grow(256 * 1024, 2 * 1024 * 1024, f)
}
