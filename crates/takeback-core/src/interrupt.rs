//! Interrupt flag checked between batch items
//!
//! Signal handlers set the flag; the fetch loop finishes the in-flight
//! item (whose progress record has already been committed or whose failure
//! has already been logged) and stops before starting the next one.

use std::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// The raw flag, for registering signal handlers against.
pub fn interrupt_flag() -> &'static AtomicBool {
    &INTERRUPTED
}

pub fn interrupt_requested() -> bool {
    INTERRUPTED.load(Ordering::Relaxed)
}
