//! Process-wide core instance.
//!
//! libretro entry points are free functions with no user pointer, so the one
//! `HelloCore` lives in a static. The host calls entry points from a single thread;
//! the mutex only makes the static sound.

use std::sync::{Mutex, MutexGuard, OnceLock};

use crate::HelloCore;
use crate::logging;

static CORE: OnceLock<Mutex<HelloCore>> = OnceLock::new();

pub fn global() -> &'static Mutex<HelloCore> {
    CORE.get_or_init(|| {
        logging::init_diagnostics();
        Mutex::new(HelloCore::default())
    })
}

fn lock() -> MutexGuard<'static, HelloCore> {
    // A panic never unwinds into the host (panic = "abort"), but tests do unwind;
    // keep going with whatever state the panicking call left behind.
    match global().lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Run `f` against the global core.
pub fn with_core<R>(f: impl FnOnce(&mut HelloCore) -> R) -> R {
    let mut core = lock();
    f(&mut core)
}
