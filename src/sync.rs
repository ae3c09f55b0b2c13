#[cfg(feature = "loom")]
mod imp {
    use loom::sync::MutexGuard;
    pub(crate) use loom::sync::{
        atomic::{AtomicI32, Ordering},
        Mutex,
    };

    pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        mutex.lock().expect("scheduler state mutex poisoned")
    }
}

#[cfg(not(feature = "loom"))]
mod imp {
    pub(crate) use core::sync::atomic::{AtomicI32, Ordering};
    use std::sync::{MutexGuard, PoisonError};
    pub(crate) use std::sync::Mutex;

    /// The tables stay structurally valid across a dispatcher panic (growth is
    /// append-only and completes before any dispatcher call), so the poison
    /// flag is ignored.
    pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        mutex.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub(crate) use imp::*;
