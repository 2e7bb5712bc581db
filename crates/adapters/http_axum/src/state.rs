//! Shared state for admin handlers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// State shared across admin handlers: the serial link, co-owned with the
/// control loop.
///
/// `Clone` is implemented manually so the link type itself does not need to
/// be `Clone` — only the `Arc` is cloned.
pub struct AdminState<L> {
    link: Arc<Mutex<L>>,
}

impl<L> Clone for AdminState<L> {
    fn clone(&self) -> Self {
        Self {
            link: Arc::clone(&self.link),
        }
    }
}

impl<L> AdminState<L> {
    pub fn new(link: Arc<Mutex<L>>) -> Self {
        Self { link }
    }

    /// Lock the shared link. Commands must never interleave with the
    /// control loop's reads, so every handler goes through this guard.
    pub fn lock_link(&self) -> MutexGuard<'_, L> {
        self.link.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
