use std::sync::atomic::{AtomicBool, Ordering};

/// "Temporary switch in progress" flag. Only the engine writes it.
#[derive(Debug, Default)]
pub struct SessionFlag(AtomicBool);

/// Held for the whole lifetime of a temporary switch; dropping it returns the engine to idle,
/// including on early return or cancellation.
#[derive(Debug)]
pub struct SessionGuard<'a>(&'a AtomicBool);

impl SessionFlag {
    pub fn try_begin(&self) -> Option<SessionGuard<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SessionGuard(&self.0))
    }

    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
