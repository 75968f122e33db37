use std::{
    sync::{Arc, Condvar, Mutex, PoisonError},
    time::{Duration, Instant},
};

/// Process-wide cancellation signal shared by every background loop.
///
/// `sleep` doubles as the suspension point of the loops: it returns early as soon as
/// `cancel` is called, so no loop outlives shutdown by more than one OS call.
#[derive(Clone, Debug, Default)]
pub struct Shutdown {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: Mutex<bool>,
    cv: Condvar,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let mut cancelled = self
            .inner
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *cancelled = true;
        self.inner.cv.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self
            .inner
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Waits for `period` or until cancelled. Returns `true` if the caller should keep running.
    pub fn sleep(&self, period: Duration) -> bool {
        let deadline = Instant::now() + period;
        let mut cancelled = self
            .inner
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        while !*cancelled {
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            cancelled = self
                .inner
                .cv
                .wait_timeout(cancelled, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn sleep_runs_full_period_when_not_cancelled() {
        let s = Shutdown::new();
        let started = Instant::now();
        assert!(s.sleep(Duration::from_millis(30)));
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn cancel_wakes_sleepers_early() {
        let s = Shutdown::new();
        let sleeper = {
            let s = s.clone();
            thread::spawn(move || {
                let started = Instant::now();
                let keep_running = s.sleep(Duration::from_secs(30));
                (keep_running, started.elapsed())
            })
        };

        thread::sleep(Duration::from_millis(20));
        s.cancel();

        let (keep_running, waited) = sleeper.join().unwrap();
        assert!(!keep_running);
        assert!(waited < Duration::from_secs(5));
        assert!(s.is_cancelled());
        assert!(!s.sleep(Duration::from_secs(30)));
    }
}
