use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use super::{ports::KeyStateSource, shutdown::Shutdown};

/// Time of the most recent global key press.
///
/// Stored as milliseconds since `epoch`, offset by one so that 0 can mean "no press recorded".
#[derive(Debug)]
pub struct KeyActivity {
    epoch: Instant,
    last_press: AtomicU64,
}

impl Default for KeyActivity {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyActivity {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            last_press: AtomicU64::new(0),
        }
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX - 1) + 1
    }

    pub fn record_press(&self) {
        self.last_press.store(self.now_ms(), Ordering::Release);
    }

    pub fn clear(&self) {
        self.last_press.store(0, Ordering::Release);
    }

    pub fn has_press(&self) -> bool {
        self.last_press.load(Ordering::Acquire) != 0
    }

    /// Time since the last recorded press, `None` if nothing was recorded since the last `clear`.
    pub fn idle_for(&self) -> Option<Duration> {
        match self.last_press.load(Ordering::Acquire) {
            0 => None,
            at => Some(Duration::from_millis(self.now_ms().saturating_sub(at))),
        }
    }
}

/// Samples a [`KeyStateSource`] and records every press edge into a shared [`KeyActivity`].
pub struct KeyActivityMonitor<S> {
    source: S,
    activity: Arc<KeyActivity>,
    previous: [bool; 256],
}

impl<S: KeyStateSource> KeyActivityMonitor<S> {
    pub fn new(source: S, activity: Arc<KeyActivity>) -> Self {
        Self {
            source,
            activity,
            previous: [false; 256],
        }
    }

    /// One scan over every virtual key code. Returns `true` if a new press was seen.
    ///
    /// A key that stays held across samples is not a new press.
    pub fn sample(&mut self) -> bool {
        let mut pressed = false;

        for (vk, was_down) in (0..=u8::MAX).zip(self.previous.iter_mut()) {
            let down = self.source.is_down(vk);
            if down && !*was_down {
                pressed = true;
            }
            *was_down = down;
        }

        if pressed {
            self.activity.record_press();
        }
        pressed
    }

    pub fn run(mut self, interval: Duration, shutdown: &Shutdown) {
        tracing::debug!(interval_ms = interval.as_millis() as u64, "key activity monitor started");
        while shutdown.sleep(interval) {
            self.sample();
        }
        tracing::debug!("key activity monitor stopped");
    }
}
