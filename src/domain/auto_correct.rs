use std::sync::{
    Mutex, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use ime_switcher_core::KeyboardLayoutId;

use super::ports::{ForegroundSnapshot, WindowHandle};

/// What the auto-correct rule last saw in the foreground window.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct AutoCorrectStatus {
    pub is_candidate: bool,
    pub in_target_mode: bool,
    pub window: WindowHandle,
}

/// Edge-triggered "force native mode" rule.
///
/// A correction is issued only when the observed status changes, so a user who deliberately
/// switches the IME back to alphanumeric is not fought on every tick.
#[derive(Debug)]
pub struct AutoCorrect {
    candidates: Vec<KeyboardLayoutId>,
    secondary: KeyboardLayoutId,
    enabled: AtomicBool,
    last: Mutex<Option<AutoCorrectStatus>>,
}

impl AutoCorrect {
    pub fn new(secondary: KeyboardLayoutId, candidates: Vec<KeyboardLayoutId>, enabled: bool) -> Self {
        Self {
            candidates,
            secondary,
            enabled: AtomicBool::new(enabled),
            last: Mutex::new(None),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Enabling forgets the last observed status so the next tick can correct right away.
    pub fn set_enabled(&self, enabled: bool) {
        let was = self.enabled.swap(enabled, Ordering::AcqRel);
        if enabled && !was {
            self.reset();
        }
    }

    pub fn reset(&self) {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Layout is one of the allow-listed IMEs of the secondary language.
    pub fn is_candidate(&self, snapshot: &ForegroundSnapshot) -> bool {
        snapshot.language == self.secondary.language()
            && self
                .candidates
                .iter()
                .any(|id| id.0 == snapshot.layout)
    }

    pub fn status_of(&self, snapshot: &ForegroundSnapshot, in_target_mode: bool) -> AutoCorrectStatus {
        AutoCorrectStatus {
            is_candidate: self.is_candidate(snapshot),
            in_target_mode,
            window: snapshot.window,
        }
    }

    /// Stores `status` as the last observed one. Returns `true` if it differs from the previous.
    pub fn observe(&self, status: AutoCorrectStatus) -> bool {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        let changed = *last != Some(status);
        *last = Some(status);
        changed
    }
}

#[cfg(test)]
mod tests {
    use ime_switcher_core::{ImeState, LanguageId};

    use super::*;

    fn snapshot(layout: u32) -> ForegroundSnapshot {
        ForegroundSnapshot {
            window: WindowHandle(7),
            title: "Editor".into(),
            layout,
            language: LanguageId::from_layout_handle(layout),
            ime: ImeState::CLOSED,
            has_ime_context: true,
        }
    }

    fn rule() -> AutoCorrect {
        AutoCorrect::new(
            KeyboardLayoutId::CHINESE_SIMPLIFIED,
            vec![KeyboardLayoutId(0x0804_0804), KeyboardLayoutId(0xE001_0804)],
            true,
        )
    }

    #[test]
    fn candidate_requires_listed_layout_and_secondary_language() {
        let rule = rule();
        assert!(rule.is_candidate(&snapshot(0x0804_0804)));
        assert!(rule.is_candidate(&snapshot(0xE001_0804)));
        assert!(!rule.is_candidate(&snapshot(0x0000_0804)));
        assert!(!rule.is_candidate(&snapshot(0x0409_0409)));
    }

    #[test]
    fn observe_reports_changes_only() {
        let rule = rule();
        let status = rule.status_of(&snapshot(0x0804_0804), false);
        assert!(rule.observe(status));
        assert!(!rule.observe(status));

        let native = rule.status_of(&snapshot(0x0804_0804), true);
        assert!(rule.observe(native));
        assert!(rule.observe(status));
    }

    #[test]
    fn enabling_clears_the_cache() {
        let rule = rule();
        let status = rule.status_of(&snapshot(0x0804_0804), false);
        assert!(rule.observe(status));

        rule.set_enabled(false);
        rule.set_enabled(true);
        assert!(rule.observe(status));
    }
}
