//! The toggle engine: picks target layouts and IME modes and owns the temporary-switch session.

use std::{
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

use ime_switcher_core::{ConversionMode, KeyboardLayoutId, LanguageId, PunctuationMode};

use super::{
    activity::KeyActivity,
    auto_correct::AutoCorrect,
    outcome::{ActionOutcome, Failure, SkipReason},
    ports::{ForegroundSnapshot, InputCommander, WindowInputQuery},
    session::SessionFlag,
    shutdown::Shutdown,
};
use crate::config::Config;

/// Fixed delays of a temporary switch.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SessionTiming {
    /// Lets the hotkey's modifier keys come up before the layout changes.
    pub settle: Duration,
    pub poll: Duration,
    /// Minimum revert interval when switching from the primary language into Chinese,
    /// which needs time for candidate selection.
    pub composition_floor: Duration,
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self {
            settle: Duration::from_millis(200),
            poll: Duration::from_millis(100),
            composition_floor: Duration::from_secs(2),
        }
    }
}

#[derive(Clone, Debug)]
pub struct EngineSettings {
    pub primary: KeyboardLayoutId,
    pub secondary: KeyboardLayoutId,
    pub candidates: Vec<KeyboardLayoutId>,
    pub temp_interval: Duration,
    pub instant_interval: Duration,
    pub auto_interval: Duration,
    pub auto_correct: bool,
    pub timing: SessionTiming,
}

impl EngineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            primary: config.primary_keyboard,
            secondary: config.secondary_keyboard,
            candidates: config.secondary_ime_candidates.clone(),
            temp_interval: config.temp_switch_interval,
            instant_interval: config.instant_switch_interval,
            auto_interval: config.auto_switch_interval,
            auto_correct: config.force_secondary_mode,
            timing: SessionTiming::default(),
        }
    }
}

/// Snapshot of everything the tray "Status" item reports.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StatusReport {
    pub title: String,
    pub language: LanguageId,
    pub layout: u32,
    pub is_candidate: bool,
    pub native: bool,
    pub punctuation: PunctuationMode,
    pub auto_correct: bool,
    pub session_active: bool,
}

pub struct ToggleEngine<Q, C> {
    query: Q,
    commander: C,
    activity: Arc<KeyActivity>,
    settings: EngineSettings,
    session: SessionFlag,
    auto: AutoCorrect,
    shutdown: Shutdown,
}

impl<Q, C> ToggleEngine<Q, C>
where
    Q: WindowInputQuery,
    C: InputCommander,
{
    pub fn new(
        query: Q,
        commander: C,
        activity: Arc<KeyActivity>,
        settings: EngineSettings,
        shutdown: Shutdown,
    ) -> Self {
        let auto = AutoCorrect::new(
            settings.secondary,
            settings.candidates.clone(),
            settings.auto_correct,
        );
        Self {
            query,
            commander,
            activity,
            settings,
            session: SessionFlag::default(),
            auto,
            shutdown,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn temp_interval(&self) -> Duration {
        self.settings.temp_interval
    }

    pub fn instant_interval(&self) -> Duration {
        self.settings.instant_interval
    }

    pub fn shutdown(&self) -> &Shutdown {
        &self.shutdown
    }

    pub fn is_session_active(&self) -> bool {
        self.session.is_active()
    }

    fn primary_language(&self) -> LanguageId {
        self.settings.primary.language()
    }

    fn secondary_language(&self) -> LanguageId {
        self.settings.secondary.language()
    }

    fn activate(
        &self,
        snapshot: &ForegroundSnapshot,
        layout: KeyboardLayoutId,
    ) -> ActionOutcome {
        match self.commander.activate_layout(snapshot.window, layout) {
            Ok(()) => {
                tracing::info!(
                    title = %snapshot.display_title(),
                    from = %snapshot.language,
                    to = %layout,
                    "layout switched"
                );
                ActionOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(
                    title = %snapshot.display_title(),
                    layout = %layout,
                    error = %e,
                    "layout switch failed"
                );
                ActionOutcome::Failed(Failure::LayoutError)
            }
        }
    }

    /// Flips between the primary and the secondary layout based on the current language.
    pub fn toggle(&self) -> ActionOutcome {
        let snapshot = self.query.read_foreground();
        let target = if snapshot.language == self.secondary_language() {
            self.settings.primary
        } else {
            self.settings.secondary
        };
        self.activate(&snapshot, target)
    }

    pub fn switch_primary(&self) -> ActionOutcome {
        let snapshot = self.query.read_foreground();
        self.activate(&snapshot, self.settings.primary)
    }

    pub fn switch_secondary(&self) -> ActionOutcome {
        let snapshot = self.query.read_foreground();
        self.activate(&snapshot, self.settings.secondary)
    }

    /// Toggles now and toggles back once the user has typed and then stayed idle for `interval`.
    ///
    /// Blocks the calling thread for the whole session. A second call while a session runs is
    /// rejected with [`SkipReason::Reentry`]. Shutdown ends the session without reverting.
    pub fn temp_toggle(&self, interval: Duration) -> ActionOutcome {
        let Some(_session) = self.session.try_begin() else {
            tracing::debug!("temporary switch already running");
            return ActionOutcome::Skipped(SkipReason::Reentry);
        };

        let timing = self.settings.timing;
        let start_language = self.query.read_foreground().language;
        let interval = if start_language == self.primary_language()
            && self.secondary_language() == LanguageId::CHINESE_SIMPLIFIED
        {
            interval.max(timing.composition_floor)
        } else {
            interval
        };

        if !self.shutdown.sleep(timing.settle) {
            return ActionOutcome::Skipped(SkipReason::Cancelled);
        }

        let switched = self.toggle();
        if !switched.is_applied() {
            return switched;
        }
        self.activity.clear();
        tracing::debug!(interval_ms = interval.as_millis() as u64, "temporary switch started");

        loop {
            if !self.shutdown.sleep(timing.poll) {
                tracing::debug!("temporary switch cancelled");
                return ActionOutcome::Skipped(SkipReason::Cancelled);
            }
            if self.activity.idle_for().is_some_and(|idle| idle > interval) {
                break;
            }
        }

        tracing::debug!("temporary switch idle, reverting");
        self.toggle()
    }

    /// Runs [`Self::temp_toggle`] on a worker thread so the caller never blocks.
    pub fn spawn_temp_toggle(self: &Arc<Self>, interval: Duration) -> Option<JoinHandle<ActionOutcome>>
    where
        Q: 'static,
        C: 'static,
    {
        let engine = Arc::clone(self);
        match thread::Builder::new()
            .name("temp-toggle".into())
            .spawn(move || engine.temp_toggle(interval))
        {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::error!(error = %e, "failed to spawn temporary switch worker");
                None
            }
        }
    }

    pub fn auto_correct_enabled(&self) -> bool {
        self.auto.is_enabled()
    }

    pub fn set_auto_correct_enabled(&self, enabled: bool) {
        self.auto.set_enabled(enabled);
        tracing::info!(enabled, "force secondary mode");
    }

    /// One auto-correct decision: forces native conversion when a candidate IME shows up in
    /// alphanumeric mode.
    pub fn auto_correct_tick(&self) -> ActionOutcome {
        if !self.auto.is_enabled() {
            return ActionOutcome::Skipped(SkipReason::Disabled);
        }

        let snapshot = self.query.read_foreground();
        let native = snapshot
            .ime
            .is_native_mode(snapshot.language, self.primary_language());
        let status = self.auto.status_of(&snapshot, native);
        let changed = self.auto.observe(status);

        if !status.is_candidate {
            return ActionOutcome::Skipped(SkipReason::NotCandidate);
        }
        if status.in_target_mode {
            return ActionOutcome::Skipped(SkipReason::AlreadyNative);
        }
        if !changed {
            return ActionOutcome::Skipped(SkipReason::AlreadyCorrected);
        }

        self.force_native(&snapshot)
    }

    fn force_native(&self, snapshot: &ForegroundSnapshot) -> ActionOutcome {
        match self
            .commander
            .set_ime_state(snapshot.window, Some(true), Some(ConversionMode::NATIVE))
        {
            Ok(()) => {
                tracing::info!(title = %snapshot.display_title(), "switched IME to native mode");
                ActionOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(title = %snapshot.display_title(), error = %e, "IME mode change failed");
                ActionOutcome::Failed(Failure::ImeError)
            }
        }
    }

    /// Auto-correct loop. Backs off for twice the interval after a failed command.
    pub fn run_auto_correct(&self) {
        let interval = self.settings.auto_interval;
        tracing::debug!(interval_ms = interval.as_millis() as u64, "auto-correct started");

        loop {
            let pause = match self.auto_correct_tick() {
                ActionOutcome::Failed(_) => interval * 2,
                _ => interval,
            };
            if !self.shutdown.sleep(pause) {
                break;
            }
        }

        tracing::debug!("auto-correct stopped");
    }

    pub fn status(&self) -> StatusReport {
        let snapshot = self.query.read_foreground();
        let mode = snapshot.ime.derive(snapshot.language, self.primary_language());
        StatusReport {
            is_candidate: self.auto.is_candidate(&snapshot),
            title: snapshot.display_title().to_owned(),
            language: snapshot.language,
            layout: snapshot.layout,
            native: mode.native,
            punctuation: mode.punctuation,
            auto_correct: self.auto.is_enabled(),
            session_active: self.session.is_active(),
        }
    }

    pub fn log_status(&self) {
        let s = self.status();
        tracing::info!(
            title = %s.title,
            language = %s.language,
            layout = %KeyboardLayoutId(s.layout),
            candidate = s.is_candidate,
            native = s.native,
            punctuation = s.punctuation.as_str(),
            force_secondary_mode = s.auto_correct,
            session_active = s.session_active,
            "status"
        );
    }
}
