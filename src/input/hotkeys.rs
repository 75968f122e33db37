use std::{
    sync::{Arc, mpsc::Receiver},
    thread::JoinHandle,
};

use ime_switcher_core::Shortcut;

use crate::{
    config::{
        Config,
        constants::{INSTANT_TOGGLE, SWITCH_PRIMARY, SWITCH_SECONDARY, TEMP_TOGGLE, TOGGLE},
    },
    domain::{
        engine::ToggleEngine,
        outcome::ActionOutcome,
        ports::{InputCommander, WindowInputQuery},
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HotkeyAction {
    Toggle,
    TempToggle,
    InstantToggle,
    SwitchPrimary,
    SwitchSecondary,
}

impl HotkeyAction {
    pub const ALL: [HotkeyAction; 5] = [
        HotkeyAction::Toggle,
        HotkeyAction::TempToggle,
        HotkeyAction::InstantToggle,
        HotkeyAction::SwitchPrimary,
        HotkeyAction::SwitchSecondary,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HotkeyAction::Toggle => TOGGLE,
            HotkeyAction::TempToggle => TEMP_TOGGLE,
            HotkeyAction::InstantToggle => INSTANT_TOGGLE,
            HotkeyAction::SwitchPrimary => SWITCH_PRIMARY,
            HotkeyAction::SwitchSecondary => SWITCH_SECONDARY,
        }
    }

    pub fn id(self) -> i32 {
        match self {
            HotkeyAction::Toggle => HK_TOGGLE_ID,
            HotkeyAction::TempToggle => HK_TEMP_TOGGLE_ID,
            HotkeyAction::InstantToggle => HK_INSTANT_TOGGLE_ID,
            HotkeyAction::SwitchPrimary => HK_SWITCH_PRIMARY_ID,
            HotkeyAction::SwitchSecondary => HK_SWITCH_SECONDARY_ID,
        }
    }

    fn shortcut(self, cfg: &Config) -> Option<Shortcut> {
        let hk = &cfg.hotkeys;
        match self {
            HotkeyAction::Toggle => hk.toggle,
            HotkeyAction::TempToggle => hk.temp_toggle,
            HotkeyAction::InstantToggle => hk.instant_toggle,
            HotkeyAction::SwitchPrimary => hk.switch_primary,
            HotkeyAction::SwitchSecondary => hk.switch_secondary,
        }
    }
}

// Ids start at 20000 so they never collide with menu command ids.
const HK_ID_BASE: i32 = 20000;

pub const HK_TOGGLE_ID: i32 = HK_ID_BASE + 1;
pub const HK_TEMP_TOGGLE_ID: i32 = HK_ID_BASE + 2;
pub const HK_INSTANT_TOGGLE_ID: i32 = HK_ID_BASE + 3;
pub const HK_SWITCH_PRIMARY_ID: i32 = HK_ID_BASE + 4;
pub const HK_SWITCH_SECONDARY_ID: i32 = HK_ID_BASE + 5;

pub fn action_from_id(id: i32) -> Option<HotkeyAction> {
    match id {
        HK_TOGGLE_ID => Some(HotkeyAction::Toggle),
        HK_TEMP_TOGGLE_ID => Some(HotkeyAction::TempToggle),
        HK_INSTANT_TOGGLE_ID => Some(HotkeyAction::InstantToggle),
        HK_SWITCH_PRIMARY_ID => Some(HotkeyAction::SwitchPrimary),
        HK_SWITCH_SECONDARY_ID => Some(HotkeyAction::SwitchSecondary),
        _ => None,
    }
}

/// Actions that have a usable shortcut, in id order.
pub fn bindings(cfg: &Config) -> Vec<(HotkeyAction, Shortcut)> {
    HotkeyAction::ALL
        .into_iter()
        .filter_map(|action| action.shortcut(cfg).map(|s| (action, s)))
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HotkeyEvent {
    Hotkey(i32),
    Shutdown,
}

/// Consumes hotkey ids and runs the matching engine operation.
pub struct HotkeyDispatcher<Q, C> {
    engine: Arc<ToggleEngine<Q, C>>,
    workers: Vec<(HotkeyAction, JoinHandle<ActionOutcome>)>,
}

impl<Q, C> HotkeyDispatcher<Q, C>
where
    Q: WindowInputQuery + 'static,
    C: InputCommander + 'static,
{
    pub fn new(engine: Arc<ToggleEngine<Q, C>>) -> Self {
        Self {
            engine,
            workers: Vec::new(),
        }
    }

    /// Runs until [`HotkeyEvent::Shutdown`] arrives or every sender is dropped, then waits for
    /// any temporary switch still in flight.
    pub fn run(mut self, rx: &Receiver<HotkeyEvent>) {
        tracing::debug!("hotkey dispatcher started");

        while let Ok(event) = rx.recv() {
            match event {
                HotkeyEvent::Shutdown => break,
                HotkeyEvent::Hotkey(id) => self.on_hotkey(id),
            }
        }

        for (action, worker) in self.workers.drain(..) {
            join_worker(action, worker);
        }
        tracing::debug!("hotkey dispatcher stopped");
    }

    /// Joins and logs every temporary switch that has already ended.
    fn reap_finished(&mut self) {
        let (finished, running) = self
            .workers
            .drain(..)
            .partition(|(_, worker)| worker.is_finished());
        self.workers = running;

        for (action, worker) in finished {
            join_worker(action, worker);
        }
    }

    fn on_hotkey(&mut self, id: i32) {
        let Some(action) = action_from_id(id) else {
            tracing::warn!(id, "unknown hotkey id");
            return;
        };
        tracing::debug!(action = action.as_str(), "hotkey");
        self.dispatch(action);
    }

    pub fn dispatch(&mut self, action: HotkeyAction) {
        self.reap_finished();

        let outcome = match action {
            HotkeyAction::Toggle => self.engine.toggle(),
            HotkeyAction::SwitchPrimary => self.engine.switch_primary(),
            HotkeyAction::SwitchSecondary => self.engine.switch_secondary(),
            HotkeyAction::TempToggle | HotkeyAction::InstantToggle => {
                let interval = if action == HotkeyAction::TempToggle {
                    self.engine.temp_interval()
                } else {
                    self.engine.instant_interval()
                };
                if let Some(worker) = self.engine.spawn_temp_toggle(interval) {
                    self.workers.push((action, worker));
                }
                return;
            }
        };

        log_outcome(action, &outcome);
    }
}

fn join_worker(action: HotkeyAction, worker: JoinHandle<ActionOutcome>) {
    match worker.join() {
        Ok(outcome) => log_outcome(action, &outcome),
        Err(_) => tracing::error!(action = action.as_str(), "temporary switch worker panicked"),
    }
}

fn log_outcome(action: HotkeyAction, outcome: &ActionOutcome) {
    match outcome {
        ActionOutcome::Applied => {}
        ActionOutcome::Skipped(reason) => {
            tracing::debug!(action = action.as_str(), reason = reason.as_str(), "skipped");
        }
        ActionOutcome::Failed(failure) => {
            tracing::debug!(action = action.as_str(), failure = ?failure, "failed");
        }
    }
}
