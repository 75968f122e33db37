use std::{sync::mpsc::Sender, time::Duration};

use ime_switcher_core::{MODIFIER_KEYS, Shortcut};

use super::hotkeys::{HotkeyAction, HotkeyEvent};
use crate::domain::{ports::KeyStateSource, shutdown::Shutdown};

struct Binding {
    action: HotkeyAction,
    shortcut: Shortcut,
    latched: bool,
    /// Trigger key state at the previous poll.
    key_was_down: bool,
}

/// Polling replacement for `RegisterHotKey`.
///
/// A binding fires on the press edge of its trigger key while exactly its modifiers are held,
/// and re-arms only after all of its keys are up again. Releasing a modifier of a longer
/// combination while the key stays down therefore never fires a shorter one.
pub struct ComboWatcher<S> {
    source: S,
    bindings: Vec<Binding>,
    tx: Sender<HotkeyEvent>,
}

impl<S: KeyStateSource> ComboWatcher<S> {
    pub fn new(source: S, bindings: Vec<(HotkeyAction, Shortcut)>, tx: Sender<HotkeyEvent>) -> Self {
        let bindings = bindings
            .into_iter()
            .filter(|(_, shortcut)| shortcut.is_bindable())
            .map(|(action, shortcut)| Binding {
                action,
                shortcut,
                latched: false,
                key_was_down: false,
            })
            .collect();

        Self {
            source,
            bindings,
            tx,
        }
    }

    fn down(&self, vk: u32) -> bool {
        u8::try_from(vk).is_ok_and(|vk| self.source.is_down(vk))
    }

    fn any_down(&self, keys: &[u32]) -> bool {
        keys.iter().any(|&vk| self.down(vk))
    }

    /// Exactly the shortcut's modifiers are held, so `Ctrl+\` does not fire on `Ctrl+Shift+\`.
    fn modifiers_match(&self, shortcut: &Shortcut) -> bool {
        MODIFIER_KEYS
            .iter()
            .all(|(mask, keys)| (shortcut.mods & mask != 0) == self.any_down(keys))
    }

    fn is_released(&self, shortcut: &Shortcut) -> bool {
        let key_up = shortcut.vk.is_none_or(|vk| !self.down(vk));

        key_up
            && MODIFIER_KEYS
                .iter()
                .filter(|(mask, _)| shortcut.mods & mask != 0)
                .all(|(_, keys)| !self.any_down(keys))
    }

    /// One pass over all bindings. Returns `false` once the receiving side is gone.
    pub fn poll(&mut self) -> bool {
        for i in 0..self.bindings.len() {
            let shortcut = self.bindings[i].shortcut;
            let key_down = shortcut.vk.is_some_and(|vk| self.down(vk));
            let key_edge = key_down && !self.bindings[i].key_was_down;
            self.bindings[i].key_was_down = key_down;

            if self.bindings[i].latched {
                if self.is_released(&shortcut) {
                    self.bindings[i].latched = false;
                }
                continue;
            }

            if key_edge && self.modifiers_match(&shortcut) {
                let action = self.bindings[i].action;
                self.bindings[i].latched = true;
                tracing::debug!(action = action.as_str(), shortcut = %shortcut, "combination pressed");

                if self.tx.send(HotkeyEvent::Hotkey(action.id())).is_err() {
                    return false;
                }
            }
        }
        true
    }

    pub fn run(mut self, interval: Duration, shutdown: &Shutdown) {
        tracing::debug!(bindings = self.bindings.len(), "combination watcher started");
        while shutdown.sleep(interval) {
            if !self.poll() {
                break;
            }
        }
        tracing::debug!("combination watcher stopped");
    }
}
