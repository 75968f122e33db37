use std::fmt::Write as _;

use ime_switcher_core::Shortcut;

use crate::config::Hotkeys;

/// Lists every pair of actions bound to the same shortcut. Disabled actions never collide.
pub fn find_duplicate_shortcuts(hotkeys: &Hotkeys) -> Option<String> {
    let bound: Vec<(&str, Shortcut)> = hotkeys
        .named()
        .into_iter()
        .filter_map(|(name, shortcut)| shortcut.map(|s| (name, s)))
        .collect();

    let duplicates: Vec<_> = bound
        .iter()
        .enumerate()
        .flat_map(|(i, (name1, s1))| {
            bound
                .iter()
                .skip(i + 1)
                .filter(move |(_, s2)| s1 == s2)
                .map(move |(name2, _)| (*name1, *name2, *s1))
        })
        .collect();

    if duplicates.is_empty() {
        return None;
    }

    let mut error = String::from("Duplicate shortcuts found:\n\n");
    for (name1, name2, shortcut) in &duplicates {
        let _ = writeln!(error, "- '{name1}' and '{name2}' both use {shortcut}");
    }
    error.push_str("\nEach action must have a unique shortcut.");
    Some(error)
}

impl Hotkeys {
    pub fn validate(&self) -> Result<(), String> {
        match find_duplicate_shortcuts(self) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
