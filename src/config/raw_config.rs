use serde::{Deserialize, Serialize};

use super::constants::{
    DEFAULT_INSTANT_TOGGLE, DEFAULT_SECONDARY_IME_CANDIDATES, DEFAULT_TEMP_TOGGLE, DEFAULT_TOGGLE,
};

/// On-disk shape of the config file. Every field has a default so partial files load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub temp_switch_interval: f64,
    pub instant_switch_interval: f64,
    pub primary_keyboard_id: String,
    pub secondary_keyboard_id: String,
    #[serde(alias = "force_cn_mode")]
    pub force_secondary_mode: bool,
    pub auto_switch_interval: f64,
    pub key_sample_interval: f64,
    pub hotkey_source: String,
    pub secondary_ime_candidates: Vec<String>,

    // Tables must come after plain values in TOML.
    pub hotkeys: RawHotkeys,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawHotkeys {
    pub toggle: String,
    pub temp_toggle: String,
    pub instant_toggle: String,
    #[serde(alias = "english")]
    pub switch_primary: String,
    #[serde(alias = "secondary")]
    pub switch_secondary: String,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            temp_switch_interval: 2.0,
            instant_switch_interval: 0.6,
            primary_keyboard_id: "00000409".into(),
            secondary_keyboard_id: "00000804".into(),
            force_secondary_mode: true,
            auto_switch_interval: 0.2,
            key_sample_interval: 0.05,
            hotkey_source: "register".into(),
            secondary_ime_candidates: DEFAULT_SECONDARY_IME_CANDIDATES
                .iter()
                .map(ToString::to_string)
                .collect(),
            hotkeys: RawHotkeys::default(),
        }
    }
}

impl Default for RawHotkeys {
    fn default() -> Self {
        Self {
            toggle: DEFAULT_TOGGLE.into(),
            temp_toggle: DEFAULT_TEMP_TOGGLE.into(),
            instant_toggle: DEFAULT_INSTANT_TOGGLE.into(),
            switch_primary: String::new(),
            switch_secondary: String::new(),
        }
    }
}
