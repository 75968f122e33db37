mod config_validator;
pub mod constants;
pub mod raw_config;

use std::{
    fmt, io,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use ime_switcher_core::{KeyboardLayoutId, Shortcut, parse_shortcut};
pub use raw_config::{RawConfig, RawHotkeys};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use self::constants::{
    DEFAULT_INSTANT_TOGGLE, DEFAULT_SECONDARY_IME_CANDIDATES, DEFAULT_TEMP_TOGGLE, DEFAULT_TOGGLE,
    INSTANT_TOGGLE, SWITCH_PRIMARY, SWITCH_SECONDARY, TEMP_TOGGLE, TOGGLE,
};

const APP_DIR: &str = "ImeSwitcher";
const CONFIG_FILE: &str = "config.toml";

/// Where hotkey presses come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HotkeySource {
    /// `RegisterHotKey` on the hidden window.
    #[default]
    Register,
    /// Poll the key state and match combinations in-process.
    Poll,
}

impl HotkeySource {
    pub fn as_str(self) -> &'static str {
        match self {
            HotkeySource::Register => "register",
            HotkeySource::Poll => "poll",
        }
    }
}

impl FromStr for HotkeySource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "register" => Ok(HotkeySource::Register),
            "poll" => Ok(HotkeySource::Poll),
            other => Err(format!(
                "hotkey_source: expected \"register\" or \"poll\", got \"{other}\""
            )),
        }
    }
}

impl fmt::Display for HotkeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shortcut per action. `None` means the action has no hotkey.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hotkeys {
    pub toggle: Option<Shortcut>,
    pub temp_toggle: Option<Shortcut>,
    pub instant_toggle: Option<Shortcut>,
    pub switch_primary: Option<Shortcut>,
    pub switch_secondary: Option<Shortcut>,
}

impl Hotkeys {
    pub fn named(&self) -> [(&'static str, Option<Shortcut>); 5] {
        [
            (TOGGLE, self.toggle),
            (TEMP_TOGGLE, self.temp_toggle),
            (INSTANT_TOGGLE, self.instant_toggle),
            (SWITCH_PRIMARY, self.switch_primary),
            (SWITCH_SECONDARY, self.switch_secondary),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub temp_switch_interval: Duration,
    pub instant_switch_interval: Duration,
    pub auto_switch_interval: Duration,
    pub key_sample_interval: Duration,
    pub primary_keyboard: KeyboardLayoutId,
    pub secondary_keyboard: KeyboardLayoutId,
    pub force_secondary_mode: bool,
    pub hotkey_source: HotkeySource,
    pub secondary_ime_candidates: Vec<KeyboardLayoutId>,
    pub hotkeys: Hotkeys,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            temp_switch_interval: Duration::from_secs(2),
            instant_switch_interval: Duration::from_millis(600),
            auto_switch_interval: Duration::from_millis(200),
            key_sample_interval: Duration::from_millis(50),
            primary_keyboard: KeyboardLayoutId::ENGLISH_US,
            secondary_keyboard: KeyboardLayoutId::CHINESE_SIMPLIFIED,
            force_secondary_mode: true,
            hotkey_source: HotkeySource::Register,
            secondary_ime_candidates: DEFAULT_SECONDARY_IME_CANDIDATES.to_vec(),
            hotkeys: Hotkeys {
                toggle: Some(parse_shortcut(DEFAULT_TOGGLE)),
                temp_toggle: Some(parse_shortcut(DEFAULT_TEMP_TOGGLE)),
                instant_toggle: Some(parse_shortcut(DEFAULT_INSTANT_TOGGLE)),
                switch_primary: None,
                switch_secondary: None,
            },
        }
    }
}

pub fn config_path() -> io::Result<PathBuf> {
    let appdata = std::env::var_os("APPDATA")
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "APPDATA is not set"))?;

    Ok(PathBuf::from(appdata).join(APP_DIR).join(CONFIG_FILE))
}

fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    let Some(dir) = path.parent() else {
        return Ok(());
    };
    std::fs::create_dir_all(dir)
}

/// Flattens the error chain; confy's own message alone does not say what was wrong.
fn confy_err(e: confy::ConfyError) -> io::Error {
    let mut message = e.to_string();
    let mut source = std::error::Error::source(&e);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    io::Error::other(message)
}

/// Loads the config file, writing the defaults first if it does not exist yet.
pub fn load() -> io::Result<Config> {
    let path = config_path()?;
    ensure_parent_dir(&path)?;

    confy::load_path(&path).map_err(confy_err)
}

pub fn save(cfg: &Config) -> io::Result<()> {
    let path = config_path()?;
    ensure_parent_dir(&path)?;
    confy::store_path(path, cfg).map_err(confy_err)
}

/// Like [`load`], but never fails: any problem is logged once and the defaults are used.
pub fn load_or_default() -> Config {
    match load() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!(error = %e, "failed to load config, using defaults");
            Config::default()
        }
    }
}

fn seconds(name: &str, value: f64) -> Result<Duration, String> {
    if !value.is_finite() || value <= 0.0 {
        return Err(format!("{name}: expected a positive number of seconds, got {value}"));
    }

    let millis = (value * 1000.0).round() as u64;
    if millis == 0 {
        return Err(format!("{name}: {value} s is shorter than one millisecond"));
    }
    Ok(Duration::from_millis(millis))
}

fn layout_id(name: &str, value: &str) -> Result<KeyboardLayoutId, String> {
    value
        .parse()
        .map_err(|e| format!("{name}: \"{value}\" is not a keyboard layout id: {e}"))
}

fn shortcut(name: &str, value: &str) -> Option<Shortcut> {
    let parsed = parse_shortcut(value);
    if parsed.is_bindable() {
        return Some(parsed);
    }

    if value.trim().is_empty() {
        tracing::debug!(action = name, "no shortcut configured");
    } else {
        tracing::warn!(action = name, shortcut = value, "shortcut names no key, action disabled");
    }
    None
}

impl TryFrom<RawConfig> for Config {
    type Error = String;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let secondary_ime_candidates = raw
            .secondary_ime_candidates
            .iter()
            .map(|id| layout_id("secondary_ime_candidates", id))
            .collect::<Result<Vec<_>, _>>()?;

        let hotkeys = Hotkeys {
            toggle: shortcut(TOGGLE, &raw.hotkeys.toggle),
            temp_toggle: shortcut(TEMP_TOGGLE, &raw.hotkeys.temp_toggle),
            instant_toggle: shortcut(INSTANT_TOGGLE, &raw.hotkeys.instant_toggle),
            switch_primary: shortcut(SWITCH_PRIMARY, &raw.hotkeys.switch_primary),
            switch_secondary: shortcut(SWITCH_SECONDARY, &raw.hotkeys.switch_secondary),
        };
        hotkeys.validate()?;

        Ok(Self {
            temp_switch_interval: seconds("temp_switch_interval", raw.temp_switch_interval)?,
            instant_switch_interval: seconds(
                "instant_switch_interval",
                raw.instant_switch_interval,
            )?,
            auto_switch_interval: seconds("auto_switch_interval", raw.auto_switch_interval)?,
            key_sample_interval: seconds("key_sample_interval", raw.key_sample_interval)?,
            primary_keyboard: layout_id("primary_keyboard_id", &raw.primary_keyboard_id)?,
            secondary_keyboard: layout_id("secondary_keyboard_id", &raw.secondary_keyboard_id)?,
            force_secondary_mode: raw.force_secondary_mode,
            hotkey_source: raw.hotkey_source.parse()?,
            secondary_ime_candidates,
            hotkeys,
        })
    }
}

fn shortcut_text(s: Option<Shortcut>) -> String {
    s.map(|s| s.to_string()).unwrap_or_default()
}

impl From<&Config> for RawConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            temp_switch_interval: cfg.temp_switch_interval.as_secs_f64(),
            instant_switch_interval: cfg.instant_switch_interval.as_secs_f64(),
            primary_keyboard_id: cfg.primary_keyboard.to_string(),
            secondary_keyboard_id: cfg.secondary_keyboard.to_string(),
            force_secondary_mode: cfg.force_secondary_mode,
            auto_switch_interval: cfg.auto_switch_interval.as_secs_f64(),
            key_sample_interval: cfg.key_sample_interval.as_secs_f64(),
            hotkey_source: cfg.hotkey_source.to_string(),
            secondary_ime_candidates: cfg
                .secondary_ime_candidates
                .iter()
                .map(ToString::to_string)
                .collect(),
            hotkeys: RawHotkeys {
                toggle: shortcut_text(cfg.hotkeys.toggle),
                temp_toggle: shortcut_text(cfg.hotkeys.temp_toggle),
                instant_toggle: shortcut_text(cfg.hotkeys.instant_toggle),
                switch_primary: shortcut_text(cfg.hotkeys.switch_primary),
                switch_secondary: shortcut_text(cfg.hotkeys.switch_secondary),
            },
        }
    }
}

impl<'de> Deserialize<'de> for Config {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawConfig::deserialize(deserializer)?;
        Self::try_from(raw).map_err(serde::de::Error::custom)
    }
}

impl Serialize for Config {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        RawConfig::from(self).serialize(serializer)
    }
}
