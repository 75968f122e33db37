use ime_switcher_core::KeyboardLayoutId;

pub const TOGGLE: &str = "toggle";
pub const TEMP_TOGGLE: &str = "temp_toggle";
pub const INSTANT_TOGGLE: &str = "instant_toggle";
pub const SWITCH_PRIMARY: &str = "switch_primary";
pub const SWITCH_SECONDARY: &str = "switch_secondary";

pub const DEFAULT_TOGGLE: &str = "Ctrl+\\";
pub const DEFAULT_TEMP_TOGGLE: &str = "Ctrl+Shift+\\";
pub const DEFAULT_INSTANT_TOGGLE: &str = "Ctrl+Alt+\\";

/// Microsoft Pinyin layouts.
pub const DEFAULT_SECONDARY_IME_CANDIDATES: [KeyboardLayoutId; 3] = [
    KeyboardLayoutId(0x0804_0804),
    KeyboardLayoutId(0x0000_0804),
    KeyboardLayoutId(0xE001_0804),
];
