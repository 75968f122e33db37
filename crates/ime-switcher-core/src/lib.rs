//! Platform-independent vocabulary shared by the switcher: layout and language ids,
//! IME conversion modes and the shortcut grammar used in the config file.

pub mod ime;
pub mod layout;
pub mod shortcut;

pub use ime::{ConversionMode, ImeMode, ImeState, PunctuationMode};
pub use layout::{KeyboardLayoutId, LanguageId, ParseLayoutIdError};
pub use shortcut::{MODIFIER_KEYS, Shortcut, parse_shortcut};
