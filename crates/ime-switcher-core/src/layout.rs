use std::{fmt, str::FromStr};

/// Locale half of a keyboard layout handle (`LANGID`).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct LanguageId(pub u16);

impl LanguageId {
    pub const ENGLISH_US: Self = Self(0x0409);
    pub const CHINESE_SIMPLIFIED: Self = Self(0x0804);

    /// Extracts the language from a raw layout handle value (its low word).
    #[must_use]
    pub const fn from_layout_handle(raw: u32) -> Self {
        Self((raw & 0xFFFF) as u16)
    }
}

impl fmt::Display for LanguageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}", self.0)
    }
}

/// Keyboard layout identifier (`KLID`), written as exactly 8 hex digits, e.g. `00000804`.
///
/// The low 16 bits are the language; the high 16 bits select the layout variant.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct KeyboardLayoutId(pub u32);

impl KeyboardLayoutId {
    pub const ENGLISH_US: Self = Self(0x0000_0409);
    pub const CHINESE_SIMPLIFIED: Self = Self(0x0000_0804);

    #[must_use]
    pub const fn language(self) -> LanguageId {
        LanguageId::from_layout_handle(self.0)
    }
}

impl fmt::Display for KeyboardLayoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseLayoutIdError {
    Length(usize),
    NotHex(String),
}

impl fmt::Display for ParseLayoutIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length(n) => write!(f, "keyboard id must be 8 hex digits, got {n} characters"),
            Self::NotHex(s) => write!(f, "keyboard id '{s}' is not hexadecimal"),
        }
    }
}

impl std::error::Error for ParseLayoutIdError {}

impl FromStr for KeyboardLayoutId {
    type Err = ParseLayoutIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let len = s.chars().count();
        if len != 8 {
            return Err(ParseLayoutIdError::Length(len));
        }
        if !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ParseLayoutIdError::NotHex(s.to_string()));
        }
        u32::from_str_radix(s, 16)
            .map(Self)
            .map_err(|_| ParseLayoutIdError::NotHex(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_secondary_keyboard_id() {
        let id: KeyboardLayoutId = "00000804".parse().unwrap();
        assert_eq!(id, KeyboardLayoutId::CHINESE_SIMPLIFIED);
        assert_eq!(id.language(), LanguageId::CHINESE_SIMPLIFIED);
        assert_eq!(id.to_string(), "00000804");
    }

    #[test]
    fn language_is_low_word_of_variant_layouts() {
        let id: KeyboardLayoutId = "e0010804".parse().unwrap();
        assert_eq!(id.0, 0xE001_0804);
        assert_eq!(id.language(), LanguageId(0x0804));
        assert_eq!(id.to_string(), "E0010804");
    }

    #[test]
    fn rejects_wrong_length_and_non_hex() {
        assert_eq!(
            "0804".parse::<KeyboardLayoutId>(),
            Err(ParseLayoutIdError::Length(4))
        );
        assert!(matches!(
            "0000080G".parse::<KeyboardLayoutId>(),
            Err(ParseLayoutIdError::NotHex(_))
        ));
        assert!("+0000804".parse::<KeyboardLayoutId>().is_err());
    }

    #[test]
    fn language_display_is_four_lowercase_digits() {
        assert_eq!(LanguageId::ENGLISH_US.to_string(), "0409");
        assert_eq!(LanguageId(0xABC).to_string(), "0abc");
    }
}
