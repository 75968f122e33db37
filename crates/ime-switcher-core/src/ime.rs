use crate::layout::LanguageId;

/// IME conversion mode bitset (`IME_CMODE_*`).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct ConversionMode(pub u32);

impl ConversionMode {
    pub const ALPHANUMERIC: Self = Self(0x0000);
    pub const NATIVE: Self = Self(0x0001);
    pub const KATAKANA: Self = Self(0x0002);
    pub const FULLSHAPE: Self = Self(0x0008);
    pub const NOCONVERSION: Self = Self(0x0100);
    pub const SYMBOL: Self = Self(0x0400);

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl std::ops::BitOr for ConversionMode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// How punctuation keys are interpreted in the current mode.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PunctuationMode {
    NativeSymbols,
    FullWidth,
    HalfWidth,
}

impl PunctuationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            PunctuationMode::NativeSymbols => "native_symbols",
            PunctuationMode::FullWidth => "full_width",
            PunctuationMode::HalfWidth => "half_width",
        }
    }
}

/// Raw IME status as reported by the IME window of the foreground window.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ImeState {
    pub is_open: bool,
    pub conversion: ConversionMode,
}

/// Interpreted IME status after the open-flag quirks are applied.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ImeMode {
    pub open: bool,
    pub native: bool,
    pub punctuation: PunctuationMode,
}

impl ImeState {
    pub const CLOSED: Self = Self {
        is_open: false,
        conversion: ConversionMode::ALPHANUMERIC,
    };

    /// Open flag as it should be trusted.
    ///
    /// IMEs keep a stale "open" flag after switching to the primary (Latin) layout, and
    /// `NOCONVERSION` means conversion is off no matter what the open flag says.
    #[must_use]
    pub fn effective_open(&self, language: LanguageId, primary: LanguageId) -> bool {
        if language == primary {
            return false;
        }
        if self.conversion.contains(ConversionMode::NOCONVERSION) {
            return false;
        }
        self.is_open
    }

    #[must_use]
    pub fn derive(&self, language: LanguageId, primary: LanguageId) -> ImeMode {
        let open = self.effective_open(language, primary);
        let native = open && self.conversion.contains(ConversionMode::NATIVE);

        let punctuation = if native && self.conversion.contains(ConversionMode::SYMBOL) {
            PunctuationMode::NativeSymbols
        } else if self.conversion.contains(ConversionMode::FULLSHAPE) {
            PunctuationMode::FullWidth
        } else {
            PunctuationMode::HalfWidth
        };

        ImeMode {
            open,
            native,
            punctuation,
        }
    }

    #[must_use]
    pub fn is_native_mode(&self, language: LanguageId, primary: LanguageId) -> bool {
        self.derive(language, primary).native
    }

    #[must_use]
    pub fn is_symbol_mode(&self, language: LanguageId, primary: LanguageId) -> bool {
        self.derive(language, primary).punctuation == PunctuationMode::NativeSymbols
    }

    #[must_use]
    pub fn is_fullwidth_mode(&self) -> bool {
        self.conversion.contains(ConversionMode::FULLSHAPE)
    }
}
