//! Seams between the toggle engine and the operating system.
//!
//! The engine only talks to [`WindowInputQuery`] and [`InputCommander`]; the Windows
//! implementations live in `platform::win`, tests use in-memory fakes.

use ime_switcher_core::{ConversionMode, ImeState, KeyboardLayoutId, LanguageId};

/// Opaque top-level window identifier (`HWND` value).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct WindowHandle(pub isize);

impl WindowHandle {
    pub const UNKNOWN: Self = Self(0);

    pub fn is_unknown(self) -> bool {
        self == Self::UNKNOWN
    }
}

/// Everything the engine needs to know about the foreground window for one decision.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ForegroundSnapshot {
    pub window: WindowHandle,
    pub title: String,
    /// Low 32 bits of the active layout handle (`HKL`).
    pub layout: u32,
    pub language: LanguageId,
    pub ime: ImeState,
    pub has_ime_context: bool,
}

impl ForegroundSnapshot {
    /// Neutral snapshot used when there is no foreground window.
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "[Unknown]"
        } else {
            &self.title
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("no target window")]
    NoWindow,

    #[error("window has no IME context")]
    NoImeContext,

    #[error("keyboard layout {layout} was rejected: {reason}")]
    LayoutRejected {
        layout: KeyboardLayoutId,
        reason: String,
    },

    #[error("{what} was rejected: {reason}")]
    MessageRejected { what: &'static str, reason: String },
}

/// Read-only view of the foreground window's input state.
pub trait WindowInputQuery: Send + Sync {
    /// Never fails: missing windows or IME contexts yield neutral values.
    fn read_foreground(&self) -> ForegroundSnapshot;
}

/// Requests changes to a window's keyboard layout or IME mode.
///
/// `Ok` means the OS accepted the request, not that the window already shows the change.
pub trait InputCommander: Send + Sync {
    fn activate_layout(
        &self,
        window: WindowHandle,
        layout: KeyboardLayoutId,
    ) -> Result<(), CommandError>;

    /// `None` leaves the corresponding field unchanged.
    fn set_ime_state(
        &self,
        window: WindowHandle,
        open: Option<bool>,
        conversion: Option<ConversionMode>,
    ) -> Result<(), CommandError>;
}

/// Global "is this key held" query.
pub trait KeyStateSource: Send {
    fn is_down(&self, vk: u8) -> bool;
}
