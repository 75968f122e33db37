use ime_switcher_core::{ConversionMode, ImeState, LanguageId};
use windows::Win32::{
    Foundation::{HWND, LPARAM, WPARAM},
    UI::{
        Input::{Ime::ImmGetDefaultIMEWnd, KeyboardAndMouse::GetKeyboardLayout},
        WindowsAndMessaging::{
            GA_ROOTOWNER, GetAncestor, GetForegroundWindow, GetWindowTextW,
            GetWindowThreadProcessId, SendMessageW,
        },
    },
};

use super::{IMC_GETCONVERSIONMODE, IMC_GETOPENSTATUS, WM_IME_CONTROL, window_handle};
use crate::domain::ports::{ForegroundSnapshot, WindowInputQuery};

/// Reads layout and IME state of the foreground window.
#[derive(Clone, Copy, Debug, Default)]
pub struct ForegroundQuery;

fn foreground_root() -> Option<HWND> {
    let fg = unsafe { GetForegroundWindow() };
    if fg.is_invalid() {
        return None;
    }

    let root = unsafe { GetAncestor(fg, GA_ROOTOWNER) };
    Some(if root.is_invalid() { fg } else { root })
}

fn window_title(hwnd: HWND) -> String {
    let mut buf = [0u16; 512];
    let len = unsafe { GetWindowTextW(hwnd, &mut buf) };
    let len = usize::try_from(len).unwrap_or(0).min(buf.len());
    String::from_utf16_lossy(&buf[..len])
}

fn layout_of(hwnd: HWND) -> u32 {
    let thread = unsafe { GetWindowThreadProcessId(hwnd, None) };
    let hkl = unsafe { GetKeyboardLayout(thread) };
    // Only the low 32 bits carry the layout id.
    hkl.0 as usize as u32
}

fn ime_control(ime: HWND, command: usize) -> isize {
    unsafe { SendMessageW(ime, WM_IME_CONTROL, Some(WPARAM(command)), Some(LPARAM(0))) }.0
}

/// `None` when the window has no default IME window.
fn ime_state_of(hwnd: HWND) -> Option<ImeState> {
    let ime = unsafe { ImmGetDefaultIMEWnd(hwnd) };
    if ime.is_invalid() {
        return None;
    }

    let is_open = ime_control(ime, IMC_GETOPENSTATUS) != 0;
    let conversion = ConversionMode(ime_control(ime, IMC_GETCONVERSIONMODE) as u32);
    Some(ImeState {
        is_open,
        conversion,
    })
}

impl WindowInputQuery for ForegroundQuery {
    fn read_foreground(&self) -> ForegroundSnapshot {
        let Some(hwnd) = foreground_root() else {
            return ForegroundSnapshot::unknown();
        };

        let layout = layout_of(hwnd);
        let ime = ime_state_of(hwnd);

        ForegroundSnapshot {
            window: window_handle(hwnd),
            title: window_title(hwnd),
            layout,
            language: LanguageId::from_layout_handle(layout),
            ime: ime.unwrap_or(ImeState::CLOSED),
            has_ime_context: ime.is_some(),
        }
    }
}

