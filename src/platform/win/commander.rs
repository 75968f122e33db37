use ime_switcher_core::{ConversionMode, KeyboardLayoutId};
use windows::{
    Win32::{
        Foundation::{HWND, LPARAM, WPARAM},
        UI::{
            Input::{
                Ime::ImmGetDefaultIMEWnd,
                KeyboardAndMouse::{KLF_ACTIVATE, LoadKeyboardLayoutW},
            },
            WindowsAndMessaging::{PostMessageW, SendMessageW, WM_INPUTLANGCHANGEREQUEST},
        },
    },
    core::PCWSTR,
};

use super::{IMC_SETCONVERSIONMODE, IMC_SETOPENSTATUS, WM_IME_CONTROL, hwnd_from};
use crate::domain::ports::{CommandError, InputCommander, WindowHandle};

/// Sends layout and IME requests to other windows through their message queues.
#[derive(Clone, Copy, Debug, Default)]
pub struct Win32Commander;

fn target(window: WindowHandle) -> Result<HWND, CommandError> {
    if window.is_unknown() {
        return Err(CommandError::NoWindow);
    }
    Ok(hwnd_from(window))
}

fn ime_window(hwnd: HWND) -> Result<HWND, CommandError> {
    let ime = unsafe { ImmGetDefaultIMEWnd(hwnd) };
    if ime.is_invalid() {
        return Err(CommandError::NoImeContext);
    }
    Ok(ime)
}

impl InputCommander for Win32Commander {
    fn activate_layout(
        &self,
        window: WindowHandle,
        layout: KeyboardLayoutId,
    ) -> Result<(), CommandError> {
        let hwnd = target(window)?;

        let name: Vec<u16> = layout
            .to_string()
            .encode_utf16()
            .chain(std::iter::once(0))
            .collect();
        let hkl = unsafe { LoadKeyboardLayoutW(PCWSTR(name.as_ptr()), KLF_ACTIVATE) }.map_err(
            |e| CommandError::LayoutRejected {
                layout,
                reason: e.to_string(),
            },
        )?;

        unsafe {
            PostMessageW(
                Some(hwnd),
                WM_INPUTLANGCHANGEREQUEST,
                WPARAM(0),
                LPARAM(hkl.0 as isize),
            )
        }
        .map_err(|e| CommandError::MessageRejected {
            what: "WM_INPUTLANGCHANGEREQUEST",
            reason: e.to_string(),
        })
    }

    fn set_ime_state(
        &self,
        window: WindowHandle,
        open: Option<bool>,
        conversion: Option<ConversionMode>,
    ) -> Result<(), CommandError> {
        let ime = ime_window(target(window)?)?;

        // IMEs answer both requests synchronously; the result carries no useful status.
        if let Some(open) = open {
            unsafe {
                SendMessageW(
                    ime,
                    WM_IME_CONTROL,
                    Some(WPARAM(IMC_SETOPENSTATUS)),
                    Some(LPARAM(isize::from(open))),
                )
            };
        }
        if let Some(mode) = conversion {
            unsafe {
                SendMessageW(
                    ime,
                    WM_IME_CONTROL,
                    Some(WPARAM(IMC_SETCONVERSIONMODE)),
                    Some(LPARAM(mode.0 as isize)),
                )
            };
        }

        Ok(())
    }
}
