use ime_switcher_core::Shortcut;
use windows::{
    Win32::{
        Foundation::{ERROR_HOTKEY_NOT_REGISTERED, HWND},
        UI::Input::KeyboardAndMouse::{
            HOT_KEY_MODIFIERS, MOD_NOREPEAT, RegisterHotKey, UnregisterHotKey,
        },
    },
    core::HRESULT,
};

use crate::input::hotkeys::HotkeyAction;

fn unregister_one_quiet(hwnd: HWND, id: i32) -> windows::core::Result<()> {
    if let Err(e) = unsafe { UnregisterHotKey(Some(hwnd), id) }
        && e.code() != HRESULT::from_win32(ERROR_HOTKEY_NOT_REGISTERED.0)
    {
        return Err(e);
    }
    Ok(())
}

pub fn unregister_all(hwnd: HWND) -> windows::core::Result<()> {
    for action in HotkeyAction::ALL {
        unregister_one_quiet(hwnd, action.id())?;
    }
    Ok(())
}

fn register_one(hwnd: HWND, action: HotkeyAction, shortcut: Shortcut) -> windows::core::Result<()> {
    let Some(vk) = shortcut.vk else {
        return Ok(());
    };

    unsafe {
        RegisterHotKey(
            Some(hwnd),
            action.id(),
            HOT_KEY_MODIFIERS(shortcut.mods) | MOD_NOREPEAT,
            vk,
        )
    }
}

/// Registers every binding. A binding that fails (typically taken by another program) is
/// logged and skipped. Returns how many were registered.
pub fn register_all(hwnd: HWND, bindings: &[(HotkeyAction, Shortcut)]) -> usize {
    if let Err(e) = unregister_all(hwnd) {
        tracing::warn!(error = %e, "failed to clear previous hotkeys");
    }

    bindings
        .iter()
        .filter(|(action, shortcut)| match register_one(hwnd, *action, *shortcut) {
            Ok(()) => {
                tracing::info!(action = action.as_str(), shortcut = %shortcut, "hotkey registered");
                true
            }
            Err(e) => {
                tracing::warn!(
                    action = action.as_str(),
                    shortcut = %shortcut,
                    error = %e,
                    "hotkey registration failed"
                );
                false
            }
        })
        .count()
}
