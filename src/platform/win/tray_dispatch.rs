use std::{
    sync::{Mutex, OnceLock},
    time::{Duration, Instant},
};

use windows::Win32::{
    Foundation::{HWND, LPARAM, LRESULT, WPARAM},
    UI::WindowsAndMessaging::{WM_CONTEXTMENU, WM_LBUTTONDBLCLK, WM_MOUSEMOVE, WM_RBUTTONUP},
};

use super::{
    state::with_state_do,
    tray::{TrayMenuAction, show_tray_context_menu},
};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum TrayEvent {
    RightClick,
    DoubleClick,
    Other,
}

fn tray_event_from_lparam(raw: u32) -> TrayEvent {
    match raw & 0xFFFF {
        WM_LBUTTONDBLCLK => TrayEvent::DoubleClick,
        WM_RBUTTONUP | WM_CONTEXTMENU => TrayEvent::RightClick,
        _ => TrayEvent::Other,
    }
}

/// With `NOTIFYICON_VERSION_4` one right click produces both `WM_RBUTTONUP` and
/// `WM_CONTEXTMENU`; only the first opens the menu.
fn should_open_tray_menu() -> bool {
    static LAST_OPEN_AT: OnceLock<Mutex<Option<Instant>>> = OnceLock::new();

    let now = Instant::now();
    let Ok(mut last) = LAST_OPEN_AT.get_or_init(|| Mutex::new(None)).lock() else {
        tracing::warn!("tray menu dedup lock poisoned");
        return true;
    };

    if let Some(prev) = *last
        && now.duration_since(prev) < Duration::from_millis(250)
    {
        return false;
    }

    *last = Some(now);
    true
}

pub fn handle_tray_message(hwnd: HWND, _wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    let raw = lparam.0 as u32;
    if raw & 0xFFFF == WM_MOUSEMOVE {
        return LRESULT(0);
    }

    match tray_event_from_lparam(raw) {
        TrayEvent::DoubleClick => {
            with_state_do(hwnd, |state| state.engine.log_status());
        }

        TrayEvent::RightClick => {
            if !should_open_tray_menu() {
                return LRESULT(0);
            }

            with_state_do(hwnd, |state| {
                let enabled = state.engine.auto_correct_enabled();
                match show_tray_context_menu(hwnd, enabled) {
                    Ok(TrayMenuAction::ToggleForceSecondary) => {
                        state.engine.set_auto_correct_enabled(!enabled);
                    }
                    Ok(TrayMenuAction::ShowStatus) => state.engine.log_status(),
                    Ok(TrayMenuAction::None) => {}
                    Err(e) => tracing::warn!(error = ?e, "tray menu failed"),
                }
            });
        }

        TrayEvent::Other => {}
    }

    LRESULT(0)
}
