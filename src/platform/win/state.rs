use std::sync::{Arc, mpsc::Sender};

use windows::Win32::{
    Foundation::HWND,
    UI::WindowsAndMessaging::{GWLP_USERDATA, GetWindowLongPtrW, SetWindowLongPtrW},
};

use super::WinEngine;
use crate::{config::HotkeySource, input::hotkeys::HotkeyEvent};

/// Everything the window procedure needs. Owned by `run`, reachable through `GWLP_USERDATA`
/// while the window exists.
///
/// Only ever handed out as `&AppState`: modal loops such as `TrackPopupMenu` dispatch
/// `WM_HOTKEY` while a tray handler still holds a reference.
pub(crate) struct AppState {
    pub engine: Arc<WinEngine>,
    pub tx: Sender<HotkeyEvent>,
    pub hotkey_source: HotkeySource,
}

pub(crate) fn attach_state(hwnd: HWND, state: &AppState) {
    unsafe {
        SetWindowLongPtrW(hwnd, GWLP_USERDATA, std::ptr::from_ref(state) as isize);
    }
}

pub(crate) fn detach_state(hwnd: HWND) {
    unsafe {
        SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0);
    }
}

pub(crate) fn with_state_do(hwnd: HWND, f: impl FnOnce(&AppState)) {
    unsafe {
        let p = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *const AppState;
        if !p.is_null() {
            f(&*p);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use windows::{
        Win32::UI::WindowsAndMessaging::{
            CreateWindowExW, DestroyWindow, HWND_MESSAGE, WINDOW_EX_STYLE, WINDOW_STYLE,
        },
        core::w,
    };

    use super::*;
    use crate::{
        config::Config,
        domain::{
            activity::KeyActivity,
            engine::{EngineSettings, ToggleEngine},
            shutdown::Shutdown,
        },
        platform::win::{ForegroundQuery, Win32Commander},
    };

    fn message_window() -> HWND {
        unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE(0),
                w!("STATIC"),
                w!("state-test"),
                WINDOW_STYLE(0),
                0,
                0,
                0,
                0,
                Some(HWND_MESSAGE),
                None,
                None,
                None,
            )
        }
        .unwrap()
    }

    #[test]
    fn nested_access_sees_the_same_state_until_detached() {
        let hwnd = message_window();
        let (tx, rx) = mpsc::channel();
        let state = AppState {
            engine: Arc::new(ToggleEngine::new(
                ForegroundQuery,
                Win32Commander,
                Arc::new(KeyActivity::new()),
                EngineSettings::from_config(&Config::default()),
                Shutdown::new(),
            )),
            tx,
            hotkey_source: HotkeySource::Poll,
        };
        attach_state(hwnd, &state);

        // A hotkey arriving while the tray menu is open re-enters from inside the outer call.
        let mut calls = 0;
        with_state_do(hwnd, |outer| {
            calls += 1;
            with_state_do(hwnd, |inner| {
                calls += 1;
                assert!(std::ptr::eq(outer, inner));
                inner.tx.send(HotkeyEvent::Hotkey(1)).unwrap();
            });
            assert_eq!(outer.hotkey_source, HotkeySource::Poll);
        });
        assert_eq!(calls, 2);
        assert_eq!(rx.try_recv(), Ok(HotkeyEvent::Hotkey(1)));

        detach_state(hwnd);
        with_state_do(hwnd, |_| panic!("state is detached"));

        unsafe { DestroyWindow(hwnd) }.unwrap();
    }
}
