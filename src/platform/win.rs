//! Windows runtime: hidden message window, tray icon, hotkey registration and the worker
//! threads that drive the toggle engine.

mod commander;
mod hotkeys;
mod keyboard;
mod query;
mod state;
mod tray;
mod tray_dispatch;
mod window;

use std::{
    sync::{Arc, OnceLock, mpsc},
    thread::{self, JoinHandle},
};

use windows::{
    Win32::{
        Foundation::{HWND, LPARAM, LRESULT, WPARAM},
        System::LibraryLoader::GetModuleHandleW,
        UI::WindowsAndMessaging::{
            DefWindowProcW, DestroyWindow, PostQuitMessage, RegisterWindowMessageW, WM_DESTROY,
            WM_HOTKEY, WM_NCDESTROY,
        },
    },
    core::{PCWSTR, Result, w},
};

pub use self::{commander::Win32Commander, keyboard::AsyncKeyState, query::ForegroundQuery};
use self::{
    state::{AppState, attach_state, detach_state, with_state_do},
    tray::{WM_APP_TRAY, ensure_icon, remove_icon},
    window::{create_main_window, message_loop, register_main_class},
};
use crate::{
    config::{Config, HotkeySource},
    domain::{
        activity::{KeyActivity, KeyActivityMonitor},
        engine::{EngineSettings, ToggleEngine},
        ports::WindowHandle,
        shutdown::Shutdown,
    },
    input::{
        combo::ComboWatcher,
        hotkeys::{HotkeyDispatcher, HotkeyEvent, bindings},
    },
};

pub type WinEngine = ToggleEngine<ForegroundQuery, Win32Commander>;

const WM_IME_CONTROL: u32 = 0x0283;
const IMC_GETCONVERSIONMODE: usize = 0x0001;
const IMC_SETCONVERSIONMODE: usize = 0x0002;
const IMC_GETOPENSTATUS: usize = 0x0005;
const IMC_SETOPENSTATUS: usize = 0x0006;

fn window_handle(hwnd: HWND) -> WindowHandle {
    WindowHandle(hwnd.0 as isize)
}

fn hwnd_from(window: WindowHandle) -> HWND {
    HWND(window.0 as *mut core::ffi::c_void)
}

fn spawn_worker(name: &str, body: impl FnOnce() + Send + 'static) -> Option<JoinHandle<()>> {
    match thread::Builder::new().name(name.into()).spawn(body) {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::error!(thread = name, error = %e, "failed to spawn worker");
            None
        }
    }
}

/// Starts the workers, runs the message loop until the tray "Exit" item is used, then stops
/// and joins every worker.
pub fn run(cfg: &Config) -> Result<()> {
    let shutdown = Shutdown::new();
    let activity = Arc::new(KeyActivity::new());
    let engine: Arc<WinEngine> = Arc::new(ToggleEngine::new(
        ForegroundQuery,
        Win32Commander,
        Arc::clone(&activity),
        EngineSettings::from_config(cfg),
        shutdown.clone(),
    ));
    let (tx, rx) = mpsc::channel();
    let mut workers = Vec::new();

    workers.extend(spawn_worker("key-activity", {
        let shutdown = shutdown.clone();
        let interval = cfg.key_sample_interval;
        move || KeyActivityMonitor::new(AsyncKeyState, activity).run(interval, &shutdown)
    }));

    workers.extend(spawn_worker("auto-correct", {
        let engine = Arc::clone(&engine);
        move || engine.run_auto_correct()
    }));

    workers.extend(spawn_worker("hotkey-dispatch", {
        let dispatcher = HotkeyDispatcher::new(Arc::clone(&engine));
        move || dispatcher.run(&rx)
    }));

    if cfg.hotkey_source == HotkeySource::Poll {
        workers.extend(spawn_worker("combo-watch", {
            let watcher = ComboWatcher::new(AsyncKeyState, bindings(cfg), tx.clone());
            let shutdown = shutdown.clone();
            let interval = cfg.key_sample_interval;
            move || watcher.run(interval, &shutdown)
        }));
    }

    let result = run_window(cfg, Arc::clone(&engine), tx.clone());

    tracing::info!("shutting down");
    shutdown.cancel();
    let _ = tx.send(HotkeyEvent::Shutdown);
    drop(tx);

    for worker in workers {
        if worker.join().is_err() {
            tracing::error!("worker thread panicked");
        }
    }

    result
}

fn run_window(cfg: &Config, engine: Arc<WinEngine>, tx: mpsc::Sender<HotkeyEvent>) -> Result<()> {
    let class_name = w!("ImeSwitcherMainWindow");
    let hinstance = unsafe { GetModuleHandleW(PCWSTR::null()) }?.into();

    register_main_class(class_name, hinstance)?;
    let hwnd = create_main_window(class_name, hinstance)?;

    let state = Box::new(AppState {
        engine,
        tx,
        hotkey_source: cfg.hotkey_source,
    });
    attach_state(hwnd, &state);

    if state.hotkey_source == HotkeySource::Register {
        let wanted = bindings(cfg);
        let registered = hotkeys::register_all(hwnd, &wanted);
        tracing::info!(registered, wanted = wanted.len(), "hotkeys ready");
    }

    if let Err(e) = ensure_icon(hwnd) {
        tracing::warn!(error = ?e, "tray ensure_icon failed");
    }

    tracing::info!(
        hotkey_source = %state.hotkey_source,
        force_secondary_mode = state.engine.auto_correct_enabled(),
        "running"
    );

    let result = message_loop();

    // Only reached with a live window if the loop failed.
    if result.is_err() {
        remove_icon(hwnd);
        let _ = unsafe { DestroyWindow(hwnd) };
    }
    drop(state);

    result
}

/// Explorer broadcasts this after a restart; the tray icon has to be added again.
fn taskbar_created_message_id() -> u32 {
    static ID: OnceLock<u32> = OnceLock::new();
    *ID.get_or_init(|| unsafe { RegisterWindowMessageW(w!("TaskbarCreated")) })
}

fn on_hotkey(hwnd: HWND, wparam: WPARAM) -> LRESULT {
    let id = wparam.0 as i32;
    with_state_do(hwnd, |state| {
        if state.tx.send(HotkeyEvent::Hotkey(id)).is_err() {
            tracing::warn!(id, "hotkey dispatcher is gone");
        }
    });
    LRESULT(0)
}

fn on_destroy(hwnd: HWND) -> LRESULT {
    remove_icon(hwnd);
    if let Err(e) = hotkeys::unregister_all(hwnd) {
        tracing::warn!(error = %e, "failed to unregister hotkeys");
    }
    unsafe { PostQuitMessage(0) };
    LRESULT(0)
}

pub extern "system" fn wndproc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if msg == taskbar_created_message_id() {
        if let Err(e) = ensure_icon(hwnd) {
            tracing::warn!(error = ?e, "tray icon restore failed");
        }
        return LRESULT(0);
    }

    match msg {
        WM_HOTKEY => on_hotkey(hwnd, wparam),
        WM_APP_TRAY => tray_dispatch::handle_tray_message(hwnd, wparam, lparam),
        WM_DESTROY => on_destroy(hwnd),
        WM_NCDESTROY => {
            detach_state(hwnd);
            unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
        }
        _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}
