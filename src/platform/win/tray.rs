use windows::{
    Win32::{
        Foundation::{HWND, POINT},
        UI::{
            Shell::{
                NIF_ICON, NIF_MESSAGE, NIF_SHOWTIP, NIF_TIP, NIM_ADD, NIM_DELETE, NIM_MODIFY,
                NIM_SETVERSION, NOTIFY_ICON_MESSAGE, NOTIFYICON_VERSION_4, NOTIFYICONDATAW,
                Shell_NotifyIconW,
            },
            WindowsAndMessaging::{
                AppendMenuW, CreatePopupMenu, DestroyMenu, DestroyWindow, GetCursorPos, HMENU,
                IDI_APPLICATION, LoadIconW, MF_CHECKED, MF_SEPARATOR, MF_STRING, MF_UNCHECKED,
                SetForegroundWindow, TPM_BOTTOMALIGN, TPM_NOANIMATION, TPM_RETURNCMD,
                TPM_RIGHTALIGN, TPM_RIGHTBUTTON, TrackPopupMenu, WM_APP,
            },
        },
    },
    core::{PCWSTR, Result, w},
};

use crate::utils::helpers::fill_wide;

pub enum TrayMenuAction {
    None,
    ToggleForceSecondary,
    ShowStatus,
}

pub const WM_APP_TRAY: u32 = WM_APP + 3;
const TRAY_UID: u32 = 1;
const TRAY_TIP: &str = "IME Switcher";
const ID_EXIT: u32 = 1001;
const ID_FORCE_SECONDARY: u32 = 1002;
const ID_STATUS: u32 = 1003;

unsafe fn show_popup_menu_at_cursor(hwnd: HWND, hmenu: HMENU) -> u32 {
    let mut pt = POINT { x: 0, y: 0 };
    let _ = unsafe { GetCursorPos(&raw mut pt) };

    // Without this the menu does not close when the user clicks elsewhere.
    let _ = unsafe { SetForegroundWindow(hwnd) };

    let result = unsafe {
        TrackPopupMenu(
            hmenu,
            TPM_RETURNCMD | TPM_BOTTOMALIGN | TPM_RIGHTALIGN | TPM_NOANIMATION | TPM_RIGHTBUTTON,
            pt.x,
            pt.y,
            Some(0),
            hwnd,
            None,
        )
    };
    result.0 as u32
}

/// Removes the icon first so the shell stops sending callbacks, then destroys the window.
/// `WM_DESTROY` ends the message loop.
fn request_process_exit(hwnd: HWND) -> Result<()> {
    remove_icon(hwnd);
    unsafe { DestroyWindow(hwnd) }
}

fn shell_notify(action: NOTIFY_ICON_MESSAGE, nid: &NOTIFYICONDATAW, what: &str) -> Result<()> {
    unsafe {
        if Shell_NotifyIconW(action, nid).as_bool() {
            Ok(())
        } else {
            Err(windows::core::Error::new(
                windows::core::HRESULT(0x8000_4005_u32.cast_signed()),
                format!("Shell_NotifyIconW returned FALSE: {what}"),
            ))
        }
    }
}

fn base_tray_nid(hwnd: HWND) -> Result<NOTIFYICONDATAW> {
    Ok(NOTIFYICONDATAW {
        cbSize: u32::try_from(core::mem::size_of::<NOTIFYICONDATAW>())?,
        hWnd: hwnd,
        uID: TRAY_UID,
        ..Default::default()
    })
}

/// Adds the tray icon, or refreshes it if the shell already has one.
pub fn ensure_icon(hwnd: HWND) -> Result<()> {
    let mut nid = base_tray_nid(hwnd)?;
    nid.uCallbackMessage = WM_APP_TRAY;
    nid.uFlags = NIF_MESSAGE | NIF_ICON | NIF_TIP | NIF_SHOWTIP;
    nid.hIcon = unsafe { LoadIconW(None, IDI_APPLICATION) }?;
    fill_wide(&mut nid.szTip, TRAY_TIP);

    if !unsafe { Shell_NotifyIconW(NIM_ADD, &raw const nid) }.as_bool() {
        shell_notify(NIM_MODIFY, &nid, "ensure_icon: NIM_MODIFY after NIM_ADD failure")?;
    }

    nid.Anonymous.uVersion = NOTIFYICON_VERSION_4;
    shell_notify(NIM_SETVERSION, &nid, "ensure_icon: NIM_SETVERSION")
}

pub fn remove_icon(hwnd: HWND) {
    if let Ok(nid) = base_tray_nid(hwnd) {
        let _ = unsafe { Shell_NotifyIconW(NIM_DELETE, &raw const nid) };
    }
}

pub fn show_tray_context_menu(hwnd: HWND, force_secondary: bool) -> Result<TrayMenuAction> {
    let hmenu = build_tray_menu(force_secondary)?;
    let cmd = unsafe { show_popup_menu_at_cursor(hwnd, hmenu) };
    let _ = unsafe { DestroyMenu(hmenu) };
    handle_tray_menu_cmd(hwnd, cmd)
}

fn build_tray_menu(force_secondary: bool) -> Result<HMENU> {
    let hmenu = unsafe { CreatePopupMenu() }?;

    let check = if force_secondary {
        MF_CHECKED
    } else {
        MF_UNCHECKED
    };

    unsafe {
        AppendMenuW(
            hmenu,
            MF_STRING | check,
            ID_FORCE_SECONDARY as usize,
            w!("Force secondary mode"),
        )?;
        AppendMenuW(hmenu, MF_STRING, ID_STATUS as usize, w!("Status"))?;
        AppendMenuW(hmenu, MF_SEPARATOR, 0, PCWSTR::null())?;
        AppendMenuW(hmenu, MF_STRING, ID_EXIT as usize, w!("Exit"))?;
    }

    Ok(hmenu)
}

fn handle_tray_menu_cmd(hwnd: HWND, cmd: u32) -> Result<TrayMenuAction> {
    match cmd {
        ID_FORCE_SECONDARY => Ok(TrayMenuAction::ToggleForceSecondary),
        ID_STATUS => Ok(TrayMenuAction::ShowStatus),
        ID_EXIT => {
            request_process_exit(hwnd)?;
            Ok(TrayMenuAction::None)
        }
        _ => Ok(TrayMenuAction::None),
    }
}
