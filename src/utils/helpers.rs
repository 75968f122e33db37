//! Small Win32 helpers shared by the platform layer.

use windows::{
    Win32::{
        Foundation::{CloseHandle, ERROR_ALREADY_EXISTS, GetLastError, HANDLE},
        System::Threading::CreateMutexW,
    },
    core::{Error, HRESULT, Result, w},
};

/// Last OS error as a `windows::core::Error`, for APIs that only report failure via `GetLastError`.
pub fn last_error() -> Error {
    Error::from_hresult(HRESULT::from_win32(unsafe { GetLastError() }.0))
}

/// Owns the named single-instance mutex; released on drop.
pub struct SingleInstanceGuard(HANDLE);

impl Drop for SingleInstanceGuard {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

/// Returns `None` if another instance already holds the mutex.
pub fn single_instance_guard() -> Result<Option<SingleInstanceGuard>> {
    unsafe {
        let h = CreateMutexW(None, false, w!("Global\\ImeSwitcher_SingleInstance"))?;

        if GetLastError() == ERROR_ALREADY_EXISTS {
            let _ = CloseHandle(h);
            return Ok(None);
        }

        Ok(Some(SingleInstanceGuard(h)))
    }
}

/// Writes `s` into a fixed-size, NUL-terminated UTF-16 buffer, truncating if needed.
pub fn fill_wide(dst: &mut [u16], s: &str) {
    if let Some((last, body)) = dst.split_last_mut() {
        for (d, ch) in body
            .iter_mut()
            .zip(s.encode_utf16().chain(std::iter::repeat(0)))
        {
            *d = ch;
        }
        *last = 0;
    }
}
