use windows::Win32::UI::Input::KeyboardAndMouse::GetAsyncKeyState;

use crate::domain::ports::KeyStateSource;

/// Global key state as seen by `GetAsyncKeyState`.
#[derive(Clone, Copy, Debug, Default)]
pub struct AsyncKeyState;

impl KeyStateSource for AsyncKeyState {
    fn is_down(&self, vk: u8) -> bool {
        let state = unsafe { GetAsyncKeyState(i32::from(vk)) };
        (state as u16 & 0x8000) != 0
    }
}
