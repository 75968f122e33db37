#[cfg(windows)]
pub mod win;
