pub mod combo;
pub mod hotkeys;
