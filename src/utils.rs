#[cfg(windows)]
pub mod helpers;
pub mod tracing;
