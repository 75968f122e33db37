#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use ime_switcher::utils::tracing::init_tracing;

#[cfg(windows)]
fn main() -> windows::core::Result<()> {
    use ime_switcher::{config, platform::win, utils::helpers};

    init_tracing();

    let Some(_guard) = helpers::single_instance_guard()? else {
        tracing::info!("another instance is already running");
        return Ok(());
    };

    let cfg = config::load_or_default();
    win::run(&cfg)
}

#[cfg(not(windows))]
fn main() -> std::process::ExitCode {
    init_tracing();
    tracing::error!("ime-switcher only runs on Windows");
    std::process::ExitCode::FAILURE
}
