pub mod config;
pub mod domain;
pub mod input;
pub mod platform;
pub mod utils;
