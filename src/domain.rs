pub mod activity;
pub mod auto_correct;
pub mod engine;
pub mod outcome;
pub mod ports;
pub mod session;
pub mod shutdown;
