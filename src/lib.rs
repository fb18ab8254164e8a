// Library target holds everything below the terminal driver so that
// integration tests can reach the engine and catalog directly.
// The binary entry point is main.rs; it adds the app, event and ui modules.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod media;
