// Library root: re-exports the console modules so integration tests can
// drive the app without a terminal.

pub mod app;
pub mod config;
pub mod protocol;
pub mod render;
