// Library root: exposes the shell's command parser and dispatcher so the
// binary and integration tests share them.

pub mod app;
pub mod command;
