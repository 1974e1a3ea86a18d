// Library root: re-exports all modules so the CLI and integration tests can
// access the crate's public API.

pub mod config;
pub mod db;
pub mod seed;
pub mod session;
pub mod storage;
pub mod store;
