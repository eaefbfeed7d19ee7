//! focusshell: access-control core of a restricted browser shell.
//!
//! This library exposes the shell's components for integration testing and
//! embedding. The binary entrypoint is in `main.rs`.

pub mod cli;
pub mod config;
pub mod guard;
pub mod override_window;
pub mod policy;
pub mod session;
pub mod shell;
pub mod storage;
pub mod utils;
