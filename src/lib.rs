//! Leveled terminal + file logging and a thin bridge to the `dialog(1)`
//! program for running shell commands behind a progress box.
pub mod app;
pub mod libs;

pub use libs::{
    config::{LogConfig, LogSettings},
    dialog::{BoxKind, DialogBridge},
    error::{Error, Result},
    level::Level,
    logger::Logger,
    shell::{ShellRunner, TtySize},
};
