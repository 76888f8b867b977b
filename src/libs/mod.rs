pub mod config;
pub mod dialog;
pub mod error;
pub mod level;
pub mod logger;
pub mod shell;
pub mod writing;
