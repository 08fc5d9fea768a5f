#![allow(clippy::uninlined_format_args)]

pub mod app;
pub mod config;
pub mod debounce;
pub mod dom;
pub mod engine;
pub mod keywords;
pub mod matcher;
pub mod scanner;
pub mod storage;
pub mod watcher;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use app::run;
