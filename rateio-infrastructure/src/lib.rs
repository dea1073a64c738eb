#![warn(clippy::uninlined_format_args)]

pub mod cache;
pub mod config;
pub mod parser;

pub use cache::{Clock, ManualClock, SystemClock, TtlCache};
pub use config::{ConfigError, EngineConfig};
pub use parser::RateioScriptParser;
