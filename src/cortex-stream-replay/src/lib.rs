//! Cortex Stream Replay - feed recorded event logs through a session.
//!
//! The input is one `{type, data, timestamp}` envelope per line, as captured
//! from the generation backend. Every line is decoded and dispatched in
//! order; the first line that is not a valid event stops the replay.

pub mod cli;
pub mod render;
pub mod replay;

pub use cli::{Cli, LogLevel, OutputFormat};
pub use replay::{ReplayOptions, ReplayReport, Replayer};
