//! Link trace files and replay
//!
//! Traces describe a stimulus stream for a fresh link state machine. They
//! are loaded from TOML, replayed through a [`Supervisor`](crate::supervisor::Supervisor)
//! and checked against the expectations they carry.

pub mod file;
pub mod replay;

pub use file::{Expectation, Trace, TraceStep};
pub use replay::{replay, ReplayConfig};
