//! Common utilities for integration tests

pub mod cli;
pub mod fake_longhorn;

// Re-export commonly used items
pub use cli::{CommandResult, SweepCommand};
pub use fake_longhorn::FakeLonghorn;
