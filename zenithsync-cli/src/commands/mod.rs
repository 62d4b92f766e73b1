//! CLI subcommands.

pub mod complete;
pub mod resolve;
pub mod schedule;
pub mod sync;
