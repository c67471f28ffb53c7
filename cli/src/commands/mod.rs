//! Subcommand handlers.

pub mod info;
pub mod probe;
pub mod query;
pub mod stream;
