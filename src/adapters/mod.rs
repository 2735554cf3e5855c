//! Concrete implementations of the [`crate::domain::ports`] traits.

pub mod completer;
pub mod mcp;
pub mod sqlite;
