//! Domain entities, invariants, and ports for the swarm orchestration kernel.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
