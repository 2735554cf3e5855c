//! swarmd - multi-agent swarm orchestration kernel
//!
//! A request arrives as free-form text, gets parsed into a structured project
//! `Scope`, is handed to a `Planner` that stands up a swarm of role-specialized
//! agents and a two-level task tree, and from there the kernel's job is just
//! bookkeeping: persist every state transition, retry what fails within a
//! bounded budget, and answer polling clients with a consistent snapshot.
//!
//! Module map:
//! - [`domain`] — entities, invariants, and the port traits (`Store`,
//!   `Completer`, `MCPGateway`) that adapters implement.
//! - [`adapters`] — SQLite-backed `Store`, an Anthropic-backed `Completer`,
//!   and an HTTP `MCPGateway`.
//! - [`services`] — the orchestration logic: scope extraction, planning,
//!   swarm lifecycle management, the retry monitor, the event bus.
//! - [`api`] — the axum HTTP surface and auth middleware.
//! - [`config`] — startup configuration loading and validation.

pub mod adapters;
pub mod api;
pub mod config;
pub mod domain;
pub mod logging;
pub mod services;
