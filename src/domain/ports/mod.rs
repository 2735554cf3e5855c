//! Port traits: the seams between the orchestration kernel and its external
//! collaborators. Adapters in [`crate::adapters`] implement these against
//! SQLite, the Anthropic API, and an HTTP MCP worker; tests implement them
//! against in-memory fakes.

pub mod completer;
pub mod component_catalog;
pub mod mcp_gateway;
pub mod store;
pub mod workspace_writer;

pub use completer::{Completer, CompletionOptions, ProviderError};
pub use component_catalog::{ComponentCatalog, NullComponentCatalog};
pub use mcp_gateway::{MCPGateway, ToolOutcome};
pub use store::{HealthSnapshot, Store};
pub use workspace_writer::WorkspaceWriter;
