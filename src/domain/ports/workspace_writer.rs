//! The WorkspaceWriter port: out of scope per SPEC_FULL.md §1. The kernel
//! stops at recording task outputs; actually materializing them into a
//! project workspace is the caller's responsibility. Named here only so
//! capability checks (`WORKSPACE_WRITE`, `WORKSPACE_READ`) have a concrete
//! collaborator to reference.

use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait WorkspaceWriter: Send + Sync {
    async fn write_output(&self, path: &str, content: Value) -> Result<(), String>;
}
