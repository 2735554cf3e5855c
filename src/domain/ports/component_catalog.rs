//! The ComponentCatalog port: a read-only lookup of known UI components,
//! consulted by the ScopeExtractor as planning context. Out of scope per
//! SPEC_FULL.md §1 — named interface only, with a null implementation that
//! lets the rest of the kernel run without one configured.

use async_trait::async_trait;

#[async_trait]
pub trait ComponentCatalog: Send + Sync {
    /// A short summary of available components to splice into the
    /// structured-extraction prompt. Empty string means "none configured".
    async fn summary(&self) -> String;
}

pub struct NullComponentCatalog;

#[async_trait]
impl ComponentCatalog for NullComponentCatalog {
    async fn summary(&self) -> String {
        String::new()
    }
}
