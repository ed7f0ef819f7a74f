//! Lookup tool trait
//!
//! Every tool an agent can call implements [`LookupTool`]. Tools are read-only:
//! they answer a request and never touch conversation state, so the invoker is
//! free to run several of them concurrently.

use crate::types::{ToolError, ToolId, ToolRequest};
use async_trait::async_trait;

/// Trait that all lookup tools must implement
#[async_trait]
pub trait LookupTool: Send + Sync {
    /// Returns the id agents use to request this tool
    fn id(&self) -> ToolId;

    /// Returns a one-line description shown in agent listings
    fn description(&self) -> &str;

    /// Run the lookup.
    ///
    /// * `Ok(Some(output))` - a record was found
    /// * `Ok(None)` - nothing matched
    /// * `Err(_)` - the tool could not run (bad input, missing backing data)
    async fn lookup(&self, request: &ToolRequest) -> Result<Option<String>, ToolError>;
}
