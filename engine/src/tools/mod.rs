pub mod faq;
pub mod outline;

pub use faq::{FaqEntry, FaqLookupTool, FaqTable};
pub use outline::{LessonContentTool, OutlineCourseTool};

use futures::future::join_all;
use sdk::errors::EngineError;
use sdk::tool::LookupTool;
use sdk::types::{ToolCall, ToolId, ToolRequest};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

pub const FAQ_LOOKUP: &str = "faq_lookup";
pub const OUTLINE_COURSE: &str = "outline_course";
pub const LESSON_CONTENT: &str = "lesson_content";

/// Registry of lookup tools that agents can invoke.
///
/// Every invocation produces a [`ToolCall`] record. Failures never escape as
/// errors: an unknown tool or a tool that cannot run yields an `error` record
/// so the agent can see what went wrong and phrase its reply.
#[derive(Clone, Default)]
pub struct ToolInvoker {
    tools: HashMap<ToolId, Arc<dyn LookupTool>>,
}

impl ToolInvoker {
    /// Create an invoker with no tools registered.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The course-design tools backed by `faq`
    pub fn builtin(faq: FaqTable) -> Self {
        let mut invoker = Self::empty();
        invoker.register(Arc::new(FaqLookupTool::new(Arc::new(faq))));
        invoker.register(Arc::new(OutlineCourseTool));
        invoker.register(Arc::new(LessonContentTool));
        invoker
    }

    /// Register a tool, replacing any tool with the same id.
    pub fn register(&mut self, tool: Arc<dyn LookupTool>) {
        self.tools.insert(tool.id(), tool);
    }

    pub fn contains(&self, id: &ToolId) -> bool {
        self.tools.contains_key(id)
    }

    /// Registered tool ids, sorted
    pub fn available_tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().map(|id| id.to_string()).collect();
        names.sort();
        names
    }

    pub fn description(&self, id: &ToolId) -> Option<&str> {
        self.tools.get(id).map(|tool| tool.description())
    }

    /// Run one request.
    pub async fn invoke(&self, request: &ToolRequest) -> ToolCall {
        debug!(
            "Invoking tool '{}' with input: {}",
            request.tool_id,
            request.input()
        );

        let Some(tool) = self.tools.get(&request.tool_id) else {
            warn!("{}", EngineError::ToolNotFound(request.tool_id.to_string()));
            return ToolCall::error(
                request,
                format!(
                    "Unknown tool '{}'. Available tools: {}",
                    request.tool_id,
                    self.available_tool_names().join(", ")
                ),
            );
        };

        match tool.lookup(request).await {
            Ok(Some(output)) if !output.trim().is_empty() => ToolCall::ok(request, output),
            Ok(_) => ToolCall::not_found(request),
            Err(e) => {
                warn!(
                    "{}",
                    EngineError::ToolError(format!("{} failed: {}", request.tool_id, e))
                );
                ToolCall::error(request, e.to_string())
            }
        }
    }

    /// Run all requests concurrently; results are in request order.
    pub async fn invoke_all(&self, requests: &[ToolRequest]) -> Vec<ToolCall> {
        join_all(requests.iter().map(|request| self.invoke(request))).await
    }
}
