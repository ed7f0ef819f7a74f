//! Course outline and lesson content generators
//!
//! Deterministic templates: the same topic always yields the same outline,
//! the same module the same key points.

use super::{LESSON_CONTENT, OUTLINE_COURSE};
use async_trait::async_trait;
use sdk::tool::LookupTool;
use sdk::types::{ToolError, ToolId, ToolRequest};

fn required_text<'a>(request: &'a ToolRequest, key: &str) -> Result<&'a str, ToolError> {
    let value = request.param_str(key)?.trim();
    if value.is_empty() {
        return Err(ToolError::InvalidParameter(key.to_string()));
    }
    Ok(value)
}

/// `outline_course`: four-part outline for a topic
pub struct OutlineCourseTool;

#[async_trait]
impl LookupTool for OutlineCourseTool {
    fn id(&self) -> ToolId {
        ToolId::from(OUTLINE_COURSE)
    }

    fn description(&self) -> &str {
        "Generate a basic course outline for a topic"
    }

    async fn lookup(&self, request: &ToolRequest) -> Result<Option<String>, ToolError> {
        let topic = required_text(request, "topic")?;
        Ok(Some(format!(
            "1. Introduction to {}\n2. Core concepts\n3. Case studies\n4. Implementation steps",
            topic
        )))
    }
}

/// `lesson_content`: key points for one module
pub struct LessonContentTool;

#[async_trait]
impl LookupTool for LessonContentTool {
    fn id(&self) -> ToolId {
        ToolId::from(LESSON_CONTENT)
    }

    fn description(&self) -> &str {
        "Suggest key points for a course module"
    }

    async fn lookup(&self, request: &ToolRequest) -> Result<Option<String>, ToolError> {
        let module = required_text(request, "module")?;
        Ok(Some(format!(
            "Key points for {module}:\n\
             - What {module} means for a small business and why it matters now\n\
             - A worked example from a real founder\n\
             - Common mistakes and how to avoid them\n\
             - A short exercise to apply {module} to the learner's own business"
        )))
    }
}
