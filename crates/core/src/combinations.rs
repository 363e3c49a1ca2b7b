//! Combination enumerator: the ordered Cartesian product of a style list
//! and a prompt list.
//!
//! Order is row-major (outer loop over styles, inner over prompts). Progress
//! reporting and the presentation grid both assume this order.

use serde::Serialize;

use crate::error::CoreError;
use crate::prompt::compose_prompt;

/// A loaded input list: its identity plus its cleaned fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputList {
    /// Identifier of the originating list (its file name).
    pub source_id: String,
    pub fragments: Vec<String>,
}

impl InputList {
    pub fn new(source_id: impl Into<String>, fragments: Vec<String>) -> Self {
        Self {
            source_id: source_id.into(),
            fragments,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// One (style, prompt) cell to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationTask {
    /// Position in the enumeration, starting at 0.
    pub index: usize,
    pub style_source_id: String,
    pub style_text: String,
    pub prompt_source_id: String,
    pub prompt_text: String,
    pub composed_prompt: String,
}

/// Produce `|styles| × |prompts|` tasks in row-major order.
///
/// Either list being empty is an input error; nothing is enumerated.
pub fn enumerate_tasks(
    styles: &InputList,
    prompts: &InputList,
    quality_prefix: &str,
) -> Result<Vec<GenerationTask>, CoreError> {
    if styles.is_empty() {
        return Err(CoreError::Input(format!(
            "Style list '{}' contains no entries",
            styles.source_id
        )));
    }
    if prompts.is_empty() {
        return Err(CoreError::Input(format!(
            "Prompt list '{}' contains no entries",
            prompts.source_id
        )));
    }

    let mut tasks = Vec::with_capacity(styles.fragments.len() * prompts.fragments.len());
    for style in &styles.fragments {
        for prompt in &prompts.fragments {
            tasks.push(GenerationTask {
                index: tasks.len(),
                style_source_id: styles.source_id.clone(),
                style_text: style.clone(),
                prompt_source_id: prompts.source_id.clone(),
                prompt_text: prompt.clone(),
                composed_prompt: compose_prompt(quality_prefix, style, prompt),
            });
        }
    }
    Ok(tasks)
}
