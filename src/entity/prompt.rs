// src/entity/prompt.rs
use serde::{Deserialize, Serialize};

/// LLM model the agent gets when none is chosen explicitly.
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o";

/// Catalog entry of `GET /agent_pre_made_prompts_list/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremadePrompt {
    pub id: i64,
    #[serde(alias = "name")]
    pub title: String,
}

/// Template text of `GET /agent_pre_made_prompts_details/{id}/`.
///
/// `description` becomes the agent prompt and `state_prompt` its task prompt.
/// Both may contain `{single}` spans the user edits and `{{double}}` spans that
/// are filled in by the calling platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptDetails {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub state_prompt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmModel {
    pub id: i64,
    #[serde(alias = "name", alias = "model")]
    pub value: String,
}

/// Id of the model whose value is [`DEFAULT_LLM_MODEL`].
pub fn resolve_default_llm(models: &[LlmModel]) -> Option<i64> {
    models
        .iter()
        .find(|m| m.value == DEFAULT_LLM_MODEL)
        .map(|m| m.id)
}
