use super::{DraftStore, DraftValue};
use crate::api::Backend;
use crate::catalog;
use crate::entity::{Agent, PremadePrompt};
use crate::error::Result;
use crate::wizard::Mode;

/// Where the prompt text comes from after a premade prompt is picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptSource {
    /// Keep the agent's saved prompt and task prompt.
    Saved { prompt: String, task_prompt: String },
    /// Load the template with this id.
    Template(i64),
}

/// Decide whether a selection keeps the saved prompt text.
///
/// Saved text survives only in edit mode when the selected label still
/// equals the title the agent was saved with.
pub fn choose_prompt_source(
    mode: &Mode,
    selected_id: i64,
    selected_label: Option<&str>,
    original: Option<&Agent>,
) -> PromptSource {
    if let (Mode::Edit(_), Some(label), Some(agent)) = (mode, selected_label, original) {
        if !agent.prompts_title.is_empty() && label == agent.prompts_title {
            return PromptSource::Saved {
                prompt: agent.prompts.clone(),
                task_prompt: agent.task_prompt.clone(),
            };
        }
    }
    PromptSource::Template(selected_id)
}

/// Record a premade prompt selection and fill the prompt fields.
///
/// A template response is dropped if the selection changed while it was
/// being fetched.
pub async fn select_premade_prompt(
    draft: &DraftStore,
    backend: &dyn Backend,
    catalog: &[PremadePrompt],
    id: i64,
    mode: &Mode,
    original: Option<&Agent>,
) -> Result<PromptSource> {
    draft.set(DraftValue::PremadePromptId(Some(id)))?;

    let label = catalog::title_for(catalog, id);
    let source = choose_prompt_source(mode, id, label, original);
    match &source {
        PromptSource::Saved {
            prompt,
            task_prompt,
        } => {
            tracing::debug!(id, "selection matches saved title, keeping prompt text");
            draft.set_many([
                DraftValue::Prompt(prompt.clone()),
                DraftValue::TaskPrompt(task_prompt.clone()),
            ])?;
        }
        PromptSource::Template(id) => {
            let details = backend.premade_prompt_details(*id).await?;
            if draft.snapshot().premade_prompt_id != Some(*id) {
                tracing::debug!(id, "selection changed while loading template, discarding");
                return Ok(source);
            }
            draft.set_many([
                DraftValue::Prompt(details.description),
                DraftValue::TaskPrompt(details.state_prompt),
            ])?;
        }
    }
    Ok(source)
}
