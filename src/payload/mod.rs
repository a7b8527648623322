//! Builds the agent mutation body from the draft and checks it is complete.
//!
//! Fields are checked in [`VALIDATION_ORDER`] and the first missing one is
//! reported alone. The order is part of the contract with the backend's test
//! suite and must not change.

use thiserror::Error;

use crate::catalog;
use crate::draft::AgentDraft;
use crate::entity::{AgentPayload, ClientOption, PremadePrompt, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadField {
    Name,
    InitialMessage,
    Language,
    PreMadePrompts,
    PromptsTitle,
    Prompts,
    TaskPrompt,
    VoiceId,
    VoiceModel,
    Client,
}

pub const VALIDATION_ORDER: [PayloadField; 10] = [
    PayloadField::Name,
    PayloadField::InitialMessage,
    PayloadField::Language,
    PayloadField::PreMadePrompts,
    PayloadField::PromptsTitle,
    PayloadField::Prompts,
    PayloadField::TaskPrompt,
    PayloadField::VoiceId,
    PayloadField::VoiceModel,
    PayloadField::Client,
];

impl PayloadField {
    /// Key of the field in the mutation body.
    pub fn wire_name(&self) -> &'static str {
        match self {
            PayloadField::Name => "name",
            PayloadField::InitialMessage => "initial_message",
            PayloadField::Language => "language",
            PayloadField::PreMadePrompts => "pre_made_prompts",
            PayloadField::PromptsTitle => "prompts_title",
            PayloadField::Prompts => "prompts",
            PayloadField::TaskPrompt => "task_prompt",
            PayloadField::VoiceId => "voice_id",
            PayloadField::VoiceModel => "voice_model",
            PayloadField::Client => "client",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            PayloadField::Name => "Agent name is required",
            PayloadField::InitialMessage => "Initial message is required",
            PayloadField::Language => "Language is required",
            PayloadField::PreMadePrompts => "Industry is required",
            PayloadField::PromptsTitle => "Prompt title is required",
            PayloadField::Prompts => "Prompt is required",
            PayloadField::TaskPrompt => "Task prompt is required",
            PayloadField::VoiceId => "Voice is required",
            PayloadField::VoiceModel => "Voice model is required",
            PayloadField::Client => "Client is required",
        }
    }
}

/// First required field found missing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", field.message())]
pub struct ValidationError {
    pub field: PayloadField,
}

impl ValidationError {
    pub fn missing(field: PayloadField) -> Self {
        Self { field }
    }
}

/// Server-side values the payload draws on besides the draft.
#[derive(Debug, Clone, Default)]
pub struct Lookups {
    pub catalog: Vec<PremadePrompt>,
    /// Title carried by the route, used when the catalog has no entry for
    /// the chosen prompt.
    pub prompts_title: Option<String>,
    pub clients: Vec<ClientOption>,
    pub llm_model_id: Option<i64>,
}

impl Lookups {
    /// Title of the chosen premade prompt. The catalog entry for the id wins
    /// over a route title, which may be stale after the prompt was changed.
    pub fn prompts_title_for(&self, premade_prompt_id: Option<i64>) -> Option<String> {
        premade_prompt_id
            .and_then(|id| catalog::title_for(&self.catalog, id))
            .map(str::to_string)
            .or_else(|| {
                self.prompts_title
                    .clone()
                    .filter(|t| !t.trim().is_empty())
            })
    }

    /// The draft's client, relabelled from the dropdown when it is listed.
    pub fn match_client(&self, selected: Option<&ClientOption>) -> Option<ClientOption> {
        let selected = selected?;
        Some(
            ClientOption::find(&self.clients, selected.value)
                .cloned()
                .unwrap_or_else(|| selected.clone()),
        )
    }
}

fn present(s: &str) -> bool {
    !s.trim().is_empty()
}

/// Validate the draft and build the mutation body.
///
/// Makes no network calls. `client` is required only for admins; for other
/// roles it is left out of the body.
pub fn assemble(draft: &AgentDraft, lookups: &Lookups, role: Role) -> Result<AgentPayload, ValidationError> {
    let prompts_title = lookups.prompts_title_for(draft.premade_prompt_id);
    let voice = draft.selected_voice.as_ref();
    let client = lookups.match_client(draft.client.as_ref());

    for field in VALIDATION_ORDER {
        let ok = match field {
            PayloadField::Name => present(&draft.name),
            PayloadField::InitialMessage => present(&draft.initial_message),
            PayloadField::Language => present(&draft.language),
            PayloadField::PreMadePrompts => draft.premade_prompt_id.is_some(),
            PayloadField::PromptsTitle => prompts_title.as_deref().is_some_and(present),
            PayloadField::Prompts => present(&draft.prompt),
            PayloadField::TaskPrompt => present(&draft.task_prompt),
            PayloadField::VoiceId => voice.is_some_and(|v| present(&v.voice_id)),
            PayloadField::VoiceModel => voice.is_some_and(|v| present(&v.provider)),
            PayloadField::Client => role != Role::Admin || client.is_some(),
        };
        if !ok {
            return Err(ValidationError::missing(field));
        }
    }

    let voice = voice
        .cloned()
        .ok_or(ValidationError::missing(PayloadField::VoiceId))?;

    Ok(AgentPayload {
        name: draft.name.trim().to_string(),
        is_inbound: draft.is_inbound,
        initial_message: draft.initial_message.clone(),
        language: draft.language.clone(),
        pre_made_prompts: draft.premade_prompt_id.unwrap_or_default(),
        prompts_title: prompts_title.unwrap_or_default(),
        prompts: draft.prompt.clone(),
        task_prompt: draft.task_prompt.clone(),
        voice_id: voice.voice_id,
        voice_name: voice.voice_name,
        voice_model: voice.provider,
        voice_gender: voice.gender,
        client: match role {
            Role::Admin => client.map(|c| c.value),
            Role::Client => None,
        },
        llm_model: lookups.llm_model_id,
    })
}
