//! The agent draft shared by every wizard step.
//!
//! One [`DraftStore`] is created per session and handed to each step; clones
//! share the same state. Every change is written through to durable storage
//! under `agent-creation-storage` so a restarted session resumes where it was.

mod prompt_choice;

pub use prompt_choice::{choose_prompt_source, select_premade_prompt, PromptSource};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::entity::{Agent, AgentId, ClientOption, VoiceSelection};
use crate::error::{DeskError, Result};
use crate::storage::{load_state, save_state, DurableStorage, AGENT_CREATION_KEY};

/// In-progress agent. `Default` gives the documented defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentDraft {
    pub name: String,
    pub is_inbound: bool,
    pub selected_voice: Option<VoiceSelection>,
    pub language: String,
    pub client: Option<ClientOption>,
    pub initial_message: String,
    pub prompt: String,
    pub premade_prompt_id: Option<i64>,
    pub task_prompt: String,
}

/// A single field assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftValue {
    Name(String),
    IsInbound(bool),
    SelectedVoice(Option<VoiceSelection>),
    Language(String),
    Client(Option<ClientOption>),
    InitialMessage(String),
    Prompt(String),
    PremadePromptId(Option<i64>),
    TaskPrompt(String),
}

/// Field names accepted by [`DraftValue::parse`].
pub const DRAFT_FIELDS: &[&str] = &[
    "name",
    "isInbound",
    "selectedVoice",
    "language",
    "client",
    "initialMessage",
    "prompt",
    "premadePrompt",
    "taskPrompt",
];

impl DraftValue {
    /// Build a value from a field name and its textual form.
    ///
    /// Structured fields (`selectedVoice`, `client`) take JSON; `null` or an
    /// empty string clears optional fields.
    pub fn parse(field: &str, raw: &str) -> Result<Self> {
        let invalid = || DeskError::InvalidValue {
            field: field.to_string(),
            value: raw.to_string(),
        };
        let cleared = raw.is_empty() || raw == "null";

        let value = match field {
            "name" => DraftValue::Name(raw.to_string()),
            "isInbound" | "is_inbound" => {
                DraftValue::IsInbound(raw.parse().map_err(|_| invalid())?)
            }
            "selectedVoice" | "selected_voice" | "voice" => {
                if cleared {
                    DraftValue::SelectedVoice(None)
                } else {
                    DraftValue::SelectedVoice(Some(
                        serde_json::from_str(raw).map_err(|_| invalid())?,
                    ))
                }
            }
            "language" => DraftValue::Language(raw.to_string()),
            "client" => {
                if cleared {
                    DraftValue::Client(None)
                } else {
                    DraftValue::Client(Some(serde_json::from_str(raw).map_err(|_| invalid())?))
                }
            }
            "initialMessage" | "initial_message" => DraftValue::InitialMessage(raw.to_string()),
            "prompt" => DraftValue::Prompt(raw.to_string()),
            "premadePrompt" | "premadePromptId" | "premade_prompt_id" => {
                if cleared {
                    DraftValue::PremadePromptId(None)
                } else {
                    DraftValue::PremadePromptId(Some(raw.parse().map_err(|_| invalid())?))
                }
            }
            "taskPrompt" | "task_prompt" => DraftValue::TaskPrompt(raw.to_string()),
            other => return Err(DeskError::UnknownField(other.to_string())),
        };
        Ok(value)
    }

    fn apply(self, draft: &mut AgentDraft) {
        match self {
            DraftValue::Name(v) => draft.name = v,
            DraftValue::IsInbound(v) => draft.is_inbound = v,
            DraftValue::SelectedVoice(v) => draft.selected_voice = v,
            DraftValue::Language(v) => draft.language = v,
            DraftValue::Client(v) => draft.client = v,
            DraftValue::InitialMessage(v) => draft.initial_message = v,
            DraftValue::Prompt(v) => draft.prompt = v,
            DraftValue::PremadePromptId(v) => draft.premade_prompt_id = v,
            DraftValue::TaskPrompt(v) => draft.task_prompt = v,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct DraftState {
    #[serde(flatten)]
    draft: AgentDraft,
    /// Agent the draft was hydrated from, if editing.
    hydrated_for: Option<AgentId>,
}

/// Shared handle to the session's draft.
#[derive(Clone)]
pub struct DraftStore {
    state: Arc<Mutex<DraftState>>,
    storage: Arc<dyn DurableStorage>,
}

impl DraftStore {
    /// Open the draft, restoring whatever was persisted.
    pub fn open(storage: Arc<dyn DurableStorage>) -> Result<Self> {
        let state: DraftState =
            load_state(storage.as_ref(), AGENT_CREATION_KEY)?.unwrap_or_default();
        Ok(Self {
            state: Arc::new(Mutex::new(state)),
            storage,
        })
    }

    fn lock(&self) -> MutexGuard<'_, DraftState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, state: &DraftState) -> Result<()> {
        save_state(self.storage.as_ref(), AGENT_CREATION_KEY, state)
    }

    pub fn snapshot(&self) -> AgentDraft {
        self.lock().draft.clone()
    }

    pub fn hydrated_for(&self) -> Option<AgentId> {
        self.lock().hydrated_for
    }

    pub fn set(&self, value: DraftValue) -> Result<()> {
        let mut state = self.lock();
        value.apply(&mut state.draft);
        self.persist(&state)
    }

    /// Apply several assignments under one lock.
    pub fn set_many(&self, values: impl IntoIterator<Item = DraftValue>) -> Result<()> {
        let mut state = self.lock();
        for value in values {
            value.apply(&mut state.draft);
        }
        self.persist(&state)
    }

    /// Restore every field to its default and forget any hydration.
    pub fn reset(&self) -> Result<()> {
        let mut state = self.lock();
        *state = DraftState::default();
        self.persist(&state)
    }

    /// Fill the draft from an agent being edited.
    ///
    /// Runs once per agent id; later calls for the same agent (background
    /// refetches) leave in-session edits alone. Returns whether the draft was
    /// overwritten.
    pub fn hydrate_from_entity(&self, agent: &Agent, clients: &[ClientOption]) -> Result<bool> {
        let mut state = self.lock();
        if state.hydrated_for == Some(agent.id) {
            tracing::debug!(agent_id = agent.id, "draft already hydrated, keeping edits");
            return Ok(false);
        }

        let client = agent.client.map(|id| {
            ClientOption::find(clients, id).cloned().unwrap_or_else(|| ClientOption {
                value: id,
                label: agent.client_name.clone().unwrap_or_else(|| id.to_string()),
            })
        });

        state.draft = AgentDraft {
            name: agent.name.clone(),
            is_inbound: agent.is_inbound,
            selected_voice: agent.voice(),
            language: agent.language.clone(),
            client,
            initial_message: agent.initial_message.clone(),
            prompt: agent.prompts.clone(),
            premade_prompt_id: agent.pre_made_prompts,
            task_prompt: agent.task_prompt.clone(),
        };
        state.hydrated_for = Some(agent.id);
        tracing::debug!(agent_id = agent.id, "draft hydrated from agent");
        self.persist(&state)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn store() -> (DraftStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        (DraftStore::open(storage.clone()).unwrap(), storage)
    }

    fn agent(id: AgentId) -> Agent {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": "Reception",
            "is_inbound": true,
            "initial_message": "Hello, thanks for calling",
            "language": "en-GB",
            "pre_made_prompts": 8,
            "prompts_title": "Dentist_Receptionist",
            "prompts": "You are {name}'s receptionist",
            "task_prompt": "Book {{slot}}",
            "voice_id": "v-2",
            "voice_name": "Ava",
            "voice_model": "elevenlabs",
            "voice_gender": "female",
            "client": 3,
            "client_name": "Smile Co"
        }))
        .unwrap()
    }

    #[test]
    fn test_set_is_visible_to_clones() {
        let (draft, _) = store();
        let other = draft.clone();
        draft.set(DraftValue::Language("en-US".into())).unwrap();
        assert_eq!(other.snapshot().language, "en-US");
    }

    #[test]
    fn test_reset_restores_defaults() {
        let (draft, _) = store();
        draft
            .set_many([
                DraftValue::Name("Sales".into()),
                DraftValue::IsInbound(true),
                DraftValue::Language("fr-FR".into()),
                DraftValue::PremadePromptId(Some(3)),
                DraftValue::Client(Some(ClientOption { value: 1, label: "A".into() })),
            ])
            .unwrap();
        draft.reset().unwrap();
        assert_eq!(draft.snapshot(), AgentDraft::default());
        assert!(draft.hydrated_for().is_none());
    }

    #[test]
    fn test_restored_from_storage() {
        let (draft, storage) = store();
        draft.set(DraftValue::InitialMessage("Hi there".into())).unwrap();
        draft.set(DraftValue::PremadePromptId(Some(9))).unwrap();

        let restored = DraftStore::open(storage).unwrap();
        let snapshot = restored.snapshot();
        assert_eq!(snapshot.initial_message, "Hi there");
        assert_eq!(snapshot.premade_prompt_id, Some(9));
    }

    #[test]
    fn test_persisted_field_names_are_camel_case() {
        let (draft, storage) = store();
        draft.set(DraftValue::IsInbound(true)).unwrap();
        let raw = storage.get(AGENT_CREATION_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["state"]["isInbound"], true);
        assert!(value["state"].get("premadePromptId").is_some());
    }

    #[test]
    fn test_hydrate_only_once_per_agent() {
        let (draft, _) = store();
        assert!(draft.hydrate_from_entity(&agent(5), &[]).unwrap());
        assert_eq!(draft.snapshot().name, "Reception");
        assert_eq!(
            draft.snapshot().client,
            Some(ClientOption { value: 3, label: "Smile Co".into() })
        );

        draft.set(DraftValue::Name("Edited".into())).unwrap();
        assert!(!draft.hydrate_from_entity(&agent(5), &[]).unwrap());
        assert_eq!(draft.snapshot().name, "Edited");

        assert!(draft.hydrate_from_entity(&agent(6), &[]).unwrap());
        assert_eq!(draft.snapshot().name, "Reception");
    }

    #[test]
    fn test_hydrate_prefers_dropdown_label() {
        let (draft, _) = store();
        let clients = vec![ClientOption { value: 3, label: "Smile Co Ltd".into() }];
        draft.hydrate_from_entity(&agent(5), &clients).unwrap();
        assert_eq!(draft.snapshot().client.unwrap().label, "Smile Co Ltd");
        let voice = draft.snapshot().selected_voice.unwrap();
        assert_eq!(voice.provider, "elevenlabs");
    }

    #[test]
    fn test_parse_values() {
        assert_eq!(
            DraftValue::parse("premadePrompt", "9").unwrap(),
            DraftValue::PremadePromptId(Some(9))
        );
        assert_eq!(
            DraftValue::parse("client", r#"{"value": 2, "label": "B"}"#).unwrap(),
            DraftValue::Client(Some(ClientOption { value: 2, label: "B".into() }))
        );
        assert_eq!(
            DraftValue::parse("selectedVoice", "null").unwrap(),
            DraftValue::SelectedVoice(None)
        );
        assert!(matches!(
            DraftValue::parse("isInbound", "maybe"),
            Err(DeskError::InvalidValue { .. })
        ));
        assert!(matches!(
            DraftValue::parse("temperature", "1"),
            Err(DeskError::UnknownField(_))
        ));
    }
}
