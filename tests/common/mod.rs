//! Shared helpers for integration tests.
//!
//! Each integration test file compiles common/ as its own module, so not
//! every helper is used in every file.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use voicedesk::api::{ApiError, ApiResult, Backend};
use voicedesk::cache::ListParams;
use voicedesk::config::Config;
use voicedesk::context::AppContext;
use voicedesk::entity::{
    Agent, AgentId, AgentPayload, ClientOption, LlmModel, NumberPatch, Page, PremadePrompt,
    PromptDetails, PurchasedNumber,
};
use voicedesk::storage::MemoryStorage;

/// A backend request as the fake saw it.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    PremadePrompts(bool),
    PromptDetails(i64),
    CreateAgent(AgentPayload),
    UpdateAgent(AgentId, AgentPayload),
    GetAgent(AgentId),
    ListAgents(ListParams),
    ListNumbers(ListParams),
    UpdateNumber(i64, NumberPatch),
    ListClients(u32, u32),
    LlmModels,
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    agents: Vec<Agent>,
    numbers: Vec<PurchasedNumber>,
    prompts: Vec<PremadePrompt>,
    details: HashMap<i64, PromptDetails>,
    clients: Vec<ClientOption>,
    llm_models: Vec<LlmModel>,
    fail_next: Option<ApiError>,
}

/// In-memory backend that records every call.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<State>,
}

impl FakeBackend {
    pub fn new() -> Self {
        let backend = Self::default();
        {
            let mut state = backend.state.lock().unwrap();
            state.llm_models = vec![
                LlmModel {
                    id: 1,
                    value: "gpt-4o-mini".to_string(),
                },
                LlmModel {
                    id: 2,
                    value: "gpt-4o".to_string(),
                },
            ];
            state.clients = vec![
                ClientOption {
                    value: 3,
                    label: "Smile Dental".to_string(),
                },
                ClientOption {
                    value: 7,
                    label: "Harbor Hotels".to_string(),
                },
            ];
            for id in 1..=10 {
                state.details.insert(
                    id,
                    PromptDetails {
                        id,
                        title: format!("template {}", id),
                        description: format!("You are {{agent_name}}, template {}", id),
                        state_prompt: format!("Collect {{{{caller_name}}}} for template {}", id),
                    },
                );
            }
        }
        backend
    }

    pub fn with_numbers(self, count: i64) -> Self {
        self.state.lock().unwrap().numbers = (1..=count).map(number).collect();
        self
    }

    pub fn with_agents(self, agents: Vec<Agent>) -> Self {
        self.state.lock().unwrap().agents = agents;
        self
    }

    pub fn with_prompts(self, prompts: Vec<PremadePrompt>) -> Self {
        self.state.lock().unwrap().prompts = prompts;
        self
    }

    /// Make the next mutation fail with `error`.
    pub fn fail_next(&self, error: ApiError) {
        self.state.lock().unwrap().fail_next = Some(error);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| matches(c)).count()
    }

    pub fn number(&self, id: i64) -> Option<PurchasedNumber> {
        self.state
            .lock()
            .unwrap()
            .numbers
            .iter()
            .find(|n| n.id == id)
            .cloned()
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn take_failure(&self) -> ApiResult<()> {
        match self.state.lock().unwrap().fail_next.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn paginate<T: Clone>(items: &[T], params: &ListParams) -> Page<T> {
    let size = params.page_size as usize;
    let start = (params.page.saturating_sub(1) as usize) * size;
    Page {
        items: items.iter().skip(start).take(size).cloned().collect(),
        total_count: items.len() as u64,
        page: params.page,
        page_size: params.page_size,
    }
}

fn agent_from_payload(id: AgentId, payload: &AgentPayload) -> Agent {
    Agent {
        id,
        name: payload.name.clone(),
        is_inbound: payload.is_inbound,
        initial_message: payload.initial_message.clone(),
        language: payload.language.clone(),
        pre_made_prompts: Some(payload.pre_made_prompts),
        prompts_title: payload.prompts_title.clone(),
        prompts: payload.prompts.clone(),
        task_prompt: payload.task_prompt.clone(),
        voice_id: payload.voice_id.clone(),
        voice_name: payload.voice_name.clone(),
        voice_model: payload.voice_model.clone(),
        voice_gender: payload.voice_gender.clone(),
        client: payload.client,
        client_name: None,
        llm_model: payload.llm_model,
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn premade_prompts(&self, is_inbound: bool) -> ApiResult<Vec<PremadePrompt>> {
        self.record(Call::PremadePrompts(is_inbound));
        Ok(self.state.lock().unwrap().prompts.clone())
    }

    async fn premade_prompt_details(&self, id: i64) -> ApiResult<PromptDetails> {
        self.record(Call::PromptDetails(id));
        self.state
            .lock()
            .unwrap()
            .details
            .get(&id)
            .cloned()
            .ok_or(ApiError::Client {
                status: 404,
                message: Some("Not found.".to_string()),
            })
    }

    async fn create_agent(&self, payload: &AgentPayload) -> ApiResult<Agent> {
        self.record(Call::CreateAgent(payload.clone()));
        self.take_failure()?;
        let mut state = self.state.lock().unwrap();
        let id = state.agents.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        let agent = agent_from_payload(id, payload);
        state.agents.push(agent.clone());
        Ok(agent)
    }

    async fn update_agent(&self, id: AgentId, payload: &AgentPayload) -> ApiResult<Agent> {
        self.record(Call::UpdateAgent(id, payload.clone()));
        self.take_failure()?;
        let mut state = self.state.lock().unwrap();
        let agent = agent_from_payload(id, payload);
        state.agents.retain(|a| a.id != id);
        state.agents.push(agent.clone());
        Ok(agent)
    }

    async fn get_agent(&self, id: AgentId) -> ApiResult<Agent> {
        self.record(Call::GetAgent(id));
        self.state
            .lock()
            .unwrap()
            .agents
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or(ApiError::Client {
                status: 404,
                message: Some("Not found.".to_string()),
            })
    }

    async fn list_agents(&self, params: &ListParams) -> ApiResult<Page<Agent>> {
        self.record(Call::ListAgents(params.clone()));
        let state = self.state.lock().unwrap();
        let matching: Vec<Agent> = state
            .agents
            .iter()
            .filter(|a| a.name.contains(&params.search))
            .cloned()
            .collect();
        Ok(paginate(&matching, params))
    }

    async fn list_purchased_numbers(&self, params: &ListParams) -> ApiResult<Page<PurchasedNumber>> {
        self.record(Call::ListNumbers(params.clone()));
        let state = self.state.lock().unwrap();
        let matching: Vec<PurchasedNumber> = state
            .numbers
            .iter()
            .filter(|n| n.phone_number.contains(&params.search))
            .filter(|n| params.client.is_none() || n.client == params.client)
            .filter(|n| params.status.is_none() || n.status == params.status)
            .cloned()
            .collect();
        Ok(paginate(&matching, params))
    }

    async fn update_purchased_number(
        &self,
        id: i64,
        patch: &NumberPatch,
    ) -> ApiResult<PurchasedNumber> {
        self.record(Call::UpdateNumber(id, patch.clone()));
        self.take_failure()?;
        let mut state = self.state.lock().unwrap();
        let number = state
            .numbers
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(ApiError::Client {
                status: 404,
                message: Some("Not found.".to_string()),
            })?;
        if let Some(client) = patch.client {
            number.client = client;
        }
        if let Some(agent) = patch.agent {
            number.agent = agent;
        }
        Ok(number.clone())
    }

    async fn list_clients(&self, page: u32, per_page: u32) -> ApiResult<Page<ClientOption>> {
        self.record(Call::ListClients(page, per_page));
        let state = self.state.lock().unwrap();
        let params = ListParams {
            page,
            page_size: per_page,
            ..ListParams::default()
        };
        Ok(paginate(&state.clients, &params))
    }

    async fn llm_models(&self) -> ApiResult<Vec<LlmModel>> {
        self.record(Call::LlmModels);
        Ok(self.state.lock().unwrap().llm_models.clone())
    }
}

/// Phone numbers `+1555000NNNN`, all unassigned.
pub fn number(id: i64) -> PurchasedNumber {
    PurchasedNumber {
        id,
        phone_number: format!("+1555000{:04}", id),
        client: None,
        client_name: None,
        agent: None,
        agent_name: None,
        status: Some("active".to_string()),
        created_at: None,
    }
}

pub fn agent(id: AgentId, name: &str) -> Agent {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "name": name,
        "is_inbound": true,
        "initial_message": "Thanks for calling",
        "language": "en-US",
        "pre_made_prompts": 5,
        "prompts_title": "Hotel_Booking",
        "prompts": "You are {agent_name}, edited by hand",
        "task_prompt": "Take the booking for {{guest}}",
        "voice_id": "v-7",
        "voice_name": "Ava",
        "voice_model": "elevenlabs",
        "voice_gender": "female",
        "client": 7,
        "client_name": "Harbor Hotels"
    }))
    .unwrap()
}

/// Fresh session over `backend` with in-memory storage.
pub fn context(backend: Arc<FakeBackend>) -> AppContext {
    AppContext::new(backend, Arc::new(MemoryStorage::new()), Config::default()).unwrap()
}
