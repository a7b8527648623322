//! Backend REST API.
//!
//! [`Backend`] is the seam between the client core and the network: one
//! method per endpoint the wizard, list screens and assignment flow use.
//! [`ApiClient`] implements it over HTTP.

mod client;
mod error;

pub use client::ApiClient;
pub use error::{extract_message, ApiError};

use async_trait::async_trait;

use crate::cache::ListParams;
use crate::entity::{
    Agent, AgentId, AgentPayload, ClientOption, LlmModel, NumberPatch, Page, PremadePrompt,
    PromptDetails, PurchasedNumber,
};

/// Resource names, shared by endpoints and cache keys.
pub mod resources {
    pub const AGENTS: &str = "agent_detail";
    pub const PREMADE_PROMPTS: &str = "agent_pre_made_prompts_list";
    pub const PREMADE_PROMPT_DETAILS: &str = "agent_pre_made_prompts_details";
    pub const PURCHASED_NUMBERS: &str = "purchase_number";
    pub const CLIENTS: &str = "admin_client_business_list";
    pub const LLM_MODELS: &str = "retell_llm_model_list";
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[async_trait]
pub trait Backend: Send + Sync {
    /// `GET /agent_pre_made_prompts_list/?is_inbound=`
    async fn premade_prompts(&self, is_inbound: bool) -> ApiResult<Vec<PremadePrompt>>;

    /// `GET /agent_pre_made_prompts_details/{id}/`
    async fn premade_prompt_details(&self, id: i64) -> ApiResult<PromptDetails>;

    /// `POST /agent_detail/`
    async fn create_agent(&self, payload: &AgentPayload) -> ApiResult<Agent>;

    /// `PATCH /agent_detail/{id}/`
    async fn update_agent(&self, id: AgentId, payload: &AgentPayload) -> ApiResult<Agent>;

    /// `GET /agent_detail/{id}/`
    async fn get_agent(&self, id: AgentId) -> ApiResult<Agent>;

    /// `GET /agent_detail/?page=&per_page=&search=`
    async fn list_agents(&self, params: &ListParams) -> ApiResult<Page<Agent>>;

    /// `GET /purchase_number/`
    async fn list_purchased_numbers(&self, params: &ListParams) -> ApiResult<Page<PurchasedNumber>>;

    /// `PATCH /purchase_number/{id}/`
    async fn update_purchased_number(&self, id: i64, patch: &NumberPatch)
        -> ApiResult<PurchasedNumber>;

    /// `GET /admin_client_business_list/?is_for_dropdown=true&page=&per_page=`
    async fn list_clients(&self, page: u32, per_page: u32) -> ApiResult<Page<ClientOption>>;

    /// `GET /retell_llm_model_list/`
    async fn llm_models(&self) -> ApiResult<Vec<LlmModel>>;
}
