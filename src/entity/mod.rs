mod agent;
mod client;
mod number;
mod page;
mod prompt;

pub use agent::{Agent, AgentId, AgentPayload, VoiceSelection};
pub use client::{ClientOption, ClientRecord};
pub use number::{NumberPatch, PurchasedNumber};
pub use page::{clamp_page, total_pages, ListEnvelope, Page, PAGE_SIZE};
pub use prompt::{resolve_default_llm, LlmModel, PremadePrompt, PromptDetails, DEFAULT_LLM_MODEL};

use serde::{Deserialize, Serialize};

/// Actor role. Decides route prefixes and whether a client must be picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(alias = "admin")]
    Admin,
    #[serde(alias = "client")]
    Client,
}

impl Role {
    /// Path segment used by every screen belonging to this role.
    pub fn route_prefix(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Client => "client",
        }
    }

    pub fn from_route_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "admin" => Some(Role::Admin),
            "client" => Some(Role::Client),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "Admin"),
            Role::Client => write!(f, "Client"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "client" => Ok(Role::Client),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// Logged-in user as kept in `auth-storage`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub role: Role,
}
