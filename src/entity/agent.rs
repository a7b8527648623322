// src/entity/agent.rs
use serde::{Deserialize, Serialize};

pub type AgentId = i64;

/// Voice picked on the voice step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSelection {
    pub voice_id: String,
    pub voice_name: String,
    pub provider: String,
    pub gender: String,
}

/// Agent as served by `GET /agent_detail/{id}/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    #[serde(default, alias = "agent_name")]
    pub name: String,
    #[serde(default)]
    pub is_inbound: bool,
    #[serde(default)]
    pub initial_message: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub pre_made_prompts: Option<i64>,
    #[serde(default)]
    pub prompts_title: String,
    #[serde(default)]
    pub prompts: String,
    #[serde(default)]
    pub task_prompt: String,
    #[serde(default)]
    pub voice_id: String,
    #[serde(default)]
    pub voice_name: String,
    #[serde(default)]
    pub voice_model: String,
    #[serde(default)]
    pub voice_gender: String,
    #[serde(default)]
    pub client: Option<i64>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub llm_model: Option<i64>,
}

/// Body of `POST /agent_detail/` and `PATCH /agent_detail/{id}/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentPayload {
    pub name: String,
    pub is_inbound: bool,
    pub initial_message: String,
    pub language: String,
    pub pre_made_prompts: i64,
    pub prompts_title: String,
    pub prompts: String,
    pub task_prompt: String,
    pub voice_id: String,
    pub voice_name: String,
    pub voice_model: String,
    pub voice_gender: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_model: Option<i64>,
}

impl Agent {
    /// Voice stored on the agent, if one was saved.
    pub fn voice(&self) -> Option<VoiceSelection> {
        if self.voice_id.is_empty() {
            return None;
        }
        Some(VoiceSelection {
            voice_id: self.voice_id.clone(),
            voice_name: self.voice_name.clone(),
            provider: self.voice_model.clone(),
            gender: self.voice_gender.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_tolerates_sparse_body() {
        let agent: Agent =
            serde_json::from_str(r#"{"id": 12, "agent_name": "Front desk"}"#).unwrap();
        assert_eq!(agent.id, 12);
        assert_eq!(agent.name, "Front desk");
        assert!(agent.voice().is_none());
        assert!(agent.client.is_none());
    }

    #[test]
    fn test_agent_voice() {
        let agent: Agent = serde_json::from_str(
            r#"{"id": 3, "voice_id": "v-11", "voice_name": "Ava", "voice_model": "elevenlabs", "voice_gender": "female"}"#,
        )
        .unwrap();
        let voice = agent.voice().unwrap();
        assert_eq!(voice.voice_id, "v-11");
        assert_eq!(voice.provider, "elevenlabs");
    }

    #[test]
    fn test_payload_omits_unset_client() {
        let payload = AgentPayload {
            name: "Sales".to_string(),
            is_inbound: false,
            initial_message: "Hi".to_string(),
            language: "en-US".to_string(),
            pre_made_prompts: 9,
            prompts_title: "Cold_call_1".to_string(),
            prompts: "p".to_string(),
            task_prompt: "t".to_string(),
            voice_id: "v".to_string(),
            voice_name: "Ava".to_string(),
            voice_model: "elevenlabs".to_string(),
            voice_gender: "female".to_string(),
            client: None,
            llm_model: Some(2),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("client").is_none());
        assert_eq!(json["llm_model"], 2);
        assert_eq!(json["pre_made_prompts"], 9);
    }
}
