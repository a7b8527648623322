// src/entity/client.rs
use serde::{Deserialize, Serialize};

/// Dropdown option for a client business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientOption {
    pub value: i64,
    pub label: String,
}

/// Row of `GET /admin_client_business_list/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: i64,
    #[serde(alias = "business_name", alias = "company_name")]
    pub name: String,
}

impl From<ClientRecord> for ClientOption {
    fn from(record: ClientRecord) -> Self {
        Self {
            value: record.id,
            label: record.name,
        }
    }
}

impl ClientOption {
    pub fn find(options: &[ClientOption], value: i64) -> Option<&ClientOption> {
        options.iter().find(|o| o.value == value)
    }
}
