use reqwest::Url;

use super::Step;
use crate::entity::{AgentId, Role};
use crate::error::{DeskError, Result};

// Routes are paths; a fixed origin lets `Url` parse and encode them.
const ROUTE_ORIGIN: &str = "http://voicedesk.local";

/// A wizard step route with the context it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardRoute {
    pub role: Role,
    pub step: Step,
    pub agent_id: Option<AgentId>,
    pub is_inbound: Option<bool>,
    pub prompts_title: Option<String>,
}

/// Agent list screen of a role.
pub fn agents_list_route(role: Role) -> String {
    format!("/{}/agents", role.route_prefix())
}

fn origin() -> Result<Url> {
    Url::parse(ROUTE_ORIGIN).map_err(|e| DeskError::InvalidRoute(e.to_string()))
}

impl WizardRoute {
    /// `/{role}/{step}?agentId=&isInbound=&promptsTitle=`, unset values left out.
    pub fn to_url(&self) -> String {
        let path = format!("/{}/{}", self.role.route_prefix(), self.step.slug());
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if let Some(id) = self.agent_id {
            pairs.push(("agentId", id.to_string()));
        }
        if let Some(inbound) = self.is_inbound {
            pairs.push(("isInbound", inbound.to_string()));
        }
        if let Some(title) = &self.prompts_title {
            pairs.push(("promptsTitle", title.clone()));
        }
        if pairs.is_empty() {
            return path;
        }

        let query = url_encode_pairs(&pairs);
        format!("{}?{}", path, query)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = || DeskError::InvalidRoute(raw.to_string());
        let url = origin()?.join(raw).map_err(|_| invalid())?;

        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();
        let [prefix, slug] = segments.as_slice() else {
            return Err(invalid());
        };
        let role = Role::from_route_prefix(prefix).ok_or_else(invalid)?;
        let step = Step::from_slug(slug).ok_or_else(invalid)?;

        let mut route = WizardRoute {
            role,
            step,
            agent_id: None,
            is_inbound: None,
            prompts_title: None,
        };
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "agentId" if !value.is_empty() => {
                    route.agent_id = Some(value.parse().map_err(|_| invalid())?);
                }
                "isInbound" if !value.is_empty() => {
                    route.is_inbound = Some(value.parse().map_err(|_| invalid())?);
                }
                "promptsTitle" if !value.is_empty() => {
                    route.prompts_title = Some(value.into_owned());
                }
                _ => {}
            }
        }

        if route.step == Step::AgentType && route.agent_id.is_some() {
            return Err(invalid());
        }
        Ok(route)
    }
}

fn url_encode_pairs(pairs: &[(&str, String)]) -> String {
    match origin() {
        Ok(mut url) => {
            url.query_pairs_mut().extend_pairs(pairs.iter().map(|(k, v)| (*k, v.as_str())));
            url.query().unwrap_or_default().to_string()
        }
        Err(_) => pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&"),
    }
}

impl std::fmt::Display for WizardRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_url())
    }
}
