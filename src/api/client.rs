// HTTP client for the voice platform REST API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use super::{resources, ApiError, ApiResult, Backend};
use crate::cache::ListParams;
use crate::config::Config;
use crate::entity::{
    Agent, AgentId, AgentPayload, ClientOption, ClientRecord, ListEnvelope, LlmModel,
    NumberPatch, Page, PremadePrompt, PromptDetails, PurchasedNumber,
};
use crate::error::{DeskError, Result};

pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            http: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DeskError::Config(format!("HTTP client: {}", e)))?;
        Ok(Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            http,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(String, String)]) -> ApiResult<T> {
        tracing::debug!(path, ?query, "GET");
        let response = self.request(Method::GET, path).query(query).send().await?;
        Self::handle_response(response).await
    }

    async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("mutation", %method, path, %request_id);
        async {
            let response = self
                .request(method.clone(), path)
                .header("X-Request-Id", request_id.to_string())
                .json(body)
                .send()
                .await?;
            let result = Self::handle_response(response).await;
            match &result {
                Ok(_) => tracing::info!("mutation succeeded"),
                Err(e) => tracing::warn!(
                    error_type = e.error_type(),
                    retryable = e.is_retryable(),
                    error = %e,
                    "mutation failed"
                ),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status.as_u16(), &body));
        }

        if status == StatusCode::NO_CONTENT {
            return serde_json::from_str("null").map_err(|e| ApiError::Decode(e.to_string()));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl Backend for ApiClient {
    async fn premade_prompts(&self, is_inbound: bool) -> ApiResult<Vec<PremadePrompt>> {
        let path = format!("/{}/", resources::PREMADE_PROMPTS);
        let query = [("is_inbound".to_string(), is_inbound.to_string())];
        let envelope: ListEnvelope<PremadePrompt> = self.get(&path, &query).await?;
        Ok(envelope.into_items())
    }

    async fn premade_prompt_details(&self, id: i64) -> ApiResult<PromptDetails> {
        let path = format!("/{}/{}/", resources::PREMADE_PROMPT_DETAILS, id);
        self.get(&path, &[]).await
    }

    async fn create_agent(&self, payload: &AgentPayload) -> ApiResult<Agent> {
        let path = format!("/{}/", resources::AGENTS);
        self.send_json(Method::POST, &path, payload).await
    }

    async fn update_agent(&self, id: AgentId, payload: &AgentPayload) -> ApiResult<Agent> {
        let path = format!("/{}/{}/", resources::AGENTS, id);
        self.send_json(Method::PATCH, &path, payload).await
    }

    async fn get_agent(&self, id: AgentId) -> ApiResult<Agent> {
        let path = format!("/{}/{}/", resources::AGENTS, id);
        self.get(&path, &[]).await
    }

    async fn list_agents(&self, params: &ListParams) -> ApiResult<Page<Agent>> {
        let path = format!("/{}/", resources::AGENTS);
        let envelope: ListEnvelope<Agent> = self.get(&path, &params.query_pairs()).await?;
        Ok(envelope.into_page(params.page, params.page_size))
    }

    async fn list_purchased_numbers(&self, params: &ListParams) -> ApiResult<Page<PurchasedNumber>> {
        let path = format!("/{}/", resources::PURCHASED_NUMBERS);
        let envelope: ListEnvelope<PurchasedNumber> =
            self.get(&path, &params.query_pairs()).await?;
        Ok(envelope.into_page(params.page, params.page_size))
    }

    async fn update_purchased_number(
        &self,
        id: i64,
        patch: &NumberPatch,
    ) -> ApiResult<PurchasedNumber> {
        let path = format!("/{}/{}/", resources::PURCHASED_NUMBERS, id);
        self.send_json(Method::PATCH, &path, patch).await
    }

    async fn list_clients(&self, page: u32, per_page: u32) -> ApiResult<Page<ClientOption>> {
        let path = format!("/{}/", resources::CLIENTS);
        let query = [
            ("is_for_dropdown".to_string(), "true".to_string()),
            ("page".to_string(), page.to_string()),
            ("per_page".to_string(), per_page.to_string()),
        ];
        let envelope: ListEnvelope<ClientRecord> = self.get(&path, &query).await?;
        let page = envelope.into_page(page, per_page);
        Ok(Page {
            items: page.items.into_iter().map(ClientOption::from).collect(),
            total_count: page.total_count,
            page: page.page,
            page_size: page.page_size,
        })
    }

    async fn llm_models(&self) -> ApiResult<Vec<LlmModel>> {
        let path = format!("/{}/", resources::LLM_MODELS);
        let envelope: ListEnvelope<LlmModel> = self.get(&path, &[]).await?;
        Ok(envelope.into_items())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn premade_prompts_sends_inbound_flag() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/agent_pre_made_prompts_list/"))
            .and(query_param("is_inbound", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"id": 1, "title": "B2BSAAS_Inbound"}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = ApiClient::new(&mock_server.uri());
        let prompts = client.premade_prompts(true).await.unwrap();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].title, "B2BSAAS_Inbound");
    }

    #[tokio::test]
    async fn create_agent_posts_payload_with_auth() {
        let mock_server = MockServer::start().await;
        let payload = AgentPayload {
            name: "Sales".to_string(),
            is_inbound: false,
            initial_message: "Hi".to_string(),
            language: "en-US".to_string(),
            pre_made_prompts: 9,
            prompts_title: "Cold_call_1".to_string(),
            prompts: "Sell {product}".to_string(),
            task_prompt: "Close {{deal}}".to_string(),
            voice_id: "v-1".to_string(),
            voice_name: "Ava".to_string(),
            voice_model: "elevenlabs".to_string(),
            voice_gender: "female".to_string(),
            client: None,
            llm_model: Some(2),
        };

        Mock::given(method("POST"))
            .and(path("/agent_detail/"))
            .and(header("Authorization", "Bearer tok-1"))
            .and(header_exists("X-Request-Id"))
            .and(body_json(&payload))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(serde_json::json!({"id": 77, "name": "Sales"})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = ApiClient::new(&mock_server.uri()).with_token("tok-1");
        let agent = client.create_agent(&payload).await.unwrap();
        assert_eq!(agent.id, 77);
    }

    #[tokio::test]
    async fn list_numbers_passes_filters_and_builds_page() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/purchase_number/"))
            .and(query_param("page", "3"))
            .and(query_param("per_page", "10"))
            .and(query_param("search", "555"))
            .and(query_param("client", "4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"id": 21, "phone_number": "+15550121"}],
                "total_count": 23
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let params = ListParams {
            search: "555".to_string(),
            client: Some(4),
            page: 3,
            ..ListParams::default()
        };
        let client = ApiClient::new(&mock_server.uri());
        let page = client.list_purchased_numbers(&params).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total_pages(), 3);
        assert!(page.is_last());
    }

    #[tokio::test]
    async fn bare_full_page_leaves_next_page_reachable() {
        let mock_server = MockServer::start().await;
        let rows: Vec<serde_json::Value> = (1..=10)
            .map(|id| serde_json::json!({"id": id, "phone_number": format!("+1555010{:02}", id)}))
            .collect();

        Mock::given(method("GET"))
            .and(path("/purchase_number/"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = ApiClient::new(&mock_server.uri());
        let page = client
            .list_purchased_numbers(&ListParams::default())
            .await
            .unwrap();
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.total_pages(), 2);
        assert!(!page.is_last());

        let mut view = crate::cache::ListView::new(resources::PURCHASED_NUMBERS);
        let ticket = view.dispatch();
        assert!(view.apply(&ticket, page));
        assert_eq!(view.set_page(2), 2);
    }

    #[tokio::test]
    async fn clients_without_count_page_until_short_page() {
        let mock_server = MockServer::start().await;
        let full: Vec<serde_json::Value> = (1..=5)
            .map(|id| serde_json::json!({"id": id, "name": format!("Client {}", id)}))
            .collect();

        Mock::given(method("GET"))
            .and(path("/admin_client_business_list/"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(full))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/admin_client_business_list/"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"id": 6, "name": "Client 6"}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = ApiClient::new(&mock_server.uri());
        let first = client.list_clients(1, 5).await.unwrap();
        assert!(!first.is_last());
        let second = client.list_clients(2, 5).await.unwrap();
        assert_eq!(second.items[0].label, "Client 6");
        assert_eq!(second.total_count, 6);
        assert!(second.is_last());
    }

    #[tokio::test]
    async fn client_error_uses_server_message() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/purchase_number/8/"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"message": "Number is already assigned"}"#),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = ApiClient::new(&mock_server.uri());
        let patch = NumberPatch {
            client: Some(Some(2)),
            agent: None,
        };
        let err = client.update_purchased_number(8, &patch).await.unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.user_message(), "Number is already assigned");
    }

    #[tokio::test]
    async fn server_error_is_generic() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/retell_llm_model_list/"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
            .mount(&mock_server)
            .await;

        let client = ApiClient::new(&mock_server.uri());
        let err = client.llm_models().await.unwrap_err();
        assert!(matches!(err, ApiError::Server { status: 502, message: None }));
        assert_eq!(err.user_message(), "An unexpected error occurred");
    }

    #[tokio::test]
    async fn clients_map_to_dropdown_options() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/admin_client_business_list/"))
            .and(query_param("is_for_dropdown", "true"))
            .and(query_param("page", "1"))
            .and(query_param("per_page", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{"id": 3, "business_name": "Smile Co"}],
                "count": 1
            })))
            .mount(&mock_server)
            .await;

        let client = ApiClient::new(&mock_server.uri());
        let page = client.list_clients(1, 50).await.unwrap();
        assert_eq!(page.items, vec![ClientOption { value: 3, label: "Smile Co".to_string() }]);
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        // Nothing listens on the discard port.
        let client = ApiClient::new("http://127.0.0.1:9");
        let err = client.get_agent(1).await.unwrap_err();
        assert!(matches!(err, ApiError::Network { .. }));
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/agent_detail/5/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let client = ApiClient::new(&mock_server.uri());
        let err = client.get_agent(5).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
