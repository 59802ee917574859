use crate::{
    chat::ChatMessage,
    config::{ChatContract, Config, Timeouts},
    errors::RequestError,
    logging::log_api_call,
    models::{
        AnalyticsSummary, ApiCallLog, ChatReply, HealthStatus, ProductListing, SearchResults,
        SimilarProducts,
    },
    schema,
};
use chrono::Utc;
use reqwest::{Client, Method, Url};
use serde_json::Value;
use std::time::{Duration, Instant};

/// Upper bound on reading the body of a non-success response.
pub const ERROR_BODY_GRACE: Duration = Duration::from_secs(2);

/// Client for the recommendation service.
///
/// Built once from the startup [`Config`]; every operation is bounded by its
/// own timeout and returns canonical models or a [`RequestError`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    timeouts: Timeouts,
    default_top_k: usize,
    chat_top_k: usize,
    similar_top_k: usize,
    contract: ChatContract,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, RequestError> {
        let raw = config.api_base_url.trim();
        let base_url = Url::parse(raw)
            .map_err(|e| RequestError::InvalidUrl(format!("{}: {}", raw, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(RequestError::InvalidUrl(raw.to_string()));
        }

        let http = Client::builder()
            .user_agent(concat!("ikarus/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RequestError::Transport {
                url: raw.to_string(),
                source: e,
            })?;

        Ok(Self {
            http,
            base_url,
            timeouts: config.timeouts.clone(),
            default_top_k: config.default_top_k,
            chat_top_k: config.chat_top_k,
            similar_top_k: config.similar_top_k,
            contract: config.chat_contract,
        })
    }

    pub fn default_top_k(&self) -> usize {
        self.default_top_k
    }

    pub fn chat_top_k(&self) -> usize {
        self.chat_top_k
    }

    pub fn similar_top_k(&self) -> usize {
        self.similar_top_k
    }

    /// Base URL plus path segments; each segment is percent-encoded on its own.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, RequestError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RequestError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Performs one exchange under `budget` and records it in the call log.
    ///
    /// Timers live inside `tokio::time::timeout*` futures, so they are
    /// dropped on every exit path, including the abort when the budget runs out.
    async fn execute(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
        budget: Duration,
        summary: &str,
    ) -> Result<Value, RequestError> {
        let endpoint = format!("{} {}", method, url.path());
        let started = Instant::now();

        let result = self.exchange(method, &url, body, budget).await;

        let response_status = match &result {
            Ok((status, _)) => Some(*status),
            Err(e) => e.status(),
        };
        log_api_call(&ApiCallLog {
            timestamp: Utc::now(),
            endpoint,
            request_summary: summary.to_string(),
            response_status,
            response_time_ms: started.elapsed().as_millis(),
        });

        result.map(|(_, value)| value)
    }

    /// Sending and reading a success body share one deadline. The body of an
    /// error response is read under [`ERROR_BODY_GRACE`] instead, so a stalled
    /// error body never hides the status code.
    async fn exchange(
        &self,
        method: Method,
        url: &Url,
        body: Option<&Value>,
        budget: Duration,
    ) -> Result<(u16, Value), RequestError> {
        let deadline = tokio::time::Instant::now() + budget;
        let timed_out = || RequestError::Timeout {
            url: url.to_string(),
            timeout: budget,
        };
        let transport = |e: reqwest::Error| RequestError::Transport {
            url: url.to_string(),
            source: e,
        };

        let mut request = self.http.request(method, url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = tokio::time::timeout_at(deadline, request.send())
            .await
            .map_err(|_| timed_out())?
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = tokio::time::timeout(ERROR_BODY_GRACE, response.text())
                .await
                .ok()
                .and_then(Result::ok)
                .unwrap_or_default();
            return Err(RequestError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
                body,
            });
        }

        let text = tokio::time::timeout_at(deadline, response.text())
            .await
            .map_err(|_| timed_out())?
            .map_err(transport)?;
        let value = serde_json::from_str(&text).map_err(|e| RequestError::Decode {
            url: url.to_string(),
            source: e,
        })?;

        Ok((status.as_u16(), value))
    }

    pub async fn health(&self) -> Result<HealthStatus, RequestError> {
        let url = self.endpoint(&["health"])?;
        let body = self
            .execute(Method::GET, url.clone(), None, self.timeouts.health(), "health")
            .await?;
        schema::parse_health(url.as_str(), &body)
    }

    /// Natural-language product search.
    pub async fn search_products(
        &self,
        query: &str,
        top_k: usize,
        include_description: bool,
    ) -> Result<SearchResults, RequestError> {
        let url = self.endpoint(&["api", "recommendations", "search"])?;
        let payload = schema::search_request_body(query, top_k, include_description);
        let body = self
            .execute(
                Method::POST,
                url.clone(),
                Some(&payload),
                self.timeouts.search(),
                "search",
            )
            .await?;
        schema::parse_search(url.as_str(), query, &body)
    }

    /// Sends the last user turn of `history` and returns the assistant's reply.
    pub async fn chat_recommendations(
        &self,
        history: &[ChatMessage],
        top_k: usize,
    ) -> Result<ChatReply, RequestError> {
        let url = self.endpoint(&["api", "recommendations", "chat"])?;
        let payload = schema::chat_request_body(history, top_k, self.contract)?;
        let body = self
            .execute(
                Method::POST,
                url.clone(),
                Some(&payload),
                self.timeouts.chat(),
                "chat",
            )
            .await?;
        schema::parse_chat_reply(url.as_str(), &body)
    }

    /// Products similar to `product_id`; never more than `top_k` items.
    pub async fn similar_products(
        &self,
        product_id: &str,
        top_k: usize,
    ) -> Result<SimilarProducts, RequestError> {
        let mut url = self.endpoint(&["api", "recommendations", "similar", product_id])?;
        url.query_pairs_mut()
            .append_pair("top_k", &top_k.to_string());
        let body = self
            .execute(
                Method::GET,
                url.clone(),
                None,
                self.timeouts.similar(),
                "similar",
            )
            .await?;
        schema::parse_similar(url.as_str(), product_id, top_k, &body)
    }

    pub async fn analytics(&self) -> Result<AnalyticsSummary, RequestError> {
        let url = self.endpoint(&["api", "analytics", ""])?;
        let body = self
            .execute(
                Method::GET,
                url.clone(),
                None,
                self.timeouts.analytics(),
                "analytics",
            )
            .await?;
        schema::parse_analytics(url.as_str(), &body)
    }

    pub async fn all_products(&self) -> Result<ProductListing, RequestError> {
        let url = self.endpoint(&["api", "analytics", "products"])?;
        let body = self
            .execute(
                Method::GET,
                url.clone(),
                None,
                self.timeouts.products(),
                "products",
            )
            .await?;
        schema::parse_product_listing(url.as_str(), &body)
    }
}
