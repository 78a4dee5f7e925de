use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use url::Url;

use super::error::ApiError;
use super::types::{
    BotTokenOutcome, BotTokenRequest, Envelope, NewSubscription, PostsPage, PushSettings,
    RssFetchOutcome, Stats, Subscription, TelegramStatus, UserConfig,
};
use crate::filters::FilterSet;
use crate::util::{validate_base_url, UrlCheckError};

/// Upper bound on any response body.
pub const MAX_RESPONSE_SIZE: usize = 1024 * 1024;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Authenticated client for the push backend's JSON API.
///
/// Cheap to clone; background tasks each take their own copy.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    session: Arc<SecretString>,
    timeout: Duration,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.base.as_str())
            .field("session", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ApiClient {
    pub fn new(base_url: &str, session: SecretString, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("tgrss-dash/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_http_client(http, base_url, session, timeout)
    }

    pub fn with_http_client(
        http: reqwest::Client,
        base_url: &str,
        session: SecretString,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let base = validate_base_url(base_url).map_err(|e| match e {
            UrlCheckError::Insecure => ApiError::InsecureBaseUrl,
            other => ApiError::InvalidBaseUrl(other.to_string()),
        })?;
        Ok(Self {
            http,
            base,
            session: Arc::new(session),
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Webhook address the backend serves Telegram updates on.
    pub fn default_webhook_url(&self) -> String {
        format!("{}telegram/webhook", self.base)
    }

    // ========================================================================
    // Posts
    // ========================================================================

    /// `GET /api/posts` with only the non-empty filters in the query.
    pub async fn list_posts(
        &self,
        page: u32,
        limit: u32,
        filters: &FilterSet,
    ) -> Result<PostsPage, ApiError> {
        let mut url = self.endpoint("api/posts")?;
        {
            let page = page.to_string();
            let limit = limit.to_string();
            let mut query = url.query_pairs_mut();
            query.append_pair("page", &page);
            query.append_pair("limit", &limit);
            for (key, value) in filters.query_pairs() {
                query.append_pair(key, value);
            }
        }
        self.fetch_data(Method::GET, url, None).await
    }

    pub async fn fetch_rss(&self) -> Result<RssFetchOutcome, ApiError> {
        let url = self.endpoint("api/rss/fetch")?;
        let envelope = self
            .exchange_envelope::<RssFetchOutcome>(Method::POST, url, None)
            .await?;
        Ok(envelope.data.unwrap_or_default())
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    pub async fn list_subscriptions(&self) -> Result<Vec<Subscription>, ApiError> {
        let url = self.endpoint("api/subscriptions")?;
        let envelope = self
            .exchange_envelope::<Vec<Subscription>>(Method::GET, url, None)
            .await?;
        Ok(envelope.data.unwrap_or_default())
    }

    pub async fn create_subscription(&self, sub: &NewSubscription) -> Result<(), ApiError> {
        let url = self.endpoint("api/subscriptions")?;
        self.command(Method::POST, url, Some(encode(sub)?)).await?;
        Ok(())
    }

    pub async fn delete_subscription(&self, id: i64) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("api/subscriptions/{}", id))?;
        self.command(Method::DELETE, url, None).await?;
        Ok(())
    }

    // ========================================================================
    // Configuration & stats
    // ========================================================================

    pub async fn get_config(&self) -> Result<UserConfig, ApiError> {
        let url = self.endpoint("api/config")?;
        self.fetch_data(Method::GET, url, None).await
    }

    pub async fn update_push_settings(&self, settings: PushSettings) -> Result<(), ApiError> {
        let url = self.endpoint("api/config")?;
        self.command(Method::PUT, url, Some(encode(&settings)?))
            .await?;
        Ok(())
    }

    pub async fn get_stats(&self) -> Result<Stats, ApiError> {
        let url = self.endpoint("api/stats")?;
        self.fetch_data(Method::GET, url, None).await
    }

    // ========================================================================
    // Telegram
    // ========================================================================

    pub async fn set_bot_token(&self, req: &BotTokenRequest) -> Result<BotTokenOutcome, ApiError> {
        let url = self.endpoint("api/bot-token")?;
        let body = serde_json::to_vec(&req.to_json())?;
        let envelope = self
            .exchange_envelope::<BotTokenOutcome>(Method::POST, url, Some(body))
            .await?;
        Ok(envelope.data.unwrap_or_default())
    }

    pub async fn telegram_status(&self) -> Result<TelegramStatus, ApiError> {
        let url = self.endpoint("api/telegram/status")?;
        self.fetch_data(Method::GET, url, None).await
    }

    /// Returns the backend's message, if any.
    pub async fn test_bot(&self) -> Result<Option<String>, ApiError> {
        let url = self.endpoint("api/telegram/test")?;
        self.command(Method::POST, url, None).await
    }

    /// A blank or missing `message` lets the backend pick its default text.
    pub async fn send_test_message(&self, message: Option<&str>) -> Result<(), ApiError> {
        let url = self.endpoint("api/telegram/send-test")?;
        let body = match message.map(str::trim).filter(|m| !m.is_empty()) {
            Some(m) => serde_json::json!({ "message": m }),
            None => serde_json::json!({}),
        };
        self.command(Method::POST, url, Some(serde_json::to_vec(&body)?))
            .await?;
        Ok(())
    }

    pub async fn unbind_user(&self) -> Result<(), ApiError> {
        let url = self.endpoint("api/telegram/unbind")?;
        self.command(Method::POST, url, None).await?;
        Ok(())
    }

    // ========================================================================
    // Session
    // ========================================================================

    /// Invalidate the session server-side. The response body is not
    /// inspected beyond the status code.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let url = self.endpoint("auth/logout")?;
        let body = serde_json::to_vec(
            &serde_json::json!({ "sessionId": self.session.expose_secret() }),
        )?;
        let (status, _) = self.exchange(Method::POST, url, Some(body)).await?;
        if status.is_success() {
            Ok(())
        } else {
            Err(ApiError::HttpStatus(status.as_u16()))
        }
    }

    // ========================================================================
    // Plumbing
    // ========================================================================

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|e| ApiError::InvalidBaseUrl(e.to_string()))
    }

    /// Expect `success: true` with a `data` payload.
    async fn fetch_data<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<T, ApiError> {
        self.exchange_envelope::<T>(method, url, body)
            .await?
            .data
            .ok_or(ApiError::MissingData)
    }

    /// Expect `success: true`; any payload is ignored.
    async fn command(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<Option<String>, ApiError> {
        let envelope = self
            .exchange_envelope::<IgnoredAny>(method, url, body)
            .await?;
        Ok(envelope.message)
    }

    async fn exchange_envelope<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<Envelope<T>, ApiError> {
        let (status, bytes) = self.exchange(method, url, body).await?;

        if !status.is_success() {
            // Error responses usually still carry the envelope's message.
            let message = serde_json::from_slice::<Envelope<IgnoredAny>>(&bytes)
                .ok()
                .and_then(|env| env.message);
            return Err(match message {
                Some(message) => ApiError::Rejected {
                    message: Some(message),
                },
                None => ApiError::HttpStatus(status.as_u16()),
            });
        }

        let envelope: Envelope<T> = serde_json::from_slice(&bytes)?;
        if !envelope.success {
            return Err(ApiError::Rejected {
                message: envelope.message,
            });
        }
        Ok(envelope)
    }

    /// Send one request and read its body under the size cap.
    ///
    /// A 401 short-circuits before the body is read.
    async fn exchange(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<(StatusCode, Vec<u8>), ApiError> {
        let path = url.path().to_string();
        tracing::debug!(method = %method, path = %path, "API request");

        let round_trip = async {
            let mut request = self.http.request(method.clone(), url).header(
                AUTHORIZATION,
                format!("Bearer {}", self.session.expose_secret()),
            );
            if let Some(body) = body {
                request = request
                    .header(CONTENT_TYPE, "application/json")
                    .body(body);
            }

            let response = request.send().await?;
            let status = response.status();
            if status == StatusCode::UNAUTHORIZED {
                return Err(ApiError::Unauthorized);
            }
            let bytes = read_limited_body(response, MAX_RESPONSE_SIZE).await?;
            Ok((status, bytes))
        };

        let result = tokio::time::timeout(self.timeout, round_trip)
            .await
            .map_err(|_| ApiError::Timeout(self.timeout.as_secs()))?;

        match &result {
            Ok((status, _)) => {
                tracing::debug!(method = %method, path = %path, status = status.as_u16(), "API response");
            }
            Err(e) => {
                tracing::warn!(method = %method, path = %path, error = %e, "API request failed");
            }
        }
        result
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, ApiError> {
    Ok(serde_json::to_vec(value)?)
}

async fn read_limited_body(response: reqwest::Response, limit: usize) -> Result<Vec<u8>, ApiError> {
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(ApiError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(
            &server.uri(),
            SecretString::from("session-abc"),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_bearer_header_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/stats"))
            .and(header("authorization", "Bearer session-abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": { "total_posts": 3, "today_messages": 1 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let stats = client_for(&server).await.get_stats().await.unwrap();
        assert_eq!(stats.total_posts, 3);
        assert_eq!(stats.today_messages, 1);
        assert_eq!(stats.pushed_posts, 0);
    }

    #[tokio::test]
    async fn test_401_with_non_json_body_is_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("<html>login</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.get_config().await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_success_false_is_rejected_with_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/rss/fetch"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "message": "RSS source unreachable"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).await.fetch_rss().await.unwrap_err();
        assert_eq!(err.user_message("RSS update failed"), "RSS source unreachable");
    }

    #[tokio::test]
    async fn test_error_status_with_envelope_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/subscriptions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "success": false,
                "message": "At least one condition is required"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .create_subscription(&NewSubscription::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Rejected { message: Some(ref m) } if m.contains("condition")));
    }

    #[tokio::test]
    async fn test_error_status_without_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let err = client_for(&server).await.get_stats().await.unwrap_err();
        assert!(matches!(err, ApiError::HttpStatus(502)));
    }

    #[tokio::test]
    async fn test_missing_data_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/telegram/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .mount(&server)
            .await;

        let err = client_for(&server).await.telegram_status().await.unwrap_err();
        assert!(matches!(err, ApiError::MissingData));
    }

    #[tokio::test]
    async fn test_list_posts_query_has_only_set_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/posts"))
            .and(query_param("page", "2"))
            .and(query_param("limit", "20"))
            .and(query_param("pushStatus", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": { "posts": [], "total": 0, "page": 2, "totalPages": 0 }
            })))
            .mount(&server)
            .await;

        let filters = FilterSet::new()
            .with(crate::filters::FilterKey::PushStatus, "1")
            .with(crate::filters::FilterKey::Search, "   ");
        let page = client_for(&server)
            .await
            .list_posts(2, 20, &filters)
            .await
            .unwrap();
        assert_eq!(page.page, 2);

        let requests = server.received_requests().await.unwrap();
        let query = requests[0].url.query().unwrap_or_default().to_string();
        assert!(!query.contains("search"));
        assert!(!query.contains("creator"));
    }

    #[tokio::test]
    async fn test_send_test_message_omits_blank_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/telegram/send-test"))
            .and(body_json(json!({})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .await
            .send_test_message(Some("  "))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_logout_sends_session_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .and(body_json(json!({ "sessionId": "session-abc" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).await.logout().await.unwrap();
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("x".repeat(MAX_RESPONSE_SIZE + 1)),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).await.get_stats().await.unwrap_err();
        assert!(matches!(err, ApiError::ResponseTooLarge(_)));
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(2))
                    .set_body_json(json!({ "success": true, "data": {} })),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(
            &server.uri(),
            SecretString::from("s"),
            Duration::from_millis(200),
        )
        .unwrap();
        let err = client.get_stats().await.unwrap_err();
        assert!(matches!(err, ApiError::Timeout(_)));
    }

    #[test]
    fn test_public_http_base_rejected() {
        let err = ApiClient::new(
            "http://push.example.com",
            SecretString::from("s"),
            DEFAULT_TIMEOUT,
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::InsecureBaseUrl));
    }

    #[test]
    fn test_default_webhook_url() {
        let client = ApiClient::new(
            "https://push.example.com/app",
            SecretString::from("s"),
            DEFAULT_TIMEOUT,
        )
        .unwrap();
        assert_eq!(
            client.default_webhook_url(),
            "https://push.example.com/app/telegram/webhook"
        );
        assert!(!format!("{:?}", client).contains("\"s\""));
    }
}
