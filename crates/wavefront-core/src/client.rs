//! Async client for the Wavefront v2 REST API.

use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use url::Url;

use crate::error::{Result, WavefrontError};
use crate::model::{ApiEnvelope, PagedItems, Source, TagSet};
use crate::params::Connection;

/// Default HTTP request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct WavefrontClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
}

impl WavefrontClient {
    pub fn new(connection: &Connection) -> Result<Self> {
        Self::with_timeout(connection, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(connection: &Connection, timeout: Duration) -> Result<Self> {
        let base_url = parse_endpoint(&connection.endpoint)?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            token: connection.token.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn api_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                WavefrontError::invalid_argument(format!(
                    "endpoint {} cannot carry an API path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["api", "v2"])
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        tracing::debug!(%method, %url, "wavefront request");
        self.http
            .request(method, url)
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
        target: Target<'_>,
    ) -> Result<Option<T>> {
        let resp = builder.send().await?;
        handle_response(resp, target).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: &B,
        target: Target<'_>,
    ) -> Result<Option<T>> {
        let builder = self
            .request(method, url)
            .header("Content-Type", "application/json")
            .json(body);
        self.send(builder, target).await
    }

    pub async fn get_alert(&self, alert_id: &str) -> Result<Value> {
        let url = self.api_url(&["alert", alert_id])?;
        let alert = self
            .send(self.request(Method::GET, url), Target::new("Alert", alert_id))
            .await?;
        Ok(alert.unwrap_or_else(|| Value::Object(Map::new())))
    }

    /// Fetches a source. Only a not-found response is `Ok(None)`; a success
    /// without a body is an upstream error.
    pub async fn get_source(&self, name: &str) -> Result<Option<Source>> {
        let url = self.api_url(&["source", name])?;
        match self
            .send(self.request(Method::GET, url), Target::new("Source", name))
            .await
        {
            Ok(Some(source)) => Ok(Some(source)),
            Ok(None) => Err(WavefrontError::Upstream {
                status: StatusCode::OK.as_u16(),
                message: format!("empty response body for source {name}"),
            }),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn create_source(&self, source: &Source) -> Result<Source> {
        let url = self.api_url(&["source"])?;
        let created = self
            .send_json(Method::POST, url, source, Target::new("Source", &source.name))
            .await?;
        Ok(created.unwrap_or_else(|| source.clone()))
    }

    pub async fn update_source(&self, source: &Source) -> Result<Source> {
        let url = self.api_url(&["source", &source.name])?;
        let updated = self
            .send_json(Method::PUT, url, source, Target::new("Source", &source.name))
            .await?;
        Ok(updated.unwrap_or_else(|| source.clone()))
    }

    pub async fn get_source_tags(&self, name: &str) -> Result<TagSet> {
        let url = self.api_url(&["source", name, "tag"])?;
        let page: Option<PagedItems<String>> = self
            .send(self.request(Method::GET, url), Target::new("Source", name))
            .await?;
        Ok(page.map(|p| p.items.into_iter().collect()).unwrap_or_default())
    }

    /// Replaces the full tag set of a source in one call.
    pub async fn set_source_tags(&self, name: &str, tags: &TagSet) -> Result<()> {
        let url = self.api_url(&["source", name, "tag"])?;
        let _: Option<Value> = self
            .send_json(Method::POST, url, tags, Target::new("Source", name))
            .await?;
        Ok(())
    }

    pub async fn get_event(&self, id: &str) -> Result<Value> {
        let url = self.api_url(&["event", id])?;
        self.send(self.request(Method::GET, url), Target::new("Event", id))
            .await
            .map(Option::unwrap_or_default)
    }

    pub async fn search_events(&self, query: &Value) -> Result<Value> {
        let url = self.api_url(&["search", "event"])?;
        self.send_json(Method::POST, url, query, Target::new("Event search", "query"))
            .await
            .map(Option::unwrap_or_default)
    }

    pub async fn create_event(&self, body: &Map<String, Value>) -> Result<Value> {
        let url = self.api_url(&["event"])?;
        let name = body.get("name").and_then(Value::as_str).unwrap_or("(unnamed)");
        self.send_json(Method::POST, url, body, Target::new("Event", name))
            .await
            .map(Option::unwrap_or_default)
    }

    pub async fn update_event(&self, id: &str, body: &Map<String, Value>) -> Result<Value> {
        let url = self.api_url(&["event", id])?;
        self.send_json(Method::PUT, url, body, Target::new("Event", id))
            .await
            .map(Option::unwrap_or_default)
    }

    pub async fn delete_event(&self, id: &str) -> Result<Value> {
        let url = self.api_url(&["event", id])?;
        self.send(self.request(Method::DELETE, url), Target::new("Event", id))
            .await
            .map(Option::unwrap_or_default)
    }
}

/// What a request addresses, used to build `NotFound` errors.
#[derive(Debug, Clone, Copy)]
struct Target<'a> {
    kind: &'a str,
    id: &'a str,
}

impl<'a> Target<'a> {
    fn new(kind: &'a str, id: &'a str) -> Self {
        Self { kind, id }
    }
}

/// Accepts bare host names (`example.wavefront.com`) by assuming HTTPS.
fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let endpoint = endpoint.trim();
    if endpoint.is_empty() {
        return Err(WavefrontError::invalid_argument("endpoint must not be empty"));
    }
    let url = if endpoint.contains("://") {
        Url::parse(endpoint)?
    } else {
        Url::parse(&format!("https://{endpoint}"))?
    };
    match url.scheme() {
        "https" | "http" => Ok(url),
        other => Err(WavefrontError::invalid_argument(format!(
            "unsupported endpoint scheme `{other}` in {endpoint}"
        ))),
    }
}

async fn handle_response<T: DeserializeOwned>(
    resp: reqwest::Response,
    target: Target<'_>,
) -> Result<Option<T>> {
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        let err = classify_failure(status, &body, target);
        tracing::debug!(%status, category = %err.category(), "wavefront request failed");
        return Err(err);
    }

    if body.trim().is_empty() {
        return Ok(None);
    }

    let envelope: ApiEnvelope<T> = serde_json::from_str(&body)?;
    Ok(envelope.response)
}

/// Maps a non-2xx response onto the error taxonomy.
fn classify_failure(status: StatusCode, body: &str, target: Target<'_>) -> WavefrontError {
    let message = serde_json::from_str::<ApiEnvelope<Value>>(body)
        .ok()
        .and_then(|envelope| envelope.status)
        .and_then(|status| status.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| body.trim().to_string());

    if status == StatusCode::NOT_FOUND || message.contains("does not exist") {
        return WavefrontError::not_found(target.kind, target.id);
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => WavefrontError::Auth {
            status: status.as_u16(),
            message,
        },
        _ => WavefrontError::Upstream {
            status: status.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;

    const TARGET: Target<'static> = Target {
        kind: "Source",
        id: "app-01",
    };

    #[test]
    fn test_bare_host_endpoint_gets_https() {
        let url = parse_endpoint("example.wavefront.com").unwrap();
        assert_eq!(url.as_str(), "https://example.wavefront.com/");
    }

    #[test]
    fn test_unsupported_scheme_rejected() {
        let err = parse_endpoint("ftp://example.wavefront.com").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::InvalidArgument);
        assert!(parse_endpoint("   ").is_err());
    }

    #[test]
    fn test_api_url_encodes_segments() {
        let connection = Connection::new("https://try.wavefront.com/", "t");
        let client = WavefrontClient::new(&connection).unwrap();
        let url = client.api_url(&["event", "1507307331000:CPU is > 90%"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://try.wavefront.com/api/v2/event/1507307331000:CPU%20is%20%3E%2090%25"
        );
    }

    #[test]
    fn test_classify_not_found_by_status() {
        let err = classify_failure(StatusCode::NOT_FOUND, "", TARGET);
        assert!(err.is_not_found());
    }

    #[test]
    fn test_classify_not_found_by_message() {
        let body = r#"{"status":{"result":"ERROR","message":"Source app-01 does not exist","code":400}}"#;
        let err = classify_failure(StatusCode::BAD_REQUEST, body, TARGET);
        assert!(err.is_not_found());
    }

    #[test]
    fn test_classify_auth() {
        let err = classify_failure(StatusCode::UNAUTHORIZED, "bad token", TARGET);
        assert!(matches!(err, WavefrontError::Auth { status: 401, .. }));
        let err = classify_failure(StatusCode::FORBIDDEN, "", TARGET);
        assert_eq!(err.category(), ErrorCategory::Auth);
    }

    #[test]
    fn test_classify_upstream_uses_status_message() {
        let body = r#"{"status":{"result":"ERROR","message":"rate limited","code":406}}"#;
        let err = classify_failure(StatusCode::NOT_ACCEPTABLE, body, TARGET);
        match err {
            WavefrontError::Upstream { status, message } => {
                assert_eq!(status, 406);
                assert_eq!(message, "rate limited");
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }
}
