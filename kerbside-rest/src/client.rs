use std::time::Duration;

use kerbside_core::{Bin, NewBin, Priority};
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::RestError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Connection settings for [`BinsClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    /// Sent as `Authorization: Bearer <token>` when present.
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Client for the bins REST API.
#[derive(Debug, Clone)]
pub struct BinsClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl BinsClient {
    /// Creates a client for `base_url` without a token or timeout.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, RestError> {
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: parse_base_url(base_url.as_ref())?,
            token: None,
        })
    }

    /// Creates a client from a full configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self, RestError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: parse_base_url(&config.base_url)?,
            token: config.token.clone().filter(|t| !t.is_empty()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /api/bins`
    #[instrument(skip(self))]
    pub async fn list_bins(&self) -> Result<Vec<Bin>, RestError> {
        let url = self.endpoint(&["api", "bins"])?;
        let response = self.authorize(self.http.get(url)).send().await?;
        let bins: Vec<Bin> = read_json(response).await?;
        debug!(count = bins.len(), "listed bins");
        Ok(bins)
    }

    /// `POST /api/bins`, returning the bin with its server-assigned id.
    #[instrument(skip(self, new), fields(lat = new.lat, lng = new.lng))]
    pub async fn create_bin(&self, new: &NewBin) -> Result<Bin, RestError> {
        let url = self.endpoint(&["api", "bins"])?;
        let response = self.authorize(self.http.post(url)).json(new).send().await?;
        let bin: Bin = read_json(response).await?;
        debug!(id = %bin.id, "created bin");
        Ok(bin)
    }

    /// `DELETE /api/bins/{id}`
    #[instrument(skip(self))]
    pub async fn delete_bin(&self, id: &str) -> Result<(), RestError> {
        let url = self.endpoint(&["api", "bins", id])?;
        let response = self.authorize(self.http.delete(url)).send().await?;
        expect_success(response).await
    }

    /// `PUT /api/bins/{id}/priority?priority=..`
    #[instrument(skip(self))]
    pub async fn update_priority(&self, id: &str, priority: Priority) -> Result<(), RestError> {
        let url = self.priority_url(id, priority)?;
        let response = self.authorize(self.http.put(url)).send().await?;
        expect_success(response).await
    }

    fn priority_url(&self, id: &str, priority: Priority) -> Result<Url, RestError> {
        let mut url = self.endpoint(&["api", "bins", id, "priority"])?;
        url.query_pairs_mut().append_pair("priority", priority.as_str());
        Ok(url)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, RestError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RestError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

fn parse_base_url(raw: &str) -> Result<Url, RestError> {
    let url = Url::parse(raw.trim()).map_err(|e| RestError::InvalidBaseUrl(format!("{}: {}", raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(RestError::InvalidBaseUrl(raw.to_string()));
    }
    Ok(url)
}

async fn expect_success(response: Response) -> Result<(), RestError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(RestError::Api {
        status: status.as_u16(),
        message: extract_message(&body),
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, RestError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(RestError::Api {
            status: status.as_u16(),
            message: extract_message(&body),
        });
    }

    let value: Value = serde_json::from_str(&body)?;
    let payload = unwrap_envelope(status.as_u16(), value)?;
    Ok(serde_json::from_value(payload)?)
}

/// Accepts both bare payloads and `{"success": bool, "data": ..}` envelopes.
fn unwrap_envelope(status: u16, value: Value) -> Result<Value, RestError> {
    let Value::Object(mut map) = value else {
        return Ok(value);
    };

    if !map.contains_key("success") {
        return Ok(Value::Object(map));
    }

    if map.get("success").and_then(Value::as_bool) == Some(false) {
        let message = message_from_value(&Value::Object(map));
        return Err(RestError::Api { status, message });
    }

    Ok(map.remove("data").unwrap_or(Value::Null))
}

/// Best-effort error text from a response body.
///
/// Tried in order: a JSON string, a `message` field, an `error` field (string
/// or object with `message`), then the raw body if it is not JSON.
pub(crate) fn extract_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => message_from_value(&value),
        Err(_) => Some(trimmed.to_string()),
    }
}

fn message_from_value(value: &Value) -> Option<String> {
    let message = match value {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| map.get("error").and_then(Value::as_str))
            .or_else(|| {
                map.get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(Value::as_str)
            }),
        _ => None,
    };
    message
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from)
}
