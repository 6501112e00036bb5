//! Minimal Graph API client shared by the Facebook and Instagram publishers.

use std::time::Duration;

use autopost_core::config::GraphConfig;
use reqwest::Client;
use tracing::debug;

use crate::error::PublishError;

/// Form-posting client with a bounded per-request timeout.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct GraphClient {
    client: Client,
    base_url: String,
    timeout_secs: u64,
}

impl GraphClient {
    pub fn new(config: &GraphConfig) -> Result<Self, PublishError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|e| PublishError::Client(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_secs: config.request_timeout_secs,
        })
    }

    /// POST `form` to `{base}/{node}/{edge}` and return the `id` of the
    /// created object.
    ///
    /// Success requires a 2xx status *and* an `id` in the body; anything else
    /// is a [`PublishError`].
    pub async fn create(
        &self,
        node: &str,
        edge: &str,
        form: &[(&str, &str)],
    ) -> Result<String, PublishError> {
        let endpoint = format!("{node}/{edge}");
        let url = format!("{}/{}", self.base_url, endpoint);

        let resp = self
            .client
            .post(&url)
            .form(form)
            .send()
            .await
            .map_err(|e| self.transport_error(&endpoint, e))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| self.transport_error(&endpoint, e))?;
        debug!(%endpoint, status = status.as_u16(), "graph api response");

        if !status.is_success() {
            return Err(PublishError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        extract_id(&body).ok_or(PublishError::UnexpectedResponse { endpoint, body })
    }

    fn transport_error(&self, endpoint: &str, e: reqwest::Error) -> PublishError {
        let endpoint = endpoint.to_string();
        if e.is_timeout() {
            PublishError::Timeout {
                endpoint,
                secs: self.timeout_secs,
            }
        } else if e.is_connect() {
            PublishError::Connection {
                endpoint,
                reason: e.to_string(),
            }
        } else {
            PublishError::Transport {
                endpoint,
                reason: e.to_string(),
            }
        }
    }
}

/// Pull a non-empty `id` out of a JSON object. Numeric ids are accepted.
fn extract_id(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("id")? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_read_from_string_or_number() {
        assert_eq!(extract_id(r#"{"id":"123"}"#).as_deref(), Some("123"));
        assert_eq!(extract_id(r#"{"id":456,"post_id":"x"}"#).as_deref(), Some("456"));
    }

    #[test]
    fn missing_or_empty_id_is_none() {
        assert!(extract_id(r#"{"success":true}"#).is_none());
        assert!(extract_id(r#"{"id":""}"#).is_none());
        assert!(extract_id("not json").is_none());
        assert!(extract_id(r#"["id"]"#).is_none());
    }
}
