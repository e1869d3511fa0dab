//! HTTP client for the upstream onboarding backend.
//!
//! The upstream speaks a single-endpoint, action-labeled JSON POST contract.
//! Its JSON replies are relayed verbatim; transport failures are normalized
//! to the gateway's own taxonomy without ever exposing the upstream URL.

use std::time::Duration;

use reqwest::Client;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use url::Url;

use crate::error::GatewayError;

/// A relayed upstream reply: HTTP status plus parsed JSON body.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    /// Upstream HTTP status.
    pub status: u16,
    /// Parsed JSON body, relayed to the caller as-is.
    pub body: Value,
}

impl UpstreamReply {
    /// True when the body is an envelope with `ok: true`.
    #[must_use]
    pub fn is_ok_envelope(&self) -> bool {
        self.body
            .get("ok")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// Pooled client for the upstream backend with a bounded timeout.
pub struct UpstreamClient {
    http: Client,
    url: Url,
}

impl UpstreamClient {
    /// Creates a client posting to `url` with the given per-call timeout.
    pub fn new(url: Url, timeout: Duration) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Internal(anyhow::anyhow!("HTTP client build: {e}")))?;
        Ok(Self { http, url })
    }

    /// Forwards `payload` with `action` stamped in and returns the reply.
    ///
    /// The `action` field always comes from the route table; a caller-supplied
    /// value in the payload is overwritten.
    pub async fn forward(&self, action: &str, payload: &Value) -> Result<UpstreamReply, GatewayError> {
        let body = inject_action(action, payload);
        debug!(action, "forwarding to upstream");

        let response = self.http.post(self.url.clone()).json(&body).send().await?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|_| GatewayError::UpstreamMalformed { status })?;
        let body: Value = serde_json::from_str(&text).map_err(|_| {
            warn!(action, status, "upstream returned a non-JSON body");
            GatewayError::UpstreamMalformed { status }
        })?;

        Ok(UpstreamReply { status, body })
    }
}

/// Merges `action` into the payload object, overriding any existing value.
/// Non-object payloads are replaced by a bare `{action}` object.
fn inject_action(action: &str, payload: &Value) -> Value {
    let mut map = match payload {
        Value::Object(fields) => fields.clone(),
        _ => Map::new(),
    };
    map.insert("action".to_string(), Value::String(action.to_string()));
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_inject_action_preserves_fields() {
        let merged = inject_action("listFiles", &json!({"token": "t", "query": "acme"}));
        assert_eq!(merged["action"], "listFiles");
        assert_eq!(merged["token"], "t");
        assert_eq!(merged["query"], "acme");
    }

    #[test]
    fn test_inject_action_overrides_spoofed_action() {
        let merged = inject_action("listFiles", &json!({"action": "deleteFile"}));
        assert_eq!(merged["action"], "listFiles");
    }

    #[test]
    fn test_inject_action_on_non_object() {
        let merged = inject_action("whoami", &json!(null));
        assert_eq!(merged, json!({"action": "whoami"}));
    }

    #[test]
    fn test_ok_envelope_detection() {
        let ok = UpstreamReply {
            status: 200,
            body: json!({"ok": true, "files": []}),
        };
        assert!(ok.is_ok_envelope());

        let not_ok = UpstreamReply {
            status: 200,
            body: json!({"ok": false, "error": "Invalid credentials"}),
        };
        assert!(!not_ok.is_ok_envelope());

        let missing = UpstreamReply {
            status: 200,
            body: json!({"files": []}),
        };
        assert!(!missing.is_ok_envelope());
    }
}
