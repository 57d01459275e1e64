//! Transport seam over the underlying HTTP backend
//!
//! The coordinator consumes a [`Transport`]; it never performs network I/O
//! itself. [`ReqwestTransport`] is the default implementation.

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::FetchResult;
use crate::request::RequestParts;

/// Raw result handed back by a transport
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Reason phrase for the status
    pub status_text: String,
    /// Final URL of the response
    pub url: String,
    /// Decoded response payload
    pub data: Value,
}

/// Pluggable HTTP backend
///
/// The cancellation token mirrors the coordinator's abort signal. The
/// coordinator stops waiting on a cancelled send regardless, so honoring the
/// token is an optimization for backends that can abort underlying work
/// early, not a requirement.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform the request described by `parts`
    async fn send(
        &self,
        parts: RequestParts,
        cancel: CancellationToken,
    ) -> FetchResult<TransportResponse>;
}

/// Default transport backed by `reqwest`
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: Option<Url>,
}

impl ReqwestTransport {
    /// Transport with a default `reqwest` client
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport wrapping a pre-configured `reqwest` client
    pub fn from_reqwest(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: None,
        }
    }

    /// Resolve relative request URLs against `base`
    pub fn with_base_url(mut self, base: Url) -> Self {
        self.base_url = Some(base);
        self
    }

    fn resolve(&self, url: &str) -> FetchResult<String> {
        match &self.base_url {
            Some(base) => Ok(base.join(url)?.to_string()),
            None => Ok(url.to_string()),
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    // Cancellation happens by the coordinator dropping this future, which
    // aborts the reqwest request in turn.
    async fn send(
        &self,
        parts: RequestParts,
        _cancel: CancellationToken,
    ) -> FetchResult<TransportResponse> {
        let url = self.resolve(&parts.url)?;

        let mut builder = self.client.request(parts.method.into(), &url);
        for (name, value) in &parts.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &parts.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or_default().to_string();
        let final_url = response.url().to_string();
        let bytes = response.bytes().await?;

        Ok(TransportResponse {
            status: status.as_u16(),
            status_text,
            url: final_url,
            data: decode_body(&bytes),
        })
    }
}

// Opaque payload: JSON when the body parses as such, raw text otherwise,
// null when empty.
fn decode_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_decode_body_empty_is_null() {
        assert_eq!(decode_body(b""), Value::Null);
    }

    #[test]
    fn test_decode_body_json() {
        assert_eq!(
            decode_body(br#"{"message": "hello"}"#),
            json!({"message": "hello"})
        );
    }

    #[test]
    fn test_decode_body_plain_text_falls_back_to_string() {
        assert_eq!(decode_body(b"Not Found"), json!("Not Found"));
    }

    #[test]
    fn test_resolve_without_base_passes_through() {
        let transport = ReqwestTransport::new();
        let url = transport
            .resolve("https://example.com/a")
            .expect("absolute URL should resolve");
        assert_eq!(url, "https://example.com/a");
    }

    #[test]
    fn test_resolve_joins_relative_path_against_base() {
        let base = Url::parse("http://127.0.0.1:8080").expect("valid base URL");
        let transport = ReqwestTransport::new().with_base_url(base);
        let url = transport
            .resolve("/api/data")
            .expect("relative URL should resolve");
        assert_eq!(url, "http://127.0.0.1:8080/api/data");
    }
}
