//! Response descriptor

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, FetchResult};
use crate::transport::TransportResponse;

/// Inbound response descriptor delivered to the caller
///
/// A non-2xx status still resolves the request; only transport failure or an
/// abort produces an error. Callers branch on [`FetchResponse::is_success`].
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// HTTP status code
    pub status: u16,
    /// Canonical reason phrase for the status
    pub status_text: String,
    /// Final URL of the response
    pub url: String,
    /// True iff `200 <= status < 300`
    pub is_success: bool,
    /// Opaque payload; JSON when the body parses as such
    pub data: Value,
}

impl FetchResponse {
    pub(crate) fn from_transport(raw: TransportResponse) -> Self {
        Self {
            is_success: (200..300).contains(&raw.status),
            status: raw.status,
            status_text: raw.status_text,
            url: raw.url,
            data: raw.data,
        }
    }

    /// Deserialize the payload into a typed value
    pub fn json<T: DeserializeOwned>(&self) -> FetchResult<T> {
        serde_json::from_value(self.data.clone()).map_err(Error::from)
    }
}
