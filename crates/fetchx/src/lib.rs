//! Abortable, interceptable HTTP request coordinator
//!
//! This crate wraps an existing HTTP backend (reqwest by default) and adds the
//! bookkeeping a client application usually ends up hand-rolling: per-request
//! cancellation keyed by `METHOD-url`, suppression of duplicate in-flight
//! requests, timeout-triggered abort, and ordered request/response
//! interceptor chains.
//!
//! The coordinator does not implement HTTP, retries, caching, or connection
//! management; all of that stays with the backend behind the [`Transport`]
//! seam.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use fetchx::{FetchClient, RequestConfig};
//!
//! async fn example() -> fetchx::FetchResult<()> {
//!     let client = FetchClient::builder()
//!         .timeout(Duration::from_secs(5))
//!         .build();
//!
//!     client.interceptors().request.use_fn(|mut parts| {
//!         parts
//!             .headers
//!             .insert("authorization".into(), "Bearer token".into());
//!         parts
//!     });
//!
//!     let response = client
//!         .get("https://api.example.com/data", RequestConfig::default())
//!         .await?;
//!     assert!(response.is_success);
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod interceptor;
mod request;
mod response;
mod transport;

pub use client::{FetchClient, FetchClientBuilder};
pub use error::{AbortReason, Error, FetchResult};
pub use interceptor::{InterceptorChain, Interceptors};
pub use request::{Method, RequestConfig, RequestKey, RequestParts};
pub use response::FetchResponse;
pub use transport::{ReqwestTransport, Transport, TransportResponse};
