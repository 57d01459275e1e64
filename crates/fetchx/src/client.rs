//! Request coordinator

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::{AbortReason, Error, FetchResult};
use crate::interceptor::Interceptors;
use crate::request::{Method, RequestConfig, RequestKey, RequestParts};
use crate::response::FetchResponse;
use crate::transport::{ReqwestTransport, Transport};

/// Coordinates outbound HTTP requests
///
/// Each call is tracked under its [`RequestKey`] so it can be aborted by
/// timeout, by an explicit [`FetchClient::abort_request`], or by a newer
/// request superseding it when duplicate suppression is enabled (the
/// default). Request and response payloads pass through the registered
/// interceptor chains before send and before delivery.
///
/// Cloning is cheap; clones share the registry and interceptor chains.
#[derive(Clone)]
pub struct FetchClient {
    inner: Arc<Inner>,
}

struct Inner {
    transport: Arc<dyn Transport>,
    timeout: Option<Duration>,
    allow_duplicates: bool,
    interceptors: Interceptors,
    registry: Mutex<HashMap<RequestKey, AbortHandle>>,
    next_id: AtomicU64,
}

/// Cancellation handle for one registered call
///
/// The id makes registry removal idempotent-safe: a settled call never
/// evicts a newer registration that reused its key.
#[derive(Clone)]
struct AbortHandle {
    id: u64,
    cancel: CancellationToken,
    reason: Arc<OnceLock<AbortReason>>,
}

impl AbortHandle {
    fn abort(&self, reason: AbortReason) {
        // First writer wins; the token stays cancelled either way.
        let _ = self.reason.set(reason);
        self.cancel.cancel();
    }
}

impl Default for FetchClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchClient {
    /// Client with default settings: no timeout, duplicate suppression on,
    /// reqwest transport
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a new client builder
    pub fn builder() -> FetchClientBuilder {
        FetchClientBuilder::default()
    }

    /// Interceptor chains of this client
    ///
    /// ```no_run
    /// # let client = fetchx::FetchClient::new();
    /// client.interceptors().response.use_fn(|response| response);
    /// ```
    pub fn interceptors(&self) -> &Interceptors {
        &self.inner.interceptors
    }

    /// Number of requests currently in flight
    pub fn in_flight(&self) -> usize {
        self.lock_registry().len()
    }

    /// GET request
    pub async fn get(&self, url: &str, config: RequestConfig) -> FetchResult<FetchResponse> {
        self.request(
            url,
            RequestConfig {
                method: Method::Get,
                ..config
            },
        )
        .await
    }

    /// POST request
    pub async fn post(&self, url: &str, config: RequestConfig) -> FetchResult<FetchResponse> {
        self.request(
            url,
            RequestConfig {
                method: Method::Post,
                ..config
            },
        )
        .await
    }

    /// PUT request
    pub async fn put(&self, url: &str, config: RequestConfig) -> FetchResult<FetchResponse> {
        self.request(
            url,
            RequestConfig {
                method: Method::Put,
                ..config
            },
        )
        .await
    }

    /// DELETE request
    pub async fn delete(&self, url: &str, config: RequestConfig) -> FetchResult<FetchResponse> {
        self.request(
            url,
            RequestConfig {
                method: Method::Delete,
                ..config
            },
        )
        .await
    }

    /// Issue a request; the general entry point behind the method wrappers
    ///
    /// Resolves with a [`FetchResponse`] for any HTTP status the transport
    /// reports; fails with [`Error::Aborted`] on cancellation or
    /// [`Error::Transport`] on network-level failure.
    pub async fn request(&self, url: &str, config: RequestConfig) -> FetchResult<FetchResponse> {
        let key = RequestKey::new(config.method, url);
        let handle = self.register(&key);

        let parts = self.inner.interceptors.request.apply(RequestParts {
            url: url.to_string(),
            method: config.method,
            headers: config.headers,
            body: config.body,
        });

        let result = self.run(&key, &handle, parts).await;
        self.deregister(&key, handle.id);
        result
    }

    /// Abort the in-flight request registered under `key`; no-op when absent
    pub fn abort_request(&self, key: &RequestKey, reason: AbortReason) {
        let removed = self.lock_registry().remove(key);
        if let Some(handle) = removed {
            tracing::debug!(key = %key, reason = %reason, "aborting request");
            handle.abort(reason);
        }
    }

    /// Abort every in-flight request with `reason`
    ///
    /// Operates on a snapshot of the registered keys, so cancellations
    /// triggered mid-iteration do not change the visited set.
    pub fn abort_all_requests(&self, reason: AbortReason) {
        let keys: Vec<RequestKey> = self.lock_registry().keys().cloned().collect();
        for key in keys {
            self.abort_request(&key, reason);
        }
    }

    async fn run(
        &self,
        key: &RequestKey,
        handle: &AbortHandle,
        parts: RequestParts,
    ) -> FetchResult<FetchResponse> {
        // Biased so a cancellation that races transport completion or the
        // timer deterministically wins. Settling through any arm drops the
        // other two, which both disarms the timer and aborts the transport's
        // pending work.
        tokio::select! {
            biased;
            _ = handle.cancel.cancelled() => {
                let reason = handle.reason.get().copied().unwrap_or(AbortReason::User);
                Err(Error::Aborted(reason))
            }
            _ = Self::deadline(self.inner.timeout) => {
                handle.abort(AbortReason::Timeout);
                tracing::debug!(key = %key, "request timed out");
                Err(Error::Aborted(AbortReason::Timeout))
            }
            result = self.inner.transport.send(parts, handle.cancel.clone()) => {
                if let Err(err) = &result {
                    tracing::debug!(key = %key, error = %err, "transport failure");
                }
                result.map(|raw| {
                    self.inner
                        .interceptors
                        .response
                        .apply(FetchResponse::from_transport(raw))
                })
            }
        }
    }

    async fn deadline(timeout: Option<Duration>) {
        match timeout {
            Some(duration) => tokio::time::sleep(duration).await,
            None => std::future::pending().await,
        }
    }

    /// Duplicate check and registration, atomic under one registry lock
    fn register(&self, key: &RequestKey) -> AbortHandle {
        let mut registry = self.lock_registry();

        if let Some(existing) = registry.remove(key) {
            if self.inner.allow_duplicates {
                // Keys collide per method + url, so the newer registration
                // replaces the older entry; the older call keeps running but
                // is no longer addressable through the registry.
                tracing::debug!(key = %key, "replacing registry entry for concurrent duplicate");
            } else {
                tracing::debug!(key = %key, reason = %AbortReason::Duplicate, "superseding in-flight request");
                existing.abort(AbortReason::Duplicate);
            }
        }

        let handle = AbortHandle {
            id: self.inner.next_id.fetch_add(1, Ordering::Relaxed),
            cancel: CancellationToken::new(),
            reason: Arc::new(OnceLock::new()),
        };
        registry.insert(key.clone(), handle.clone());
        handle
    }

    /// Remove this call's entry, unless the key has been re-registered by a
    /// newer call in the meantime. Safe to reach twice for the same call.
    fn deregister(&self, key: &RequestKey, id: u64) {
        let mut registry = self.lock_registry();
        if registry.get(key).is_some_and(|handle| handle.id == id) {
            registry.remove(key);
        }
    }

    fn lock_registry(&self) -> MutexGuard<'_, HashMap<RequestKey, AbortHandle>> {
        self.inner.registry.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl fmt::Debug for FetchClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchClient")
            .field("timeout", &self.inner.timeout)
            .field("allow_duplicates", &self.inner.allow_duplicates)
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

/// Builder for [`FetchClient`]
#[derive(Default)]
pub struct FetchClientBuilder {
    timeout: Option<Duration>,
    allow_duplicates: bool,
    transport: Option<Arc<dyn Transport>>,
}

impl FetchClientBuilder {
    /// Abort any request that has not settled within `timeout`
    ///
    /// Without this, no automatic timeout-based cancellation is installed.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Let requests with an identical method + url run concurrently
    ///
    /// Defaults to `false`: issuing a request whose key matches an in-flight
    /// one aborts the in-flight request with [`AbortReason::Duplicate`]
    /// before starting the new one.
    pub fn allow_duplicates(mut self, allow: bool) -> Self {
        self.allow_duplicates = allow;
        self
    }

    /// Replace the default reqwest transport
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Build the client
    pub fn build(self) -> FetchClient {
        FetchClient {
            inner: Arc::new(Inner {
                transport: self
                    .transport
                    .unwrap_or_else(|| Arc::new(ReqwestTransport::new())),
                timeout: self.timeout,
                allow_duplicates: self.allow_duplicates,
                interceptors: Interceptors::new(),
                registry: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }
}

impl fmt::Debug for FetchClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchClientBuilder")
            .field("timeout", &self.timeout)
            .field("allow_duplicates", &self.allow_duplicates)
            .finish()
    }
}
