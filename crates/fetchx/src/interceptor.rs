//! Request and response interceptor chains

use std::fmt;
use std::sync::{Mutex, MutexGuard};

use crate::request::RequestParts;
use crate::response::FetchResponse;

type Interceptor<T> = Box<dyn Fn(T) -> T + Send + Sync>;

/// One ordered, append-only chain of transforms
///
/// Transforms run synchronously in registration order, each receiving the
/// previous transform's output. There is no removal API.
pub struct InterceptorChain<T> {
    chain: Mutex<Vec<Interceptor<T>>>,
}

impl<T> InterceptorChain<T> {
    pub(crate) fn new() -> Self {
        Self {
            chain: Mutex::new(Vec::new()),
        }
    }

    /// Append a transform to the chain
    pub fn use_fn<F>(&self, interceptor: F)
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        self.lock().push(Box::new(interceptor));
    }

    /// Number of registered transforms
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when no transforms are registered
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub(crate) fn apply(&self, mut value: T) -> T {
        for interceptor in self.lock().iter() {
            value = interceptor(value);
        }
        value
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Interceptor<T>>> {
        self.chain.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<T> fmt::Debug for InterceptorChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptorChain")
            .field("len", &self.len())
            .finish()
    }
}

/// The interceptor chains owned by one client
#[derive(Debug)]
pub struct Interceptors {
    /// Outbound chain, applied to [`RequestParts`] before send
    pub request: InterceptorChain<RequestParts>,
    /// Inbound chain, applied to [`FetchResponse`] before delivery
    pub response: InterceptorChain<FetchResponse>,
}

impl Interceptors {
    pub(crate) fn new() -> Self {
        Self {
            request: InterceptorChain::new(),
            response: InterceptorChain::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transforms_run_in_registration_order() {
        let chain: InterceptorChain<i32> = InterceptorChain::new();
        chain.use_fn(|x| x + 1);
        chain.use_fn(|x| x * 10);

        // f2(f1(x)), not f1(f2(x))
        assert_eq!(chain.apply(5), 60);
    }

    #[test]
    fn test_empty_chain_is_identity() {
        let chain: InterceptorChain<String> = InterceptorChain::new();
        assert!(chain.is_empty());
        assert_eq!(chain.apply("unchanged".to_string()), "unchanged");
    }

    #[test]
    fn test_len_tracks_registrations() {
        let chain: InterceptorChain<i32> = InterceptorChain::new();
        assert_eq!(chain.len(), 0);
        chain.use_fn(|x| x);
        chain.use_fn(|x| x);
        assert_eq!(chain.len(), 2);
        assert!(!chain.is_empty());
    }
}
