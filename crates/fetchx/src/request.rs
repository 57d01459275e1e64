//! Request descriptors and keys

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

/// HTTP methods supported by the convenience wrappers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    /// GET
    #[default]
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl Method {
    /// Upper-case token used in request keys and on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Per-call request options
///
/// The convenience wrappers (`get`, `post`, ...) overwrite `method`;
/// `request` uses it as-is.
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// HTTP method, defaults to GET
    pub method: Method,
    /// Header name/value pairs
    pub headers: HashMap<String, String>,
    /// Optional JSON body
    pub body: Option<Value>,
}

impl RequestConfig {
    /// Config with the given method and no headers or body
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Add a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the JSON body
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Identity of an in-flight request, the literal `"<METHOD>-<url>"` form
///
/// Keys collide across calls to the same method and url; with duplicate
/// suppression enabled this is what forces a newer request to supersede an
/// older one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey(String);

impl RequestKey {
    /// Derive the key for a method + url pair
    pub fn new(method: Method, url: &str) -> Self {
        Self(format!("{}-{}", method, url))
    }

    /// Key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outbound request descriptor handed to request interceptors and the
/// transport
#[derive(Debug, Clone)]
pub struct RequestParts {
    /// Request URL as supplied by the caller (resolved against any base URL
    /// at the transport)
    pub url: String,
    /// HTTP method
    pub method: Method,
    /// Header name/value pairs
    pub headers: HashMap<String, String>,
    /// Optional JSON body
    pub body: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_key_literal_form() {
        assert_eq!(RequestKey::new(Method::Get, "/a").as_str(), "GET-/a");
        assert_eq!(
            RequestKey::new(Method::Delete, "https://example.com/x").to_string(),
            "DELETE-https://example.com/x"
        );
    }

    #[test]
    fn test_same_method_and_url_collide() {
        assert_eq!(
            RequestKey::new(Method::Post, "/a"),
            RequestKey::new(Method::Post, "/a")
        );
        assert_ne!(
            RequestKey::new(Method::Post, "/a"),
            RequestKey::new(Method::Get, "/a")
        );
    }

    #[test]
    fn test_method_display() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Post.to_string(), "POST");
        assert_eq!(Method::Put.to_string(), "PUT");
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_config_builders() {
        let config = RequestConfig::new(Method::Post)
            .header("x-test", "1")
            .body(serde_json::json!({"k": "v"}));
        assert_eq!(config.method, Method::Post);
        assert_eq!(config.headers.get("x-test").map(String::as_str), Some("1"));
        assert!(config.body.is_some());
    }
}
