//! HTTP transport port: the single "send request, get response" operation.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use serde::de::DeserializeOwned;

use crate::error::VcrError;

/// Boxed future type alias used by [`HttpTransport`] to keep the trait dyn-compatible.
pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<HttpResponse, VcrError>> + Send + 'a>>;

/// Multi-valued header map keyed by lower-case header name.
pub type Headers = BTreeMap<String, Vec<String>>;

/// An outbound HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Upper-case method, e.g. `"GET"`.
    pub method: String,
    /// Absolute URL.
    pub url: String,
    /// Request headers. Names are lower-case.
    pub headers: Headers,
    /// Raw request body; empty when the request has none.
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Creates a request with no headers and no body.
    pub fn new(method: impl AsRef<str>, url: impl Into<String>) -> Self {
        Self {
            method: method.as_ref().to_ascii_uppercase(),
            url: url.into(),
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    /// Appends a header value. The name is stored lower-case.
    #[must_use]
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.entry(name.as_ref().to_ascii_lowercase()).or_default().push(value.into());
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the first value of the named header.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        first_value(&self.headers, name)
    }

    /// Returns the `content-type` header, if any.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

/// A response returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Response headers. Names are lower-case.
    pub headers: Headers,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response with no headers.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self { status, headers: Headers::new(), body: body.into() }
    }

    /// Appends a header value. The name is stored lower-case.
    #[must_use]
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.entry(name.as_ref().to_ascii_lowercase()).or_default().push(value.into());
        self
    }

    /// Returns the first value of the named header.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        first_value(&self.headers, name)
    }

    /// Returns `true` for 2xx status codes.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the body decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

fn first_value<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    headers.get(&name.to_ascii_lowercase()).and_then(|v| v.first()).map(String::as_str)
}

/// Sends HTTP requests.
pub trait HttpTransport: Send + Sync {
    /// Sends the request and resolves to the response.
    ///
    /// # Errors
    ///
    /// Returns an error if no response could be obtained.
    fn send(&self, request: HttpRequest) -> TransportFuture<'_>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_names_are_lower_cased() {
        let req = HttpRequest::new("get", "https://example.com")
            .with_header("Content-Type", "application/json")
            .with_header("X-Amz-Target", "A")
            .with_header("x-amz-target", "B");
        assert_eq!(req.method, "GET");
        assert_eq!(req.content_type(), Some("application/json"));
        assert_eq!(req.headers["x-amz-target"], vec!["A".to_string(), "B".to_string()]);
        assert_eq!(req.header("X-AMZ-TARGET"), Some("A"));
    }

    #[test]
    fn response_helpers() {
        let resp = HttpResponse::new(200, r#"{"ok":true}"#).with_header("Content-Type", "json");
        assert!(resp.is_success());
        assert_eq!(resp.header("content-type"), Some("json"));
        let value: serde_json::Value = resp.json().unwrap();
        assert_eq!(value["ok"], true);
        assert!(!HttpResponse::new(404, "").is_success());
    }
}
