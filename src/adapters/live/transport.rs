//! Live adapter for the `HttpTransport` port using `reqwest`.

use std::sync::Arc;

use reqwest::{Client, Method};

use crate::error::{Result, VcrError};
use crate::ports::session::SessionProvider;
use crate::ports::transport::{Headers, HttpRequest, HttpResponse, HttpTransport, TransportFuture};

/// Sends requests over the network.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with a default `reqwest` client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport sharing an existing `reqwest` client.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(&self, request: HttpRequest) -> TransportFuture<'_> {
        Box::pin(async move {
            let method = Method::from_bytes(request.method.as_bytes()).map_err(|e| {
                VcrError::InvalidRequest(format!("invalid method {:?}: {e}", request.method))
            })?;

            let mut builder = self.client.request(method, request.url.as_str());
            for (name, values) in &request.headers {
                for value in values {
                    builder = builder.header(name.as_str(), value.as_str());
                }
            }
            if !request.body.is_empty() {
                builder = builder.body(request.body);
            }

            let response = builder.send().await?;
            let status = response.status().as_u16();
            let mut headers = Headers::new();
            for (name, value) in response.headers() {
                headers
                    .entry(name.as_str().to_string())
                    .or_default()
                    .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
            }
            let body = response.bytes().await?.to_vec();

            tracing::debug!(status, body_len = body.len(), "live response received");
            Ok(HttpResponse { status, headers, body })
        })
    }
}

/// Session provider handing every test a live transport on a shared client.
#[derive(Debug, Clone, Default)]
pub struct LiveSession {
    client: Client,
}

impl LiveSession {
    /// Creates a session with a default `reqwest` client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session sharing an existing `reqwest` client.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl SessionProvider for LiveSession {
    fn base_transport(&self) -> Result<Arc<dyn HttpTransport>> {
        Ok(Arc::new(ReqwestTransport::with_client(self.client.clone())))
    }
}
