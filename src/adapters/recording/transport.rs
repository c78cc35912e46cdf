//! Recording adapter for the `HttpTransport` port.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::cassette::recorder::CassetteRecorder;
use crate::ports::transport::{HttpRequest, HttpTransport, TransportFuture};

/// Records every completed exchange while delegating to an inner transport.
pub struct RecordingTransport {
    inner: Arc<dyn HttpTransport>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingTransport {
    /// Creates a recording transport wrapping the given implementation.
    pub fn new(inner: Arc<dyn HttpTransport>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl HttpTransport for RecordingTransport {
    fn send(&self, request: HttpRequest) -> TransportFuture<'_> {
        Box::pin(async move {
            // Failed exchanges have no response to replay, so only successes are kept.
            let response = self.inner.send(request.clone()).await?;
            self.recorder.lock().record(&request, &response);
            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VcrError;
    use crate::ports::transport::HttpResponse;

    struct Echo;

    impl HttpTransport for Echo {
        fn send(&self, request: HttpRequest) -> TransportFuture<'_> {
            Box::pin(async move {
                if request.url.ends_with("/fail") {
                    return Err(VcrError::InvalidRequest("boom".into()));
                }
                Ok(HttpResponse::new(201, request.url).with_header("X-Echo", "1"))
            })
        }
    }

    #[tokio::test]
    async fn records_and_returns_real_response() {
        let dir = tempfile::tempdir().unwrap();
        let recorder =
            Arc::new(Mutex::new(CassetteRecorder::new(dir.path().join("r.cassette"), "r")));
        let transport = RecordingTransport::new(Arc::new(Echo), Arc::clone(&recorder));

        let request = HttpRequest::new("GET", "https://api/item")
            .with_header("Authorization", "Bearer secret");
        let response = transport.send(request).await.unwrap();
        assert_eq!(response.status, 201);
        assert_eq!(response.text(), "https://api/item");

        let err = transport.send(HttpRequest::new("GET", "https://api/fail")).await;
        assert!(err.is_err());

        let guard = recorder.lock();
        assert_eq!(guard.interactions().len(), 1);
        let recorded = &guard.interactions()[0];
        assert_eq!(recorded.response.status, 201);
        assert!(recorded.request.headers.get("authorization").is_none());
    }
}
