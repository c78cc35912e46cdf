//! Cassette data structures for recording and replaying HTTP interactions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ports::transport::{Headers, HttpRequest, HttpResponse};

/// The request half of a recorded interaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordedRequest {
    /// HTTP method.
    pub method: String,
    /// Absolute URL.
    pub url: String,
    /// Request headers, minus redacted entries.
    #[serde(default)]
    pub headers: Headers,
    /// Raw request body.
    #[serde(default, with = "body")]
    pub body: Vec<u8>,
}

/// The response half of a recorded interaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordedResponse {
    /// Status code.
    pub status: u16,
    /// Response headers.
    #[serde(default)]
    pub headers: Headers,
    /// Raw response body.
    #[serde(default, with = "body")]
    pub body: Vec<u8>,
}

/// A single recorded request/response pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Interaction {
    /// Sequence number (assigned automatically by the recorder).
    pub seq: u64,
    /// What the test sent.
    pub request: RecordedRequest,
    /// What the server answered.
    pub response: RecordedResponse,
}

/// A cassette containing the ordered interactions of one test.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cassette {
    /// Normalized test name.
    pub name: String,
    /// When this cassette was recorded.
    pub recorded_at: DateTime<Utc>,
    /// Ordered list of interactions.
    pub interactions: Vec<Interaction>,
}

/// Bodies are stored as a plain string when they are UTF-8 and as a byte
/// sequence otherwise, so binary payloads survive the round trip unchanged.
mod body {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StoredBody {
        Text(String),
        Binary(Vec<u8>),
    }

    pub(super) fn serialize<S>(body: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match std::str::from_utf8(body) {
            Ok(text) => serializer.serialize_str(text),
            Err(_) => serializer.collect_seq(body),
        }
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match StoredBody::deserialize(deserializer)? {
            StoredBody::Text(text) => text.into_bytes(),
            StoredBody::Binary(bytes) => bytes,
        })
    }
}

impl From<&HttpRequest> for RecordedRequest {
    fn from(request: &HttpRequest) -> Self {
        Self {
            method: request.method.clone(),
            url: request.url.clone(),
            headers: request.headers.clone(),
            body: request.body.clone(),
        }
    }
}

impl From<&HttpResponse> for RecordedResponse {
    fn from(response: &HttpResponse) -> Self {
        Self {
            status: response.status,
            headers: response.headers.clone(),
            body: response.body.clone(),
        }
    }
}

impl RecordedResponse {
    /// Rebuilds the response a transport would have returned.
    #[must_use]
    pub fn to_response(&self) -> HttpResponse {
        HttpResponse { status: self.status, headers: self.headers.clone(), body: self.body.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_keeps_interaction_order_and_fields() {
        let request = HttpRequest::new("POST", "https://iam.amazonaws.com/")
            .with_header("Content-Type", "application/x-www-form-urlencoded")
            .with_body("Action=GetRole&RoleName=r1");
        let response = HttpResponse::new(200, "<GetRoleResponse/>").with_header("X-Id", "1");
        let cassette = Cassette {
            name: "TestAccRole_basic".into(),
            recorded_at: Utc::now(),
            interactions: vec![
                Interaction {
                    seq: 0,
                    request: RecordedRequest::from(&request),
                    response: RecordedResponse::from(&response),
                },
                Interaction {
                    seq: 1,
                    request: RecordedRequest::from(&HttpRequest::new("GET", "https://x/")),
                    response: RecordedResponse::from(&HttpResponse::new(404, "")),
                },
            ],
        };

        let yaml = serde_yaml::to_string(&cassette).expect("serialize");
        let decoded: Cassette = serde_yaml::from_str(&yaml).expect("deserialize");
        assert_eq!(decoded, cassette);
        assert_eq!(decoded.interactions[0].response.to_response(), response);
    }

    #[test]
    fn missing_optional_fields_default_to_empty() {
        let yaml = "seq: 3\nrequest:\n  method: GET\n  url: https://x/\nresponse:\n  status: 204\n";
        let interaction: Interaction = serde_yaml::from_str(yaml).expect("deserialize");
        assert!(interaction.request.headers.is_empty());
        assert!(interaction.request.body.is_empty());
        assert_eq!(interaction.response.to_response(), HttpResponse::new(204, ""));
    }

    #[test]
    fn binary_bodies_survive_yaml_unchanged() {
        let gzip = vec![0x1fu8, 0x8b, 0xff, 0x00, 0x80];
        let request = HttpRequest::new("PUT", "https://s3/obj").with_body(vec![0xffu8, 0xfe, 0x01]);
        let response = HttpResponse::new(200, gzip.clone());
        let interaction = Interaction {
            seq: 0,
            request: RecordedRequest::from(&request),
            response: RecordedResponse::from(&response),
        };

        let yaml = serde_yaml::to_string(&interaction).expect("serialize");
        let decoded: Interaction = serde_yaml::from_str(&yaml).expect("deserialize");
        assert_eq!(decoded.request.body, vec![0xff, 0xfe, 0x01]);
        assert_eq!(decoded.response.to_response().body, gzip);
    }

    #[test]
    fn text_bodies_are_stored_as_strings() {
        let response = RecordedResponse::from(&HttpResponse::new(200, "42"));
        let yaml = serde_yaml::to_string(&response).expect("serialize");
        assert!(!yaml.contains("- "), "{yaml}");
        let decoded: RecordedResponse = serde_yaml::from_str(&yaml).expect("deserialize");
        assert_eq!(decoded.body, b"42");
    }
}
