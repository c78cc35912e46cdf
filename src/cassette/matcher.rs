//! Decides whether a live request corresponds to a recorded one.
//!
//! Matching is staged: method and URL first, then the body. Bodies that are
//! not byte-identical get a second chance through a format-aware comparison
//! picked from the request's content type, because client libraries do not
//! agree on key order or whitespace.

use std::collections::BTreeMap;

use reqwest::Url;

use super::format::RecordedRequest;
use crate::ports::transport::HttpRequest;

/// How two non-identical bodies are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyComparison {
    /// Bytes must be identical.
    Exact,
    /// Both bodies parse to equal JSON values.
    Json,
    /// Both bodies parse to equal XML element trees.
    Xml,
}

struct BodyRule {
    applies: fn(&str) -> bool,
    comparison: BodyComparison,
}

/// Checked in order; the first rule whose predicate accepts the media type wins.
const BODY_RULES: &[BodyRule] = &[
    BodyRule { applies: is_json, comparison: BodyComparison::Json },
    BodyRule { applies: is_xml, comparison: BodyComparison::Xml },
];

fn is_json(media_type: &str) -> bool {
    media_type == "application/json"
        || media_type.starts_with("application/x-amz-json-")
        || media_type.ends_with("+json")
}

fn is_xml(media_type: &str) -> bool {
    media_type == "application/xml" || media_type == "text/xml" || media_type.ends_with("+xml")
}

/// Picks the body comparison for a `content-type` header value.
#[must_use]
pub fn comparison_for(content_type: Option<&str>) -> BodyComparison {
    let Some(content_type) = content_type else {
        return BodyComparison::Exact;
    };
    let media_type = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    BODY_RULES
        .iter()
        .find(|rule| (rule.applies)(&media_type))
        .map_or(BodyComparison::Exact, |rule| rule.comparison)
}

/// Returns `true` if `candidate` was recorded for a request equivalent to `live`.
#[must_use]
pub fn matches(live: &HttpRequest, candidate: &RecordedRequest) -> bool {
    if live.method != candidate.method || !same_url(&live.url, &candidate.url) {
        return false;
    }
    if live.body.is_empty() {
        return true;
    }
    if live.body == candidate.body {
        return true;
    }

    let comparison = comparison_for(live.content_type());
    let equal = match comparison {
        BodyComparison::Exact => false,
        BodyComparison::Json => json_equal(&live.body, &candidate.body),
        BodyComparison::Xml => xml_equal(&live.body, &candidate.body),
    };
    tracing::debug!(
        method = %live.method,
        url = %live.url,
        ?comparison,
        equal,
        "compared request bodies"
    );
    equal
}

fn same_url(live: &str, recorded: &str) -> bool {
    match (Url::parse(live), Url::parse(recorded)) {
        (Ok(a), Ok(b)) => a == b,
        _ => live == recorded,
    }
}

fn json_equal(a: &[u8], b: &[u8]) -> bool {
    match (
        serde_json::from_slice::<serde_json::Value>(a),
        serde_json::from_slice::<serde_json::Value>(b),
    ) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Owned, order-insensitive-attribute view of an XML element.
#[derive(Debug, PartialEq, Eq)]
struct XmlElement {
    namespace: Option<String>,
    name: String,
    attributes: BTreeMap<String, String>,
    text: String,
    children: Vec<XmlElement>,
}

impl XmlElement {
    fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        let tag = node.tag_name();
        let attributes = node
            .attributes()
            .map(|attr| {
                let key = match attr.namespace() {
                    Some(ns) => format!("{{{ns}}}{}", attr.name()),
                    None => attr.name().to_string(),
                };
                (key, attr.value().to_string())
            })
            .collect();

        let mut text = String::new();
        let mut children = Vec::new();
        for child in node.children() {
            if child.is_element() {
                children.push(Self::from_node(child));
            } else if child.is_text() {
                text.push_str(child.text().unwrap_or_default().trim());
            }
        }

        Self {
            namespace: tag.namespace().map(str::to_string),
            name: tag.name().to_string(),
            attributes,
            text,
            children,
        }
    }
}

fn parse_xml(body: &[u8]) -> Option<XmlElement> {
    let text = std::str::from_utf8(body).ok()?;
    let doc = roxmltree::Document::parse(text).ok()?;
    Some(XmlElement::from_node(doc.root_element()))
}

fn xml_equal(a: &[u8], b: &[u8]) -> bool {
    match (parse_xml(a), parse_xml(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
