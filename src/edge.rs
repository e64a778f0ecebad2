//! Content-hash injection for CloudFront origin requests.
//!
//! CloudFront signs origin requests to a Lambda Function URL with SigV4,
//! which requires the payload hash in `x-amz-content-sha256` for requests
//! that carry a body.  The Lambda@Edge origin-request handler computes that
//! hash from the body CloudFront hands it and attaches the header; the body
//! itself is forwarded unchanged.
//!
//! Only the fields this module reads are modelled; everything else in the
//! event is carried through verbatim.

use std::collections::BTreeMap;

use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use tracing::debug;

/// Header CloudFront's signer reads the payload hash from.
pub const CONTENT_SHA256_HEADER: &str = "x-amz-content-sha256";

/// Lambda@Edge event envelope: `{"Records": [{"cf": {...}}]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudFrontRequestEvent {
    #[serde(rename = "Records")]
    pub records: Vec<CloudFrontRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudFrontRecord {
    pub cf: CloudFrontEvent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudFrontEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    pub request: CloudFrontRequest,
}

/// The origin request as seen by Lambda@Edge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudFrontRequest {
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub uri: String,
    /// Lowercased header name -> list of `{key, value}` entries.
    #[serde(default)]
    pub headers: BTreeMap<String, Vec<CloudFrontHeader>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<CloudFrontBody>,
    /// `clientIp`, `querystring`, `origin` and anything else CloudFront sends.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudFrontHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudFrontBody {
    #[serde(default)]
    pub input_truncated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default)]
    pub encoding: BodyEncoding,
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyEncoding {
    #[default]
    Base64,
    Text,
}

impl CloudFrontBody {
    /// Decode `data` into the raw body bytes.
    pub fn decode(&self) -> anyhow::Result<Vec<u8>> {
        match self.encoding {
            BodyEncoding::Base64 => base64::engine::general_purpose::STANDARD
                .decode(self.data.as_bytes())
                .map_err(|e| anyhow::anyhow!("request body is not valid base64: {e}")),
            BodyEncoding::Text => Ok(self.data.as_bytes().to_vec()),
        }
    }
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Attach `x-amz-content-sha256` to `request` if it carries a body.
///
/// A request without a body (or with empty body data) is left untouched.
/// An undecodable or truncated body is an error; the invocation fails and
/// CloudFront does not forward the request.
pub fn attach_content_hash(request: &mut CloudFrontRequest) -> anyhow::Result<()> {
    let Some(body) = request.body.as_ref().filter(|b| !b.data.is_empty()) else {
        return Ok(());
    };

    if body.input_truncated {
        anyhow::bail!(
            "request body for {} {} was truncated by CloudFront; cannot hash it",
            request.method,
            request.uri
        );
    }

    let digest = sha256_hex(&body.decode()?);
    debug!(method = %request.method, uri = %request.uri, %digest, "attached content hash");

    request.headers.insert(
        CONTENT_SHA256_HEADER.to_string(),
        vec![CloudFrontHeader {
            key: Some(CONTENT_SHA256_HEADER.to_string()),
            value: digest,
        }],
    );
    Ok(())
}

/// Origin-request handler: hash the first record's request and return it.
pub fn handle_origin_request(event: CloudFrontRequestEvent) -> anyhow::Result<CloudFrontRequest> {
    let record = event
        .records
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("CloudFront event contains no records"))?;

    let mut request = record.cf.request;
    attach_content_hash(&mut request)?;
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // SHA-256("hello world")
    const HELLO_WORLD_SHA256: &str =
        "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    fn event(body: Option<Value>) -> CloudFrontRequestEvent {
        let mut request = json!({
            "clientIp": "203.0.113.178",
            "method": "POST",
            "uri": "/todos",
            "querystring": "",
            "headers": {
                "host": [{"key": "Host", "value": "abc.lambda-url.ap-northeast-1.on.aws"}]
            }
        });
        if let Some(body) = body {
            request["body"] = body;
        }
        serde_json::from_value(json!({
            "Records": [{"cf": {"config": {"eventType": "origin-request"}, "request": request}}]
        }))
        .unwrap()
    }

    fn base64_body(raw: &str) -> Value {
        json!({
            "inputTruncated": false,
            "action": "read-only",
            "encoding": "base64",
            "data": base64::engine::general_purpose::STANDARD.encode(raw)
        })
    }

    #[test]
    fn test_sha256_hex_known_vector() {
        assert_eq!(sha256_hex(b"hello world"), HELLO_WORLD_SHA256);
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_attaches_hash_for_base64_body() {
        let request = handle_origin_request(event(Some(base64_body("hello world")))).unwrap();
        let header = &request.headers[CONTENT_SHA256_HEADER];
        assert_eq!(header.len(), 1);
        assert_eq!(header[0].key.as_deref(), Some(CONTENT_SHA256_HEADER));
        assert_eq!(header[0].value, HELLO_WORLD_SHA256);
    }

    #[test]
    fn test_body_is_not_altered() {
        let body = base64_body(r#"{"title":"x"}"#);
        let request = handle_origin_request(event(Some(body.clone()))).unwrap();
        let round_tripped = serde_json::to_value(request.body.unwrap()).unwrap();
        assert_eq!(round_tripped, body);
    }

    #[test]
    fn test_text_encoding() {
        let body = json!({"encoding": "text", "data": "hello world"});
        let request = handle_origin_request(event(Some(body))).unwrap();
        assert_eq!(
            request.headers[CONTENT_SHA256_HEADER][0].value,
            HELLO_WORLD_SHA256
        );
    }

    #[test]
    fn test_absent_body_leaves_headers_unchanged() {
        let original = event(None);
        let before = original.records[0].cf.request.headers.clone();
        let request = handle_origin_request(original).unwrap();
        assert_eq!(request.headers, before);
        assert!(!request.headers.contains_key(CONTENT_SHA256_HEADER));
    }

    #[test]
    fn test_empty_body_data_leaves_headers_unchanged() {
        let body = json!({"inputTruncated": false, "action": "read-only", "encoding": "base64", "data": ""});
        let request = handle_origin_request(event(Some(body))).unwrap();
        assert!(!request.headers.contains_key(CONTENT_SHA256_HEADER));
    }

    #[test]
    fn test_replaces_existing_header() {
        let mut ev = event(Some(base64_body("hello world")));
        ev.records[0].cf.request.headers.insert(
            CONTENT_SHA256_HEADER.to_string(),
            vec![CloudFrontHeader {
                key: Some(CONTENT_SHA256_HEADER.to_string()),
                value: "stale".to_string(),
            }],
        );
        let request = handle_origin_request(ev).unwrap();
        assert_eq!(request.headers[CONTENT_SHA256_HEADER].len(), 1);
        assert_eq!(
            request.headers[CONTENT_SHA256_HEADER][0].value,
            HELLO_WORLD_SHA256
        );
    }

    #[test]
    fn test_deterministic() {
        let a = handle_origin_request(event(Some(base64_body("same bytes")))).unwrap();
        let b = handle_origin_request(event(Some(base64_body("same bytes")))).unwrap();
        assert_eq!(
            a.headers[CONTENT_SHA256_HEADER],
            b.headers[CONTENT_SHA256_HEADER]
        );
    }

    #[test]
    fn test_invalid_base64_fails() {
        let body = json!({"encoding": "base64", "data": "!!!not base64!!!"});
        assert!(handle_origin_request(event(Some(body))).is_err());
    }

    #[test]
    fn test_truncated_body_fails() {
        let mut body = base64_body("partial");
        body["inputTruncated"] = json!(true);
        assert!(handle_origin_request(event(Some(body))).is_err());
    }

    #[test]
    fn test_no_records_fails() {
        let ev = CloudFrontRequestEvent { records: vec![] };
        assert!(handle_origin_request(ev).is_err());
    }

    #[test]
    fn test_unknown_fields_pass_through() {
        let request = handle_origin_request(event(None)).unwrap();
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["clientIp"], "203.0.113.178");
        assert_eq!(json["querystring"], "");
        assert!(json.get("body").is_none());
    }
}
