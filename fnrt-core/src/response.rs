//! Translation of raw handler output into a wire-ready response

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer};
use serde_json::value::RawValue;
use std::collections::HashMap;
use tracing::debug;

use crate::error::ResponseError;

/// Status used when the handler does not pick one
pub const DEFAULT_STATUS_CODE: u16 = 200;

/// Body of a handler response, classified once when parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    /// No body at all; nothing is written
    Empty,
    /// A JSON string literal, already unquoted
    Text(String),
    /// Literal bytes written unmodified: JSON text of a non-string value,
    /// or a handler payload that was not JSON
    Raw(Vec<u8>),
}

impl ResponseBody {
    fn from_raw_value(raw: &RawValue) -> Self {
        let text = raw.get();
        if text.starts_with('"') {
            if let Ok(unquoted) = serde_json::from_str::<String>(text) {
                return ResponseBody::Text(unquoted);
            }
        }
        ResponseBody::Raw(text.as_bytes().to_vec())
    }

    fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return ResponseBody::Empty;
        }
        if bytes[0] == b'"' {
            if let Ok(unquoted) = serde_json::from_slice::<String>(bytes) {
                return ResponseBody::Text(unquoted);
            }
        }
        ResponseBody::Raw(bytes.to_vec())
    }
}

/// Parsed handler output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResponse {
    pub status_code: u16,
    pub body: ResponseBody,
    pub headers: HashMap<String, String>,
    pub is_base64_encoded: bool,
}

/// Field names are matched in the casings handlers commonly emit
#[derive(Deserialize)]
struct WireResponse {
    #[serde(rename = "statusCode", alias = "StatusCode", alias = "statuscode", default)]
    status_code: Option<u16>,
    #[serde(alias = "Body", default, deserialize_with = "present_body")]
    body: Option<Box<RawValue>>,
    #[serde(alias = "Headers", default)]
    headers: Option<HashMap<String, String>>,
    #[serde(
        rename = "isBase64Encoded",
        alias = "IsBase64Encoded",
        alias = "isbase64encoded",
        default
    )]
    is_base64_encoded: bool,
}

/// Keep an explicit `null` body as the literal `null`
fn present_body<'de, D>(deserializer: D) -> Result<Option<Box<RawValue>>, D::Error>
where
    D: Deserializer<'de>,
{
    Box::<RawValue>::deserialize(deserializer).map(Some)
}

impl InvocationResponse {
    /// Parse whatever the handler answered
    ///
    /// Never fails: a payload that is not a response object becomes the body
    /// of a 200 response as-is.
    pub fn parse(raw: &[u8]) -> Self {
        match serde_json::from_slice::<WireResponse>(raw) {
            Ok(wire) => Self {
                status_code: match wire.status_code {
                    None | Some(0) => DEFAULT_STATUS_CODE,
                    Some(code) => code,
                },
                body: wire
                    .body
                    .as_deref()
                    .map(ResponseBody::from_raw_value)
                    .unwrap_or(ResponseBody::Empty),
                headers: wire.headers.unwrap_or_default(),
                is_base64_encoded: wire.is_base64_encoded,
            },
            Err(e) => {
                debug!("Handler output is not a response object ({}), passing it through", e);
                Self {
                    status_code: DEFAULT_STATUS_CODE,
                    body: ResponseBody::from_bytes(raw),
                    headers: HashMap::new(),
                    is_base64_encoded: false,
                }
            }
        }
    }

    /// Bytes to write as the response payload; empty means write nothing
    pub fn render_body(&self) -> Result<Vec<u8>, ResponseError> {
        if self.is_base64_encoded {
            return match &self.body {
                ResponseBody::Text(encoded) => STANDARD
                    .decode(encoded.as_bytes())
                    .map_err(|e| ResponseError::InvalidBase64Body(e.to_string())),
                _ => Err(ResponseError::Base64BodyNotString),
            };
        }

        Ok(match &self.body {
            ResponseBody::Empty => Vec::new(),
            ResponseBody::Text(text) => text.clone().into_bytes(),
            ResponseBody::Raw(bytes) => bytes.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(raw: &str) -> String {
        let response = InvocationResponse::parse(raw.as_bytes());
        String::from_utf8(response.render_body().unwrap()).unwrap()
    }

    #[test]
    fn test_string_body_is_unquoted() {
        let response = InvocationResponse::parse(br#"{"body": "hello"}"#);
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, ResponseBody::Text("hello".to_string()));
        assert_eq!(response.render_body().unwrap(), b"hello");
    }

    #[test]
    fn test_string_body_keeps_whitespace() {
        assert_eq!(
            rendered("\n\t\t\t{\n         \"body\":  \"this is a string   \"  \n      }\n"),
            "this is a string   "
        );
    }

    #[test]
    fn test_number_and_bool_bodies() {
        assert_eq!(rendered(r#"{"body": 5}"#), "5");
        assert_eq!(rendered(r#"{"body": true}"#), "true");
    }

    #[test]
    fn test_object_body_is_written_literally() {
        assert_eq!(
            rendered(r#"{"body":  {  "a": 2,  "4": "asdds" }}"#),
            r#"{  "a": 2,  "4": "asdds" }"#
        );
    }

    #[test]
    fn test_pre_serialised_json_string_is_not_double_encoded() {
        assert_eq!(
            rendered(r#"{"body": "{  \"a\": 2,  \"4\": \"asdds\" }"}"#),
            r#"{  "a": 2,  "4": "asdds" }"#
        );
    }

    #[test]
    fn test_null_body_is_literal() {
        assert_eq!(rendered(r#"{"body": null}"#), "null");
    }

    #[test]
    fn test_missing_body_writes_nothing() {
        let response = InvocationResponse::parse(br#"{"statusCode": 204}"#);
        assert_eq!(response.status_code, 204);
        assert_eq!(response.body, ResponseBody::Empty);
        assert!(response.render_body().unwrap().is_empty());
    }

    #[test]
    fn test_zero_status_defaults_to_ok() {
        let response = InvocationResponse::parse(br#"{"statusCode": 0, "body": "x"}"#);
        assert_eq!(response.status_code, 200);
    }

    #[test]
    fn test_status_and_headers_are_kept() {
        let response = InvocationResponse::parse(
            br#"{"statusCode": 201, "headers": {"Content-Type": "application/json"}, "body": {"id": 1}}"#,
        );
        assert_eq!(response.status_code, 201);
        assert_eq!(response.headers.get("Content-Type").unwrap(), "application/json");
        assert_eq!(response.render_body().unwrap(), br#"{"id": 1}"#);
    }

    #[test]
    fn test_non_json_payload_passes_through() {
        let response = InvocationResponse::parse(b"plain text answer");
        assert_eq!(response.status_code, 200);
        assert_eq!(response.render_body().unwrap(), b"plain text answer");
    }

    #[test]
    fn test_bare_json_string_payload_is_unquoted() {
        assert_eq!(rendered(r#""just a string""#), "just a string");
    }

    #[test]
    fn test_bare_array_payload_passes_through() {
        assert_eq!(rendered("[1, 2, 3]"), "[1, 2, 3]");
    }

    #[test]
    fn test_mistyped_field_falls_back_to_raw() {
        let raw = r#"{"statusCode": "201", "body": "x"}"#;
        let response = InvocationResponse::parse(raw.as_bytes());
        assert_eq!(response.status_code, 200);
        assert_eq!(response.render_body().unwrap(), raw.as_bytes());
    }

    #[test]
    fn test_capitalised_field_names_are_accepted() {
        let response = InvocationResponse::parse(
            br#"{"StatusCode": 202, "Headers": {"X-A": "b"}, "Body": "aGk=", "IsBase64Encoded": true}"#,
        );
        assert_eq!(response.status_code, 202);
        assert_eq!(response.headers.get("X-A").unwrap(), "b");
        assert_eq!(response.render_body().unwrap(), b"hi");

        assert_eq!(rendered(r#"{"Body": "hi"}"#), "hi");
    }

    #[test]
    fn test_base64_body_is_decoded() {
        let response = InvocationResponse::parse(br#"{"body": "aGVsbG8=", "isBase64Encoded": true}"#);
        assert_eq!(response.render_body().unwrap(), b"hello");
    }

    #[test]
    fn test_invalid_base64_body_is_an_error() {
        let response = InvocationResponse::parse(br#"{"body": "not base64!", "isBase64Encoded": true}"#);
        assert!(matches!(response.render_body(), Err(ResponseError::InvalidBase64Body(_))));

        let response = InvocationResponse::parse(br#"{"body": {"a": 1}, "isBase64Encoded": true}"#);
        assert_eq!(response.render_body(), Err(ResponseError::Base64BodyNotString));
    }
}
