//! Gateway-style event built from an HTTP trigger

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use std::collections::HashMap;

/// Request event in the proxy-integration shape handlers expect
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpEvent {
    pub resource: String,
    pub path: String,
    pub http_method: String,
    pub headers: HashMap<String, String>,
    pub multi_value_headers: Option<HashMap<String, Vec<String>>>,
    pub query_string_parameters: HashMap<String, String>,
    pub multi_value_query_string_parameters: Option<HashMap<String, Vec<String>>>,
    pub path_parameters: Option<HashMap<String, String>>,
    pub stage_variables: HashMap<String, String>,
    pub request_context: HttpRequestContext,
    pub body: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_base64_encoded: bool,
}

/// Request context; only the method is known to this runtime
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRequestContext {
    pub account_id: String,
    pub resource_id: String,
    pub stage: String,
    pub request_id: String,
    pub resource_path: String,
    pub authorizer: Option<serde_json::Map<String, serde_json::Value>>,
    pub http_method: String,
    pub api_id: String,
}

impl HttpEvent {
    pub fn from_request(parts: &http::request::Parts, body: &[u8]) -> Self {
        let body = String::from_utf8_lossy(body).into_owned();
        let method = parts.method.to_string();

        // Advisory only: plain text can happen to be valid base64
        let is_base64_encoded = STANDARD.decode(body.as_bytes()).is_ok();

        Self {
            resource: String::new(),
            path: decode_path(parts.uri.path()),
            http_method: method.clone(),
            headers: collapse_headers(&parts.headers),
            multi_value_headers: None,
            query_string_parameters: collapse_query(parts.uri.query()),
            multi_value_query_string_parameters: None,
            path_parameters: None,
            stage_variables: HashMap::new(),
            request_context: HttpRequestContext {
                http_method: method,
                ..Default::default()
            },
            body,
            is_base64_encoded,
        }
    }
}

/// Percent-decoded path; the raw path when it does not decode to UTF-8
fn decode_path(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}

/// Fold multi-valued headers to their last occurrence
///
/// `Host` and `Transfer-Encoding` describe the connection, not the request,
/// and are left out.
fn collapse_headers(headers: &http::HeaderMap) -> HashMap<String, String> {
    headers
        .keys()
        .filter(|name| **name != http::header::HOST && **name != http::header::TRANSFER_ENCODING)
        .filter_map(|name| {
            headers.get_all(name).iter().last().map(|value| {
                (
                    canonical_header_name(name.as_str()),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
        })
        .collect()
}

/// Fold repeated query parameters to their last occurrence
fn collapse_query(query: Option<&str>) -> HashMap<String, String> {
    let mut parameters = HashMap::new();
    if let Some(query) = query {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            parameters.insert(key.into_owned(), value.into_owned());
        }
    }
    parameters
}

/// `content-type` -> `Content-Type`
pub fn canonical_header_name(name: &str) -> String {
    let mut canonical = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            canonical.extend(c.to_uppercase());
        } else {
            canonical.extend(c.to_lowercase());
        }
        upper = c == '-';
    }
    canonical
}
