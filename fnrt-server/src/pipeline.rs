//! Per-request invocation pipeline

use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use fnrt_config::RuntimeConfig;
use fnrt_core::{EventFormatter, FormatError, InvocationResponse, TriggerError, TriggerType};
use fnrt_execution::{FunctionInvoker, InvokeError};
use fnrt_web::{cors_layer, AuthGate, WebError};
use futures_util::StreamExt;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Header naming the protocol that triggered the invocation
pub const TRIGGER_TYPE_HEADER: &str = "SCW_TRIGGER_TYPE";

/// Acknowledgement for triggers nobody waits an answer from
const EXECUTED_PROPERLY: &str = "executed properly";

/// Components shared by every request, read-only
pub struct AppState {
    pub auth: AuthGate,
    pub formatter: EventFormatter,
    pub invoker: FunctionInvoker,
    pub max_payload_bytes: usize,
}

impl AppState {
    pub fn from_config(config: &RuntimeConfig) -> Result<Self, InvokeError> {
        Ok(Self {
            auth: AuthGate::from_config(&config.auth),
            formatter: EventFormatter::new(&config.function),
            invoker: FunctionInvoker::new(&config.upstream, &config.handler)?,
            max_payload_bytes: config.server.max_payload_bytes,
        })
    }
}

/// Router answering every method and path with the invocation pipeline
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .fallback(handle_invocation)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
}

/// Authenticate, normalise, invoke, translate
pub async fn handle_invocation(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Response, WebError> {
    let (parts, body) = request.into_parts();
    info!(method = %parts.method, path = %parts.uri.path(), "Function triggered");

    state.auth.authenticate(&parts.headers)?;

    let trigger = resolve_trigger(&parts.headers)?;

    let body = read_body(body, state.max_payload_bytes).await?;
    let event = state.formatter.format_event(&parts, &body, trigger);
    let request = state
        .invoker
        .request(event, state.formatter.execution_context());

    let output = state.invoker.execute(&request).await.map_err(|e| {
        error!("Invocation failed: {}", e);
        WebError::internal(e.to_string())
    })?;

    if !trigger.expects_response() {
        return Ok((StatusCode::OK, EXECUTED_PROPERLY).into_response());
    }

    build_response(InvocationResponse::parse(&output))
}

/// Trigger named by the request; a value that is not visible ASCII is
/// unsupported rather than absent
fn resolve_trigger(headers: &HeaderMap) -> Result<TriggerType, TriggerError> {
    match headers.get(TRIGGER_TYPE_HEADER) {
        None => EventFormatter::resolve_trigger_type(""),
        Some(value) => match value.to_str() {
            Ok(value) => EventFormatter::resolve_trigger_type(value),
            Err(_) => Err(TriggerError::Unsupported(
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )),
        },
    }
}

/// Buffer the request body, refusing anything above `limit` bytes
async fn read_body(body: Body, limit: usize) -> Result<Vec<u8>, FormatError> {
    let mut stream = body.into_data_stream();
    let mut buffer = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| FormatError::BodyRead(e.to_string()))?;
        if buffer.len() + chunk.len() > limit {
            return Err(FormatError::PayloadTooLarge(limit));
        }
        buffer.extend_from_slice(&chunk);
    }

    Ok(buffer)
}

/// Turn the translated handler answer into the wire response
fn build_response(handler_response: InvocationResponse) -> Result<Response, WebError> {
    let body = handler_response.render_body()?;
    let status = StatusCode::from_u16(handler_response.status_code).map_err(|_| {
        WebError::internal(format!(
            "invalid status code returned by handler: {}",
            handler_response.status_code
        ))
    })?;

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;

    for (name, value) in &handler_response.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                response.headers_mut().insert(name, value);
            }
            _ => warn!("Skipping invalid header returned by handler: {}", name),
        }
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    async fn body_bytes(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    #[test]
    fn test_resolve_trigger_from_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(resolve_trigger(&headers), Ok(TriggerType::Http));

        headers.insert(TRIGGER_TYPE_HEADER, HeaderValue::from_static("mqtt"));
        assert_eq!(resolve_trigger(&headers), Ok(TriggerType::Mqtt));
    }

    #[test]
    fn test_non_ascii_trigger_is_unsupported() {
        let mut headers = HeaderMap::new();
        headers.insert(
            TRIGGER_TYPE_HEADER,
            HeaderValue::from_bytes("mqtt\u{e9}".as_bytes()).unwrap(),
        );

        assert!(matches!(
            resolve_trigger(&headers),
            Err(TriggerError::Unsupported(value)) if !value.is_empty()
        ));
    }

    #[tokio::test]
    async fn test_read_body_within_limit() {
        let body = read_body(Body::from("12345"), 5).await.unwrap();
        assert_eq!(body, b"12345");
    }

    #[tokio::test]
    async fn test_read_body_over_limit() {
        let result = read_body(Body::from("123456"), 5).await;
        assert_eq!(result, Err(FormatError::PayloadTooLarge(5)));
    }

    #[tokio::test]
    async fn test_build_response_sets_status_headers_and_body() {
        let parsed = InvocationResponse::parse(
            br#"{"statusCode": 201, "headers": {"Content-Type": "application/json"}, "body": {"id": 1}}"#,
        );
        let response = build_response(parsed).unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(body_bytes(response).await, br#"{"id": 1}"#);
    }

    #[tokio::test]
    async fn test_build_response_skips_invalid_headers() {
        let parsed = InvocationResponse::parse(
            br#"{"headers": {"bad header": "x", "X-Good": "y"}, "body": "ok"}"#,
        );
        let response = build_response(parsed).unwrap();

        assert_eq!(response.headers().get("x-good").unwrap(), "y");
        assert_eq!(response.headers().len(), 1);
    }

    #[test]
    fn test_build_response_rejects_invalid_status() {
        let parsed = InvocationResponse::parse(br#"{"statusCode": 1000, "body": "x"}"#);
        let error = build_response(parsed).unwrap_err();
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_build_response_rejects_bad_base64() {
        let parsed = InvocationResponse::parse(br#"{"body": "%%%", "isBase64Encoded": true}"#);
        let error = build_response(parsed).unwrap_err();
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
