//! Delivery of invocations to the handler sub-process

use fnrt_config::{HandlerConfig, UpstreamConfig};
use fnrt_core::{ExecutionContext, InvocationRequest, TriggerEvent};
use fnrt_resilience::{RetryError, RetryExecutor, RetryPolicy, Retryable};
use reqwest::{header::CONTENT_TYPE, Client, Response};
use tracing::{debug, warn};

use crate::error::InvokeError;

/// A failed delivery attempt
#[derive(Debug)]
struct AttemptError(reqwest::Error);

impl std::fmt::Display for AttemptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Retryable for AttemptError {
    // No answer at all: the sub-runtime may still be cold-starting
    fn is_retryable(&self) -> bool {
        !self.0.is_builder()
    }
}

/// Client of the sub-runtime's local HTTP endpoint
pub struct FunctionInvoker {
    client: Client,
    upstream_url: String,
    retry: RetryExecutor,
    handler_name: String,
    handler_path: String,
}

impl FunctionInvoker {
    pub fn new(upstream: &UpstreamConfig, handler: &HandlerConfig) -> Result<Self, InvokeError> {
        let client = Client::builder().no_proxy().build()?;

        Ok(Self {
            client,
            upstream_url: upstream.upstream_url(),
            retry: RetryExecutor::new(RetryPolicy::fixed(
                upstream.retry_attempts,
                upstream.retry_interval,
            )),
            handler_name: handler.name.clone(),
            handler_path: handler.path.clone(),
        })
    }

    pub fn upstream_url(&self) -> &str {
        &self.upstream_url
    }

    /// Wrap an event in the envelope the sub-runtime expects
    pub fn request(&self, event: TriggerEvent, context: ExecutionContext) -> InvocationRequest {
        InvocationRequest {
            event,
            context,
            handler_name: self.handler_name.clone(),
            handler_path: self.handler_path.clone(),
        }
    }

    /// POST the invocation and return the handler's raw output
    ///
    /// Only transport failures are retried. Any answer ends the loop; a
    /// server error answer becomes [`InvokeError::HandlerExecutionError`].
    pub async fn execute(&self, request: &InvocationRequest) -> Result<Vec<u8>, InvokeError> {
        let body = serde_json::to_vec(request)?;

        let response = self
            .retry
            .execute_with_context(|attempt| {
                debug!("Delivering invocation to {} (attempt {})", self.upstream_url, attempt);
                let sent = self
                    .client
                    .post(&self.upstream_url)
                    .header(CONTENT_TYPE, "application/json")
                    .body(body.clone())
                    .send();
                async move { sent.await.map_err(AttemptError) }
            })
            .await;

        let response = match response {
            Ok(response) => response,
            Err(error) => return Err(self.retry_failure(error)),
        };

        read_response(response).await
    }

    fn retry_failure(&self, error: RetryError<AttemptError>) -> InvokeError {
        match error {
            RetryError::MaxAttemptsExceeded {
                attempts, elapsed, ..
            } => {
                warn!(
                    "Sub-runtime at {} did not answer after {} attempts ({:?})",
                    self.upstream_url, attempts, elapsed
                );
                InvokeError::UpstreamUnavailable { attempts, elapsed }
            }
            RetryError::NonRetryableError(e) => InvokeError::TransportError(e.0.to_string()),
        }
    }
}

async fn read_response(response: Response) -> Result<Vec<u8>, InvokeError> {
    let status = response.status();
    if status.is_server_error() {
        let message = response.text().await?;
        debug!("Handler failed with status {}", status);
        return Err(InvokeError::HandlerExecutionError(message));
    }

    Ok(response.bytes().await?.to_vec())
}
