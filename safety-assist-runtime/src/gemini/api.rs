//! ModelProvider implementation for GeminiClient (blocking + streaming).

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::interfaces::{ModelProvider, ModelRequest, ProviderError};
use crate::metrics::MetricTimer;
use crate::streaming::{parse_sse_stream, CompletedTurn, SseEvent, TurnAccumulator};

use super::client::{ingest_chunk, GeminiClient};

impl GeminiClient {
    async fn post(&self, url: &str, body: &Value) -> Result<reqwest::Response, ProviderError> {
        let response = self
            .http
            .post(url)
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: text,
            });
        }
        Ok(response)
    }

    async fn generate_once(&self, url: &str, body: &Value) -> Result<CompletedTurn, ProviderError> {
        let response = self.post(url, body).await?;
        let json: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        self.parse_response(&json)
    }

    /// Send with retries. Only the connection and status phase is retried,
    /// before any byte of the body is consumed.
    async fn post_with_retry(&self, url: &str, body: &Value) -> Result<reqwest::Response, ProviderError> {
        let mut attempt = 0;
        loop {
            match self.post(url, body).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = self.retry_delay(attempt, &e);
                    warn!(attempt = attempt + 1, "Gemini request failed, retrying in {:?}: {}", delay, e);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl ModelProvider for GeminiClient {
    async fn generate(&self, request: ModelRequest<'_>) -> Result<CompletedTurn, ProviderError> {
        let _timer = MetricTimer::new("model_request_latency");
        let body = self.build_request_body(&request);
        let url = self.api_url(false);

        debug!(model = %self.config.model, messages = request.history.len(), "Gemini API request");

        let mut attempt = 0;
        loop {
            match self.generate_once(&url, &body).await {
                Ok(turn) => return Ok(turn),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = self.retry_delay(attempt, &e);
                    warn!(attempt = attempt + 1, "Gemini call failed, retrying in {:?}: {}", delay, e);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn generate_stream(
        &self,
        request: ModelRequest<'_>,
        on_text: &mut (dyn for<'s> FnMut(&'s str) + Send),
    ) -> Result<CompletedTurn, ProviderError> {
        let _timer = MetricTimer::new("model_request_latency");
        let body = self.build_request_body(&request);
        let url = self.api_url(true);

        debug!(model = %self.config.model, messages = request.history.len(), "Gemini API streaming request");

        let response = self.post_with_retry(&url, &body).await?;

        let mut acc = TurnAccumulator::new();
        let mut malformed = 0usize;
        parse_sse_stream(response, |event: SseEvent| {
            match serde_json::from_str::<Value>(&event.data) {
                Ok(data) => {
                    let chunk = ingest_chunk(&mut acc, &data);
                    if !chunk.is_empty() {
                        on_text(&chunk);
                    }
                }
                Err(_) => malformed += 1,
            }
        })
        .await?;

        if malformed > 0 {
            warn!(malformed, "ignored malformed stream events");
        }
        Ok(acc.finish())
    }
}
