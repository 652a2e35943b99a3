use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, error, info, warn};

use glimpse_config::dispatch::DispatchConfig;
use glimpse_config::providers::ProviderConfig;
use glimpse_types::PixelBuffer;

use crate::ai::{ChatRequest, ChatResponse, chat_url};
use crate::ocr::{OcrResponse, ocr_form};
use crate::{AiPayload, AiReply, Dispatch, DispatchError};

/// Dispatcher backed by a shared `reqwest` client. Each request carries
/// the provider's own timeout; transient failures are retried with a
/// linearly growing backoff.
pub struct HttpDispatcher {
    client: Client,
    retry: DispatchConfig,
}

impl HttpDispatcher {
    pub fn new(retry: DispatchConfig) -> Self {
        Self {
            client: Client::new(),
            retry,
        }
    }

    async fn with_retry<T, F, Fut>(
        &self,
        provider_id: &str,
        send: F,
    ) -> Result<T, DispatchError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, DispatchError>>,
    {
        let mut attempt = 0;
        loop {
            match send().await {
                Ok(value) => {
                    if attempt > 0 {
                        info!(
                            provider = provider_id,
                            attempt = attempt + 1,
                            "request succeeded after retry"
                        );
                    }
                    return Ok(value);
                }
                Err(err) if err.is_retryable() && attempt < self.retry.retry_limit => {
                    attempt += 1;
                    let backoff =
                        Duration::from_millis(self.retry.backoff_ms.saturating_mul(attempt as u64));
                    warn!(
                        provider = provider_id,
                        attempt,
                        max_retries = self.retry.retry_limit,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %err,
                        "request failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(err) => {
                    error!(
                        provider = provider_id,
                        attempt = attempt + 1,
                        error = %err,
                        "request failed permanently"
                    );
                    return Err(err);
                }
            }
        }
    }

    fn post(&self, provider: &ProviderConfig, url: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .post(url)
            .timeout(Duration::from_millis(provider.timeout_ms));
        if !provider.api_key.is_empty() {
            builder = builder.header(
                "Authorization",
                format!("Bearer {}", provider.api_key.expose()),
            );
        }
        builder
    }

    async fn send_chat(
        &self,
        provider: &ProviderConfig,
        url: &str,
        request: &ChatRequest,
    ) -> Result<AiReply, DispatchError> {
        let response = self
            .post(provider, url)
            .json(request)
            .send()
            .await
            .map_err(|e| classify_transport(e, provider.timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body, provider.timeout_ms));
        }

        let decoded: ChatResponse = response
            .json()
            .await
            .map_err(|e| classify_transport(e, provider.timeout_ms))?;
        decoded.into_reply()
    }

    async fn send_ocr(
        &self,
        provider: &ProviderConfig,
        image: &PixelBuffer,
    ) -> Result<String, DispatchError> {
        let form = ocr_form(image).map_err(|e| classify_transport(e, provider.timeout_ms))?;
        let response = self
            .post(provider, &provider.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| classify_transport(e, provider.timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body, provider.timeout_ms));
        }

        let decoded: OcrResponse = response
            .json()
            .await
            .map_err(|e| classify_transport(e, provider.timeout_ms))?;
        decoded.into_text()
    }
}

#[async_trait::async_trait]
impl Dispatch for HttpDispatcher {
    async fn ocr(
        &self,
        provider: &ProviderConfig,
        image: &PixelBuffer,
    ) -> Result<String, DispatchError> {
        debug!(
            provider = %provider.id,
            bytes = image.png.len(),
            "uploading capture for text extraction"
        );
        self.with_retry(&provider.id, || self.send_ocr(provider, image))
            .await
    }

    async fn ai(
        &self,
        provider: &ProviderConfig,
        payload: AiPayload,
    ) -> Result<AiReply, DispatchError> {
        let url = chat_url(&provider.endpoint);
        let request = ChatRequest::build(provider, &payload);
        debug!(
            provider = %provider.id,
            model = %provider.model,
            with_image = payload.image.is_some(),
            "sending chat request"
        );
        let result = self
            .with_retry(&provider.id, || self.send_chat(provider, &url, &request))
            .await;

        // A 400 on an image request is almost always a text-only model.
        match result {
            Err(DispatchError::Rejected {
                status: 400,
                message,
            }) if payload.image.is_some() => Err(DispatchError::Rejected {
                status: 400,
                message: format!("{} (the model may not accept image input)", message),
            }),
            other => other,
        }
    }
}

fn classify_transport(err: reqwest::Error, timeout_ms: u64) -> DispatchError {
    if err.is_timeout() {
        DispatchError::Timeout { timeout_ms }
    } else if err.is_decode() {
        DispatchError::Malformed {
            message: err.to_string(),
        }
    } else {
        DispatchError::Transient {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

fn classify_status(status: StatusCode, body: &str, timeout_ms: u64) -> DispatchError {
    let message = if body.is_empty() {
        status.to_string()
    } else {
        truncate_body(body)
    };
    match status.as_u16() {
        408 | 504 => DispatchError::Timeout { timeout_ms },
        code @ (429 | 500..=599) => DispatchError::Transient {
            status: Some(code),
            message,
        },
        code => DispatchError::Rejected {
            status: code,
            message,
        },
    }
}

fn truncate_body(body: &str) -> String {
    const LIMIT: usize = 300;
    if body.chars().count() <= LIMIT {
        body.to_string()
    } else {
        let head: String = body.chars().take(LIMIT).collect();
        format!("{}...", head)
    }
}
