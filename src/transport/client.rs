//! HTTP client for the local backend's `/reply` endpoint.

use std::time::Duration;

use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CACHE_CONTROL};
use tracing::debug;

use super::lines::LineDecoder;
use crate::config::ChatEnvironment;
use crate::error::{ChatError, Result};
use crate::handler::{StreamDispatcher, StreamHandler};
use crate::protocol::{StreamParser, StreamPart};
use crate::types::{ChatRequest, ChatResponse};
use crate::util::timeout::with_timeout;

/// Header announcing the data-stream protocol version we understand.
pub const DATA_STREAM_HEADER: &str = "x-vercel-ai-data-stream";

/// Client for one backend instance.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ChatClient {
    /// Build a client for the backend described by `env`.
    ///
    /// Fails with [`ChatError::Configuration`] when the environment is
    /// invalid or names no port.
    pub fn from_environment(env: &ChatEnvironment) -> Result<Self> {
        env.validate()?;
        Self::with_base_url(env.base_url()?, env.timeout())
    }

    /// Build a client for an explicit base URL such as `http://localhost:3000`.
    ///
    /// `timeout` bounds connecting and each read, not the whole stream.
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn reply_url(&self) -> String {
        format!("{}/reply", self.base_url)
    }

    /// Send a prompt and wait for the complete, non-streamed reply.
    pub async fn send_message(&self, message: &str) -> Result<ChatResponse> {
        let request = ChatRequest::from_prompt(message);
        debug!(url = %self.reply_url(), streaming = false, "sending chat request");

        with_timeout(self.timeout, async {
            let resp = self.http.post(self.reply_url()).json(&request).send().await?;
            let resp = check_status(resp).await?;
            let body = resp.text().await?;
            Ok::<ChatResponse, ChatError>(serde_json::from_str(&body)?)
        })
        .await
    }

    /// Send a prompt and stream the raw protocol lines of the reply.
    pub async fn stream_lines(&self, message: &str) -> Result<BoxStream<'static, Result<String>>> {
        let request = ChatRequest::from_prompt(message);
        debug!(url = %self.reply_url(), streaming = true, "sending chat request");

        let resp = self
            .http
            .post(self.reply_url())
            .headers(stream_headers())
            .json(&request)
            .send()
            .await?;
        let resp = check_status(resp).await?;
        let byte_stream = resp.bytes_stream();

        let stream = async_stream::stream! {
            let mut decoder = LineDecoder::new();
            futures::pin_mut!(byte_stream);

            loop {
                match byte_stream.next().await {
                    Some(Ok(chunk)) => {
                        for line in decoder.push(&chunk) {
                            yield Ok(line);
                        }
                    }
                    Some(Err(e)) => {
                        yield Err(ChatError::Network(e));
                        break;
                    }
                    None => {
                        if let Some(line) = decoder.finish() {
                            yield Ok(line);
                        }
                        debug!("reply stream ended");
                        break;
                    }
                }
            }
        };
        Ok(Box::pin(stream))
    }

    /// Send a prompt and stream decoded parts. Text parts are cumulative
    /// within a block, exactly as the parser emits them.
    pub async fn stream_parts(
        &self,
        message: &str,
    ) -> Result<BoxStream<'static, Result<StreamPart>>> {
        let mut lines = self.stream_lines(message).await?;

        let stream = async_stream::stream! {
            let mut parser = StreamParser::new();
            while let Some(line) = lines.next().await {
                match line {
                    Ok(line) => {
                        if let Some(part) = parser.parse_line(&line) {
                            yield Ok(part);
                        }
                    }
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                }
            }
        };
        Ok(Box::pin(stream))
    }

    /// Send a prompt, forward every part to `handler` (text as deltas) and
    /// return the assembled reply.
    pub async fn stream_message<H: StreamHandler + ?Sized>(
        &self,
        message: &str,
        handler: &mut H,
    ) -> Result<ChatResponse> {
        let mut lines = self.stream_lines(message).await?;
        let mut dispatcher = StreamDispatcher::new();

        while let Some(line) = lines.next().await {
            dispatcher.feed_line(&line?, handler);
        }

        Ok(dispatcher.finish())
    }
}

fn stream_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(DATA_STREAM_HEADER, HeaderValue::from_static("v1"));
    headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ChatError::api(status.as_u16(), body))
}
