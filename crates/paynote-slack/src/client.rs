//! Slack Web API client.
//!
//! Every method posts JSON with `Authorization: Bearer {bot token}` and checks the
//! `ok` flag of the response envelope; transport success alone is not enough.

use async_trait::async_trait;
use bytes::Bytes;
use paynote_core::SlackConfig;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::payloads::SlackFile;
use crate::traits::{ChatPlatform, SlackError, SlackResult};

/// Errors that mean the desired state is already in place.
const BENIGN_ERRORS: &[&str] = &["already_reacted"];

/// Host serving `url_private` / `url_private_download`
const FILES_HOST: &str = "files.slack.com";

#[derive(Debug, Deserialize)]
struct Envelope {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    rest: Value,
}

#[derive(Debug, Deserialize)]
struct FileInfoResponse {
    file: SlackFile,
}

/// HTTP client for the Slack Web API.
#[derive(Clone, Debug)]
pub struct SlackClient {
    client: Client,
    base_url: String,
    bot_token: String,
}

impl SlackClient {
    pub fn new(base_url: String, bot_token: String, timeout: Duration) -> SlackResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SlackError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bot_token,
        })
    }

    pub fn from_config(config: &SlackConfig, timeout_secs: u64) -> SlackResult<Self> {
        Self::new(
            config.api_base_url.clone(),
            config.bot_token.clone(),
            Duration::from_secs(timeout_secs),
        )
    }

    /// The bot token is only ever sent to Slack's file host or the configured API origin.
    fn validate_download_url(&self, url: &str) -> SlackResult<()> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| SlackError::Download(format!("Invalid file URL: {}", e)))?;

        let host = parsed.host_str().unwrap_or_default().to_lowercase();
        if parsed.scheme() == "https" && host == FILES_HOST {
            return Ok(());
        }

        let same_origin = reqwest::Url::parse(&self.base_url)
            .map(|base| base.origin() == parsed.origin())
            .unwrap_or(false);
        if same_origin {
            return Ok(());
        }

        Err(SlackError::Download(format!(
            "refusing to send credentials to '{}', files are only fetched from {}",
            host, FILES_HOST
        )))
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    /// POST a JSON body to a Web API method and return the envelope's payload.
    async fn call<T: DeserializeOwned>(&self, method: &str, body: &Value) -> SlackResult<T> {
        let request = self
            .client
            .post(self.method_url(method))
            .bearer_auth(&self.bot_token)
            .json(body);
        self.send(method, request).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: &str,
        request: reqwest::RequestBuilder,
    ) -> SlackResult<T> {
        let response = request
            .send()
            .await
            .map_err(|e| SlackError::Http(format!("{}: {}", method, e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SlackError::Http(format!(
                "{} returned {}: {}",
                method, status, error_text
            )));
        }

        let envelope: Envelope = response
            .json()
            .await
            .map_err(|e| SlackError::InvalidResponse(format!("{}: {}", method, e)))?;

        if !envelope.ok {
            let error = envelope.error.unwrap_or_else(|| "unknown_error".to_string());
            if !BENIGN_ERRORS.contains(&error.as_str()) {
                return Err(SlackError::Api {
                    method: method.to_string(),
                    error,
                });
            }
            tracing::debug!(method = %method, error = %error, "Ignoring benign Slack API error");
        }

        serde_json::from_value(envelope.rest)
            .map_err(|e| SlackError::InvalidResponse(format!("{}: {}", method, e)))
    }
}

#[async_trait]
impl ChatPlatform for SlackClient {
    #[tracing::instrument(skip(self))]
    async fn download_file(&self, url: &str) -> SlackResult<Bytes> {
        self.validate_download_url(url)?;

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.bot_token)
            .send()
            .await
            .map_err(|e| SlackError::Download(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SlackError::Download(format!("HTTP {}", status)));
        }

        // A token without files:read gets the HTML sign-in page with a 200
        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("text/html"));
        if is_html {
            return Err(SlackError::Download(
                "received an HTML page instead of the file (missing files:read scope?)"
                    .to_string(),
            ));
        }

        response
            .bytes()
            .await
            .map_err(|e| SlackError::Download(e.to_string()))
    }

    #[tracing::instrument(skip(self))]
    async fn add_reaction(&self, channel: &str, ts: &str, emoji: &str) -> SlackResult<()> {
        let _: Value = self
            .call(
                "reactions.add",
                &json!({ "channel": channel, "timestamp": ts, "name": emoji }),
            )
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, text))]
    async fn post_thread_reply(&self, channel: &str, ts: &str, text: &str) -> SlackResult<()> {
        let _: Value = self
            .call(
                "chat.postMessage",
                &json!({ "channel": channel, "thread_ts": ts, "text": text }),
            )
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, text, blocks))]
    async fn post_message(
        &self,
        channel: &str,
        text: &str,
        blocks: Option<Value>,
    ) -> SlackResult<()> {
        let mut body = json!({ "channel": channel, "text": text });
        if let Some(blocks) = blocks {
            body["blocks"] = blocks;
        }
        let _: Value = self.call("chat.postMessage", &body).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, view))]
    async fn open_modal(&self, trigger_id: &str, view: Value) -> SlackResult<()> {
        let _: Value = self
            .call(
                "views.open",
                &json!({ "trigger_id": trigger_id, "view": view }),
            )
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn get_file_info(&self, file_id: &str) -> SlackResult<SlackFile> {
        let request = self
            .client
            .get(self.method_url("files.info"))
            .bearer_auth(&self.bot_token)
            .query(&[("file", file_id)]);
        let info: FileInfoResponse = self.send("files.info", request).await?;
        Ok(info.file)
    }
}
