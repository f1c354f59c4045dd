use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServiceError};

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<TelegramUser>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'a str,
    disable_web_page_preview: bool,
}

/// Minimal Bot API client: long polling in, HTML messages out.
#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    api_base: String,
    token: String,
}

impl TelegramClient {
    pub const POLL_TIMEOUT_SECS: u64 = 30;

    pub fn new(token: impl Into<String>, api_base: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(Self::POLL_TIMEOUT_SECS + 10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    fn unwrap_response<T>(method: &str, res: ApiResponse<T>) -> Result<Option<T>> {
        if !res.ok {
            return Err(ServiceError::upstream(format!(
                "telegram {method} failed: {}",
                res.description.unwrap_or_else(|| "no description".to_string())
            )));
        }
        Ok(res.result)
    }

    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        let offset = offset.to_string();
        let timeout = timeout_secs.to_string();
        let res: ApiResponse<Vec<Update>> = self
            .http
            .get(self.method_url("getUpdates"))
            .query(&[
                ("offset", offset.as_str()),
                ("timeout", timeout.as_str()),
                ("allowed_updates", r#"["message"]"#),
            ])
            .send()
            .await?
            .json()
            .await?;

        Ok(Self::unwrap_response("getUpdates", res)?.unwrap_or_default())
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let body = SendMessageRequest {
            chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        let res: ApiResponse<serde_json::Value> = self
            .http
            .post(self.method_url("sendMessage"))
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        Self::unwrap_response("sendMessage", res)?;
        Ok(())
    }
}
