// File: questbot-core/src/platforms/telegram/client.rs
//
// Thin wrapper over the Telegram Bot API. Only the two methods the
// verification engine needs: `getChatMember` for membership checks and
// `sendMessage` for the join-group announcement. The trait exists so
// tests can run against a scripted implementation instead of the
// network.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::Deserialize;
use tracing::warn;

use crate::Error;

const API_TIMEOUT: Duration = Duration::from_secs(10);

/// Membership status as reported by `getChatMember`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatMemberStatus {
    Creator,
    Administrator,
    Member,
    Restricted,
    Left,
    Kicked,
    Unknown,
}

impl ChatMemberStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "creator" => ChatMemberStatus::Creator,
            "administrator" => ChatMemberStatus::Administrator,
            "member" => ChatMemberStatus::Member,
            "restricted" => ChatMemberStatus::Restricted,
            "left" => ChatMemberStatus::Left,
            "kicked" => ChatMemberStatus::Kicked,
            _ => ChatMemberStatus::Unknown,
        }
    }

    /// Restricted users are still inside the chat; left/kicked are not.
    pub fn is_member(&self) -> bool {
        matches!(
            self,
            ChatMemberStatus::Creator
                | ChatMemberStatus::Administrator
                | ChatMemberStatus::Member
                | ChatMemberStatus::Restricted
        )
    }
}

#[derive(Debug, Clone)]
pub struct ChatMemberInfo {
    pub status: ChatMemberStatus,
    pub username: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TelegramApi: Send + Sync {
    async fn get_chat_member(&self, chat: &str, telegram_id: i64) -> Result<ChatMemberInfo, Error>;
    async fn send_message(&self, chat: &str, text: &str) -> Result<(), Error>;
}

/// Production client backed by reqwest with a fixed request timeout.
pub struct TelegramBotClient {
    http: ReqwestClient,
    token: String,
}

impl TelegramBotClient {
    pub fn new(token: &str) -> Result<Self, Error> {
        let http = ReqwestClient::builder().timeout(API_TIMEOUT).build()?;
        Ok(Self {
            http,
            token: token.to_string(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{}", self.token, method)
    }
}

#[derive(Debug, Deserialize)]
struct TgResponse<T> {
    ok: bool,
    description: Option<String>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct TgChatMember {
    status: String,
    user: TgUser,
}

#[derive(Debug, Deserialize)]
struct TgUser {
    username: Option<String>,
}

#[async_trait]
impl TelegramApi for TelegramBotClient {
    async fn get_chat_member(&self, chat: &str, telegram_id: i64) -> Result<ChatMemberInfo, Error> {
        let resp = self
            .http
            .get(self.method_url("getChatMember"))
            .query(&[("chat_id", chat), ("user_id", &telegram_id.to_string())])
            .send()
            .await
            .map_err(|e| Error::Platform(format!("Telegram network error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body_text = resp.text().await.unwrap_or_default();
            warn!("getChatMember => status={} body={}", status, body_text);
            return Err(Error::Platform(format!(
                "Telegram API error: HTTP {} => {}",
                status, body_text
            )));
        }

        let parsed: TgResponse<TgChatMember> = resp
            .json()
            .await
            .map_err(|e| Error::Platform(format!("Error parsing getChatMember JSON: {e}")))?;

        if !parsed.ok {
            return Err(Error::Platform(format!(
                "Telegram API refused getChatMember: {}",
                parsed.description.unwrap_or_default()
            )));
        }

        let member = parsed
            .result
            .ok_or_else(|| Error::Platform("getChatMember returned no result".to_string()))?;

        Ok(ChatMemberInfo {
            status: ChatMemberStatus::parse(&member.status),
            username: member.user.username,
        })
    }

    async fn send_message(&self, chat: &str, text: &str) -> Result<(), Error> {
        let resp = self
            .http
            .post(self.method_url("sendMessage"))
            .json(&serde_json::json!({ "chat_id": chat, "text": text }))
            .send()
            .await
            .map_err(|e| Error::Platform(format!("Telegram network error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body_text = resp.text().await.unwrap_or_default();
            return Err(Error::Platform(format!(
                "Telegram API error: HTTP {} => {}",
                status, body_text
            )));
        }
        Ok(())
    }
}
