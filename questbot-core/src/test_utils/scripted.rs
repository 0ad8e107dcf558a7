// questbot-core/src/test_utils/scripted.rs

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use questbot_common::Error;

use crate::platforms::telegram::{ChatMemberInfo, ChatMemberStatus, TelegramApi};
use crate::platforms::twitter::{TwitterApi, TwitterCheck};

/// Telegram client that answers from a script instead of the network.
pub struct ScriptedTelegram {
    member: Mutex<Option<ChatMemberInfo>>,
    send_fails: bool,
    pub sent_messages: Mutex<Vec<(String, String)>>,
}

impl ScriptedTelegram {
    pub fn member(status: ChatMemberStatus, username: Option<&str>) -> Self {
        Self {
            member: Mutex::new(Some(ChatMemberInfo {
                status,
                username: username.map(String::from),
            })),
            send_fails: false,
            sent_messages: Mutex::new(Vec::new()),
        }
    }

    /// A client whose `getChatMember` always errors (network down).
    pub fn unreachable() -> Self {
        Self {
            member: Mutex::new(None),
            send_fails: false,
            sent_messages: Mutex::new(Vec::new()),
        }
    }

    pub fn with_failing_send(mut self) -> Self {
        self.send_fails = true;
        self
    }

    pub fn sent_count(&self) -> usize {
        self.sent_messages.lock().expect("mutex poisoned").len()
    }
}

#[async_trait]
impl TelegramApi for ScriptedTelegram {
    async fn get_chat_member(
        &self,
        _chat: &str,
        _telegram_id: i64,
    ) -> Result<ChatMemberInfo, Error> {
        self.member
            .lock()
            .expect("mutex poisoned")
            .clone()
            .ok_or_else(|| Error::Platform("scripted network failure".to_string()))
    }

    async fn send_message(&self, chat: &str, text: &str) -> Result<(), Error> {
        if self.send_fails {
            return Err(Error::Platform("scripted send failure".to_string()));
        }
        self.sent_messages
            .lock()
            .expect("mutex poisoned")
            .push((chat.to_string(), text.to_string()));
        Ok(())
    }
}

/// Twitter client that returns a fixed check and counts API calls, so
/// tests can assert the cache actually short-circuits.
pub struct ScriptedTwitter {
    check: TwitterCheck,
    pub calls: AtomicU32,
}

impl ScriptedTwitter {
    pub fn answering(check: TwitterCheck) -> Self {
        Self {
            check,
            calls: AtomicU32::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::Relaxed)
    }

    fn answer(&self) -> Result<TwitterCheck, Error> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(self.check)
    }
}

#[async_trait]
impl TwitterApi for ScriptedTwitter {
    async fn verify_follow(&self, _username: &str, _target: &str) -> Result<TwitterCheck, Error> {
        self.answer()
    }

    async fn verify_like(&self, _username: &str, _tweet_id: &str) -> Result<TwitterCheck, Error> {
        self.answer()
    }

    async fn verify_retweet(
        &self,
        _username: &str,
        _tweet_id: &str,
    ) -> Result<TwitterCheck, Error> {
        self.answer()
    }
}
