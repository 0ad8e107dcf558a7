// questbot-core/src/platforms/telegram/mod.rs

pub mod client;

pub use client::{ChatMemberInfo, ChatMemberStatus, TelegramApi, TelegramBotClient};
