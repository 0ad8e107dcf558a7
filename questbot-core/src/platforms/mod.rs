// questbot-core/src/platforms/mod.rs

pub mod telegram;
pub mod twitter;
