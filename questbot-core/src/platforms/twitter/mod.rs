// questbot-core/src/platforms/twitter/mod.rs

pub mod client;

pub use client::{extract_tweet_id, TwitterApi, TwitterApiClient, TwitterCheck};
