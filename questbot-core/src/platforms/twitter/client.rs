// File: questbot-core/src/platforms/twitter/client.rs
//
// Twitter read-API v2 client. The deployment runs on the free tier
// (~100 reads/month), so every call is budgeted through an in-process
// counter and the client degrades to `Unavailable` once it runs dry.
// The verification layer turns `Unavailable` into a fallback to human
// review instead of a hard failure.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{info, warn};

use crate::Error;

const API_TIMEOUT: Duration = Duration::from_secs(10);
const API_BASE: &str = "https://api.twitter.com/2";
const PAGE_SIZE: u32 = 100;

/// Result of a single action check against the read API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TwitterCheck {
    /// The action was observed.
    Confirmed,
    /// The API answered and the action was not observed.
    NotConfirmed,
    /// The submitted handle does not exist (or the tweet is gone).
    UserNotFound,
    /// Rate limit, exhausted budget, or transport trouble.
    Unavailable,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TwitterApi: Send + Sync {
    async fn verify_follow(&self, username: &str, target: &str) -> Result<TwitterCheck, Error>;
    async fn verify_like(&self, username: &str, tweet_id: &str) -> Result<TwitterCheck, Error>;
    async fn verify_retweet(&self, username: &str, tweet_id: &str) -> Result<TwitterCheck, Error>;
}

pub struct TwitterApiClient {
    http: ReqwestClient,
    bearer_token: String,
    /// Our own account id, compared against the user's following list.
    account_id: String,
    monthly_limit: u32,
    requests_made: AtomicU32,
}

impl TwitterApiClient {
    pub fn new(bearer_token: &str, account_id: &str, monthly_limit: u32) -> Result<Self, Error> {
        let http = ReqwestClient::builder().timeout(API_TIMEOUT).build()?;
        Ok(Self {
            http,
            bearer_token: bearer_token.to_string(),
            account_id: account_id.to_string(),
            monthly_limit,
            requests_made: AtomicU32::new(0),
        })
    }

    fn budget_spent(&self) -> bool {
        self.requests_made.load(Ordering::Relaxed) >= self.monthly_limit
    }

    fn spend_budget(&self) {
        let made = self.requests_made.fetch_add(1, Ordering::Relaxed) + 1;
        info!("Twitter API usage: {}/{}", made, self.monthly_limit);
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<Option<T>, TwitterCheck> {
        if self.budget_spent() {
            warn!("Twitter API monthly budget exhausted");
            return Err(TwitterCheck::Unavailable);
        }

        let resp = self
            .http
            .get(url)
            .header("Authorization", format!("Bearer {}", self.bearer_token))
            .send()
            .await
            .map_err(|e| {
                warn!("Twitter API transport error: {e}");
                TwitterCheck::Unavailable
            })?;
        self.spend_budget();

        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("Twitter API rate limit exceeded");
                Err(TwitterCheck::Unavailable)
            }
            s if s.is_success() => resp.json::<T>().await.map(Some).map_err(|e| {
                warn!("Error parsing Twitter API JSON: {e}");
                TwitterCheck::Unavailable
            }),
            s => {
                let body_text = resp.text().await.unwrap_or_default();
                warn!("Twitter API error: HTTP {} => {}", s, body_text);
                Err(TwitterCheck::Unavailable)
            }
        }
    }

    async fn lookup_user_id(&self, username: &str) -> Result<Option<String>, TwitterCheck> {
        let handle = username.trim_start_matches('@');
        let url = format!("{API_BASE}/users/by/username/{handle}");
        let parsed: Option<UserLookupResponse> = self.get_json(&url).await?;
        Ok(parsed.and_then(|p| p.data).map(|d| d.id))
    }

    /// Scans an id list endpoint (following / liking_users / retweeted_by)
    /// for `needle`. Single page; the free tier cannot afford pagination.
    async fn id_listed(&self, url: &str, needle: &str) -> Result<TwitterCheck, TwitterCheck> {
        let parsed: Option<UserListResponse> = self.get_json(url).await?;
        let Some(parsed) = parsed else {
            return Ok(TwitterCheck::UserNotFound);
        };
        let found = parsed
            .data
            .unwrap_or_default()
            .iter()
            .any(|u| u.id == needle);
        Ok(if found {
            TwitterCheck::Confirmed
        } else {
            TwitterCheck::NotConfirmed
        })
    }
}

#[derive(Debug, Deserialize)]
struct UserLookupResponse {
    data: Option<UserData>,
}

#[derive(Debug, Deserialize)]
struct UserListResponse {
    data: Option<Vec<UserData>>,
}

#[derive(Debug, Deserialize)]
struct UserData {
    id: String,
}

#[async_trait]
impl TwitterApi for TwitterApiClient {
    async fn verify_follow(&self, username: &str, _target: &str) -> Result<TwitterCheck, Error> {
        let user_id = match self.lookup_user_id(username).await {
            Ok(Some(id)) => id,
            Ok(None) => return Ok(TwitterCheck::UserNotFound),
            Err(check) => return Ok(check),
        };
        let url = format!("{API_BASE}/users/{user_id}/following?max_results={PAGE_SIZE}");
        match self.id_listed(&url, &self.account_id).await {
            Ok(check) | Err(check) => Ok(check),
        }
    }

    async fn verify_like(&self, username: &str, tweet_id: &str) -> Result<TwitterCheck, Error> {
        let user_id = match self.lookup_user_id(username).await {
            Ok(Some(id)) => id,
            Ok(None) => return Ok(TwitterCheck::UserNotFound),
            Err(check) => return Ok(check),
        };
        let url = format!("{API_BASE}/tweets/{tweet_id}/liking_users?max_results={PAGE_SIZE}");
        match self.id_listed(&url, &user_id).await {
            Ok(check) | Err(check) => Ok(check),
        }
    }

    async fn verify_retweet(&self, username: &str, tweet_id: &str) -> Result<TwitterCheck, Error> {
        let user_id = match self.lookup_user_id(username).await {
            Ok(Some(id)) => id,
            Ok(None) => return Ok(TwitterCheck::UserNotFound),
            Err(check) => return Ok(check),
        };
        let url = format!("{API_BASE}/tweets/{tweet_id}/retweeted_by?max_results={PAGE_SIZE}");
        match self.id_listed(&url, &user_id).await {
            Ok(check) | Err(check) => Ok(check),
        }
    }
}

/// Pulls a tweet id out of a status URL, e.g.
/// `https://x.com/user/status/1234567890?s=20` -> `1234567890`.
pub fn extract_tweet_id(url: &str) -> Option<String> {
    let mut parts = url.split('/').peekable();
    while let Some(part) = parts.next() {
        if part == "status" {
            return parts
                .next()
                .map(|id| id.split('?').next().unwrap_or(id).to_string())
                .filter(|id| !id.is_empty());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_tweet_id_from_status_urls() {
        assert_eq!(
            extract_tweet_id("https://twitter.com/someone/status/1234567890"),
            Some("1234567890".to_string())
        );
        assert_eq!(
            extract_tweet_id("https://x.com/someone/status/987?s=20"),
            Some("987".to_string())
        );
        assert_eq!(extract_tweet_id("https://x.com/someone"), None);
    }
}
