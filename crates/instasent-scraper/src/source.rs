use async_trait::async_trait;

use crate::client::InstagramClient;
use crate::error::ScraperError;
use crate::types::{PostPage, Profile};

/// Anything that can resolve a username and page through its posts.
///
/// The analysis pipeline depends on this trait rather than on
/// [`InstagramClient`] so it can run against in-memory fakes.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// Resolves `username`.
    async fn lookup_profile(&self, username: &str) -> Result<Profile, ScraperError>;

    /// Returns the page of posts after `cursor`, most-recent-first.
    async fn fetch_posts_page(
        &self,
        profile: &Profile,
        cursor: Option<&str>,
    ) -> Result<PostPage, ScraperError>;
}

#[async_trait]
impl ProfileSource for InstagramClient {
    async fn lookup_profile(&self, username: &str) -> Result<Profile, ScraperError> {
        InstagramClient::lookup_profile(self, username).await
    }

    async fn fetch_posts_page(
        &self,
        profile: &Profile,
        cursor: Option<&str>,
    ) -> Result<PostPage, ScraperError> {
        InstagramClient::fetch_posts_page(self, profile, cursor).await
    }
}
