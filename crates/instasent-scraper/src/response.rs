//! Wire shapes for the Instagram web endpoints.
//!
//! Only the fields the analysis reads are modelled; everything else in the
//! payloads is ignored by serde.

use serde::Deserialize;

use crate::types::{Post, PostPage, Profile};

/// `POST /api/v1/web/accounts/login/ajax/`
#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    #[serde(default)]
    pub(crate) authenticated: Option<bool>,
    #[serde(default)]
    pub(crate) user: Option<bool>,
    #[serde(default)]
    pub(crate) message: Option<String>,
    #[serde(default)]
    pub(crate) two_factor_required: Option<bool>,
}

impl LoginResponse {
    /// Human-readable reason for a rejected login.
    pub(crate) fn failure_reason(&self) -> String {
        if self.two_factor_required == Some(true) {
            return "two-factor authentication required".to_string();
        }
        if let Some(message) = self.message.as_deref().filter(|m| !m.is_empty()) {
            return message.to_string();
        }
        if self.user == Some(false) {
            return "unknown account".to_string();
        }
        "invalid credentials".to_string()
    }
}

/// `GET /api/v1/users/web_profile_info/?username=...`
#[derive(Debug, Deserialize)]
pub(crate) struct WebProfileInfo {
    pub(crate) data: WebProfileData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WebProfileData {
    pub(crate) user: Option<WebProfileUser>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WebProfileUser {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) edge_followed_by: EdgeCount,
    #[serde(default)]
    pub(crate) is_private: bool,
    #[serde(default)]
    pub(crate) followed_by_viewer: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EdgeCount {
    pub(crate) count: u64,
}

impl From<WebProfileUser> for Profile {
    fn from(user: WebProfileUser) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
            follower_count: user.edge_followed_by.count,
            is_private: user.is_private,
        }
    }
}

/// `GET /api/v1/feed/user/{id}/?count=..&max_id=..`
#[derive(Debug, Deserialize)]
pub(crate) struct FeedResponse {
    #[serde(default)]
    pub(crate) items: Vec<FeedItem>,
    #[serde(default)]
    pub(crate) more_available: bool,
    #[serde(default)]
    pub(crate) next_max_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FeedItem {
    #[serde(default)]
    pub(crate) code: Option<String>,
    #[serde(default)]
    pub(crate) caption: Option<FeedCaption>,
    /// Absent when the owner hides like counts.
    #[serde(default)]
    pub(crate) like_count: Option<u64>,
    #[serde(default)]
    pub(crate) image_versions2: Option<ImageVersions>,
    #[serde(default)]
    pub(crate) carousel_media: Vec<CarouselItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FeedCaption {
    pub(crate) text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImageVersions {
    #[serde(default)]
    pub(crate) candidates: Vec<ImageCandidate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImageCandidate {
    pub(crate) url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CarouselItem {
    #[serde(default)]
    pub(crate) image_versions2: Option<ImageVersions>,
}

fn first_candidate(versions: Option<&ImageVersions>) -> Option<&str> {
    versions?
        .candidates
        .first()
        .map(|c| c.url.as_str())
        .filter(|url| !url.is_empty())
}

impl From<FeedItem> for Post {
    fn from(item: FeedItem) -> Self {
        let image_url = first_candidate(item.image_versions2.as_ref())
            .or_else(|| {
                item.carousel_media
                    .first()
                    .and_then(|c| first_candidate(c.image_versions2.as_ref()))
            })
            .map(str::to_owned);

        Self {
            shortcode: item.code,
            caption: item.caption.and_then(|c| c.text),
            image_url,
            like_count: item.like_count.unwrap_or(0),
        }
    }
}

impl From<FeedResponse> for PostPage {
    fn from(feed: FeedResponse) -> Self {
        let next_cursor = if feed.more_available {
            feed.next_max_id.filter(|id| !id.is_empty())
        } else {
            None
        };
        Self {
            posts: feed.items.into_iter().map(Post::from).collect(),
            next_cursor,
        }
    }
}
