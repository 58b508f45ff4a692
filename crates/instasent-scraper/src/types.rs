use serde::Serialize;

/// A resolved Instagram account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    /// Numeric account id, used to page the feed.
    pub user_id: String,
    pub username: String,
    pub follower_count: u64,
    pub is_private: bool,
}

/// One published post as seen at fetch time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    /// Shortcode from the post permalink, when the feed reports one.
    pub shortcode: Option<String>,
    pub caption: Option<String>,
    /// Best available image URL; for carousels, the first item's image.
    pub image_url: Option<String>,
    pub like_count: u64,
}

impl Post {
    /// Caption text when present and non-empty.
    #[must_use]
    pub fn non_empty_caption(&self) -> Option<&str> {
        self.caption.as_deref().filter(|c| !c.is_empty())
    }
}

/// One page of a profile's feed, most-recent-first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostPage {
    pub posts: Vec<Post>,
    /// Cursor for the following page; `None` on the last page.
    pub next_cursor: Option<String>,
}
