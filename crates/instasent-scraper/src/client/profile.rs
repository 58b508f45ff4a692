use super::InstagramClient;
use crate::error::ScraperError;
use crate::response::{FeedResponse, WebProfileInfo};
use crate::types::{PostPage, Profile};

/// Feed page size requested from the web endpoint.
const FEED_PAGE_SIZE: u32 = 12;

impl InstagramClient {
    /// Resolves a username to a [`Profile`].
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::ProfileNotFound`] if the account does not
    /// exist, [`ScraperError::PrivateProfile`] if it is private and this
    /// session does not follow it, or any transport error left after retries.
    pub async fn lookup_profile(&self, username: &str) -> Result<Profile, ScraperError> {
        let mut url = self.endpoint("api/v1/users/web_profile_info/")?;
        url.query_pairs_mut().append_pair("username", username);

        let info: WebProfileInfo = match self.get_json(&url, "web_profile_info").await {
            Ok(info) => info,
            Err(ScraperError::NotFound { .. }) => {
                return Err(ScraperError::ProfileNotFound {
                    username: username.to_owned(),
                })
            }
            Err(e) => return Err(e),
        };

        let Some(user) = info.data.user else {
            return Err(ScraperError::ProfileNotFound {
                username: username.to_owned(),
            });
        };

        let viewer_is_owner = self
            .session_user
            .as_deref()
            .is_some_and(|me| me.eq_ignore_ascii_case(&user.username));
        if user.is_private && !user.followed_by_viewer && !viewer_is_owner {
            return Err(ScraperError::PrivateProfile {
                username: user.username,
            });
        }

        tracing::debug!(
            username = %user.username,
            user_id = %user.id,
            followers = user.edge_followed_by.count,
            "resolved instagram profile"
        );
        Ok(Profile::from(user))
    }

    /// Fetches one page of `profile`'s feed, most-recent-first.
    ///
    /// `cursor` is the `next_cursor` of the previous page, or `None` for the
    /// first page.
    ///
    /// # Errors
    ///
    /// Returns any transport or decode error left after retries.
    pub async fn fetch_posts_page(
        &self,
        profile: &Profile,
        cursor: Option<&str>,
    ) -> Result<PostPage, ScraperError> {
        let mut url = self.endpoint(&format!("api/v1/feed/user/{}/", profile.user_id))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("count", &FEED_PAGE_SIZE.to_string());
            if let Some(cursor) = cursor {
                query.append_pair("max_id", cursor);
            }
        }

        let feed: FeedResponse = self.get_json(&url, "user feed").await?;
        let page = PostPage::from(feed);
        tracing::debug!(
            username = %profile.username,
            posts = page.posts.len(),
            has_more = page.next_cursor.is_some(),
            "fetched feed page"
        );
        Ok(page)
    }
}
