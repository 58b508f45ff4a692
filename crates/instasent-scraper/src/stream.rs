//! Lazy, page-at-a-time iteration over a profile's posts.

use std::collections::{HashSet, VecDeque};

use crate::error::ScraperError;
use crate::source::ProfileSource;
use crate::types::{Post, Profile};

/// Upper bound on feed pages requested for a single stream.
pub const MAX_PAGES: usize = 500;

/// Yields a profile's posts most-recent-first, fetching the next page only
/// when the buffered one is drained.
///
/// Callers that stop early never trigger requests for pages they do not
/// consume.
pub struct PostStream<'a> {
    source: &'a dyn ProfileSource,
    profile: &'a Profile,
    buffered: VecDeque<Post>,
    cursor: Option<String>,
    seen_cursors: HashSet<String>,
    exhausted: bool,
    pages: usize,
}

impl<'a> PostStream<'a> {
    #[must_use]
    pub fn new(source: &'a dyn ProfileSource, profile: &'a Profile) -> Self {
        Self {
            source,
            profile,
            buffered: VecDeque::new(),
            cursor: None,
            seen_cursors: HashSet::new(),
            exhausted: false,
            pages: 0,
        }
    }

    /// Returns the next post, or `None` once the feed is exhausted.
    ///
    /// # Errors
    ///
    /// Returns the source's error if a page fetch fails, or
    /// [`ScraperError::PaginationLimit`] after [`MAX_PAGES`] pages.
    pub async fn next_post(&mut self) -> Result<Option<Post>, ScraperError> {
        loop {
            if let Some(post) = self.buffered.pop_front() {
                return Ok(Some(post));
            }
            if self.exhausted {
                return Ok(None);
            }
            if self.pages >= MAX_PAGES {
                return Err(ScraperError::PaginationLimit {
                    username: self.profile.username.clone(),
                    max_pages: MAX_PAGES,
                });
            }

            let page = self
                .source
                .fetch_posts_page(self.profile, self.cursor.as_deref())
                .await?;
            self.pages += 1;

            match page.next_cursor {
                // Any cursor already followed leads back into pages already yielded.
                Some(next) if self.seen_cursors.insert(next.clone()) => {
                    self.cursor = Some(next);
                }
                Some(next) => {
                    tracing::warn!(
                        username = %self.profile.username,
                        cursor = %next,
                        "feed cursor cycled; ending stream"
                    );
                    self.exhausted = true;
                }
                None => self.exhausted = true,
            }
            self.buffered.extend(page.posts);
        }
    }
}
