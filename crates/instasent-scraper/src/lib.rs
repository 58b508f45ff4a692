//! Instagram profile source for instasent.
//!
//! Holds the authenticated web session, resolves usernames to profiles, pages
//! through a profile's feed most-recent-first, and downloads post images.
//! Upstream failures are typed so callers can retry on rate limits without
//! inspecting error text.

pub mod client;
pub mod error;
pub mod image;
pub mod retry;
pub mod source;
pub mod stream;
pub mod types;

mod response;

pub use client::{InstagramClient, InstagramClientConfig};
pub use error::ScraperError;
pub use image::{HttpImageFetcher, ImageFetcher};
pub use retry::{with_retry, Classify, FailureKind, RetryPolicy};
pub use source::ProfileSource;
pub use stream::PostStream;
pub use types::{Post, PostPage, Profile};
