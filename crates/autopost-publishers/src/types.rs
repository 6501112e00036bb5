use autopost_core::Job;
use serde::{Deserialize, Serialize};

use crate::error::PublishError;

/// Platform-neutral description of one post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRequest {
    pub caption: String,
    /// Publicly reachable image URL.
    pub image_url: Option<String>,
    /// Overrides the publisher's default token when set.
    pub access_token: Option<String>,
    /// Overrides the publisher's default page / account id when set.
    pub account_id: Option<String>,
}

impl PostRequest {
    pub fn from_job(job: &Job) -> Self {
        Self {
            caption: job.caption.clone(),
            image_url: job.image.clone(),
            access_token: job.token.clone(),
            account_id: job.account_id.clone(),
        }
    }

    /// Image URL, treating a blank string as absent.
    pub fn image(&self) -> Option<&str> {
        non_blank(self.image_url.as_deref())
    }
}

/// A post the platform accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedPost {
    pub platform: String,
    pub post_id: String,
}

pub type PublishResult = Result<PublishedPost, PublishError>;

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Row value if present, otherwise the configured default.
pub(crate) fn resolve<'a>(row: Option<&'a str>, default: &'a str) -> Option<&'a str> {
    non_blank(row).or_else(|| non_blank(Some(default)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_value_wins_over_default() {
        assert_eq!(resolve(Some("row-token"), "default"), Some("row-token"));
        assert_eq!(resolve(Some("  "), "default"), Some("default"));
        assert_eq!(resolve(None, "default"), Some("default"));
        assert_eq!(resolve(None, ""), None);
    }

    #[test]
    fn blank_image_counts_as_missing() {
        let post = PostRequest {
            image_url: Some("   ".into()),
            ..PostRequest::default()
        };
        assert!(post.image().is_none());
    }
}
