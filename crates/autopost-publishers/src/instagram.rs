use async_trait::async_trait;
use autopost_core::config::InstagramConfig;
use tracing::info;

use crate::{
    error::PublishError,
    graph::GraphClient,
    publisher::Publisher,
    types::{resolve, PostRequest, PublishResult, PublishedPost},
};

const PLATFORM: &str = "instagram";

/// Publishes an image post to an Instagram business account.
///
/// Two calls: create a media container from the image URL, then publish
/// that container. Instagram has no text-only posts, so a request without an
/// image fails before anything is sent.
pub struct InstagramPublisher {
    graph: GraphClient,
    defaults: InstagramConfig,
}

impl InstagramPublisher {
    pub fn new(graph: GraphClient, defaults: InstagramConfig) -> Self {
        Self { graph, defaults }
    }
}

#[async_trait]
impl Publisher for InstagramPublisher {
    fn name(&self) -> &str {
        PLATFORM
    }

    async fn publish(&self, post: &PostRequest) -> PublishResult {
        let image_url = post.image().ok_or(PublishError::MissingImage {
            platform: "Instagram",
        })?;
        let account_id = resolve(post.account_id.as_deref(), &self.defaults.account_id).ok_or(
            PublishError::MissingCredential {
                platform: "Instagram",
                what: "account id",
            },
        )?;
        let token = resolve(post.access_token.as_deref(), &self.defaults.access_token).ok_or(
            PublishError::MissingCredential {
                platform: "Instagram",
                what: "access token",
            },
        )?;

        let creation_id = self
            .graph
            .create(
                account_id,
                "media",
                &[
                    ("image_url", image_url),
                    ("caption", post.caption.as_str()),
                    ("access_token", token),
                ],
            )
            .await
            .map_err(|e| e.in_step("media container creation"))?;
        info!(account_id, %creation_id, "instagram media container created");

        let post_id = self
            .graph
            .create(
                account_id,
                "media_publish",
                &[("creation_id", creation_id.as_str()), ("access_token", token)],
            )
            .await
            .map_err(|e| e.in_step("media publish"))?;

        Ok(PublishedPost {
            platform: PLATFORM.to_string(),
            post_id,
        })
    }
}
