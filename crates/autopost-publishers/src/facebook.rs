use async_trait::async_trait;
use autopost_core::config::FacebookConfig;
use tracing::info;

use crate::{
    error::PublishError,
    graph::GraphClient,
    publisher::Publisher,
    types::{resolve, PostRequest, PublishResult, PublishedPost},
};

const PLATFORM: &str = "facebook";

/// Publishes to a Facebook page: a photo post when the row carries an image,
/// a text feed post otherwise.
pub struct FacebookPublisher {
    graph: GraphClient,
    defaults: FacebookConfig,
}

impl FacebookPublisher {
    pub fn new(graph: GraphClient, defaults: FacebookConfig) -> Self {
        Self { graph, defaults }
    }
}

#[async_trait]
impl Publisher for FacebookPublisher {
    fn name(&self) -> &str {
        PLATFORM
    }

    async fn publish(&self, post: &PostRequest) -> PublishResult {
        let page_id = resolve(post.account_id.as_deref(), &self.defaults.page_id).ok_or(
            PublishError::MissingCredential {
                platform: "Facebook",
                what: "page id",
            },
        )?;
        let token = resolve(post.access_token.as_deref(), &self.defaults.access_token).ok_or(
            PublishError::MissingCredential {
                platform: "Facebook",
                what: "access token",
            },
        )?;

        let post_id = match post.image() {
            Some(url) => {
                info!(page_id, image = url, "publishing facebook photo post");
                self.graph
                    .create(
                        page_id,
                        "photos",
                        &[
                            ("message", post.caption.as_str()),
                            ("url", url),
                            ("access_token", token),
                        ],
                    )
                    .await?
            }
            None => {
                info!(page_id, "publishing facebook text post");
                self.graph
                    .create(
                        page_id,
                        "feed",
                        &[("message", post.caption.as_str()), ("access_token", token)],
                    )
                    .await?
            }
        };

        Ok(PublishedPost {
            platform: PLATFORM.to_string(),
            post_id,
        })
    }
}
