use std::collections::HashMap;

use autopost_core::AutopostConfig;
use tracing::info;

use crate::{
    facebook::FacebookPublisher, graph::GraphClient, instagram::InstagramPublisher,
    publisher::Publisher,
};

/// Lookup table from platform name to the publisher that serves it.
///
/// Names are matched case-insensitively, so a row saying `Facebook` or
/// `FACEBOOK` reaches the same adapter.
pub struct PublisherRegistry {
    publishers: HashMap<String, Box<dyn Publisher>>,
}

impl PublisherRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            publishers: HashMap::new(),
        }
    }

    /// The Facebook and Instagram publishers sharing one Graph API client.
    pub fn with_defaults(graph: GraphClient, config: &AutopostConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(FacebookPublisher::new(
            graph.clone(),
            config.facebook.clone(),
        )));
        registry.register(Box::new(InstagramPublisher::new(
            graph,
            config.instagram.clone(),
        )));
        registry
    }

    /// Register a publisher under its [`Publisher::name`].
    ///
    /// A publisher already registered under the same name is replaced.
    pub fn register(&mut self, publisher: Box<dyn Publisher>) {
        let name = normalize(publisher.name());
        info!(platform = %name, "registering publisher");
        self.publishers.insert(name, publisher);
    }

    pub fn get(&self, platform: &str) -> Option<&dyn Publisher> {
        self.publishers
            .get(&normalize(platform))
            .map(|p| p.as_ref())
    }

    /// Registered platform names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.publishers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.publishers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.publishers.is_empty()
    }
}

impl Default for PublisherRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(platform: &str) -> String {
    platform.trim().to_lowercase()
}
