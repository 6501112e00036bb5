pub mod error;
pub mod facebook;
pub mod graph;
pub mod instagram;
pub mod publisher;
pub mod registry;
pub mod types;

pub use error::PublishError;
pub use facebook::FacebookPublisher;
pub use graph::GraphClient;
pub use instagram::InstagramPublisher;
pub use publisher::Publisher;
pub use registry::PublisherRegistry;
pub use types::{PostRequest, PublishResult, PublishedPost};
