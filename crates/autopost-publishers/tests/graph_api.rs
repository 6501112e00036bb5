// Publishers against a local mock of the Graph API.

use std::time::Duration;

use autopost_core::config::{FacebookConfig, GraphConfig, InstagramConfig};
use autopost_publishers::{
    FacebookPublisher, GraphClient, InstagramPublisher, PostRequest, PublishError, Publisher,
};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn graph(server: &MockServer, timeout_secs: u64) -> GraphClient {
    GraphClient::new(&GraphConfig {
        base_url: server.uri(),
        request_timeout_secs: timeout_secs,
    })
    .unwrap()
}

fn facebook(server: &MockServer) -> FacebookPublisher {
    FacebookPublisher::new(
        graph(server, 5),
        FacebookConfig {
            page_id: "1000".into(),
            access_token: "fb-default".into(),
        },
    )
}

fn instagram(server: &MockServer) -> InstagramPublisher {
    InstagramPublisher::new(
        graph(server, 5),
        InstagramConfig {
            account_id: "2000".into(),
            access_token: "ig-default".into(),
        },
    )
}

fn caption(text: &str) -> PostRequest {
    PostRequest {
        caption: text.into(),
        ..PostRequest::default()
    }
}

#[tokio::test]
async fn facebook_text_post_uses_feed_with_default_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1000/feed"))
        .and(body_string_contains("message=Hello"))
        .and(body_string_contains("access_token=fb-default"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "123" })))
        .expect(1)
        .mount(&server)
        .await;

    let posted = facebook(&server).publish(&caption("Hello")).await.unwrap();
    assert_eq!(posted.platform, "facebook");
    assert_eq!(posted.post_id, "123");
}

#[tokio::test]
async fn facebook_image_post_uses_photos_and_row_overrides() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/555/photos"))
        .and(body_string_contains("url=https%3A%2F%2Fcdn.example.com%2Fa.jpg"))
        .and(body_string_contains("access_token=row-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "p1", "post_id": "555_1" })))
        .expect(1)
        .mount(&server)
        .await;

    let post = PostRequest {
        caption: "Pic".into(),
        image_url: Some("https://cdn.example.com/a.jpg".into()),
        access_token: Some("row-token".into()),
        account_id: Some("555".into()),
    };
    let posted = facebook(&server).publish(&post).await.unwrap();
    assert_eq!(posted.post_id, "p1");
}

#[tokio::test]
async fn rejection_cause_carries_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1000/feed"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad token"))
        .mount(&server)
        .await;

    let err = facebook(&server).publish(&caption("Hello")).await.unwrap_err();
    assert!(matches!(err, PublishError::Rejected { status: 400, .. }));
    assert_eq!(err.to_string(), "HTTP 400: bad token");
}

#[tokio::test]
async fn success_status_without_id_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1000/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;

    let err = facebook(&server).publish(&caption("Hello")).await.unwrap_err();
    assert!(matches!(err, PublishError::UnexpectedResponse { .. }));
}

#[tokio::test]
async fn slow_api_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1000/feed"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "id": "late" }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let publisher = FacebookPublisher::new(
        graph(&server, 1),
        FacebookConfig {
            page_id: "1000".into(),
            access_token: "t".into(),
        },
    );
    let err = publisher.publish(&caption("Hello")).await.unwrap_err();
    assert!(matches!(err, PublishError::Timeout { secs: 1, .. }), "got {err:?}");
}

#[tokio::test]
async fn missing_default_credentials_fail_without_a_request() {
    let server = MockServer::start().await;
    let publisher = FacebookPublisher::new(graph(&server, 5), FacebookConfig::default());

    let err = publisher.publish(&caption("Hello")).await.unwrap_err();
    assert!(matches!(err, PublishError::MissingCredential { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn instagram_without_image_sends_nothing() {
    let server = MockServer::start().await;

    let err = instagram(&server).publish(&caption("Hi")).await.unwrap_err();
    assert_eq!(err.to_string(), "Instagram requires an image");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn instagram_creates_then_publishes_container() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/2000/media"))
        .and(body_string_contains("image_url=https%3A%2F%2Fcdn.example.com%2Fb.jpg"))
        .and(body_string_contains("caption=Hi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "container-9" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/2000/media_publish"))
        .and(body_string_contains("creation_id=container-9"))
        .and(body_string_contains("access_token=ig-default"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "ig-post-1" })))
        .expect(1)
        .mount(&server)
        .await;

    let post = PostRequest {
        caption: "Hi".into(),
        image_url: Some("https://cdn.example.com/b.jpg".into()),
        ..PostRequest::default()
    };
    let posted = instagram(&server).publish(&post).await.unwrap();
    assert_eq!(posted.platform, "instagram");
    assert_eq!(posted.post_id, "ig-post-1");
}

#[tokio::test]
async fn failed_container_creation_skips_publish() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/2000/media"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid image"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/2000/media_publish"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "never" })))
        .expect(0)
        .mount(&server)
        .await;

    let post = PostRequest {
        caption: "Hi".into(),
        image_url: Some("https://cdn.example.com/b.jpg".into()),
        ..PostRequest::default()
    };
    let err = instagram(&server).publish(&post).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "media container creation failed: HTTP 400: invalid image"
    );
}

#[tokio::test]
async fn failed_publish_phase_is_reported_after_container_creation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/2000/media"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "c1" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/2000/media_publish"))
        .and(body_string_contains("creation_id=c1"))
        .respond_with(ResponseTemplate::new(400).set_body_string("container not ready"))
        .expect(1)
        .mount(&server)
        .await;

    let post = PostRequest {
        caption: "Hi".into(),
        image_url: Some("https://cdn.example.com/b.jpg".into()),
        ..PostRequest::default()
    };
    let err = instagram(&server).publish(&post).await.unwrap_err();
    assert!(
        err.to_string().starts_with("media publish failed: "),
        "got {err}"
    );
    assert!(matches!(err, PublishError::Step { step: "media publish", .. }));
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn refused_connection_is_a_connection_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let graph = GraphClient::new(&GraphConfig {
        base_url: format!("http://127.0.0.1:{port}"),
        request_timeout_secs: 5,
    })
    .unwrap();
    let publisher = FacebookPublisher::new(
        graph,
        FacebookConfig {
            page_id: "1000".into(),
            access_token: "t".into(),
        },
    );

    let err = publisher.publish(&caption("Hello")).await.unwrap_err();
    assert!(matches!(err, PublishError::Connection { .. }), "got {err:?}");
    assert!(err.to_string().starts_with("cannot connect to 1000/feed"));
}
