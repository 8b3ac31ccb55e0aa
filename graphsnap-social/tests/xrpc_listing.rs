use graphsnap_common::GraphsnapError;
use graphsnap_fetch::{Backoff, FetchError, Paginator};
use graphsnap_social::bsky::{BskyClient, Relationship, SocialGraph, list};
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{
    bearer_token, body_json, method, path, query_param, query_param_is_missing,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ME: &str = "did:plc:me";

fn profiles(range: std::ops::Range<usize>) -> Vec<Value> {
    range
        .map(|i| json!({ "did": format!("did:plc:u{i}"), "handle": format!("u{i}.test") }))
        .collect()
}

fn fast_paginator() -> Paginator {
    Paginator::new(Backoff::new(5, Duration::from_millis(5)), 100, Duration::ZERO)
}

async fn server_with_session() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/xrpc/com.atproto.server.createSession"))
        .and(body_json(json!({ "identifier": "me.test", "password": "app-pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessJwt": "access-1",
            "refreshJwt": "refresh-1",
            "handle": "me.test",
            "did": ME
        })))
        .expect(1)
        .mount(&server)
        .await;
    server
}

async fn connect(server: &MockServer) -> BskyClient {
    BskyClient::connect(&server.uri(), "me.test", "app-pw")
        .await
        .expect("session")
}

#[tokio::test]
async fn following_walks_three_pages_in_order() {
    let server = server_with_session().await;

    Mock::given(method("GET"))
        .and(path("/xrpc/app.bsky.graph.getFollows"))
        .and(bearer_token("access-1"))
        .and(query_param("actor", ME))
        .and(query_param("limit", "100"))
        .and(query_param_is_missing("cursor"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "cursor": "T1", "follows": profiles(0..100) })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/xrpc/app.bsky.graph.getFollows"))
        .and(query_param("cursor", "T1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "cursor": "T2", "follows": profiles(100..200) })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/xrpc/app.bsky.graph.getFollows"))
        .and(query_param("cursor", "T2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "cursor": "", "follows": profiles(200..237) })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let accounts = list(&client, &fast_paginator(), Relationship::Following, ME)
        .await
        .unwrap();

    assert_eq!(accounts.len(), 237);
    for (i, account) in accounts.iter().enumerate() {
        assert_eq!(account.did, format!("did:plc:u{i}"));
        assert_eq!(account.handle, format!("u{i}.test"));
    }
}

#[tokio::test]
async fn empty_first_page_makes_one_call() {
    let server = server_with_session().await;
    Mock::given(method("GET"))
        .and(path("/xrpc/app.bsky.graph.getFollowers"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "cursor": "dangling", "followers": [] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let accounts = list(&client, &fast_paginator(), Relationship::Followers, ME)
        .await
        .unwrap();
    assert!(accounts.is_empty());
}

#[tokio::test]
async fn blocks_recover_from_throttling() {
    let server = server_with_session().await;
    Mock::given(method("GET"))
        .and(path("/xrpc/app.bsky.graph.getBlocks"))
        .respond_with(ResponseTemplate::new(429).set_body_json(
            json!({ "error": "RateLimitExceeded", "message": "Rate Limit Exceeded" }),
        ))
        .up_to_n_times(2)
        .with_priority(1)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/xrpc/app.bsky.graph.getBlocks"))
        .and(query_param_is_missing("actor"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "blocks": profiles(0..3) })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let accounts = list(&client, &fast_paginator(), Relationship::Blocks, ME)
        .await
        .unwrap();
    assert_eq!(accounts.len(), 3);
}

#[tokio::test]
async fn mutes_give_up_after_retry_budget() {
    let server = server_with_session().await;
    Mock::given(method("GET"))
        .and(path("/xrpc/app.bsky.graph.getMutes"))
        .and(query_param_is_missing("actor"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let paginator = Paginator::new(
        Backoff::new(2, Duration::from_millis(5)),
        100,
        Duration::ZERO,
    );
    let err = list(&client, &paginator, Relationship::Mutes, ME)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Exhausted { retries: 2, .. }));
    assert!(
        err.to_string()
            .starts_with("app.bsky.graph.getMutes page 1 failed after 2 retries")
    );
}

#[tokio::test]
async fn server_error_is_not_retried() {
    let server = server_with_session().await;
    Mock::given(method("GET"))
        .and(path("/xrpc/app.bsky.graph.getFollows"))
        .and(query_param_is_missing("cursor"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "cursor": "T1", "follows": profiles(0..100) })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/xrpc/app.bsky.graph.getFollows"))
        .and(query_param("cursor", "T1"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let err = list(&client, &fast_paginator(), Relationship::Following, ME)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Failed { .. }));
    assert_eq!(err.operation(), "app.bsky.graph.getFollows page 2");
}

#[tokio::test]
async fn self_id_resolves_profile_of_session_did() {
    let server = server_with_session().await;
    Mock::given(method("GET"))
        .and(path("/xrpc/app.bsky.actor.getProfile"))
        .and(query_param("actor", ME))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "did": ME,
            "handle": "me.test",
            "followersCount": 12,
            "followsCount": 34
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    assert_eq!(client.session().did, ME);
    assert_eq!(client.self_id().await.unwrap(), ME);
}

#[tokio::test]
async fn rejected_login_is_an_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/xrpc/com.atproto.server.createSession"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "AuthenticationRequired",
            "message": "Invalid identifier or password"
        })))
        .mount(&server)
        .await;

    let err = BskyClient::connect(&server.uri(), "me.test", "wrong")
        .await
        .unwrap_err();
    match err {
        GraphsnapError::Auth(msg) => assert!(msg.contains("Invalid identifier or password")),
        other => panic!("expected auth error, got {other:?}"),
    }
}

#[tokio::test]
async fn bad_instance_is_a_config_error() {
    let err = BskyClient::connect("not a url", "me.test", "pw")
        .await
        .unwrap_err();
    assert!(matches!(err, GraphsnapError::Config(_)));
}
