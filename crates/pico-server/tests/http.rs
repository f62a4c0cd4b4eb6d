//! End-to-end exercises of the HTTP surface against an in-memory silo.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::util::ServiceExt;

use pico_feed::{Feed, SecretKey};
use pico_server::{build_router, AppState, ServerConfig, FEED_CONTENT_TYPE};
use pico_silo::Silo;
use pico_store::MemoryKv;
use pico_wire::{pack, Headers, PackOptions};

const HTML: &str = "<!doctype html>\n<html><head><title>PicoWEB title</title></head>\
                    <body><h1>Hello World</h1></body></html>\n";

fn app_with_config(config: ServerConfig) -> Router {
    let silo = Arc::new(Silo::new(Arc::new(MemoryKv::new())));
    build_router(AppState {
        silo,
        config: Arc::new(config),
    })
}

fn app() -> Router {
    app_with_config(ServerConfig::default())
}

fn packed(sk: &SecretKey, html: &str) -> Vec<u8> {
    pack(
        html,
        PackOptions {
            secret: Some(sk),
            ..Default::default()
        },
    )
    .unwrap()
    .encode()
}

fn post_feed(key_hex: &str, bytes: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/{key_hex}"))
        .header(header::CONTENT_TYPE, FEED_CONTENT_TYPE)
        .header(header::CONTENT_LENGTH, bytes.len())
        .body(Body::from(bytes))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 2 * 1024 * 1024)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

// ---------------------------------------------------------------------------
// publish / fetch / list / hits
// ---------------------------------------------------------------------------

#[tokio::test]
async fn publish_fetch_list_and_hit_accounting() {
    let app = app();
    let sk = SecretKey::generate();
    let key = sk.public_key().to_hex();

    // Publish.
    let res = app
        .clone()
        .oneshot(post_feed(&key, packed(&sk, HTML)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(body_json(res).await, serde_json::json!({ "done": true }));

    // Listing shows the site, untouched by any visit yet.
    let res = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let listing = body_json(res).await;
    let rows = listing.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["key"], key.as_str());
    assert_eq!(rows[0]["title"], "PicoWEB title");
    assert_eq!(rows[0]["runlevel"], 0);
    assert_eq!(rows[0]["hits"], 0);
    assert!(rows[0]["signature"].as_str().unwrap().len() == 128);

    // Fetch renders the HTML and counts the visit.
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/{key}"))
                .header(header::ACCEPT, "text/html")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    assert_eq!(body_bytes(res).await, HTML.as_bytes());

    // Stat reflects the visit without adding one.
    for expected_hits in [1, 1] {
        let res = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/stat/{key}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let stat = body_json(res).await;
        assert_eq!(stat["hits"], expected_hits);
        assert_eq!(stat["title"], "PicoWEB title");
    }
}

#[tokio::test]
async fn fetch_as_feed_returns_raw_bytes() {
    let app = app();
    let sk = SecretKey::generate();
    let key = sk.public_key().to_hex();
    let bytes = packed(&sk, HTML);

    let res = app
        .clone()
        .oneshot(post_feed(&key, bytes.clone()))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = app
        .oneshot(
            Request::builder()
                .uri(format!("/{key}"))
                .header(header::ACCEPT, FEED_CONTENT_TYPE)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers().get(header::CONTENT_TYPE).unwrap(),
        FEED_CONTENT_TYPE,
    );
    let served = body_bytes(res).await;
    assert_eq!(served, bytes);
    Feed::decode(&served).unwrap();
}

#[tokio::test]
async fn site_headers_are_relayed_on_html_fetch() {
    let app = app();
    let sk = SecretKey::generate();
    let key = sk.public_key().to_hex();
    let feed = pack(
        HTML,
        PackOptions {
            secret: Some(&sk),
            extra_headers: Headers::from_iter([("x-powered-by", "picoweb")]),
            ..Default::default()
        },
    )
    .unwrap();

    let res = app
        .clone()
        .oneshot(post_feed(&key, feed.encode()))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = app
        .oneshot(
            Request::builder()
                .uri(format!("/{key}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers().get("x-powered-by").unwrap(), "picoweb");
    assert_eq!(res.headers().get("key").unwrap(), key.as_str());
}

// ---------------------------------------------------------------------------
// rejections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn post_to_wrong_key_is_unauthorized() {
    let app = app();
    let sk = SecretKey::generate();
    let other = SecretKey::generate().public_key().to_hex();

    let res = app.oneshot(post_feed(&other, packed(&sk, HTML))).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(res).await,
        serde_json::json!({ "error": "verification failed" })
    );
}

#[tokio::test]
async fn resubmission_is_not_modified() {
    let app = app();
    let sk = SecretKey::generate();
    let key = sk.public_key().to_hex();
    let bytes = packed(&sk, HTML);

    let res = app
        .clone()
        .oneshot(post_feed(&key, bytes.clone()))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = app.oneshot(post_feed(&key, bytes)).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_MODIFIED);
}

#[tokio::test]
async fn garbage_body_is_bad_request() {
    let app = app();
    let key = SecretKey::generate().public_key().to_hex();

    let res = app
        .oneshot(post_feed(&key, b"not a feed at all".to_vec()))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(res).await["error"].is_string());
}

#[tokio::test]
async fn invalid_hex_key_is_bad_request() {
    let app = app();
    let res = app
        .oneshot(
            Request::builder()
                .uri("/not-hex")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_key_is_not_found() {
    let app = app();
    let key = SecretKey::generate().public_key().to_hex();

    for uri in [format!("/{key}"), format!("/stat/{key}")] {
        let res = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}

// ---------------------------------------------------------------------------
// ingestion discipline
// ---------------------------------------------------------------------------

fn post_with_length(key: &str, bytes: Vec<u8>, declared: usize) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/{key}"))
        .header(header::CONTENT_TYPE, FEED_CONTENT_TYPE)
        .header(header::CONTENT_LENGTH, declared)
        .body(Body::from(bytes))
        .unwrap()
}

#[tokio::test]
async fn missing_content_length_is_refused() {
    let app = app();
    let sk = SecretKey::generate();
    let key = sk.public_key().to_hex();

    let res = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/{key}"))
                .header(header::CONTENT_TYPE, FEED_CONTENT_TYPE)
                .body(Body::from(packed(&sk, HTML)))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::LENGTH_REQUIRED);
}

#[tokio::test]
async fn understated_length_is_overflow() {
    let app = app();
    let sk = SecretKey::generate();
    let key = sk.public_key().to_hex();
    let bytes = packed(&sk, HTML);
    let declared = bytes.len() - 1;

    let res = app
        .oneshot(post_with_length(&key, bytes, declared))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(res).await["error"]
        .as_str()
        .unwrap()
        .contains("overflow"));
}

#[tokio::test]
async fn overstated_length_is_underflow() {
    let app = app();
    let sk = SecretKey::generate();
    let key = sk.public_key().to_hex();
    let bytes = packed(&sk, HTML);
    let declared = bytes.len() + 100;

    let res = app
        .oneshot(post_with_length(&key, bytes, declared))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(res).await["error"]
        .as_str()
        .unwrap()
        .contains("underflow"));
}

#[tokio::test]
async fn declared_length_over_ceiling_is_too_large() {
    let config = ServerConfig {
        max_feed_size: 64,
        ..ServerConfig::default()
    };
    let app = app_with_config(config);
    let sk = SecretKey::generate();
    let key = sk.public_key().to_hex();

    let res = app
        .oneshot(post_feed(&key, packed(&sk, HTML)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn non_feed_content_type_is_refused() {
    let app = app();
    let sk = SecretKey::generate();
    let key = sk.public_key().to_hex();
    let bytes = packed(&sk, HTML);

    let res = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/{key}"))
                .header(header::CONTENT_TYPE, "application/octet-stream")
                .header(header::CONTENT_LENGTH, bytes.len())
                .body(Body::from(bytes))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

// ---------------------------------------------------------------------------
// versioning over HTTP
// ---------------------------------------------------------------------------

#[tokio::test]
async fn newer_version_replaces_older() {
    let app = app();
    let sk = SecretKey::generate();
    let key = sk.public_key().to_hex();

    // Versions carry explicit dates so ordering does not depend on the clock.
    let base = chrono::Utc::now().timestamp_millis() - 1_000;
    let encode = |date: i64, html: &str| {
        let body = format!(
            "html0\nkey: {}\ndate: {}\n\n{}",
            sk.public_key().to_hex(),
            date,
            html
        );
        let mut feed = Feed::new();
        feed.append(body.into_bytes(), &sk);
        feed.encode()
    };

    let res = app
        .clone()
        .oneshot(post_feed(&key, encode(base, "<p>v1</p>")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = app
        .clone()
        .oneshot(post_feed(&key, encode(base + 1, "<p>v2</p>")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    // Stale delivery of v1 again.
    let res = app
        .clone()
        .oneshot(post_feed(&key, encode(base, "<p>v1</p>")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_MODIFIED);

    let res = app
        .oneshot(
            Request::builder()
                .uri(format!("/{key}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_bytes(res).await, b"<p>v2</p>");
}
