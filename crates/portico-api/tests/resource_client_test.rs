// Integration tests for `ResourceClient` using wiremock.
#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use portico_api::client::paginate_all;
use portico_api::{Credentials, Error, Page, ResourceClient, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ResourceClient) {
    let server = MockServer::start().await;
    let base = format!("{}/api", server.uri());
    let client = ResourceClient::from_reqwest(&base, reqwest::Client::new()).unwrap();
    (server, client)
}

fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

// ── Reads ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_sends_page_and_filter_params() {
    let (server, client) = setup().await;

    let body = json!({
        "items": [
            { "id": 1, "title": "Flood warning" },
            { "id": 2, "title": "Flood cleanup" }
        ],
        "totalItems": 12
    });

    Mock::given(method("GET"))
        .and(path("/api/announcements"))
        .and(query_param("PageNumber", "1"))
        .and(query_param("PageSize", "10"))
        .and(query_param("SearchTerm", "flood"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let page: Page<Value> = client
        .list(
            "announcements",
            &params(&[("PageNumber", "1"), ("PageSize", "10"), ("SearchTerm", "flood")]),
        )
        .await
        .unwrap();

    assert_eq!(page.total_items, 12);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[1]["title"], "Flood cleanup");
}

#[tokio::test]
async fn test_list_repeats_array_keys() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/news"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [], "totalItems": 0
        })))
        .mount(&server)
        .await;

    let _: Page<Value> = client
        .list("news", &params(&[("Tags", "civic"), ("Tags", "parks")]))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.query(), Some("Tags=civic&Tags=parks"));
}

#[tokio::test]
async fn test_get_by_id() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/users/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 42, "username": "mhale", "email": "mhale@example.org"
        })))
        .mount(&server)
        .await;

    let user: Value = client.get("users", "42").await.unwrap();
    assert_eq!(user["username"], "mhale");
}

// ── Writes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_with_empty_response_body() {
    let (server, client) = setup().await;

    let payload = json!({ "title": "Road closure", "isPinned": false, "pinnedOrder": 0 });

    Mock::given(method("POST"))
        .and(path("/api/announcements"))
        .and(body_json(&payload))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let created: Option<Value> = client.create("announcements", &payload).await.unwrap();
    assert!(created.is_none());
}

#[tokio::test]
async fn test_update_returns_record() {
    let (server, client) = setup().await;

    let payload = json!({ "name": "Editors", "permissions": ["news.write"] });

    Mock::given(method("PUT"))
        .and(path("/api/roles/7"))
        .and(body_json(&payload))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7, "name": "Editors", "permissions": ["news.write"]
        })))
        .mount(&server)
        .await;

    let updated: Option<Value> = client.update("roles", "7", &payload).await.unwrap();
    assert_eq!(updated.unwrap()["name"], "Editors");
}

#[tokio::test]
async fn test_delete() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/documents/abc-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.delete("documents", "abc-1").await.unwrap();
}

// ── Transitions ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_publish_scheduled_and_immediate() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/news/5/publish"))
        .and(body_json(json!({ "publishAt": "2026-11-01T09:00:00.000Z" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/news/6/publish"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let _: Option<Value> = client
        .publish("news", "5", Some("2026-11-01T09:00:00.000Z".into()))
        .await
        .unwrap();
    let _: Option<Value> = client.publish("news", "6", None).await.unwrap();
}

#[tokio::test]
async fn test_pin_unpin_archive() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/galleries/3/pin"))
        .and(body_json(json!({ "pinnedOrder": 2 })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/galleries/3/unpin"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/violations/9/archive"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 9, "status": "Archived"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let _: Option<Value> = client.pin("galleries", "3", 2).await.unwrap();
    let _: Option<Value> = client.unpin("galleries", "3").await.unwrap();
    let archived: Option<Value> = client.archive("violations", "9").await.unwrap();
    assert_eq!(archived.unwrap()["status"], "Archived");
}

// ── Auth headers ────────────────────────────────────────────────────

#[tokio::test]
async fn test_bearer_and_api_key_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/roles"))
        .and(header("authorization", "Bearer t0k"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [], "totalItems": 0
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(header("x-api-key", "svc-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [], "totalItems": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let bearer = ResourceClient::new(
        &server.uri(),
        &Credentials::Bearer {
            token: SecretString::from("t0k".to_string()),
        },
        &TransportConfig::default(),
    )
    .unwrap();
    let keyed = ResourceClient::new(
        &server.uri(),
        &Credentials::ApiKey {
            key: SecretString::from("svc-key".to_string()),
        },
        &TransportConfig::default(),
    )
    .unwrap();

    let _: Page<Value> = bearer.list("roles", &[]).await.unwrap();
    let _: Page<Value> = keyed.list("users", &[]).await.unwrap();
}

// ── Error handling ──────────────────────────────────────────────────

#[tokio::test]
async fn test_validation_error_carries_message_and_fields() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "Email already registered",
            "code": "duplicate_email",
            "errors": { "email": ["Email already registered"] }
        })))
        .mount(&server)
        .await;

    let err = client
        .create::<Value, _>("users", &json!({ "email": "a@b.c" }))
        .await
        .unwrap_err();

    assert_eq!(err.remote_message(), Some("Email already registered"));
    assert_eq!(err.api_error_code(), Some("duplicate_email"));
    assert_eq!(
        err.field_errors().unwrap()["email"],
        vec!["Email already registered".to_string()]
    );
}

#[tokio::test]
async fn test_401_is_unauthorized() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/roles"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client.list::<Value>("roles", &[]).await.unwrap_err();
    assert!(matches!(err, Error::Unauthorized));
    assert!(err.is_auth_error());
}

#[tokio::test]
async fn test_404_is_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/documents/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "title": "Not Found",
            "detail": "Document missing does not exist"
        })))
        .mount(&server)
        .await;

    let err = client.get::<Value>("documents", "missing").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.remote_message(), Some("Not Found"));
}

#[tokio::test]
async fn test_malformed_success_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/news"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
        .mount(&server)
        .await;

    let err = client.list::<Value>("news", &[]).await.unwrap_err();
    match err {
        Error::Deserialization { body, .. } => assert_eq!(body, "<html>proxy</html>"),
        other => panic!("expected deserialization error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_slow_response_reports_configured_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/roles"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "items": [], "totalItems": 0 }))
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = ResourceClient::new(
        &format!("{}/api", server.uri()),
        &Credentials::Anonymous,
        &TransportConfig {
            timeout: std::time::Duration::from_secs(1),
            ..TransportConfig::default()
        },
    )
    .unwrap();

    let err = client.list::<Value>("roles", &[]).await.unwrap_err();
    assert!(
        matches!(err, Error::Timeout { timeout_secs: 1 }),
        "expected timeout, got {err:?}"
    );
    assert!(err.is_transient());
}

// ── Pagination ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_paginate_all_stops_at_total() {
    let (server, client) = setup().await;

    for (page, ids) in [("1", vec![1, 2]), ("2", vec![3, 4]), ("3", vec![5])] {
        let items: Vec<Value> = ids.into_iter().map(|id| json!({ "id": id })).collect();
        Mock::given(method("GET"))
            .and(path("/api/violations"))
            .and(query_param("PageNumber", page))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": items, "totalItems": 5
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let all: Vec<Value> = paginate_all(2, |page_number, page_size| {
        let client = &client;
        async move {
            let query = [
                ("PageNumber".to_owned(), page_number.to_string()),
                ("PageSize".to_owned(), page_size.to_string()),
            ];
            client.list("violations", &query).await
        }
    })
    .await
    .unwrap();

    let ids: Vec<i64> = all.iter().map(|v| v["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}
