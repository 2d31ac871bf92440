// Integration tests for `NbiClient` using wiremock.

use futures_util::{StreamExt, pin_mut};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nce_api::{Error, NbiClient, paging};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, NbiClient) {
    let server = MockServer::start().await;
    let client = NbiClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

// ── Token endpoints ─────────────────────────────────────────────────

#[tokio::test]
async fn test_obtain_token_nested() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/controller/v2/tokens"))
        .and(body_json(json!({"userName": "admin@ac.branch", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errcode": "0",
            "data": { "token_id": "CA48D152F6B19D84", "expiredDate": "2026-01-01 00:00:00" }
        })))
        .mount(&server)
        .await;

    let token = client
        .obtain_token("admin@ac.branch", &SecretString::from("secret"))
        .await
        .unwrap();

    assert_eq!(token.expose_secret(), "CA48D152F6B19D84");
}

#[tokio::test]
async fn test_obtain_token_flattened() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/controller/v2/tokens"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "token_id": "FLAT-TOKEN" })),
        )
        .mount(&server)
        .await;

    let token = client
        .obtain_token("admin", &SecretString::from("pw"))
        .await
        .unwrap();

    assert_eq!(token.expose_secret(), "FLAT-TOKEN");
}

#[tokio::test]
async fn test_obtain_token_missing_in_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/controller/v2/tokens"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "errcode": "0" })))
        .mount(&server)
        .await;

    let err = client
        .obtain_token("admin", &SecretString::from("pw"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::TokenMissing { .. }));
}

#[tokio::test]
async fn test_obtain_token_bad_credentials() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/controller/v2/tokens"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errcode": "1001", "errmsg": "invalid user name or password"
        })))
        .mount(&server)
        .await;

    let err = client
        .obtain_token("admin", &SecretString::from("wrong"))
        .await
        .unwrap_err();

    match err {
        Error::Authentication { message } => {
            assert!(message.contains("invalid user name or password"));
        }
        other => panic!("expected Authentication, got {other:?}"),
    }
}

#[tokio::test]
async fn test_revoke_token() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/controller/v2/tokens"))
        .and(body_json(json!({"token": "CA48D152F6B19D84"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"errcode": "0"})))
        .expect(1)
        .mount(&server)
        .await;

    client
        .revoke_token(&SecretString::from("CA48D152F6B19D84"))
        .await
        .unwrap();
}

// ── Error parsing ───────────────────────────────────────────────────

#[tokio::test]
async fn test_api_error_carries_errcode_and_errmsg() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/controller/campus/v3/sites"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "errcode": "1399", "errmsg": "internal error"
        })))
        .mount(&server)
        .await;

    let err = client
        .get::<Value>("/controller/campus/v3/sites", &[])
        .await
        .unwrap_err();

    match err {
        Error::Api { status, message, code } => {
            assert_eq!(status, 500);
            assert_eq!(message, "internal error");
            assert_eq!(code.as_deref(), Some("1399"));
        }
        other => panic!("expected Api, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unauthorized_maps_to_authentication() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/controller/campus/v3/sites"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client
        .get::<Value>("/controller/campus/v3/sites", &[])
        .await
        .unwrap_err();

    assert!(err.is_auth_expired());
}

#[tokio::test]
async fn test_empty_success_body_is_null() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/controller/campus/v3/sites"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let resp: Value = client
        .delete("/controller/campus/v3/sites", Some(&json!({"ids": ["x"]})))
        .await
        .unwrap();

    assert!(resp.is_null());
}

// ── Paged fetcher ───────────────────────────────────────────────────

#[tokio::test]
async fn test_paged_walks_all_pages() {
    let (server, client) = setup().await;

    // Full first page (pageSize 2) -> second short page -> stop.
    Mock::given(method("GET"))
        .and(path("/controller/campus/v3/sites"))
        .and(query_param("pageIndex", "0"))
        .and(query_param("pageSize", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "a", "name": "S1"}, {"id": "b", "name": "S2"}],
            "totalRecords": 3
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/controller/campus/v3/sites"))
        .and(query_param("pageIndex", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "c", "name": "S3"}],
            "totalRecords": 3
        })))
        .expect(1)
        .mount(&server)
        .await;

    let stream = paging::paged(&client, "/controller/campus/v3/sites", &[], 2);
    pin_mut!(stream);

    let mut names = Vec::new();
    while let Some(record) = stream.next().await {
        let record = record.unwrap();
        names.push(record["name"].as_str().unwrap().to_owned());
    }

    assert_eq!(names, ["S1", "S2", "S3"]);
}

#[tokio::test]
async fn test_paged_early_drop_stops_fetching() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/controller/campus/v3/devices"))
        .and(query_param("pageIndex", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "a"}, {"id": "b"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    // The second page must never be requested when the consumer stops early.
    Mock::given(method("GET"))
        .and(path("/controller/campus/v3/devices"))
        .and(query_param("pageIndex", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(0)
        .mount(&server)
        .await;

    let stream = paging::paged(&client, "/controller/campus/v3/devices", &[], 2);
    pin_mut!(stream);

    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(first["id"], "a");
    drop(stream);
}

#[tokio::test]
async fn test_paged_passes_filters() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/controller/campus/v3/sites"))
        .and(query_param("name", "Siege"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "a", "name": "Siege"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let filters = vec![("name".to_owned(), "Siege".to_owned())];
    let stream = paging::paged(&client, "/controller/campus/v3/sites", &filters, 100);
    pin_mut!(stream);

    let record = stream.next().await.unwrap().unwrap();
    assert_eq!(record["name"], "Siege");
    assert!(stream.next().await.is_none());
}
