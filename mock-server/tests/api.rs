use std::convert::Infallible;

use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Record, PAGE_SIZE};
use tower::{Service, ServiceExt};

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

fn create_body(name: &str, email: &str) -> String {
    format!(r#"{{"name":"{name}","email":"{email}","currentTime":"2024-01-01T00:00:00.000Z"}}"#)
}

/// Sends one request through a shared service so state persists between calls.
async fn send<S>(app: &mut S, request: Request<String>) -> axum::response::Response
where
    S: Service<Request<String>, Response = axum::response::Response, Error = Infallible>,
{
    ServiceExt::ready(app)
        .await
        .unwrap()
        .call(request)
        .await
        .unwrap()
}

// --- list ---

#[tokio::test]
async fn list_records_empty() {
    let resp = app()
        .oneshot(empty_request("GET", "/records?page=1&search=&isDeleted=false"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let records: Vec<Record> = body_json(resp).await;
    assert!(records.is_empty());
}

#[tokio::test]
async fn list_records_page_zero_returns_400() {
    let resp = app()
        .oneshot(empty_request("GET", "/records?page=0"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_records_pages_and_searches() {
    let mut app = app().into_service();
    for i in 0..(PAGE_SIZE + 2) {
        let name = if i % 2 == 0 { format!("Even{i}") } else { format!("Odd{i}") };
        let resp = send(&mut app, json_request("POST", "/records", &create_body(&name, "x@x.com"))).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = send(&mut app, empty_request("GET", "/records?page=2&search=&isDeleted=false")).await;
    let second: Vec<Record> = body_json(resp).await;
    assert_eq!(second.len(), 2);
    assert_eq!(second[0].id, PAGE_SIZE as i64 + 1);

    let resp = send(&mut app, empty_request("GET", "/records?page=1&search=even&isDeleted=false")).await;
    let evens: Vec<Record> = body_json(resp).await;
    assert_eq!(evens.len(), (PAGE_SIZE + 2) / 2);
    assert!(evens.iter().all(|r| r.name.starts_with("Even")));
}

// --- create ---

#[tokio::test]
async fn create_record_returns_201() {
    let resp = app()
        .oneshot(json_request("POST", "/records", &create_body("Bob", "bob@x.com")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let record: Record = body_json(resp).await;
    assert_eq!(record.id, 1);
    assert_eq!(record.name, "Bob");
    assert!(!record.is_deleted);
}

#[tokio::test]
async fn create_record_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/records", r#"{"not_name":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- update ---

#[tokio::test]
async fn update_record_not_found() {
    let resp = app()
        .oneshot(json_request("PUT", "/records/42", &create_body("Nope", "n@x.com")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_record_bad_id_returns_400() {
    let resp = app()
        .oneshot(json_request("PUT", "/records/abc", &create_body("Nope", "n@x.com")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- delete ---

#[tokio::test]
async fn delete_record_not_found() {
    let resp = app()
        .oneshot(empty_request("DELETE", "/records/42"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- full lifecycle ---

#[tokio::test]
async fn soft_delete_lifecycle() {
    let mut app = app().into_service();

    // create
    let resp = send(&mut app, json_request("POST", "/records", &create_body("Walk dog", "w@x.com"))).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Record = body_json(resp).await;
    let id = created.id;

    // update
    let resp = send(
        &mut app,
        json_request(
            "PUT",
            &format!("/records/{id}"),
            &format!(r#"{{"id":{id},"name":"Walk cat","email":"w@x.com","currentTime":"2024-02-02T00:00:00.000Z","isDeleted":false}}"#),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Record = body_json(resp).await;
    assert_eq!(updated.name, "Walk cat");
    assert_eq!(updated.current_time, "2024-02-02T00:00:00.000Z");

    // delete
    let resp = send(&mut app, empty_request("DELETE", &format!("/records/{id}"))).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    // default listing hides it
    let resp = send(&mut app, empty_request("GET", "/records?page=1&search=&isDeleted=false")).await;
    let visible: Vec<Record> = body_json(resp).await;
    assert!(visible.is_empty());

    // showDeleted brings it back, flagged
    let resp = send(
        &mut app,
        empty_request("GET", "/records?page=1&search=&isDeleted=false&showDeleted=true"),
    )
    .await;
    let all: Vec<Record> = body_json(resp).await;
    assert_eq!(all.len(), 1);
    assert!(all[0].is_deleted);

    // so does the isDeleted toggle
    let resp = send(&mut app, empty_request("GET", "/records?page=1&search=&isDeleted=true")).await;
    let toggled: Vec<Record> = body_json(resp).await;
    assert_eq!(toggled.len(), 1);
}
