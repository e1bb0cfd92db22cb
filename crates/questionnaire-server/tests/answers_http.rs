// crates/questionnaire-server/tests/answers_http.rs
// ============================================================================
// Module: Answer Precondition HTTP Tests
// Description: End-to-end If-Match enforcement on answer routes.
// Purpose: Verify ordering, status mapping, and headers over real HTTP.
// ============================================================================

//! Answer route tests against a live server.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use common::TestServer;
use common::header;
use reqwest::Method;
use reqwest::StatusCode;
use serde_json::Value;
use serde_json::json;

const ANSWER: &str = "/response-sets/rs-1/answers/q-1";

async fn seeded() -> (TestServer, String) {
    let server = TestServer::spawn().await;
    let answer = server.store.put_answer("rs-1", "q-1", json!("yes")).unwrap();
    (server, answer.etag)
}

async fn problem(response: reqwest::Response) -> Value {
    assert_eq!(header(&response, "content-type"), "application/problem+json");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["detail"], body["message"]);
    body
}

#[tokio::test]
async fn get_answer_returns_screen_and_generic_etags() {
    let (server, etag) = seeded().await;
    let response = server.request(Method::GET, ANSWER).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "screen-etag"), etag);
    assert_eq!(header(&response, "etag"), etag);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["value"], "yes");
    server.stop().await;
}

#[tokio::test]
async fn matching_if_match_applies_write_and_rotates_etag() {
    let (server, etag) = seeded().await;
    let response = server
        .write(Method::PATCH, ANSWER, &etag, r#"{"value":"no"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fresh = header(&response, "screen-etag");
    assert_ne!(fresh, etag);
    assert_eq!(server.store.answer("rs-1", "q-1").unwrap().value, json!("no"));
    server.stop().await;
}

#[tokio::test]
async fn weak_and_uppercase_validators_still_match() {
    let (server, etag) = seeded().await;
    let relaxed = format!("W/{}", etag.to_uppercase());
    let response = server
        .write(Method::PATCH, ANSWER, &relaxed, r#"{"value":"maybe"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    server.stop().await;
}

#[tokio::test]
async fn stale_etag_is_conflict_with_current_etag_headers() {
    let (server, etag) = seeded().await;
    let response = server
        .write(Method::PATCH, ANSWER, "\"stale\"", r#"{"value":"no"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(header(&response, "screen-etag"), etag);
    assert_eq!(header(&response, "etag"), etag);
    let body = problem(response).await;
    assert_eq!(body["code"], "PRE_IF_MATCH_ETAG_MISMATCH");
    assert_eq!(body["status"], 409);
    assert_eq!(server.store.answer("rs-1", "q-1").unwrap().value, json!("yes"));
    server.stop().await;
}

#[tokio::test]
async fn missing_if_match_is_precondition_required() {
    let (server, _) = seeded().await;
    let response = server
        .request(Method::PATCH, ANSWER)
        .header("content-type", "application/json")
        .body(r#"{"value":"no"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PRECONDITION_REQUIRED);
    let body = problem(response).await;
    assert_eq!(body["code"], "PRE_IF_MATCH_MISSING");
    server.stop().await;
}

#[tokio::test]
async fn body_is_not_parsed_before_the_guard_passes() {
    let (server, _) = seeded().await;
    let response = server
        .request(Method::PATCH, ANSWER)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PRECONDITION_REQUIRED);
    server.stop().await;
}

#[tokio::test]
async fn unsupported_content_type_wins_over_missing_if_match() {
    let (server, _) = seeded().await;
    let response = server
        .request(Method::PATCH, ANSWER)
        .header("content-type", "text/plain")
        .body("value=no")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body = problem(response).await;
    assert_eq!(body["code"], "PRE_REQUEST_CONTENT_TYPE_UNSUPPORTED");
    server.stop().await;
}

#[tokio::test]
async fn json_with_charset_parameter_is_accepted() {
    let (server, etag) = seeded().await;
    let response = server
        .request(Method::PATCH, ANSWER)
        .header("content-type", "Application/JSON; charset=utf-8")
        .header("if-match", etag)
        .body(r#"{"value":"no"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    server.stop().await;
}

#[tokio::test]
async fn malformed_if_match_is_invalid_format() {
    let (server, _) = seeded().await;
    let response = server
        .write(Method::PATCH, ANSWER, "\"unterminated", r#"{"value":"no"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = problem(response).await;
    assert_eq!(body["code"], "PRE_IF_MATCH_INVALID_FORMAT");
    server.stop().await;
}

#[tokio::test]
async fn unquoted_tokens_report_no_valid_tokens_with_current_etag() {
    let (server, etag) = seeded().await;
    let response = server
        .write(Method::PATCH, ANSWER, "foo, bar", r#"{"value":"no"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(header(&response, "screen-etag"), etag);
    let body = problem(response).await;
    assert_eq!(body["code"], "PRE_IF_MATCH_NO_VALID_TOKENS");
    server.stop().await;
}

#[tokio::test]
async fn wildcard_creates_a_new_response_set() {
    let server = TestServer::spawn().await;
    let response = server
        .write(Method::POST, "/response-sets/rs-new/answers/q-1", "*", r#"{"value":1}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!header(&response, "screen-etag").is_empty());
    server.stop().await;
}

#[tokio::test]
async fn quoted_token_against_missing_response_set_is_mismatch() {
    let server = TestServer::spawn().await;
    let response = server
        .write(Method::POST, "/response-sets/rs-new/answers/q-1", "\"abc\"", r#"{"value":1}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(header(&response, "screen-etag").is_empty());
    server.stop().await;
}

#[tokio::test]
async fn delete_answer_returns_no_content_with_new_etag() {
    let (server, etag) = seeded().await;
    let response = server
        .request(Method::DELETE, ANSWER)
        .header("if-match", &etag)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_ne!(header(&response, "screen-etag"), etag);
    let missing = server.request(Method::GET, ANSWER).send().await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    let body = problem(missing).await;
    assert_eq!(body["code"], "RESOURCE_NOT_FOUND");
    server.stop().await;
}

#[tokio::test]
async fn passing_write_with_bad_body_is_bad_request() {
    let (server, etag) = seeded().await;
    let response =
        server.write(Method::PATCH, ANSWER, &etag, "{not json").send().await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = problem(response).await;
    assert_eq!(body["code"], "REQUEST_INVALID");
    server.stop().await;
}

#[tokio::test]
async fn every_guarded_write_records_one_audit_event() {
    let (server, etag) = seeded().await;
    server.request(Method::GET, ANSWER).send().await.unwrap();
    server.write(Method::PATCH, ANSWER, "\"stale\"", "{}").send().await.unwrap();
    server.write(Method::PATCH, ANSWER, &etag, r#"{"value":2}"#).send().await.unwrap();
    let events = server.audit.events();
    let outcomes: Vec<&str> = events.iter().map(|event| event.outcome).collect();
    assert_eq!(outcomes, vec!["mismatch", "pass"]);
    assert_eq!(events[0].http_status, Some(409));
    assert_eq!(events[0].code.as_deref(), Some("PRE_IF_MATCH_ETAG_MISMATCH"));
    assert_eq!(events[0].path, "/api/v1/response-sets/rs-1/answers/q-1");
    assert!(events.iter().all(|event| event.method != "GET"));
    server.stop().await;
}

#[tokio::test]
async fn reads_on_guarded_routes_are_not_audited() {
    let (server, _) = seeded().await;
    let response = server.request(Method::GET, ANSWER).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    server.request(Method::GET, "/documents").send().await.unwrap();
    assert!(server.audit.events().is_empty());
    server.stop().await;
}
