//! Router tests driven through `tower::ServiceExt::oneshot`.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::handlers::{self, error::INVALID_LINK_MESSAGE};
use crate::invitations;

fn app(h: &TestHarness) -> Router {
    handlers::router(h.server.clone())
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn admin_request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"));
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn unknown_and_expired_tokens_share_one_message() {
    let h = create_test_server().await;
    let record = invitations::send(&h.server, "client@example.com", None)
        .await
        .unwrap();
    expire(&h.server, &record.token).await;

    let missing = app(&h)
        .oneshot(
            Request::get("/token/not-a-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    let missing_body = read_json(missing).await;

    let expired = app(&h)
        .oneshot(
            Request::get(format!("/token/{}", record.token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(expired.status(), StatusCode::GONE);
    let expired_body = read_json(expired).await;

    assert_eq!(missing_body, expired_body);
    assert_eq!(missing_body["error"], INVALID_LINK_MESSAGE);
}

#[tokio::test]
async fn client_flow_over_http() {
    let h = create_test_server().await;
    let record = invitations::send(&h.server, "client@example.com", None)
        .await
        .unwrap();
    let base = format!("/token/{}", record.token);

    let view = app(&h)
        .oneshot(Request::get(&base).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(view.status(), StatusCode::OK);
    let view = read_json(view).await;
    assert_eq!(view["status"], "pending");
    assert_eq!(view["companyInfo"], json!({}));
    assert_eq!(view["autoPrefill"]["enabled"], false);
    assert!(view.get("token").is_none());
    assert!(view.get("history").is_none());

    let draft = app(&h)
        .oneshot(json_request(
            Method::POST,
            &format!("{base}/save-draft"),
            json!({ "companyInfo": { "name": "Acme Ltd" } }),
        ))
        .await
        .unwrap();
    assert_eq!(draft.status(), StatusCode::OK);
    let draft = read_json(draft).await;
    assert_eq!(draft["invitation"]["status"], "draft");
    assert_eq!(draft["invitation"]["companyInfo"]["name"], "Acme Ltd");

    let upload = app(&h)
        .oneshot(json_request(
            Method::POST,
            &format!("{base}/upload"),
            json!({ "fieldName": "gstCertificate", "file": PDF_BASE64, "filename": "gst.pdf" }),
        ))
        .await
        .unwrap();
    assert_eq!(upload.status(), StatusCode::OK);
    let upload = read_json(upload).await;
    assert_eq!(upload["fieldName"], "gstCertificate");
    assert_eq!(upload["document"]["bytes"], 8);
    assert!(upload["invitation"]["companyInfo"]["gstCertificate"]["secureUrl"].is_string());

    let incomplete = app(&h)
        .oneshot(json_request(
            Method::POST,
            &format!("{base}/submit"),
            json!({ "companyInfo": { "address": "12 MG Road" } }),
        ))
        .await
        .unwrap();
    assert_eq!(incomplete.status(), StatusCode::BAD_REQUEST);
    let incomplete = read_json(incomplete).await;
    assert_eq!(incomplete["field"], "companyInfo.pinCode");
    assert_eq!(incomplete["reason"], "required");
    assert!(incomplete["error"]
        .as_str()
        .unwrap()
        .contains("pinCode"));
}

#[tokio::test]
async fn second_submit_is_a_conflict() {
    let h = create_test_server().await;
    let done = completed_invitation(&h.server, "client@example.com", "Acme Ltd").await;

    let response = app(&h)
        .oneshot(json_request(
            Method::POST,
            &format!("/token/{}/submit", done.token),
            serde_json::to_value(complete_payload("Acme Ltd")).unwrap(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn upload_of_unsupported_field_is_bad_request() {
    let h = create_test_server().await;
    let record = invitations::send(&h.server, "client@example.com", None)
        .await
        .unwrap();

    let response = app(&h)
        .oneshot(json_request(
            Method::POST,
            &format!("/token/{}/upload", record.token),
            json!({ "fieldName": "name", "file": PDF_BASE64 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("name"));
}

#[tokio::test]
async fn storage_failure_is_bad_gateway() {
    let h = create_test_server().await;
    let record = invitations::send(&h.server, "client@example.com", None)
        .await
        .unwrap();
    h.documents.set_failing(true);

    let response = app(&h)
        .oneshot(json_request(
            Method::POST,
            &format!("/token/{}/upload", record.token),
            json!({ "fieldName": "entityCertificate", "file": PDF_BASE64 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn admin_routes_require_bearer_token() {
    let h = create_test_server().await;

    let anonymous = app(&h)
        .oneshot(json_request(
            Method::POST,
            "/send",
            json!({ "email": "client@example.com" }),
        ))
        .await
        .unwrap();
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let wrong = app(&h)
        .oneshot(
            Request::get("/admin/invitations")
                .header(header::AUTHORIZATION, "Bearer wrong-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert!(h.email.sent().is_empty());
}

#[tokio::test]
async fn admin_routes_are_closed_without_configured_token() {
    let mut h = create_test_server().await;
    let mut config = (*h.server.config).clone();
    config.admin_token = None;
    h.server.config = std::sync::Arc::new(config);

    let response = app(&h)
        .oneshot(admin_request(Method::GET, "/admin/invitations", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_send_resend_and_patch() {
    let h = create_test_server().await;

    let sent = app(&h)
        .oneshot(admin_request(
            Method::POST,
            "/send",
            Some(json!({ "email": "Client@Example.com", "name": "Client" })),
        ))
        .await
        .unwrap();
    assert_eq!(sent.status(), StatusCode::CREATED);
    let sent = read_json(sent).await;
    assert_eq!(sent["email"], "client@example.com");
    assert_eq!(sent["status"], "pending");
    let id = sent["id"].as_str().unwrap().to_string();
    let old_token = sent["token"].as_str().unwrap().to_string();
    assert_eq!(
        sent["link"],
        format!("http://localhost:3000/invitation/{old_token}")
    );

    let resent = app(&h)
        .oneshot(admin_request(
            Method::POST,
            "/resend",
            Some(json!({ "invitationId": id })),
        ))
        .await
        .unwrap();
    assert_eq!(resent.status(), StatusCode::OK);
    let resent = read_json(resent).await;
    assert_ne!(resent["token"], old_token.as_str());
    assert_eq!(resent["history"].as_array().unwrap().len(), 2);

    let patched = app(&h)
        .oneshot(admin_request(
            Method::PATCH,
            &format!("/admin/invitations/{id}"),
            Some(json!({ "edits": [
                { "section": "companyInfo", "field": "name", "value": "Acme Ltd" },
                { "section": "comments", "value": "checked by ops" }
            ]})),
        ))
        .await
        .unwrap();
    assert_eq!(patched.status(), StatusCode::OK);
    let patched = read_json(patched).await;
    assert_eq!(patched["companyInfo"]["name"], "Acme Ltd");
    assert_eq!(patched["comments"], "checked by ops");

    let bad_path = app(&h)
        .oneshot(admin_request(
            Method::PATCH,
            &format!("/admin/invitations/{id}"),
            Some(json!({ "edits": [{ "section": "companyInfo", "field": "history", "value": "x" }] })),
        ))
        .await
        .unwrap();
    assert!(bad_path.status().is_client_error());

    let fetched = app(&h)
        .oneshot(admin_request(
            Method::GET,
            &format!("/admin/invitations/{id}"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(fetched.status(), StatusCode::OK);
    assert_eq!(read_json(fetched).await["version"], 2);
}

#[tokio::test]
async fn admin_resend_without_target_is_bad_request() {
    let h = create_test_server().await;
    let response = app(&h)
        .oneshot(admin_request(Method::POST, "/resend", Some(json!({}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_send_dispatch_failure_is_bad_gateway() {
    let h = create_test_server().await;
    h.email.set_failing(true);
    let response = app(&h)
        .oneshot(admin_request(
            Method::POST,
            "/send",
            Some(json!({ "email": "client@example.com" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn admin_bulk_send_and_list() {
    let h = create_test_server().await;
    let bulk = app(&h)
        .oneshot(admin_request(
            Method::POST,
            "/send-bulk",
            Some(json!({ "recipients": [
                { "email": "a@example.com" },
                { "email": "a@example.com" },
                { "email": "nope" }
            ]})),
        ))
        .await
        .unwrap();
    assert_eq!(bulk.status(), StatusCode::OK);
    let bulk = read_json(bulk).await;
    assert_eq!(bulk["sent"], 1);
    assert_eq!(bulk["failed"], 1);
    assert_eq!(bulk["results"].as_array().unwrap().len(), 2);

    let listed = app(&h)
        .oneshot(admin_request(
            Method::GET,
            "/admin/invitations?status=pending&limit=10",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(listed.status(), StatusCode::OK);
    let listed = read_json(listed).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let bad_status = app(&h)
        .oneshot(admin_request(
            Method::GET,
            "/admin/invitations?status=archived",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(bad_status.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_reminder_schedule_round_trip() {
    let h = create_test_server().await;

    let current = app(&h)
        .oneshot(admin_request(Method::GET, "/admin/reminders", None))
        .await
        .unwrap();
    assert_eq!(current.status(), StatusCode::OK);
    let current = read_json(current).await;
    assert_eq!(current["config"]["time"], "18:00");
    assert_eq!(current["running"], false);

    let updated = app(&h)
        .oneshot(admin_request(
            Method::PUT,
            "/admin/reminders",
            Some(json!({ "enabled": true, "days": ["sat"], "time": "09:15", "utcOffsetMinutes": 0 })),
        ))
        .await
        .unwrap();
    assert_eq!(updated.status(), StatusCode::OK);
    let updated = read_json(updated).await;
    assert_eq!(updated["config"]["days"], json!(["sat"]));
    assert_eq!(updated["config"]["time"], "09:15");
    assert_eq!(updated["running"], true);
    assert!(updated["nextFireTime"].is_string());

    h.server.reminders.shutdown();
}

#[tokio::test]
async fn admin_reminder_rejects_out_of_range_offset() {
    let h = create_test_server().await;

    let response = app(&h)
        .oneshot(admin_request(
            Method::PUT,
            "/admin/reminders",
            Some(json!({ "enabled": true, "days": ["mon"], "time": "09:00", "utcOffsetMinutes": 40000000 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(!h.server.reminders.is_running());
    assert_eq!(h.server.reminders.current_config().utc_offset_minutes, 330);
}

#[tokio::test]
async fn health_and_metrics_endpoints() {
    let h = create_test_server().await;

    let health = app(&h)
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);

    // No recorder is installed in tests.
    let metrics = app(&h)
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(metrics.status(), StatusCode::NOT_FOUND);
}
