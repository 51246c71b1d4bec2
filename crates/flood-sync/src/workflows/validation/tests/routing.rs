use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::store::InMemorySensorStore;
use crate::workflows::validation::router::submit_handler;
use crate::workflows::validation::{validation_router, PeerValidationService, VotingRules};

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("encode body")))
        .expect("request builds")
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

#[tokio::test]
async fn submit_route_creates_pending_report() {
    let (service, _) = build_service();
    let router = validation_router(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/reports",
            json!({
                "location": "Ikorodu",
                "waterLevel": 1.5,
                "description": "Heavy flooding, blocked drain"
            }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    assert_eq!(body["status"], "pending");
    assert_eq!(body["validated"], false);
    assert_eq!(body["upvotes"], 0);
    assert!(body["id"].is_string());
}

#[tokio::test]
async fn submit_handler_returns_unprocessable_for_invalid_report() {
    let (service, _) = build_service();

    let response = submit_handler(State(service), axum::Json(submission("", 1.0))).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn submit_handler_returns_service_unavailable_when_store_is_down() {
    let service = Arc::new(PeerValidationService::new(
        Arc::new(UnavailableReportStore),
        Arc::new(InMemorySensorStore::default()),
        VotingRules::default(),
    ));

    let response = submit_handler(State(service), axum::Json(submission("Apapa", 1.0))).await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("store unavailable"));
}

#[tokio::test]
async fn session_routes_drive_votes_to_validation() {
    let (service, _) = build_service();
    let seeded = seed(&service, 1).await;
    service.refresh().await.expect("refresh");
    let router = validation_router(service);

    let response = router
        .clone()
        .oneshot(empty_request("POST", "/api/v1/sessions"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let session = read_json_body(response).await;
    let session_id = session["sessionId"].as_str().expect("session id").to_string();
    assert_eq!(session["report"]["id"], seeded[0].id.0.as_str());

    let mut last = Value::Null;
    for _ in 0..3 {
        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/v1/sessions/{session_id}/votes"),
                json!({ "vote": "up" }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        last = read_json_body(response).await;
    }

    assert_eq!(last["vote"]["outcome"], "validated");
    assert_eq!(last["vote"]["notice"], "Report validated successfully!");
    assert_eq!(last["cursorMove"], "exhausted");
    assert!(last["next"]["report"].is_null());

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/sessions/{session_id}/votes"),
            json!({ "vote": "down" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = router
        .oneshot(empty_request("GET", "/api/v1/dashboard"))
        .await
        .expect("response");
    let dashboard = read_json_body(response).await;
    assert_eq!(dashboard["validated"].as_array().map(Vec::len), Some(1));
    assert_eq!(dashboard["sensorChart"]["location"], "Lagos Island");
    assert_eq!(dashboard["mapCenter"]["latitude"], 6.5244);
}

#[tokio::test]
async fn vote_route_accepts_long_form_vote_names() {
    let (service, _) = build_service();
    let seeded = seed(&service, 1).await;
    let router = validation_router(service);

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/reports/{}/votes", seeded[0].id),
            json!({ "vote": "downvote" }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["report"]["downvotes"], 1);
    assert_eq!(body["outcome"], "pending");

    let response = router
        .oneshot(empty_request("GET", "/api/v1/reports/eligible"))
        .await
        .expect("response");
    let eligible = read_json_body(response).await;
    assert_eq!(eligible.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn unknown_resources_return_not_found() {
    let (service, _) = build_service();
    let router = validation_router(service);

    let response = router
        .clone()
        .oneshot(empty_request("GET", "/api/v1/sessions/session-nope"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/reports/999/votes",
            json!({ "vote": "up" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
