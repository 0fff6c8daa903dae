use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use crate::workflows::assignment::domain::IndependentWorkPolicy;

use super::common::*;

#[tokio::test]
async fn submit_route_returns_the_conflict_report() {
    let (service, store, _notifier) = seeded_service();
    insert_snapshot(&store, cooldown_snapshot());
    let router = independent_router_with_service(service);

    let response = router
        .oneshot(
            axum::http::Request::post("/api/v1/independent-work/requests")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(
                    serde_json::to_vec(&submission()).unwrap(),
                ))
                .unwrap(),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = read_json_body(response).await;
    assert_eq!(body["request"]["status"], "pending_approval");
    assert_eq!(body["request"]["conflict_level"], "high_risk");
    assert_eq!(body["report"]["level"], "high_risk");
    assert_eq!(body["report"]["recommendation"], "likely_reject");
    assert!(body["request"]["findings"][0]
        .as_str()
        .expect("rendered finding")
        .contains("days remaining"));
}

#[tokio::test]
async fn submit_route_maps_policy_violations_to_422() {
    let (service, _store, _notifier) =
        seeded_service_with_firm(firm_with_policy(IndependentWorkPolicy::NoIndependentWork));
    let router = independent_router_with_service(service);

    let response = router
        .oneshot(
            axum::http::Request::post("/api/v1/independent-work/requests")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(
                    serde_json::to_vec(&submission()).unwrap(),
                ))
                .unwrap(),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("forbids"));
    // Error path carries no conflict report.
    assert!(body.get("report").is_none());
}

#[tokio::test]
async fn status_route_returns_the_stored_view() {
    let (service, store, _notifier) = seeded_service();
    insert_snapshot(&store, cooldown_snapshot());
    let outcome = service
        .submit(submission(), now())
        .expect("submission succeeds");
    let request_id = outcome.request.id.0.clone();
    let router = independent_router_with_service(service);

    let response = router
        .oneshot(
            axum::http::Request::get(format!("/api/v1/independent-work/requests/{request_id}"))
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["request_id"], request_id);
    assert_eq!(body["status"], "pending_approval");
}

#[tokio::test]
async fn status_route_returns_not_found_for_unknown_ids() {
    let (service, _store, _notifier) = seeded_service();
    let router = independent_router_with_service(service);

    let response = router
        .oneshot(
            axum::http::Request::get("/api/v1/independent-work/requests/iwr-missing")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn decision_route_approves_with_conditions() {
    let (service, store, _notifier) = seeded_service();
    insert_snapshot(&store, cooldown_snapshot());
    let outcome = service
        .submit(submission(), now())
        .expect("submission succeeds");
    let request_id = outcome.request.id.0.clone();
    let router = independent_router_with_service(service);

    let payload = json!({
        "actor": "admin-1",
        "action": "approve",
        "commission_percent": 18.0,
        "weekends_only": true,
        "reason": "approved with weekend restriction",
    });
    let response = router
        .oneshot(
            axum::http::Request::post(format!(
                "/api/v1/independent-work/requests/{request_id}/decision"
            ))
            .header(axum::http::header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(
                serde_json::to_vec(&payload).unwrap(),
            ))
            .unwrap(),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["status"], "approved");
    assert_eq!(body["commission_percent"], 18.0);
}

#[tokio::test]
async fn decision_route_rejects_non_admin_actors() {
    let (service, store, _notifier) = seeded_service();
    insert_snapshot(&store, cooldown_snapshot());
    let outcome = service
        .submit(submission(), now())
        .expect("submission succeeds");
    let request_id = outcome.request.id.0.clone();
    let router = independent_router_with_service(service);

    let payload = json!({ "actor": "stranger", "action": "reject" });
    let response = router
        .oneshot(
            axum::http::Request::post(format!(
                "/api/v1/independent-work/requests/{request_id}/decision"
            ))
            .header(axum::http::header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(
                serde_json::to_vec(&payload).unwrap(),
            ))
            .unwrap(),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
