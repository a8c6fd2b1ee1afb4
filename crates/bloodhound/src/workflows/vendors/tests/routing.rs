use super::common::*;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::vendors::domain::VendorAttributes;
use crate::workflows::vendors::scoring::ScoringConfig;
use crate::workflows::vendors::VendorService;

fn json_request(method: &str, uri: &str, token: &str, payload: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, bearer(token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(payload).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, bearer(token))
        .body(Body::empty())
        .unwrap()
}

async fn send(router: &axum::Router, request: Request<Body>) -> Response {
    router
        .clone()
        .oneshot(request)
        .await
        .expect("route executes")
}

fn attributes_json(attributes: &VendorAttributes) -> Value {
    serde_json::to_value(attributes).unwrap()
}

#[tokio::test]
async fn vendor_routes_require_a_session() {
    let (service, _) = build_service();
    let fixture = api_fixture(service);

    let anonymous = Request::get("/api/v1/vendors").body(Body::empty()).unwrap();
    let response = send(&fixture.router, anonymous).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], "missing bearer token");

    let response = send(&fixture.router, empty_request("GET", "/api/v1/vendors", "stale")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], "unknown session");
}

#[tokio::test]
async fn submit_route_returns_scored_view() {
    let (service, _) = build_service();
    let fixture = api_fixture(service);

    let response = send(
        &fixture.router,
        json_request(
            "POST",
            "/api/v1/vendors",
            &fixture.client_token,
            &attributes_json(&shell_vendor()),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["gstin"], APEX_GSTIN);
    assert_eq!(payload["status"], "scored");
    assert_eq!(payload["risk_score"], 100);
    assert_eq!(payload["risk_level"], "Critical");
    assert_eq!(payload["badge"]["foreground"], "#FF4444");
    assert_eq!(payload["recommended_actions"][0], "BLOCK ALL PAYMENTS");
}

#[tokio::test]
async fn submit_route_accepts_itc_as_string_or_number() {
    let (service, _) = build_service();
    let fixture = api_fixture(service);

    let payload = json!({
        "name": "Shree Ganesh Traders",
        "gstin": SHREE_GSTIN,
        "registration_days": 1000,
        "gstr3b_status": "Filed",
        "months_not_filed": 0,
        "transaction_count": 200,
        "itc_amount": "100000.50",
        "director_companies": 2,
        "address_type": "commercial",
    });
    let response = send(
        &fixture.router,
        json_request("POST", "/api/v1/vendors", &fixture.client_token, &payload),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let stored = fixture.service.get(&gstin(SHREE_GSTIN)).expect("stored");
    assert_eq!(
        stored.attributes.itc_amount,
        Some(rust_decimal::Decimal::new(10_000_050, 2))
    );
}

#[tokio::test]
async fn submit_route_reports_offending_field() {
    let (service, repository) = build_service();
    let fixture = api_fixture(service);
    let mut vendor = new_vendor();
    vendor.registration_days = Some(-5);

    let response = send(
        &fixture.router,
        json_request(
            "POST",
            "/api/v1/vendors",
            &fixture.client_token,
            &attributes_json(&vendor),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["field"], "registration_days");
    assert_eq!(repository.len(), 0);
}

#[tokio::test]
async fn submit_route_maps_repository_errors() {
    let fixture = api_fixture(VendorService::new(
        Arc::new(ConflictRepository),
        ScoringConfig::default(),
    ));
    let response = send(
        &fixture.router,
        json_request(
            "POST",
            "/api/v1/vendors",
            &fixture.client_token,
            &attributes_json(&established_vendor()),
        ),
    )
    .await;
    assert_conflict_response(response);

    let fixture = api_fixture(VendorService::new(
        Arc::new(UnavailableRepository),
        ScoringConfig::default(),
    ));
    let response = send(
        &fixture.router,
        json_request(
            "POST",
            "/api/v1/vendors",
            &fixture.client_token,
            &attributes_json(&established_vendor()),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn vendor_route_distinguishes_missing_and_malformed() {
    let (service, _) = build_service();
    let fixture = api_fixture(service);

    let response = send(
        &fixture.router,
        empty_request(
            "GET",
            &format!("/api/v1/vendors/{APEX_GSTIN}"),
            &fixture.client_token,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(
        &fixture.router,
        empty_request("GET", "/api/v1/vendors/not-a-gstin", &fixture.client_token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["field"], "gstin");
}

#[tokio::test]
async fn vendor_route_returns_full_record() {
    let (service, _) = build_service();
    service.submit(new_vendor()).expect("seed");
    let fixture = api_fixture(service);

    let response = send(
        &fixture.router,
        empty_request(
            "GET",
            &format!("/api/v1/vendors/{}", KAVERI_GSTIN.to_lowercase()),
            &fixture.ca_token,
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["name"], "Kaveri Textiles");
    assert_eq!(payload["registration_days"], 15);
    assert_eq!(payload["assessment"]["risk_score"], 30);
    assert_eq!(payload["assessment"]["risk_level"], "Low Risk");
}

#[tokio::test]
async fn import_route_ingests_ledger_csv() {
    let (service, _) = build_service();
    service.submit(established_vendor()).expect("seed");
    let fixture = api_fixture(service);

    let csv = format!(
        "Vendor Name,GSTIN/UIN,Invoice Value,GST Amount\n\
         Shree Ganesh Traders,{SHREE_GSTIN},\"Rs. 11,800\",1800\n\
         Shree Ganesh Traders,{SHREE_GSTIN},5900,900\n\
         Apex Components,{APEX_GSTIN},\"₹ 2,36,000\",36000\n"
    );
    let request = Request::post("/api/v1/vendors/import")
        .header(header::AUTHORIZATION, bearer(&fixture.client_token))
        .header(header::CONTENT_TYPE, "text/csv")
        .body(Body::from(csv))
        .unwrap();
    let response = send(&fixture.router, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["source"], "file_ingestion");
    assert_eq!(payload["received"], 2);
    assert_eq!(payload["created"], 1);
    assert_eq!(payload["updated"], 1);
    assert_eq!(payload["scored"], 1);
    assert_eq!(payload["failures"][0]["gstin"], APEX_GSTIN);
    assert_eq!(payload["failures"][0]["field"], "registration_days");

    let shree = fixture.service.get(&gstin(SHREE_GSTIN)).expect("stored");
    assert_eq!(shree.attributes.transaction_count, Some(202));
}

#[tokio::test]
async fn import_route_rejects_malformed_csv() {
    let (service, repository) = build_service();
    let fixture = api_fixture(service);

    let csv = format!("GSTIN,Amount,Tax\n{SHREE_GSTIN},100,250\n");
    let request = Request::post("/api/v1/vendors/import")
        .header(header::AUTHORIZATION, bearer(&fixture.client_token))
        .body(Body::from(csv))
        .unwrap();
    let response = send(&fixture.router, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert!(payload["error"].as_str().unwrap().starts_with("line 2"));
    assert_eq!(repository.len(), 0);
}

#[tokio::test]
async fn checks_route_enriches_existing_vendor() {
    let (service, _) = build_service();
    service.submit(established_vendor()).expect("seed");
    let fixture = api_fixture(service);

    let response = send(
        &fixture.router,
        empty_request(
            "POST",
            &format!("/api/v1/vendors/{SHREE_GSTIN}/checks"),
            &fixture.client_token,
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["checks"]["pan_extracted"], "ABCDE1234F");
    assert_eq!(payload["checks"]["gstin_data"]["gstin"], SHREE_GSTIN);
    assert_eq!(payload["ingest"]["updated"], 1);
    assert_eq!(payload["vendor"]["status"], "scored");

    // ledger figures survive a registry refresh
    let stored = fixture.service.get(&gstin(SHREE_GSTIN)).expect("stored");
    assert_eq!(stored.attributes.transaction_count, Some(200));
    assert!(stored.attributes.registration_status.is_some());
}

#[tokio::test]
async fn checks_route_leaves_unknown_vendor_unscored() {
    let (service, _) = build_service();
    let fixture = api_fixture(service);

    let response = send(
        &fixture.router,
        empty_request(
            "POST",
            &format!("/api/v1/vendors/{KAVERI_GSTIN}/checks"),
            &fixture.client_token,
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["ingest"]["created"], 1);
    assert_eq!(payload["ingest"]["failures"][0]["field"], "transaction_count");
    assert_eq!(payload["vendor"]["status"], "unscored");
}

#[tokio::test]
async fn rescore_route_reports_batch_outcome() {
    let (service, _) = build_service();
    service.submit(shell_vendor()).expect("seed");
    service.submit(new_vendor()).expect("seed");
    let fixture = api_fixture(service);

    let response = send(
        &fixture.router,
        empty_request("POST", "/api/v1/vendors/rescore", &fixture.ca_token),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["scored"], 2);
    assert_eq!(payload["failures"], json!([]));
}

#[tokio::test]
async fn dashboard_is_shaped_by_role() {
    let (service, _) = build_service();
    service.submit(shell_vendor()).expect("seed");
    service.submit(new_vendor()).expect("seed");
    let fixture = api_fixture(service);

    let response = send(
        &fixture.router,
        empty_request("GET", "/api/v1/dashboard", &fixture.client_token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let client = read_json_body(response).await;
    assert_eq!(client["role"], "client");
    assert_eq!(client["total_vendors"], 2);
    assert_eq!(client["critical_vendors"], 1);
    assert_eq!(client["high_risk_vendors"], 0);
    assert_eq!(client["itc_at_risk"], "800000");
    assert!(client.get("watchlist").is_none());

    fixture
        .sessions
        .update_watchlist(&fixture.ca_token, |watchlist| {
            watchlist.add(gstin(KAVERI_GSTIN))
        })
        .expect("ca session");

    let response = send(
        &fixture.router,
        empty_request("GET", "/api/v1/dashboard", &fixture.ca_token),
    )
    .await;
    let ca = read_json_body(response).await;
    assert_eq!(ca["role"], "ca");
    assert_eq!(ca["portfolio"]["total_vendors"], 2);
    assert_eq!(ca["watchlist"]["total_vendors"], 1);
    assert_eq!(ca["watchlist"]["tiers"]["low"], 1);
}

#[tokio::test]
async fn watchlist_routes_track_entries_per_session() {
    let (service, _) = build_service();
    service.submit(shell_vendor()).expect("seed");
    let fixture = api_fixture(service);
    let watch_uri = format!("/api/v1/watchlist/{APEX_GSTIN}");

    let response = send(&fixture.router, empty_request("PUT", &watch_uri, &fixture.ca_token)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let response = send(&fixture.router, empty_request("PUT", &watch_uri, &fixture.ca_token)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        &fixture.router,
        empty_request("GET", "/api/v1/watchlist", &fixture.ca_token),
    )
    .await;
    let payload = read_json_body(response).await;
    assert_eq!(payload["entries"], json!([APEX_GSTIN]));
    assert_eq!(payload["vendors"][0]["risk_level"], "Critical");

    // other sessions keep their own list
    let response = send(
        &fixture.router,
        empty_request("GET", "/api/v1/watchlist", &fixture.client_token),
    )
    .await;
    let payload = read_json_body(response).await;
    assert_eq!(payload["entries"], json!([]));

    let response = send(
        &fixture.router,
        empty_request("DELETE", &watch_uri, &fixture.ca_token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = send(
        &fixture.router,
        empty_request("DELETE", &watch_uri, &fixture.ca_token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    fixture.sessions.revoke(&fixture.ca_token);
    let response = send(&fixture.router, empty_request("PUT", &watch_uri, &fixture.ca_token)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], "unknown session");
}
