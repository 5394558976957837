//! Router tests against in-memory seams

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, Key, SignedCookieJar};
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use mailroom_core::actions::procedures;
use mailroom_core::cache::AUTH_DATA_COOKIE;
use mailroom_core::auth::MockAuthGateway;
use mailroom_core::feed::MockChangeFeed;
use mailroom_core::model::{UserAuthData, UserRole};
use mailroom_core::rpc::MockRpcClient;
use mailroom_core::{AuthDataCacheEntry, AuthUser, Caller};
use mailroom_payments::{PayMongoClient, compute_signature};

use crate::config::PublicConfig;
use crate::routes::router;
use crate::state::AppState;

const TOKEN: &str = "user-token";
const WEBHOOK_SECRET: &str = "whsk_test";

struct Harness {
    rpc: Arc<MockRpcClient>,
    user_id: Uuid,
    key: Key,
    app: Router,
}

fn harness_with(rpc: MockRpcClient, payments: bool) -> Harness {
    let user_id = Uuid::new_v4();
    let key = Key::generate();
    let rpc = Arc::new(rpc);
    let auth = MockAuthGateway::new().with_user(
        TOKEN,
        AuthUser {
            id: user_id,
            email: Some("ana@example.com".into()),
        },
    );

    let state = AppState {
        rpc: rpc.clone(),
        auth: Arc::new(auth),
        feed: Arc::new(MockChangeFeed::new()),
        paymongo: payments.then(|| Arc::new(PayMongoClient::new("sk_test", WEBHOOK_SECRET))),
        config: Arc::new(PublicConfig {
            site_url: "https://mail.example.com".into(),
            ..Default::default()
        }),
        cookie_key: key.clone(),
    };

    Harness {
        rpc,
        user_id,
        key,
        app: router(state),
    }
}

fn harness(role: &str) -> Harness {
    let rpc = MockRpcClient::new()
        .with_response(procedures::ADMIN_GET_DASHBOARD_STATS, json!({ "total_users": 42 }));
    let h = harness_with(rpc, true);
    h.rpc.set_response(
        procedures::GET_USER_AUTH_DATA,
        json!({ "user_id": h.user_id, "email": "ana@example.com", "role": role }),
    );
    h
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(String::from)
        .collect()
}

fn authed_get(uri: &str, cookie: Option<String>) -> Request<Body> {
    let mut builder = Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"));
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn encoded_entry(user_id: Uuid, role: UserRole, exp: chrono::DateTime<Utc>) -> String {
    let entry = AuthDataCacheEntry {
        data: UserAuthData {
            user_id,
            role,
            ..Default::default()
        },
        exp: exp.timestamp_millis(),
        user_id,
    };
    entry.encode().unwrap()
}

/// `auth_data=<value>` as the server would sign it with `key`
fn signed_cookie(key: &Key, value: String) -> String {
    let response = SignedCookieJar::new(key.clone())
        .add(Cookie::new(AUTH_DATA_COOKIE, value))
        .into_response();
    let set_cookie = set_cookies(&response).remove(0);
    set_cookie.split(';').next().unwrap().to_string()
}

fn cache_cookie(h: &Harness, role: UserRole, exp: chrono::DateTime<Utc>) -> String {
    signed_cookie(&h.key, encoded_entry(h.user_id, role, exp))
}

fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn removes_auth_data(response: &Response) -> bool {
    set_cookies(response)
        .iter()
        .any(|c| c.starts_with("auth_data=") && c.contains("Max-Age=0"))
}

// ============================================================================
// Webhook
// ============================================================================

fn webhook_event(event_type: &str) -> Vec<u8> {
    json!({
        "data": {
            "id": "evt_1",
            "type": "event",
            "attributes": {
                "type": event_type,
                "livemode": false,
                "data": { "id": "cs_paid_1", "type": "checkout_session", "attributes": {} }
            }
        }
    })
    .to_string()
    .into_bytes()
}

fn webhook_request(payload: Vec<u8>, signature: Option<String>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/webhooks/paymongo")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(signature) = signature {
        builder = builder.header("paymongo-signature", signature);
    }
    builder.body(Body::from(payload)).unwrap()
}

fn sign(payload: &[u8]) -> String {
    let ts = Utc::now().timestamp().to_string();
    let sig = compute_signature(&ts, payload, WEBHOOK_SECRET);
    format!("t={ts},te={sig},li=")
}

#[tokio::test]
async fn test_webhook_without_signature_is_unauthorized() {
    let h = harness("customer");
    let response = send(&h.app, webhook_request(webhook_event("payment.paid"), None)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(h.rpc.calls().is_empty());
}

#[tokio::test]
async fn test_webhook_with_bad_signature_is_unauthorized() {
    let h = harness("customer");
    let payload = webhook_event("payment.paid");
    let forged = format!("t=1700000000,te={},li=", "ab".repeat(32));

    let response = send(&h.app, webhook_request(payload, Some(forged))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(h.rpc.calls().is_empty());
}

#[tokio::test]
async fn test_paid_checkout_webhook_relays_succeeded_once() {
    let h = harness("customer");
    let payload = webhook_event("checkout_session.payment.paid");
    let signature = sign(&payload);

    let response = send(&h.app, webhook_request(payload, Some(signature))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({ "received": true, "status": "succeeded" })
    );

    let calls = h.rpc.calls_to(procedures::PROCESS_PAYMONGO_WEBHOOK);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].caller, Caller::Service);
    assert_eq!(calls[0].params["payment_id"], "cs_paid_1");
    assert_eq!(calls[0].params["payment_status"], "succeeded");
    assert_eq!(h.rpc.calls().len(), 1);
}

#[tokio::test]
async fn test_unrelated_webhook_is_acknowledged_without_relay() {
    let h = harness("customer");
    let payload = webhook_event("payment.refunded");
    let signature = sign(&payload);

    let response = send(&h.app, webhook_request(payload, Some(signature))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "received": true }));
    assert!(h.rpc.calls().is_empty());
}

#[tokio::test]
async fn test_webhook_relay_failure_is_server_error() {
    let rpc = MockRpcClient::new().with_failure(procedures::PROCESS_PAYMONGO_WEBHOOK);
    let h = harness_with(rpc, true);
    let payload = webhook_event("payment.failed");
    let signature = sign(&payload);

    let response = send(&h.app, webhook_request(payload, Some(signature))).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["code"], "INTERNAL_ERROR");
}

#[tokio::test]
async fn test_webhook_without_payments_configured() {
    let h = harness_with(MockRpcClient::new(), false);
    let payload = webhook_event("payment.paid");
    let signature = sign(&payload);

    let response = send(&h.app, webhook_request(payload, Some(signature))).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(h.rpc.calls().is_empty());
}

// ============================================================================
// Auth-data cache
// ============================================================================

#[tokio::test]
async fn test_auth_data_miss_fetches_and_sets_cookie() {
    let h = harness("customer");

    let response = send(&h.app, authed_get("/api/auth/data", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("auth_data=") && c.contains("HttpOnly")));
    assert_eq!(h.rpc.call_count(procedures::GET_USER_AUTH_DATA), 1);

    let body = json_body(response).await;
    assert_eq!(body["email"], "ana@example.com");
}

#[tokio::test]
async fn test_auth_data_valid_cookie_skips_fetch() {
    let h = harness("customer");
    let cookie = cache_cookie(&h, UserRole::Staff, Utc::now() + Duration::minutes(3));

    let response = send(&h.app, authed_get("/api/auth/data", Some(cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookies(&response).is_empty());
    assert_eq!(json_body(response).await["role"], "staff");
    assert!(h.rpc.calls().is_empty());
}

#[tokio::test]
async fn test_auth_data_expired_cookie_fetches_once() {
    let h = harness("customer");
    let cookie = cache_cookie(&h, UserRole::Staff, Utc::now() - Duration::seconds(1));

    let response = send(&h.app, authed_get("/api/auth/data", Some(cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["role"], "customer");
    assert_eq!(h.rpc.call_count(procedures::GET_USER_AUTH_DATA), 1);
}

#[tokio::test]
async fn test_auth_data_foreign_cookie_fetches_once() {
    let h = harness("customer");
    let entry = encoded_entry(Uuid::new_v4(), UserRole::Admin, Utc::now() + Duration::minutes(3));
    let cookie = signed_cookie(&h.key, entry);

    let response = send(&h.app, authed_get("/api/auth/data", Some(cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["role"], "customer");
    assert_eq!(h.rpc.call_count(procedures::GET_USER_AUTH_DATA), 1);
}

#[tokio::test]
async fn test_auth_data_requires_session() {
    let h = harness("customer");
    let request = Request::builder()
        .uri("/api/auth/data")
        .body(Body::empty())
        .unwrap();

    let response = send(&h.app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_logout_expires_cookie() {
    let h = harness("customer");
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/logout")
        .header(header::COOKIE, "auth_data=whatever")
        .body(Body::empty())
        .unwrap();

    let response = send(&h.app, request).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(removes_auth_data(&response));
}

#[tokio::test]
async fn test_profile_update_drops_cached_permissions() {
    let h = harness("customer");
    h.rpc.set_response(
        procedures::UPDATE_USER_PROFILE,
        json!({ "id": h.user_id, "email": "ana@example.com", "first_name": "Ana" }),
    );
    let cookie = cache_cookie(&h, UserRole::Customer, Utc::now() + Duration::minutes(3));

    let request = json_request("PATCH", "/api/user", Some(&cookie), &json!({ "first_name": "Ana" }));
    let response = send(&h.app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(removes_auth_data(&response));

    // The browser no longer sends the entry, so the next read refetches
    let response = send(&h.app, authed_get("/api/auth/data", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(h.rpc.call_count(procedures::GET_USER_AUTH_DATA), 1);
}

#[tokio::test]
async fn test_kyc_submission_drops_cached_permissions() {
    let h = harness("customer");
    let cookie = cache_cookie(&h, UserRole::Customer, Utc::now() + Duration::minutes(3));
    let body = json!({
        "id_type": "passport",
        "id_number": "P1234567",
        "id_front_url": "https://files.example.com/front.jpg"
    });

    let response = send(&h.app, json_request("POST", "/api/user/kyc", Some(&cookie), &body)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(removes_auth_data(&response));
    assert_eq!(h.rpc.call_count(procedures::SUBMIT_KYC), 1);
}

#[tokio::test]
async fn test_cancel_subscription_drops_cached_permissions() {
    let h = harness("customer");
    let cookie = cache_cookie(&h, UserRole::Customer, Utc::now() + Duration::minutes(3));

    let request = json_request("POST", "/api/subscription/cancel", Some(&cookie), &json!({}));
    let response = send(&h.app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(removes_auth_data(&response));
    assert_eq!(h.rpc.call_count(procedures::CANCEL_SUBSCRIPTION), 1);
}

// ============================================================================
// Access
// ============================================================================

#[tokio::test]
async fn test_guard_sends_guest_to_sign_in() {
    let h = harness("customer");
    let request = Request::builder()
        .uri("/api/auth/guard?path=/dashboard")
        .body(Body::empty())
        .unwrap();

    let response = send(&h.app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({ "allow": false, "redirect": "/signin" })
    );
}

#[tokio::test]
async fn test_admin_routes_reject_customers() {
    let h = harness("customer");

    let response = send(&h.app, authed_get("/api/admin/stats", None)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(h.rpc.call_count(procedures::ADMIN_GET_DASHBOARD_STATS), 0);
}

#[tokio::test]
async fn test_admin_routes_allow_staff_from_cache() {
    let h = harness("customer");
    let cookie = cache_cookie(&h, UserRole::Staff, Utc::now() + Duration::minutes(3));

    let response = send(&h.app, authed_get("/api/admin/stats", Some(cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["total_users"], 42);
    assert_eq!(h.rpc.call_count(procedures::GET_USER_AUTH_DATA), 0);
}

#[tokio::test]
async fn test_unsigned_admin_cookie_is_a_miss() {
    let h = harness("customer");
    let forged = format!(
        "auth_data={}",
        encoded_entry(h.user_id, UserRole::Admin, Utc::now() + Duration::days(3650))
    );

    let response = send(&h.app, authed_get("/api/admin/stats", Some(forged))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(h.rpc.call_count(procedures::GET_USER_AUTH_DATA), 1);
    assert_eq!(h.rpc.call_count(procedures::ADMIN_GET_DASHBOARD_STATS), 0);
}

#[tokio::test]
async fn test_cookie_signed_with_another_key_is_a_miss() {
    let h = harness("customer");
    let entry = encoded_entry(h.user_id, UserRole::Admin, Utc::now() + Duration::days(3650));
    let forged = signed_cookie(&Key::generate(), entry);

    let response = send(&h.app, authed_get("/api/admin/stats", Some(forged))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(h.rpc.call_count(procedures::GET_USER_AUTH_DATA), 1);
    assert_eq!(h.rpc.call_count(procedures::ADMIN_GET_DASHBOARD_STATS), 0);
}

#[tokio::test]
async fn test_miss_cookie_is_accepted_on_the_next_request() {
    let h = harness("staff");

    let response = send(&h.app, authed_get("/api/auth/data", None)).await;
    let issued = set_cookies(&response)
        .into_iter()
        .find(|c| c.starts_with("auth_data="))
        .unwrap();
    let cookie = issued.split(';').next().unwrap().to_string();

    let response = send(&h.app, authed_get("/api/admin/stats", Some(cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(h.rpc.call_count(procedures::GET_USER_AUTH_DATA), 1);
}

// ============================================================================
// Payments
// ============================================================================

#[tokio::test]
async fn test_checkout_looks_up_plans_with_service_credentials() {
    let h = harness("customer");
    let body = json!({ "plan_id": Uuid::new_v4(), "billing_cycle": "monthly" });

    let response = send(&h.app, json_request("POST", "/api/payments/checkout", None, &body)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let lookups = h.rpc.calls_to(procedures::GET_SUBSCRIPTION_PLANS);
    assert_eq!(lookups.len(), 1);
    assert_eq!(lookups[0].caller, Caller::Service);
    assert_eq!(h.rpc.call_count(procedures::INIT_SUBSCRIPTION_PAYMENT), 0);
}

#[tokio::test]
async fn test_mail_actions_run_as_the_user() {
    let h = harness("customer");
    let item_id = Uuid::new_v4();
    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/mail/{item_id}/archive"))
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
        .body(Body::empty())
        .unwrap();

    let response = send(&h.app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let calls = h.rpc.calls_to(procedures::ARCHIVE_MAIL_ITEM);
    assert_eq!(calls.len(), 1);
    assert!(!calls[0].caller.is_service());
    assert_eq!(calls[0].params["input_mail_item_id"], item_id.to_string());
}

#[tokio::test]
async fn test_missing_mail_item_is_not_found() {
    let h = harness("customer");
    let uri = format!("/api/mail/{}", Uuid::new_v4());

    let response = send(&h.app, authed_get(&uri, None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
