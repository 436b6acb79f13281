use std::sync::Arc;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use holostay_api::{app, middleware::JwtIdentityResolver, state::{AppState, CheckoutSettings}};
use holostay_checkout::{signature::SIGNATURE_HEADER, MockCheckoutProvider, WebhookVerifier};
use holostay_core::booking::BookingStatus;
use holostay_core::payment::PaymentStatus;
use holostay_shared::Masked;
use holostay_store::{MemoryBookingRepository, MemoryPaymentRepository, MemoryRoomRepository};

const JWT_SECRET: &str = "test-jwt-secret";
const WEBHOOK_SECRET: &str = "whsec_test";

struct TestApp {
    router: Router,
    bookings: Arc<MemoryBookingRepository>,
    payments: Arc<MemoryPaymentRepository>,
    provider: Arc<MockCheckoutProvider>,
}

fn test_app_with(provider: MockCheckoutProvider) -> TestApp {
    let rooms = Arc::new(MemoryRoomRepository::seeded());
    let bookings = Arc::new(MemoryBookingRepository::new());
    let payments = Arc::new(MemoryPaymentRepository::new());
    let provider = Arc::new(provider);

    let state = AppState::new(
        rooms,
        bookings.clone(),
        payments.clone(),
        Arc::new(JwtIdentityResolver::new(Masked::from(JWT_SECRET), Some("authenticated".to_string()))),
        provider.clone(),
        WebhookVerifier::new(Masked::from(WEBHOOK_SECRET)),
        CheckoutSettings {
            public_url: "https://holostay.test".to_string(),
            currency: "usd".to_string(),
            enforce_server_pricing: false,
        },
    );

    TestApp { router: app(state), bookings, payments, provider }
}

fn test_app() -> TestApp {
    test_app_with(MockCheckoutProvider::new("https://checkout.test"))
}

fn token_for(user_id: Uuid) -> String {
    let claims = json!({
        "sub": user_id.to_string(),
        "email": "luke@tatooine.space",
        "role": "authenticated",
        "aud": "authenticated",
        "exp": chrono::Utc::now().timestamp() + 3600,
        "user_metadata": { "full_name": "Luke Skywalker" }
    });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(JWT_SECRET.as_bytes())).unwrap()
}

fn jedi_suite() -> Uuid {
    Uuid::from_u128(1)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, body)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn checkout(body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/v1/checkout/sessions")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ORIGIN, "http://localhost:5173");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn stay(room_id: Uuid) -> Value {
    json!({
        "room_id": room_id.to_string(),
        "check_in": "2026-12-01",
        "check_out": "2026-12-04",
        "total_price": 450.0
    })
}

fn webhook(event: &Value, signature: Option<String>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/v1/webhooks/stripe")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(signature) = signature {
        builder = builder.header(SIGNATURE_HEADER, signature);
    }
    builder.body(Body::from(event.to_string())).unwrap()
}

fn session_event(event_type: &str, session_id: &str, booking_id: &str) -> Value {
    json!({
        "id": format!("evt_{}", Uuid::new_v4().simple()),
        "type": event_type,
        "data": {
            "object": {
                "id": session_id,
                "payment_status": "paid",
                "metadata": { "booking_id": booking_id }
            }
        }
    })
}

fn sign(event: &Value) -> String {
    WebhookVerifier::new(Masked::from(WEBHOOK_SECRET))
        .sign(event.to_string().as_bytes(), chrono::Utc::now().timestamp())
}

/// Starts a checkout and returns (session id, booking id)
async fn start_checkout(test: &TestApp, token: &str) -> (String, String) {
    let (status, body) = send(&test.router, checkout(stay(jedi_suite()), Some(token))).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let session_id = body["sessionId"].as_str().unwrap().to_string();

    let (status, session) = send(&test.router, get(&format!("/v1/checkout/sessions/{}", session_id), Some(token))).await;
    assert_eq!(status, StatusCode::OK);
    (session_id, session["bookingId"].as_str().unwrap().to_string())
}

#[tokio::test]
async fn test_health() {
    let test = test_app();
    let (status, body) = send(&test.router, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_checkout_creates_pending_pair() {
    let test = test_app();
    let user_id = Uuid::new_v4();
    let token = token_for(user_id);

    let (status, body) = send(&test.router, checkout(stay(jedi_suite()), Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let session_id = body["sessionId"].as_str().unwrap();
    assert!(session_id.starts_with("cs_test_"));
    assert_eq!(body["sessionUrl"], format!("https://checkout.test/c/pay/{}", session_id));

    let bookings = test.bookings.all().await;
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].status, BookingStatus::Pending);
    assert_eq!(bookings[0].user_id, user_id);

    let payments = test.payments.all().await;
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].status, PaymentStatus::Pending);
    assert_eq!(payments[0].session_id, session_id);
    assert_eq!(payments[0].booking_id, bookings[0].id);

    let requests = test.provider.requests().await;
    assert_eq!(requests[0].unit_amount, 45000);
    assert_eq!(requests[0].product_name, "Jedi Suite");
    assert!(requests[0].success_url.starts_with("http://localhost:5173/booking-success"));
    assert_eq!(requests[0].cancel_url, "http://localhost:5173/booking-cancelled");
}

#[tokio::test]
async fn test_checkout_requires_authentication() {
    let test = test_app();

    let (status, body) = send(&test.router, checkout(stay(jedi_suite()), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authentication required");

    let (status, _) = send(&test.router, checkout(stay(jedi_suite()), Some("not-a-token"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(test.bookings.count().await, 0);
    assert_eq!(test.payments.count().await, 0);
}

#[tokio::test]
async fn test_checkout_rejects_incomplete_requests() {
    let test = test_app();
    let token = token_for(Uuid::new_v4());

    let mut body = stay(jedi_suite());
    body.as_object_mut().unwrap().remove("check_out");
    let (status, response) = send(&test.router, checkout(body, Some(&token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Missing required fields");

    let malformed = Request::builder()
        .method("POST")
        .uri("/v1/checkout/sessions")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = send(&test.router, malformed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(test.bookings.count().await, 0);
}

#[tokio::test]
async fn test_checkout_unknown_room() {
    let test = test_app();
    let token = token_for(Uuid::new_v4());

    let (status, body) = send(&test.router, checkout(stay(Uuid::new_v4()), Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Room not found");
    assert_eq!(test.bookings.count().await, 0);
}

#[tokio::test]
async fn test_checkout_provider_failure_leaves_no_pending_booking() {
    let test = test_app_with(MockCheckoutProvider::failing());
    let token = token_for(Uuid::new_v4());

    let (status, body) = send(&test.router, checkout(stay(jedi_suite()), Some(&token))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal Server Error");

    let bookings = test.bookings.all().await;
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].status, BookingStatus::Cancelled);
    assert_eq!(test.payments.count().await, 0);
}

#[tokio::test]
async fn test_completed_webhook_confirms_booking() {
    let test = test_app();
    let token = token_for(Uuid::new_v4());
    let (session_id, booking_id) = start_checkout(&test, &token).await;

    let event = session_event("checkout.session.completed", &session_id, &booking_id);
    let (status, body) = send(&test.router, webhook(&event, Some(sign(&event)))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["received"], true);

    let (_, booking) = send(&test.router, get(&format!("/v1/bookings/{}", booking_id), Some(&token))).await;
    assert_eq!(booking["status"], "confirmed");
    assert_eq!(booking["room"]["name"], "Jedi Suite");

    let (_, session) = send(&test.router, get(&format!("/v1/checkout/sessions/{}", session_id), Some(&token))).await;
    assert_eq!(session["status"], "completed");

    // Redelivery is acknowledged and changes nothing
    let (status, _) = send(&test.router, webhook(&event, Some(sign(&event)))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(test.bookings.all().await[0].status, BookingStatus::Confirmed);
    assert_eq!(test.payments.all().await[0].status, PaymentStatus::Completed);
}

#[tokio::test]
async fn test_expired_webhook_cancels_booking_for_good() {
    let test = test_app();
    let token = token_for(Uuid::new_v4());
    let (session_id, booking_id) = start_checkout(&test, &token).await;

    let expired = session_event("checkout.session.expired", &session_id, &booking_id);
    let (status, _) = send(&test.router, webhook(&expired, Some(sign(&expired)))).await;
    assert_eq!(status, StatusCode::OK);

    let late = session_event("checkout.session.completed", &session_id, &booking_id);
    let (status, _) = send(&test.router, webhook(&late, Some(sign(&late)))).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(test.bookings.all().await[0].status, BookingStatus::Cancelled);
    assert_eq!(test.payments.all().await[0].status, PaymentStatus::Failed);
}

#[tokio::test]
async fn test_webhook_signature_is_enforced() {
    let test = test_app();
    let token = token_for(Uuid::new_v4());
    let (session_id, booking_id) = start_checkout(&test, &token).await;
    let event = session_event("checkout.session.completed", &session_id, &booking_id);

    let (status, body) = send(&test.router, webhook(&event, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No signature provided");

    let forged = WebhookVerifier::new(Masked::from("whsec_other"))
        .sign(event.to_string().as_bytes(), chrono::Utc::now().timestamp());
    let (status, body) = send(&test.router, webhook(&event, Some(forged))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid signature");

    assert_eq!(test.bookings.all().await[0].status, BookingStatus::Pending);
    assert_eq!(test.payments.all().await[0].status, PaymentStatus::Pending);
}

#[tokio::test]
async fn test_unrelated_webhook_is_acknowledged() {
    let test = test_app();
    let event = json!({ "id": "evt_1", "type": "customer.created", "data": { "object": {} } });

    let (status, body) = send(&test.router, webhook(&event, Some(sign(&event)))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["received"], true);
}

#[tokio::test]
async fn test_room_catalog() {
    let test = test_app();

    let (status, rooms) = send(&test.router, get("/v1/rooms", None)).await;
    assert_eq!(status, StatusCode::OK);
    let rooms = rooms.as_array().unwrap();
    assert_eq!(rooms.len(), 6);
    assert_eq!(rooms[0]["name"], "Sith Sanctuary");

    let (_, suites) = send(&test.router, get("/v1/rooms?room_type=suite&max_price=250", None)).await;
    let suites = suites.as_array().unwrap();
    assert!(!suites.is_empty());
    assert!(suites.iter().all(|r| r["room_type"] == "suite"));
    assert!(suites.iter().all(|r| r["price_per_night"].as_f64().unwrap() <= 250.0));

    let (status, room) = send(&test.router, get(&format!("/v1/rooms/{}", jedi_suite()), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(room["name"], "Jedi Suite");

    let (status, body) = send(&test.router, get("/v1/rooms/not-a-uuid", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Room not found");

    let (status, amenities) = send(&test.router, get("/v1/amenities", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!amenities.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_bookings_are_scoped_to_the_caller() {
    let test = test_app();
    let owner = token_for(Uuid::new_v4());
    let stranger = token_for(Uuid::new_v4());
    let (session_id, booking_id) = start_checkout(&test, &owner).await;

    let (status, _) = send(&test.router, get("/v1/bookings", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, mine) = send(&test.router, get("/v1/bookings", Some(&owner))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 1);
    assert_eq!(mine[0]["id"], booking_id.as_str());

    let (_, theirs) = send(&test.router, get("/v1/bookings", Some(&stranger))).await;
    assert!(theirs.as_array().unwrap().is_empty());

    let (status, _) = send(&test.router, get(&format!("/v1/bookings/{}", booking_id), Some(&stranger))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&test.router, get(&format!("/v1/checkout/sessions/{}", session_id), Some(&stranger))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_profile() {
    let test = test_app();
    let user_id = Uuid::new_v4();

    let (status, _) = send(&test.router, get("/v1/me", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, me) = send(&test.router, get("/v1/me", Some(&token_for(user_id)))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["user_id"], user_id.to_string());
    assert_eq!(me["display_name"], "Luke Skywalker");
}
