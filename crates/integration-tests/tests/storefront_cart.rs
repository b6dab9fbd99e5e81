//! Integration tests for the cart routes.
//!
//! The backend cart is served by `wiremock`; the storefront computes totals
//! and stock checks on top of it.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shopfront_integration_tests::{authed, backend_path, json_body, send, test_app};

fn cart_response(items: &Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "success": true,
        "data": {"items": items},
        "message": null
    }))
}

fn mixed_cart() -> Value {
    json!([
        {
            "item_id": "line-1",
            "item_productId": "prod-1",
            "item_name": "Canvas Tote",
            "item_price": "19.99",
            "item_quantity": 2,
            "item_instock": true,
            "item_stock": 50
        },
        {
            "item_id": "line-2",
            "item_productId": "prod-2",
            "item_name": "Signed Vinyl",
            "item_price": 60,
            "item_quantity": 1,
            "item_isPreOrder": true
        }
    ])
}

async fn mount_cart(server: &MockServer, items: &Value, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(backend_path("shopping/cart")))
        .and(header("authorization", "Bearer tok"))
        .respond_with(cart_response(items))
        .expect(expected_calls)
        .mount(server)
        .await;
}

// ============================================================================
// Read
// ============================================================================

#[tokio::test]
async fn cart_view_includes_totals_and_stock() {
    let server = MockServer::start().await;
    mount_cart(&server, &mixed_cart(), 1).await;
    let app = test_app(&server.uri());

    let response = send(&app, authed("GET", "/api/cart").body(Body::empty()).unwrap()).await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["success"], true);
    let cart = &body["data"];
    assert_eq!(cart["itemCount"], 3);
    assert_eq!(cart["items"][0]["lineTotal"], "39.98");
    assert_eq!(cart["totals"]["cartSubTotal"], "99.98");
    assert_eq!(cart["totals"]["preOrderDepositDue"], "30.00");
    assert_eq!(cart["totals"]["preOrderBalanceDue"], "30.00");
    assert_eq!(cart["totals"]["dueNowSubtotal"], "69.98");
    assert_eq!(cart["stock"]["items"][1]["status"], "pre_order");
    assert_eq!(cart["stock"]["blocking"], json!([]));
}

#[tokio::test]
async fn cart_requires_token() {
    let server = MockServer::start().await;
    let app = test_app(&server.uri());

    let response = send(
        &app,
        Request::builder().uri("/api/cart").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.json(),
        json!({"success": false, "data": null, "message": "Please sign in to continue"})
    );
}

#[tokio::test]
async fn anonymous_count_is_zero_without_backend_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    let app = test_app(&server.uri());

    let response = send(
        &app,
        Request::builder()
            .uri("/api/cart/count")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["data"], json!({"count": 0}));
}

#[tokio::test]
async fn count_sums_quantities() {
    let server = MockServer::start().await;
    mount_cart(&server, &mixed_cart(), 1).await;
    let app = test_app(&server.uri());

    let response = send(
        &app,
        authed("GET", "/api/cart/count").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(response.json()["data"]["count"], 3);
}

// ============================================================================
// Mutations
// ============================================================================

#[tokio::test]
async fn add_posts_then_refreshes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(backend_path("shopping/cart")))
        .and(header("authorization", "Bearer tok"))
        .and(body_json(json!({"productId": "prod-1", "quantity": 1})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;
    mount_cart(&server, &mixed_cart(), 1).await;
    let app = test_app(&server.uri());

    let response = send(
        &app,
        authed("POST", "/api/cart/items")
            .header("content-type", "application/json")
            .body(json_body(&json!({"productId": "prod-1"})))
            .unwrap(),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["message"], "Added to cart");
}

#[tokio::test]
async fn update_issues_get_put_get() {
    let server = MockServer::start().await;
    mount_cart(&server, &mixed_cart(), 2).await;
    Mock::given(method("PUT"))
        .and(path(backend_path("shopping/cart/line-1")))
        .and(header("authorization", "Bearer tok"))
        .and(body_json(json!({"quantity": 3})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;
    let app = test_app(&server.uri());

    let response = send(
        &app,
        authed("PUT", "/api/cart/items/line-1")
            .header("content-type", "application/json")
            .body(json_body(&json!({"quantity": 3})))
            .unwrap(),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["success"], true);
}

#[tokio::test]
async fn update_over_stock_is_refused_without_put() {
    let server = MockServer::start().await;
    let items = json!([{
        "item_id": "line-1",
        "item_name": "Enamel Pin",
        "item_price": "8.00",
        "item_quantity": 1,
        "item_stock": 2
    }]);
    mount_cart(&server, &items, 1).await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let app = test_app(&server.uri());

    let response = send(
        &app,
        authed("PUT", "/api/cart/items/line-1")
            .header("content-type", "application/json")
            .body(json_body(&json!({"quantity": 5})))
            .unwrap(),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json()["message"],
        "Only 2 of Enamel Pin available, but 5 requested"
    );
}

#[tokio::test]
async fn update_decrease_on_over_stock_line_is_allowed() {
    let server = MockServer::start().await;
    let items = json!([{
        "item_id": "line-1",
        "item_name": "Enamel Pin",
        "item_price": "8.00",
        "item_quantity": 6,
        "item_stock": 2
    }]);
    mount_cart(&server, &items, 2).await;
    Mock::given(method("PUT"))
        .and(path(backend_path("shopping/cart/line-1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;
    let app = test_app(&server.uri());

    let response = send(
        &app,
        authed("PUT", "/api/cart/items/line-1")
            .header("content-type", "application/json")
            .body(json_body(&json!({"quantity": 4})))
            .unwrap(),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn update_unknown_line_is_not_found() {
    let server = MockServer::start().await;
    mount_cart(&server, &mixed_cart(), 1).await;
    let app = test_app(&server.uri());

    let response = send(
        &app,
        authed("PUT", "/api/cart/items/missing")
            .header("content-type", "application/json")
            .body(json_body(&json!({"quantity": 1})))
            .unwrap(),
    )
    .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_to_zero_is_rejected() {
    let server = MockServer::start().await;
    let app = test_app(&server.uri());

    let response = send(
        &app,
        authed("PUT", "/api/cart/items/line-1")
            .header("content-type", "application/json")
            .body(json_body(&json!({"quantity": 0})))
            .unwrap(),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["success"], false);
}

#[tokio::test]
async fn malformed_update_body_gets_failure_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(cart_response(&mixed_cart()))
        .expect(0)
        .mount(&server)
        .await;
    let app = test_app(&server.uri());

    for body in [r#"{"quantity": -1}"#, r#"{"quantity": "#] {
        let response = send(
            &app,
            authed("PUT", "/api/cart/items/line-1")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{body}");
        assert!(response.header("content-type").is_some_and(|ct| ct.starts_with("application/json")));
        let envelope = response.json();
        assert_eq!(envelope["success"], false);
        assert_eq!(envelope["data"], Value::Null);
        assert!(envelope["message"].is_string());
    }
}

#[tokio::test]
async fn remove_deletes_then_refreshes() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(backend_path("shopping/cart/line-2")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    mount_cart(&server, &json!([]), 1).await;
    let app = test_app(&server.uri());

    let response = send(
        &app,
        authed("DELETE", "/api/cart/items/line-2")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["data"]["itemCount"], 0);
}

#[tokio::test]
async fn backend_rejection_message_reaches_shopper() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(backend_path("shopping/cart")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "This product is no longer available"
        })))
        .mount(&server)
        .await;
    let app = test_app(&server.uri());

    let response = send(
        &app,
        authed("POST", "/api/cart/items")
            .header("content-type", "application/json")
            .body(json_body(&json!({"productId": "prod-9", "quantity": 1})))
            .unwrap(),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json()["message"],
        "This product is no longer available"
    );
}

// ============================================================================
// Checkout validation
// ============================================================================

#[tokio::test]
async fn checkout_blocked_by_out_of_stock_line() {
    let server = MockServer::start().await;
    let items = json!([
        {"item_id": "a", "item_name": "Desk Lamp", "item_price": "40", "item_quantity": 1,
         "item_instock": false},
        {"item_id": "b", "item_name": "Bulb", "item_price": "4", "item_quantity": 3,
         "item_stock": 1}
    ]);
    mount_cart(&server, &items, 1).await;
    let app = test_app(&server.uri());

    let response = send(
        &app,
        authed("POST", "/api/checkout/validate")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    let body = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(
        body["message"],
        "Desk Lamp is out of stock; Only 1 of Bulb available, but 3 requested"
    );
    assert_eq!(body["data"]["stock"]["blocking"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn checkout_allowed_with_low_stock_warning() {
    let server = MockServer::start().await;
    let items = json!([
        {"item_id": "a", "item_name": "Desk Lamp", "item_price": "40", "item_quantity": 1,
         "item_stock": 3}
    ]);
    mount_cart(&server, &items, 1).await;
    let app = test_app(&server.uri());

    let response = send(
        &app,
        authed("POST", "/api/checkout/validate")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["data"]["stock"]["warnings"][0]["message"], "Only 3 left in stock");
}

#[tokio::test]
async fn checkout_empty_cart_is_bad_request() {
    let server = MockServer::start().await;
    mount_cart(&server, &json!([]), 1).await;
    let app = test_app(&server.uri());

    let response = send(
        &app,
        authed("POST", "/api/checkout/validate")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["message"], "Your cart is empty");
}
