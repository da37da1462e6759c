//! End-to-end tests driving the router in-process.

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use billmaster_db::{Database, DbConfig};
use billmaster_server::{build_router, AppState, ServerConfig};

async fn app() -> Router {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    db.users().ensure_default_admin().await.unwrap();

    let config = ServerConfig::from_lookup(|key| match key {
        "BILLMASTER_SECRET" => Some("integration-test-secret".to_string()),
        _ => None,
    })
    .unwrap();

    build_router(AppState::new(db, config))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, HeaderMap, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }

    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, headers, value)
}

/// Logs in and returns the `name=value` cookie pair.
async fn login(app: &Router, username: &str, password: &str) -> String {
    let (status, headers, body) = send(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");

    let set_cookie = headers.get(SET_COOKIE).unwrap().to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_database() {
    let app = app().await;
    let (status, _, body) = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn requests_without_session_are_rejected() {
    let app = app().await;
    let (status, _, body) = send(&app, Method::GET, "/api/products", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert_eq!(body["message"], "Please login first");
}

#[tokio::test]
async fn wrong_password_sets_no_cookie() {
    let app = app().await;
    let (status, headers, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": "admin", "password": "wrong-password" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(headers.get(SET_COOKIE).is_none());
    assert_eq!(body["message"], "Invalid username or password");

    let (status, _, _) = send(&app, Method::POST, "/api/auth/login", None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn session_check_logout_and_bearer() {
    let app = app().await;

    let (_, _, body) = send(&app, Method::GET, "/api/auth/check", None, None).await;
    assert_eq!(body["success"], false);

    let (_, _, login_body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": "admin", "password": "admin123" })),
    )
    .await;
    assert_eq!(login_body["user"]["role"], "admin");
    let token = login_body["token"].as_str().unwrap().to_string();

    // Bearer header works without a cookie
    let request = Request::builder()
        .uri("/api/auth/check")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["username"], "admin");

    let (status, headers, _) = send(&app, Method::POST, "/api/auth/logout", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let cleared = headers.get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cleared.contains("Max-Age=0"));
}

#[tokio::test]
async fn invoice_flow_updates_stock_and_customer() {
    let app = app().await;
    let cookie = login(&app, "admin", "admin123").await;
    let cookie = Some(cookie.as_str());

    let (status, _, category) = send(
        &app,
        Method::POST,
        "/api/categories",
        cookie,
        Some(json!({ "name": "Beverages" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let category_id = category["data"]["id"].as_i64().unwrap();

    let (_, _, product) = send(
        &app,
        Method::POST,
        "/api/products",
        cookie,
        Some(json!({
            "name": "Coca Cola (500ml)",
            "category_id": category_id,
            "price_cents": 5000,
            "stock_quantity": 3,
        })),
    )
    .await;
    let product_id = product["data"]["id"].as_i64().unwrap();
    assert_eq!(product["data"]["category_name"], "Beverages");
    assert_eq!(product["data"]["unit"], "pcs");

    let (_, _, customer) = send(
        &app,
        Method::POST,
        "/api/customers",
        cookie,
        Some(json!({ "name": "Rahul Sharma", "phone": "9876543210" })),
    )
    .await;
    let customer_id = customer["data"]["id"].as_i64().unwrap();

    // 2 x 50.00 = 100.00, 10% tax = 10.00, discount 5.00 => 105.00
    let (status, _, created) = send(
        &app,
        Method::POST,
        "/api/invoices",
        cookie,
        Some(json!({
            "customer_id": customer_id,
            "items": [{ "product_id": product_id, "quantity": 2, "unit_price_cents": 5000 }],
            "tax_rate": 10,
            "discount_cents": 500,
            "payment_method": "upi",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    let number = created["invoice_number"].as_str().unwrap();
    assert!(number.starts_with("INV-"));
    assert!(number.ends_with("-0001"));
    assert_eq!(created["data"]["total_cents"], 10_500);

    let invoice_id = created["invoice_id"].as_i64().unwrap();
    let (_, _, invoice) = send(&app, Method::GET, &format!("/api/invoices/{invoice_id}"), cookie, None).await;
    assert_eq!(invoice["data"]["customer_name"], "Rahul Sharma");
    assert_eq!(invoice["data"]["payment_method"], "upi");
    assert_eq!(invoice["data"]["items"][0]["product_name"], "Coca Cola (500ml)");

    let (_, _, product) = send(&app, Method::GET, &format!("/api/products/{product_id}"), cookie, None).await;
    assert_eq!(product["data"]["stock_quantity"], 1);

    let (_, _, customer) = send(&app, Method::GET, &format!("/api/customers/{customer_id}"), cookie, None).await;
    assert_eq!(customer["data"]["total_orders"], 1);
    assert_eq!(customer["data"]["total_spent_cents"], 10_500);
    assert_eq!(customer["data"]["recent_invoices"].as_array().unwrap().len(), 1);

    // Selling more than is in stock clamps at zero
    let (status, _, second) = send(
        &app,
        Method::POST,
        "/api/invoices",
        cookie,
        Some(json!({ "items": [{ "product_id": product_id, "quantity": 5, "unit_price_cents": 5000 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(second["invoice_number"].as_str().unwrap().ends_with("-0002"));
    let (_, _, product) = send(&app, Method::GET, &format!("/api/products/{product_id}"), cookie, None).await;
    assert_eq!(product["data"]["stock_quantity"], 0);

    let (_, _, today) = send(&app, Method::GET, "/api/invoices/today", cookie, None).await;
    assert_eq!(today["data"]["total_invoices"], 2);
    assert_eq!(today["data"]["items_sold"], 7);

    let (status, _, _) = send(
        &app,
        Method::PUT,
        &format!("/api/invoices/{invoice_id}/status"),
        cookie,
        Some(json!({ "status": "cancelled" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, _, dashboard) = send(&app, Method::GET, "/api/analytics/dashboard", cookie, None).await;
    assert_eq!(dashboard["data"]["today"]["invoices"], 2);

    let (_, _, hourly) = send(&app, Method::GET, "/api/analytics/hourly-sales", cookie, None).await;
    assert_eq!(hourly["data"].as_array().unwrap().len(), 24);
}

#[tokio::test]
async fn rejected_invoices_write_nothing() {
    let app = app().await;
    let cookie = login(&app, "admin", "admin123").await;
    let cookie = Some(cookie.as_str());

    let (_, _, product) = send(
        &app,
        Method::POST,
        "/api/products",
        cookie,
        Some(json!({ "name": "Tata Salt (1kg)", "price_cents": 2800, "stock_quantity": 10 })),
    )
    .await;
    let product_id = product["data"]["id"].as_i64().unwrap();

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/api/invoices",
        cookie,
        Some(json!({
            "items": [{ "product_id": product_id, "quantity": 1, "unit_price_cents": 2800 }],
            "tax_rate": 0,
            "discount_cents": 5000,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, _, _) = send(
        &app,
        Method::POST,
        "/api/invoices",
        cookie,
        Some(json!({
            "items": [
                { "product_id": product_id, "quantity": 1, "unit_price_cents": 2800 },
                { "product_id": 9999, "quantity": 1, "unit_price_cents": 100 },
            ],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(&app, Method::POST, "/api/invoices", cookie, Some(json!({ "items": [] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, _, product) = send(&app, Method::GET, &format!("/api/products/{product_id}"), cookie, None).await;
    assert_eq!(product["data"]["stock_quantity"], 10);

    let (_, _, invoices) = send(&app, Method::GET, "/api/invoices", cookie, None).await;
    assert!(invoices["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn staff_cannot_reach_admin_endpoints() {
    let app = app().await;
    let admin = login(&app, "admin", "admin123").await;

    let (status, _, _) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        Some(&admin),
        Some(json!({ "username": "cashier1", "password": "cashier123", "full_name": "Ramesh Kumar" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        Some(&admin),
        Some(json!({ "username": "cashier1", "password": "cashier123", "full_name": "Someone Else" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Username already exists");

    let staff = login(&app, "cashier1", "cashier123").await;
    let staff = Some(staff.as_str());

    let (status, _, body) = send(&app, Method::GET, "/api/expenses", staff, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Admin access required");

    let (status, _, _) = send(&app, Method::PUT, "/api/settings", staff, Some(json!({ "tax_rate": "5" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, _) = send(&app, Method::POST, "/api/settings/factory-reset", staff, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Staff can still read settings and bill
    let (status, _, settings) = send(&app, Method::GET, "/api/settings", staff, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settings["data"]["invoice_prefix"], "INV");
}

#[tokio::test]
async fn admin_settings_and_user_management() {
    let app = app().await;
    let admin = login(&app, "admin", "admin123").await;
    let admin = Some(admin.as_str());

    let (status, _, _) = send(
        &app,
        Method::PUT,
        "/api/settings",
        admin,
        Some(json!({ "business_name": "Sharma General Store", "tax_rate": 12.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, _, settings) = send(&app, Method::GET, "/api/settings", admin, None).await;
    assert_eq!(settings["data"]["business_name"], "Sharma General Store");
    assert_eq!(settings["data"]["tax_rate"], "12.5");

    let (status, _, _) = send(&app, Method::PUT, "/api/settings", admin, Some(json!({ "tax_rate": "150" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, body) = send(&app, Method::DELETE, "/api/settings/users/1", admin, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (_, _, users) = send(&app, Method::GET, "/api/settings/users", admin, None).await;
    let users = users["data"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert!(users[0].get("password_hash").is_none());

    let (status, _, expense) = send(
        &app,
        Method::POST,
        "/api/expenses",
        admin,
        Some(json!({ "title": "Electricity bill", "amount_cents": 320000 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(expense["data"]["category"], "general");

    let (status, _, _) = send(&app, Method::POST, "/api/settings/factory-reset", admin, None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, _, expenses) = send(&app, Method::GET, "/api/expenses", admin, None).await;
    assert!(expenses["data"].as_array().unwrap().is_empty());

    // Users survive the reset
    let (status, _, _) = send(&app, Method::GET, "/api/auth/check", admin, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn category_with_products_cannot_be_deleted() {
    let app = app().await;
    let cookie = login(&app, "admin", "admin123").await;
    let cookie = Some(cookie.as_str());

    let (_, _, category) = send(&app, Method::POST, "/api/categories", cookie, Some(json!({ "name": "Dairy" }))).await;
    let category_id = category["data"]["id"].as_i64().unwrap();

    let (_, _, product) = send(
        &app,
        Method::POST,
        "/api/products",
        cookie,
        Some(json!({ "name": "Amul Milk (500ml)", "category_id": category_id, "price_cents": 3000 })),
    )
    .await;
    let product_id = product["data"]["id"].as_i64().unwrap();

    let (status, _, body) = send(&app, Method::DELETE, &format!("/api/categories/{category_id}"), cookie, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Cannot delete category with 1 products");

    // Soft-deleting the product frees the category
    let (status, _, _) = send(&app, Method::DELETE, &format!("/api/products/{product_id}"), cookie, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _, _) = send(&app, Method::DELETE, &format!("/api/categories/{category_id}"), cookie, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send(&app, Method::GET, "/api/categories/424242", cookie, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stock_adjustment_and_password_change() {
    let app = app().await;
    let cookie = login(&app, "admin", "admin123").await;
    let cookie = Some(cookie.as_str());

    let (_, _, product) = send(
        &app,
        Method::POST,
        "/api/products",
        cookie,
        Some(json!({ "name": "Paneer (200g)", "price_cents": 9000, "stock_quantity": 4 })),
    )
    .await;
    let product_id = product["data"]["id"].as_i64().unwrap();

    let (_, _, body) = send(
        &app,
        Method::POST,
        &format!("/api/products/{product_id}/stock"),
        cookie,
        Some(json!({ "quantity": 10, "operation": "subtract" })),
    )
    .await;
    assert_eq!(body["new_stock"], 0);

    let (_, _, body) = send(
        &app,
        Method::POST,
        &format!("/api/products/{product_id}/stock"),
        cookie,
        Some(json!({ "quantity": 25, "operation": "add" })),
    )
    .await;
    assert_eq!(body["new_stock"], 25);

    let (status, _, _) = send(
        &app,
        Method::PUT,
        "/api/auth/password",
        cookie,
        Some(json!({ "current_password": "nope", "new_password": "s3cure-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(
        &app,
        Method::PUT,
        "/api/auth/password",
        cookie,
        Some(json!({ "current_password": "admin123", "new_password": "s3cure-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    login(&app, "admin", "s3cure-pass").await;
}

#[tokio::test]
async fn invoice_accepts_whole_unit_cart() {
    let app = app().await;
    let cookie = login(&app, "admin", "admin123").await;
    let cookie = Some(cookie.as_str());

    let (_, _, product) = send(
        &app,
        Method::POST,
        "/api/products",
        cookie,
        Some(json!({ "name": "Basmati Rice (1kg)", "price_cents": 5000, "stock_quantity": 20 })),
    )
    .await;
    let product_id = product["data"]["id"].as_i64().unwrap();

    let (status, _, created) = send(
        &app,
        Method::POST,
        "/api/invoices",
        cookie,
        Some(json!({
            "items": [{ "product_id": product_id, "quantity": 2, "unit_price": 50 }],
            "tax_rate": 10,
            "discount_amount": 5,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["data"]["subtotal_cents"], 10_000);
    assert_eq!(created["data"]["tax_amount_cents"], 1_000);
    assert_eq!(created["data"]["total_cents"], 10_500);

    let (_, _, product) = send(&app, Method::GET, &format!("/api/products/{product_id}"), cookie, None).await;
    assert_eq!(product["data"]["stock_quantity"], 18);

    // A line price that would overflow the totals is a plain validation error
    let (status, _, body) = send(
        &app,
        Method::POST,
        "/api/invoices",
        cookie,
        Some(json!({
            "items": [{ "product_id": product_id, "quantity": 3, "unit_price_cents": i64::MAX / 2 }],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn product_update_null_clears_barcode() {
    let app = app().await;
    let cookie = login(&app, "admin", "admin123").await;
    let cookie = Some(cookie.as_str());

    let (_, _, product) = send(
        &app,
        Method::POST,
        "/api/products",
        cookie,
        Some(json!({
            "name": "Toor Dal (1kg)",
            "description": "Unpolished",
            "price_cents": 16000,
            "stock_quantity": 10,
            "barcode": "8901063012345",
        })),
    )
    .await;
    let product_id = product["data"]["id"].as_i64().unwrap();

    let (status, _, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/products/{product_id}"),
        cookie,
        Some(json!({ "barcode": null, "price_cents": 15500 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert!(updated["data"]["barcode"].is_null());
    assert_eq!(updated["data"]["description"], "Unpolished");
    assert_eq!(updated["data"]["price_cents"], 15500);
}
