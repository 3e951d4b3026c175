//! HTTP tests against the in-memory storage adapters

use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use domain_party::CustomerDeletionPolicy;
use interface_api::config::{ApiConfig, StorageBackend};
use interface_api::{create_router, AppState};

fn server_with(config: ApiConfig) -> TestServer {
    let state = AppState::in_memory(config).unwrap();
    TestServer::new(create_router(state)).unwrap()
}

fn server() -> TestServer {
    server_with(ApiConfig {
        storage: StorageBackend::Memory,
        ..Default::default()
    })
}

async fn create_customer(server: &TestServer, name: &str) -> String {
    let response = server
        .post("/api/v1/customers")
        .json(&json!({ "name": name, "email": "bride@example.com" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["id"].as_str().unwrap().to_string()
}

fn wedding_invoice(customer_id: &str, issue_date: &str) -> Value {
    json!({
        "customer_id": customer_id,
        "issue_date": issue_date,
        "due_date": "2024-12-31",
        "tax_percentage": "18",
        "advance_amount": "50.00",
        "items": [
            { "description": "Bridal makeup", "quantity": 2, "unit_price": "50.00" },
            { "description": "Trial session", "quantity": 1, "unit_price": "25.00" }
        ]
    })
}

fn issue_dates(listing: &Value) -> Vec<&str> {
    listing
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["issue_date"].as_str().unwrap())
        .collect()
}

async fn create_invoice(server: &TestServer, body: &Value) -> Value {
    let response = server.post("/api/v1/invoices").json(body).await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let server = server();

    let health = server.get("/health").await;
    health.assert_status_ok();
    assert_eq!(health.json::<Value>()["status"], "healthy");

    let ready = server.get("/health/ready").await;
    ready.assert_status_ok();
    let body = ready.json::<Value>();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["adapters"].as_array().unwrap().len(), 2);
}

// ============================================================================
// Customers
// ============================================================================

#[tokio::test]
async fn test_customer_lifecycle() {
    let server = server();
    let id = create_customer(&server, "Ayesha Rahman").await;

    let fetched = server.get(&format!("/api/v1/customers/{id}")).await;
    fetched.assert_status_ok();
    assert_eq!(fetched.json::<Value>()["name"], "Ayesha Rahman");

    let updated = server
        .put(&format!("/api/v1/customers/{id}"))
        .json(&json!({ "phone": "01711-000000" }))
        .await;
    updated.assert_status_ok();
    assert_eq!(updated.json::<Value>()["phone"], "01711-000000");

    let listed = server.get("/api/v1/customers").await.json::<Value>();
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let removed = server.delete(&format!("/api/v1/customers/{id}")).await;
    removed.assert_status_ok();
    assert_eq!(removed.json::<Value>()["invoices_removed"], 0);

    server
        .get(&format!("/api/v1/customers/{id}"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_customer_search() {
    let server = server();
    create_customer(&server, "Ayesha Rahman").await;
    create_customer(&server, "Meera Sen").await;

    let found = server
        .get("/api/v1/customers")
        .add_query_param("search", "SEN")
        .await
        .json::<Value>();
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["name"], "Meera Sen");

    let blank = server
        .get("/api/v1/customers")
        .add_query_param("search", "  ")
        .await
        .json::<Value>();
    assert_eq!(blank.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_delete_unknown_customer_is_not_found() {
    let server = server();
    let response = server
        .delete(&format!("/api/v1/customers/{}", uuid::Uuid::new_v4()))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"], "not_found");
}

#[tokio::test]
async fn test_invalid_customer_reports_field() {
    let server = server();
    let response = server
        .post("/api/v1/customers")
        .json(&json!({ "name": "Meera", "email": "not-an-email" }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json::<Value>()["field"], "email");
}

// ============================================================================
// Invoices
// ============================================================================

#[tokio::test]
async fn test_create_invoice_returns_totals() {
    let server = server();
    let customer = create_customer(&server, "Ayesha").await;

    let invoice = create_invoice(&server, &wedding_invoice(&customer, "2024-11-05")).await;

    assert!(invoice["invoice_number"].as_str().unwrap().starts_with("INV-"));
    assert_eq!(invoice["totals"]["subtotal"], "125.00");
    assert_eq!(invoice["totals"]["discount"], "0.00");
    assert_eq!(invoice["totals"]["tax"], "22.50");
    assert_eq!(invoice["totals"]["total"], "147.50");
    assert_eq!(invoice["totals"]["due"], "97.50");
    assert_eq!(invoice["items"][0]["line_total"], "100.00");
    assert_eq!(invoice["payment_status"], "pending");
}

#[tokio::test]
async fn test_empty_invoice_rejected_and_not_stored() {
    let server = server();
    let customer = create_customer(&server, "Ayesha").await;

    let mut body = wedding_invoice(&customer, "2024-11-05");
    body["items"] = json!([]);

    let response = server.post("/api/v1/invoices").json(&body).await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json::<Value>()["field"], "items");

    let listed = server.get("/api/v1/invoices").await.json::<Value>();
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_bad_line_item_reports_position() {
    let server = server();
    let customer = create_customer(&server, "Ayesha").await;

    let mut body = wedding_invoice(&customer, "2024-11-05");
    body["items"][1]["unit_price"] = json!("0");

    let response = server.post("/api/v1/invoices").json(&body).await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json::<Value>()["field"], "items[1].unit_price");
}

#[tokio::test]
async fn test_discount_above_hundred_rejected() {
    let server = server();
    let customer = create_customer(&server, "Ayesha").await;

    let mut body = wedding_invoice(&customer, "2024-11-05");
    body["discount_percentage"] = json!("120");

    let response = server.post("/api/v1/invoices").json(&body).await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json::<Value>()["field"], "discount_percentage");
}

#[tokio::test]
async fn test_unknown_customer_rejected() {
    let server = server();
    let body = wedding_invoice("0192f5a4-0000-7000-8000-000000000000", "2024-11-05");

    let response = server.post("/api/v1/invoices").json(&body).await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json::<Value>()["field"], "customer_id");
}

#[tokio::test]
async fn test_supplied_duplicate_number_conflicts() {
    let server = server();
    let customer = create_customer(&server, "Ayesha").await;

    let mut body = wedding_invoice(&customer, "2024-11-05");
    body["invoice_number"] = json!("GLAM/2024-001");
    create_invoice(&server, &body).await;

    let response = server.post("/api/v1/invoices").json(&body).await;
    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["field"], "invoice_number");
}

#[tokio::test]
async fn test_update_replaces_items_and_keeps_number() {
    let server = server();
    let customer = create_customer(&server, "Ayesha").await;
    let created = create_invoice(&server, &wedding_invoice(&customer, "2024-11-05")).await;
    let id = created["id"].as_str().unwrap();

    let mut edit = wedding_invoice(&customer, "2024-11-05");
    edit["items"] = json!([{ "description": "Engagement makeup", "quantity": 1, "unit_price": "80.00" }]);
    edit["payment_status"] = json!("paid");

    let updated = server.put(&format!("/api/v1/invoices/{id}")).json(&edit).await;
    updated.assert_status_ok();
    let updated = updated.json::<Value>();
    assert_eq!(updated["invoice_number"], created["invoice_number"]);
    assert_eq!(updated["items"].as_array().unwrap().len(), 1);
    assert_eq!(updated["totals"]["subtotal"], "80.00");
    assert_eq!(updated["is_overdue"], false);

    edit["invoice_number"] = json!("INV-FFFFFFFF");
    let renumbered = server.put(&format!("/api/v1/invoices/{id}")).json(&edit).await;
    renumbered.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(renumbered.json::<Value>()["field"], "invoice_number");
}

#[tokio::test]
async fn test_delete_invoice() {
    let server = server();
    let customer = create_customer(&server, "Ayesha").await;
    let created = create_invoice(&server, &wedding_invoice(&customer, "2024-11-05")).await;
    let path = format!("/api/v1/invoices/{}", created["id"].as_str().unwrap());

    server.delete(&path).await.assert_status(StatusCode::NO_CONTENT);
    server.get(&path).await.assert_status(StatusCode::NOT_FOUND);
    server.delete(&path).await.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_filters_newest_first() {
    let server = server();
    let customer = create_customer(&server, "Ayesha").await;
    for date in ["2024-03-02", "2024-03-20", "2024-07-01"] {
        create_invoice(&server, &wedding_invoice(&customer, date)).await;
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    let all = server.get("/api/v1/invoices").await.json::<Value>();
    assert_eq!(issue_dates(&all), vec!["2024-07-01", "2024-03-20", "2024-03-02"]);

    let march = server
        .get("/api/v1/invoices")
        .add_query_param("year", 2024)
        .add_query_param("month", 3)
        .await
        .json::<Value>();
    assert_eq!(issue_dates(&march), vec!["2024-03-20", "2024-03-02"]);

    server
        .get("/api/v1/invoices")
        .add_query_param("status", "refunded")
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_list_searches_number_and_customer_name() {
    let server = server();
    let ayesha = create_customer(&server, "Ayesha Rahman").await;
    let meera = create_customer(&server, "Meera Sen").await;
    let first = create_invoice(&server, &wedding_invoice(&ayesha, "2024-03-02")).await;
    create_invoice(&server, &wedding_invoice(&meera, "2024-03-05")).await;

    let by_name = server
        .get("/api/v1/invoices")
        .add_query_param("search", "rahman")
        .await
        .json::<Value>();
    assert_eq!(issue_dates(&by_name), vec!["2024-03-02"]);

    let number = first["invoice_number"].as_str().unwrap();
    let by_number = server
        .get("/api/v1/invoices")
        .add_query_param("search", number.to_lowercase())
        .await
        .json::<Value>();
    assert_eq!(by_number.as_array().unwrap().len(), 1);
    assert_eq!(by_number[0]["invoice_number"], number);

    let none = server
        .get("/api/v1/invoices")
        .add_query_param("search", "nobody")
        .await
        .json::<Value>();
    assert!(none.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_amounts_with_three_places_rejected() {
    let server = server();
    let customer = create_customer(&server, "Ayesha").await;

    let mut body = wedding_invoice(&customer, "2024-03-02");
    body["items"][0]["unit_price"] = json!("0.005");
    let response = server.post("/api/v1/invoices").json(&body).await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let error = response.json::<Value>();
    assert_eq!(error["error"], "validation_error");
    assert_eq!(error["field"], "items[0].unit_price");

    let mut body = wedding_invoice(&customer, "2024-03-02");
    body["advance_amount"] = json!("10.004");
    let response = server.post("/api/v1/invoices").json(&body).await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json::<Value>()["field"], "advance_amount");

    let mut body = wedding_invoice(&customer, "2024-03-02");
    body["discount_percentage"] = json!("12.345");
    let response = server.post("/api/v1/invoices").json(&body).await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json::<Value>()["field"], "discount_percentage");

    let listed = server.get("/api/v1/invoices").await.json::<Value>();
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let server = server();
    let response = server
        .post("/api/v1/invoices")
        .content_type("application/json")
        .bytes("{\"customer_id\": ".into())
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "bad_request");
}

// ============================================================================
// Reports
// ============================================================================

#[tokio::test]
async fn test_summary_for_month() {
    let server = server();
    let customer = create_customer(&server, "Ayesha").await;
    create_invoice(&server, &wedding_invoice(&customer, "2024-03-02")).await;
    create_invoice(&server, &wedding_invoice(&customer, "2024-03-20")).await;
    create_invoice(&server, &wedding_invoice(&customer, "2024-07-01")).await;

    let summary = server
        .get("/api/v1/reports/summary")
        .add_query_param("month", 3)
        .add_query_param("year", 2024)
        .await;
    summary.assert_status_ok();
    let summary = summary.json::<Value>();
    assert_eq!(summary["total_bookings"], 2);
    assert_eq!(summary["total_revenue"], "295.00");
    assert_eq!(summary["total_advance"], "100.00");
    assert_eq!(summary["total_due"], "195.00");
    assert_eq!(summary["status_counts"]["pending"], 2);
    assert_eq!(summary["skipped_count"], 0);

    let everything = server.get("/api/v1/reports/summary").await.json::<Value>();
    assert_eq!(everything["total_bookings"], 3);

    server
        .get("/api/v1/reports/summary")
        .add_query_param("month", 13)
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_monthly_series_is_zero_filled() {
    let server = server();
    let customer = create_customer(&server, "Ayesha").await;
    create_invoice(&server, &wedding_invoice(&customer, "2024-03-02")).await;

    let series = server
        .get("/api/v1/reports/monthly")
        .add_query_param("year", 2024)
        .await;
    series.assert_status_ok();
    let series = series.json::<Value>();

    let points = series["points"].as_array().unwrap();
    assert_eq!(points.len(), 12);
    assert_eq!(points[2]["booking_count"], 1);
    assert_eq!(points[2]["revenue"], "147.50");
    assert_eq!(points[0]["booking_count"], 0);
    assert_eq!(points[0]["revenue"], "0.00");
}

// ============================================================================
// Customer deletion policy
// ============================================================================

#[tokio::test]
async fn test_cascade_removes_invoices() {
    let server = server();
    let customer = create_customer(&server, "Ayesha").await;
    create_invoice(&server, &wedding_invoice(&customer, "2024-03-02")).await;
    create_invoice(&server, &wedding_invoice(&customer, "2024-04-02")).await;

    let removed = server.delete(&format!("/api/v1/customers/{customer}")).await;
    removed.assert_status_ok();
    assert_eq!(removed.json::<Value>()["invoices_removed"], 2);

    let listed = server.get("/api/v1/invoices").await.json::<Value>();
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_restrict_blocks_removal() {
    let server = server_with(ApiConfig {
        storage: StorageBackend::Memory,
        customer_deletion: CustomerDeletionPolicy::Restrict,
        ..Default::default()
    });
    let customer = create_customer(&server, "Ayesha").await;
    create_invoice(&server, &wedding_invoice(&customer, "2024-03-02")).await;

    server
        .delete(&format!("/api/v1/customers/{customer}"))
        .await
        .assert_status(StatusCode::CONFLICT);
    server
        .get(&format!("/api/v1/customers/{customer}"))
        .await
        .assert_status_ok();
}
