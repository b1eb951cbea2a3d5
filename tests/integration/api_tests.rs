//! API integration tests
//!
//! These run against a live server seeded with the default bootstrap admin.

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to get an authenticated client
async fn get_auth_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin123"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

fn unique_serial(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}

/// Creates an asset and returns its id
async fn create_asset(client: &Client, token: &str) -> String {
    let response = client
        .post(format!("{}/assets", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "name": "Integration Laptop",
            "serialNumber": unique_serial("IT"),
            "category": "Laptop",
            "branch": "Headquarters",
            "location": "Floor 2",
            "purchaseDate": "2022-01-01T00:00:00Z",
            "purchasePrice": 1200.0,
            "vendor": "Dell"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["asset"]["id"].as_str().expect("No asset ID").to_string()
}

async fn delete_asset(client: &Client, token: &str, id: &str) {
    let _ = client
        .delete(format!("{}/assets/{}", BASE_URL, id))
        .bearer_auth(token)
        .send()
        .await;
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_readiness_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@assetflow.local",
            "password": "admin123"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["tokenType"], "Bearer");
    assert_eq!(body["user"]["role"], "Admin");
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_get_current_user() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["username"], "admin");
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/assets", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);

    let response = client
        .get(format!("{}/assets", BASE_URL))
        .header("Authorization", "Bearer not-a-token")
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_list_assets_paginated() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/assets?page=1&limit=5", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["items"].is_array());
    assert!(body["total"].is_number());
    assert!(body["totalPages"].is_number());
    assert_eq!(body["currentPage"], 1);
}

#[tokio::test]
#[ignore]
async fn test_asset_lifecycle() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let id = create_asset(&client, &token).await;

    // Read projection carries the calculator output
    let response = client
        .get(format!("{}/assets/{}", BASE_URL, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "Active");
    assert!(body["depreciation"]["currentValue"].as_f64().expect("currentValue") < 1200.0);

    // Retire, then try to bring it back
    let response = client
        .put(format!("{}/assets/{}", BASE_URL, id))
        .bearer_auth(&token)
        .json(&json!({ "status": "Retired" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .put(format!("{}/assets/{}", BASE_URL, id))
        .bearer_auth(&token)
        .json(&json!({ "status": "Active" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    let response = client
        .get(format!("{}/assets/{}/timeline", BASE_URL, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    let timeline: Value = response.json().await.expect("Failed to parse response");
    let entries = timeline.as_array().expect("timeline array");
    assert!(entries.len() >= 2);
    assert_eq!(entries.last().expect("entry")["status"], "Retired");

    delete_asset(&client, &token, &id).await;
}

#[tokio::test]
#[ignore]
async fn test_duplicate_serial_number() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let serial = unique_serial("DUP");

    let payload = json!({
        "name": "Monitor",
        "serialNumber": serial,
        "category": "Monitor",
        "branch": "Headquarters",
        "location": "Floor 1",
        "purchaseDate": "2023-06-01T00:00:00Z",
        "purchasePrice": 300.0,
        "vendor": "LG"
    });

    let first = client
        .post(format!("{}/assets", BASE_URL))
        .bearer_auth(&token)
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(first.status(), 201);
    let body: Value = first.json().await.expect("Failed to parse response");

    let second = client
        .post(format!("{}/assets", BASE_URL))
        .bearer_auth(&token)
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(second.status(), 409);

    delete_asset(&client, &token, body["asset"]["id"].as_str().expect("id")).await;
}

#[tokio::test]
#[ignore]
async fn test_maintenance_request_flow() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let asset_id = create_asset(&client, &token).await;

    let response = client
        .post(format!("{}/maintenance/requests", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Screen flicker",
            "description": "Display flickers after wake",
            "assetId": asset_id,
            "category": "hardware",
            "priority": "high"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let request_id = body["request"]["id"].as_str().expect("request id").to_string();
    assert_eq!(body["request"]["status"], "pending");

    // Feedback is only accepted once completed
    let response = client
        .post(format!("{}/maintenance/requests/{}/feedback", BASE_URL, request_id))
        .bearer_auth(&token)
        .json(&json!({ "rating": 5 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 422);

    let me: Value = client
        .get(format!("{}/auth/me", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    let response = client
        .post(format!("{}/maintenance/requests/{}/assign", BASE_URL, request_id))
        .bearer_auth(&token)
        .json(&json!({ "assignedTo": me["id"] }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["request"]["status"], "approved");
    assert_eq!(body["request"]["assignedTo"], me["id"]);

    let response = client
        .get(format!("{}/maintenance/analytics", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_transfer_requires_destination() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let asset_id = create_asset(&client, &token).await;

    let response = client
        .post(format!("{}/transfers", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "assetId": asset_id,
            "transferType": "branch",
            "fromBranch": "Headquarters",
            "reason": "Relocation"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    delete_asset(&client, &token, &asset_id).await;
}

#[tokio::test]
#[ignore]
async fn test_acquisition_approval_and_budget() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .post(format!("{}/acquisition/requests", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "department": "IT",
            "branch": "Headquarters",
            "justification": "Replace aging laptops",
            "businessCase": "Developer productivity",
            "items": [
                { "name": "Laptop", "category": "Laptop", "quantity": 2, "unitPrice": 1500.0 }
            ]
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["request"]["totalCost"].as_f64(), Some(3000.0));
    let id = body["request"]["id"].as_str().expect("request id").to_string();

    // A draft cannot be approved directly
    let response = client
        .put(format!("{}/acquisition/requests/{}/approve", BASE_URL, id))
        .bearer_auth(&token)
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    for step in ["submit", "approve"] {
        let response = client
            .put(format!("{}/acquisition/requests/{}/{}", BASE_URL, id, step))
            .bearer_auth(&token)
            .json(&json!({}))
            .send()
            .await
            .expect("Failed to send request");
        assert!(response.status().is_success(), "{} failed", step);
    }

    let response = client
        .get(format!("{}/acquisition/budget/IT", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let budget: Value = response.json().await.expect("Failed to parse response");
    assert!(budget["usedBudget"].as_f64().expect("usedBudget") >= 3000.0);
}

#[tokio::test]
#[ignore]
async fn test_generate_report() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .post(format!("{}/reports/generate", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Inventory",
            "config": { "type": "asset-inventory" }
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["report"]["status"], "completed");
    assert!(body["rows"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_dashboard_metrics() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/dashboard/metrics?timeRange=7d", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_get_settings() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/settings", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["depreciation"]["method"].is_string());
    assert!(body["budget"]["departmentAnnualBudget"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_depreciation_calculator() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!(
            "{}/settings/depreciation/calculate?purchasePrice=1000&purchaseDate=2020-01-01T00:00:00Z&category=Laptop&currentDate=2022-01-01T00:00:00Z&method=straight-line",
            BASE_URL
        ))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["method"], "straight-line");
    assert!(body["currentValue"].as_f64().expect("currentValue") < 1000.0);
}
