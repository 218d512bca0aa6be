mod common;

use axum::http::StatusCode;
use common::{invoice_payload, TestApp};
use mongodb::bson::doc;
use reqwest::Client;

async fn create(app: &TestApp, payload: &serde_json::Value) -> serde_json::Value {
    let response = Client::new()
        .post(format!("{}/api/invoices", app.address))
        .json(payload)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::CREATED, response.status());
    response.json().await.expect("Failed to parse JSON")
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn create_and_get_invoice_works() {
    let app = TestApp::spawn().await;

    let body = create(&app, &invoice_payload("Acme Corp", "INV-001")).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["vendor"]["name"], "Acme Corp");
    assert_eq!(body["data"]["invoice"]["number"], "INV-001");
    assert!(body["data"]["fileId"].as_str().is_some_and(|s| !s.is_empty()));
    assert!(body["data"]["createdAt"].as_str().is_some());

    let id = body["data"]["id"].as_str().unwrap();

    // Verify DB
    let stored = app
        .db
        .invoices()
        .find_one(doc! { "_id": id }, None)
        .await
        .unwrap()
        .expect("Invoice not found in DB");
    assert_eq!(stored.vendor.name, "Acme Corp");

    // Fetch over HTTP
    let response = Client::new()
        .get(format!("{}/api/invoices/{}", app.address, id))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::OK, response.status());

    let fetched: serde_json::Value = response.json().await.unwrap();
    assert_eq!(fetched["data"]["id"], id);

    app.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn duplicate_file_id_is_a_conflict() {
    let app = TestApp::spawn().await;

    let mut payload = invoice_payload("Acme Corp", "INV-001");
    payload["fileId"] = serde_json::json!("fixed-file-id");
    create(&app, &payload).await;

    let response = Client::new()
        .post(format!("{}/api/invoices", app.address))
        .json(&payload)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::CONFLICT, response.status());

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);

    // The first record is untouched
    let total = app
        .db
        .invoices()
        .count_documents(doc! { "fileId": "fixed-file-id" }, None)
        .await
        .unwrap();
    assert_eq!(total, 1);

    app.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn invalid_payload_reports_each_field() {
    let app = TestApp::spawn().await;

    let mut payload = invoice_payload("", "INV-002");
    payload["invoice"]["taxPercent"] = serde_json::json!(150.0);

    let response = Client::new()
        .post(format!("{}/api/invoices", app.address))
        .json(&payload)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::BAD_REQUEST, response.status());

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Validation failed");

    let fields: Vec<&str> = body["details"]
        .as_array()
        .expect("missing details")
        .iter()
        .filter_map(|d| d["field"].as_str())
        .collect();
    assert!(fields.contains(&"vendor.name"));
    assert!(fields.contains(&"invoice.taxPercent"));

    app.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn update_replaces_data_and_stamps_updated_at() {
    let app = TestApp::spawn().await;

    let body = create(&app, &invoice_payload("Acme Corp", "INV-001")).await;
    let id = body["data"]["id"].as_str().unwrap();
    assert!(body["data"]["updatedAt"].is_null());

    let response = Client::new()
        .put(format!("{}/api/invoices/{}", app.address, id))
        .json(&invoice_payload("Globex", "INV-001-R1"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::OK, response.status());

    let updated: serde_json::Value = response.json().await.unwrap();
    assert_eq!(updated["data"]["vendor"]["name"], "Globex");
    assert_eq!(updated["data"]["invoice"]["number"], "INV-001-R1");
    assert!(updated["data"]["updatedAt"].as_str().is_some());

    app.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn missing_invoice_is_not_found() {
    let app = TestApp::spawn().await;
    let client = Client::new();
    let url = format!("{}/api/invoices/no-such-id", app.address);

    let get = client.get(&url).send().await.unwrap();
    assert_eq!(StatusCode::NOT_FOUND, get.status());

    let put = client
        .put(&url)
        .json(&invoice_payload("Acme", "INV-9"))
        .send()
        .await
        .unwrap();
    assert_eq!(StatusCode::NOT_FOUND, put.status());

    let delete = client.delete(&url).send().await.unwrap();
    assert_eq!(StatusCode::NOT_FOUND, delete.status());

    app.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn delete_removes_the_invoice() {
    let app = TestApp::spawn().await;

    let body = create(&app, &invoice_payload("Acme Corp", "INV-001")).await;
    let id = body["data"]["id"].as_str().unwrap();

    let client = Client::new();
    let url = format!("{}/api/invoices/{}", app.address, id);

    let response = client.delete(&url).send().await.unwrap();
    assert_eq!(StatusCode::OK, response.status());

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);

    // Gone from the API and the DB
    let response = client.get(&url).send().await.unwrap();
    assert_eq!(StatusCode::NOT_FOUND, response.status());

    let second = client.delete(&url).send().await.unwrap();
    assert_eq!(StatusCode::NOT_FOUND, second.status());

    app.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn list_paginates_newest_first() {
    let app = TestApp::spawn().await;

    for i in 0..15 {
        create(&app, &invoice_payload("Acme Corp", &format!("INV-{:03}", i))).await;
    }

    let client = Client::new();
    let response = client
        .get(format!("{}/api/invoices?page=1&limit=10", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(StatusCode::OK, response.status());

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["data"].as_array().unwrap().len(), 10);
    assert_eq!(body["data"]["pagination"]["page"], 1);
    assert_eq!(body["data"]["pagination"]["limit"], 10);
    assert_eq!(body["data"]["pagination"]["total"], 15);
    assert_eq!(body["data"]["pagination"]["pages"], 2);

    let response = client
        .get(format!("{}/api/invoices?page=2&limit=10", app.address))
        .send()
        .await
        .unwrap();
    let page2: serde_json::Value = response.json().await.unwrap();
    assert_eq!(page2["data"]["data"].as_array().unwrap().len(), 5);

    // Newest first: page 1 items were created after page 2 items
    let first_created = body["data"]["data"][0]["createdAt"].as_str().unwrap();
    let last_created = page2["data"]["data"][4]["createdAt"].as_str().unwrap();
    assert!(first_created >= last_created);

    app.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn search_matches_substrings_case_insensitively() {
    let app = TestApp::spawn().await;

    create(&app, &invoice_payload("Acme Corporation", "INV-100")).await;
    create(&app, &invoice_payload("Globex", "ACME-REF-7")).await;
    create(&app, &invoice_payload("Initech", "INV-200")).await;

    let client = Client::new();
    let response = client
        .get(format!("{}/api/invoices?q=acme", app.address))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();

    // Matches vendor.name on one record and invoice.number on another
    assert_eq!(body["data"]["pagination"]["total"], 2);

    // Regex metacharacters in the query are literal
    let response = client
        .get(format!("{}/api/invoices?q=.*", app.address))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["pagination"]["total"], 0);

    app.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn list_limit_is_capped() {
    let app = TestApp::spawn().await;

    let response = Client::new()
        .get(format!("{}/api/invoices?limit=500", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(StatusCode::OK, response.status());

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["pagination"]["limit"], 100);

    app.cleanup().await;
}
