//! Customer checkout, payment verification and the kitchen flow

mod common;

use common::{TestApp, error_code, multipart_upload, png_bytes};
use http::{Method, StatusCode, header};
use serde_json::{Value, json};

async fn advance(app: &TestApp, token: &str, order_id: i64, status: &str) -> (StatusCode, Value) {
    app.post(
        &format!("/api/orders/{order_id}/status"),
        Some(token),
        json!({ "status": status }),
    )
    .await
}

async fn select_method(app: &TestApp, order_id: i64, method: &str) -> Value {
    let (status, body) = app
        .put(
            &format!("/api/public/orders/{order_id}/payment-method"),
            None,
            json!({ "method": method }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "select method failed: {body}");
    body["data"].clone()
}

async fn stock_of(app: &TestApp, token: &str, menu_id: i64) -> i64 {
    let (status, body) = app.get(&format!("/api/menu/{menu_id}"), Some(token)).await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["stock"].as_i64().expect("tracked stock")
}

#[tokio::test]
async fn test_cash_checkout_through_completion() {
    let app = TestApp::new().await;
    let owner = app.owner_token().await;
    let (_, kasir) = app.create_employee(&owner, "kasir1", "kasir", 0.0).await;
    let qr = app.create_table(&owner, "T1").await;
    let latte = app.create_menu_item(&owner, "Latte", 25_000.0, Some(10)).await;

    let (status, table) = app.get(&format!("/api/public/tables/{qr}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(table["data"]["number"], "T1");

    let (status, quote) = app
        .post(
            "/api/public/cart/quote",
            None,
            json!({ "items": [{ "menu_item_id": latte, "quantity": 2 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(quote["data"]["subtotal"], 50_000.0);

    let order = app.place_order(&qr, latte, 2).await;
    let order_id = order["id"].as_i64().unwrap();
    assert_eq!(order["status"], "pending");
    assert_eq!(order["payment_status"], "unpaid");
    assert_eq!(order["total"], quote["data"]["total"]);
    assert_eq!(order["items"].as_array().unwrap().len(), 1);
    assert_eq!(stock_of(&app, &owner, latte).await, 8);

    select_method(&app, order_id, "cash").await;
    let total = order["total"].as_f64().unwrap();

    // not enough cash handed over
    let (status, body) = app
        .post(
            &format!("/api/orders/{order_id}/approve"),
            Some(&kasir),
            json!({ "amount_received": 1_000.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(error_code(&body), 5002);

    let (status, body) = app
        .post(
            &format!("/api/orders/{order_id}/approve"),
            Some(&kasir),
            json!({ "amount_received": 100_000.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["payment_status"], "paid");
    assert_eq!(body["data"]["status"], "confirmed");
    let payment = &body["data"]["latest_payment"];
    assert_eq!(payment["status"], "verified");
    assert_eq!(payment["change_amount"].as_f64().unwrap(), 100_000.0 - total);

    // a second approval loses the race
    let (status, body) = app
        .request(
            Method::POST,
            &format!("/api/orders/{order_id}/approve"),
            Some(&kasir),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), 4002);

    for next in ["preparing", "ready", "served", "completed"] {
        let (status, body) = advance(&app, &kasir, order_id, next).await;
        assert_eq!(status, StatusCode::OK, "advance to {next}: {body}");
        assert_eq!(body["data"]["status"], next);
    }

    let (status, _) = app
        .post(
            &format!("/api/orders/{order_id}/cancel"),
            Some(&kasir),
            json!({ "reason": "too late" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // the customer sees the final state
    let (status, body) = app.get(&format!("/api/public/orders/{order_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "completed");
    assert!(body["data"]["completed_at"].as_i64().is_some());
}

#[tokio::test]
async fn test_qris_proof_upload_reject_and_verify() {
    let app = TestApp::new().await;
    let owner = app.owner_token().await;
    let qr = app.create_table(&owner, "T2").await;
    let croissant = app.create_menu_item(&owner, "Croissant", 18_000.0, None).await;

    let order = app.place_order(&qr, croissant, 1).await;
    let order_id = order["id"].as_i64().unwrap();
    select_method(&app, order_id, "qris").await;

    // nothing to verify yet
    let (status, body) = app
        .request(
            Method::POST,
            &format!("/api/orders/{order_id}/verify-qris"),
            Some(&owner),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_code(&body), 5008);

    // wrong endpoint for the chosen method
    let (status, body) = app
        .post(
            &format!("/api/orders/{order_id}/verify-cash"),
            Some(&owner),
            json!({ "amount_received": 18_000.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), 5007);

    let upload_uri = format!("/api/public/orders/{order_id}/payment-proof");
    let (status, body) = app
        .send(multipart_upload(&upload_uri, "proof.png", &png_bytes()))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["payment_status"], "awaiting_verification");

    // the method is locked while a proof waits
    let (status, _) = app
        .put(
            &format!("/api/public/orders/{order_id}/payment-method"),
            None,
            json!({ "method": "cash" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .post(
            &format!("/api/orders/{order_id}/reject-payment"),
            Some(&owner),
            json!({ "reason": "blurry" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["payment_status"], "unpaid");
    assert_eq!(body["data"]["latest_payment"]["status"], "rejected");

    let (status, _) = app
        .send(multipart_upload(&upload_uri, "proof.png", &png_bytes()))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .request(
            Method::POST,
            &format!("/api/orders/{order_id}/verify-qris"),
            Some(&owner),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["payment_status"], "paid");
    assert_eq!(body["data"]["status"], "confirmed");

    let request = http::Request::builder()
        .uri(format!("/api/orders/{order_id}/payment-proof"))
        .header(header::AUTHORIZATION, format!("Bearer {owner}"))
        .body(axum::body::Body::empty())
        .unwrap();
    let (status, headers, bytes) = app.send_raw(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "image/jpeg");
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
}

#[tokio::test]
async fn test_proof_rejected_for_cash_and_bad_files() {
    let app = TestApp::new().await;
    let owner = app.owner_token().await;
    let qr = app.create_table(&owner, "T3").await;
    let tea = app.create_menu_item(&owner, "Teh Tarik", 15_000.0, None).await;
    let order = app.place_order(&qr, tea, 1).await;
    let order_id = order["id"].as_i64().unwrap();
    let upload_uri = format!("/api/public/orders/{order_id}/payment-proof");

    // no method chosen yet
    let (status, _) = app
        .send(multipart_upload(&upload_uri, "proof.png", &png_bytes()))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    select_method(&app, order_id, "transfer").await;
    let (status, _) = app
        .send(multipart_upload(&upload_uri, "proof.txt", b"not an image"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.get(&format!("/api/public/orders/{order_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["payment_status"], "unpaid");
}

#[tokio::test]
async fn test_cancel_restores_stock_and_is_final() {
    let app = TestApp::new().await;
    let owner = app.owner_token().await;
    let qr = app.create_table(&owner, "T4").await;
    let cake = app.create_menu_item(&owner, "Cheesecake", 30_000.0, Some(5)).await;

    let order = app.place_order(&qr, cake, 3).await;
    let order_id = order["id"].as_i64().unwrap();
    assert_eq!(stock_of(&app, &owner, cake).await, 2);

    // more than what is left
    let (status, body) = app
        .post(
            "/api/public/orders",
            None,
            json!({
                "qr_code": qr,
                "customer_name": "Sari",
                "items": [{ "menu_item_id": cake, "quantity": 3 }],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_code(&body), 6003);

    let (status, body) = app
        .post(
            &format!("/api/orders/{order_id}/cancel"),
            Some(&owner),
            json!({ "reason": "customer left" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "cancelled");
    assert_eq!(body["data"]["cancel_reason"], "customer left");
    assert_eq!(stock_of(&app, &owner, cake).await, 5);

    let (status, _) = advance(&app, &owner, order_id, "confirmed").await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_kitchen_flow_requires_payment_and_order() {
    let app = TestApp::new().await;
    let owner = app.owner_token().await;
    let qr = app.create_table(&owner, "T5").await;
    let espresso = app.create_menu_item(&owner, "Espresso", 12_000.0, None).await;
    let order = app.place_order(&qr, espresso, 1).await;
    let order_id = order["id"].as_i64().unwrap();

    // skipping a step
    let (status, body) = advance(&app, &owner, order_id, "ready").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), 4008);

    // confirming unpaid is fine, cooking is not
    let (status, _) = advance(&app, &owner, order_id, "confirmed").await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = advance(&app, &owner, order_id, "preparing").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_code(&body), 4009);
}

#[tokio::test]
async fn test_public_lookups() {
    let app = TestApp::new().await;
    let owner = app.owner_token().await;

    let (status, body) = app.get("/api/public/tables/no-such-qr", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"]["code"].as_u64().is_some());

    let (status, _) = app.get("/api/public/orders/424242", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.get("/api/public/cafe", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["cafe_name"].is_string());

    app.create_menu_item(&owner, "Mocha", 28_000.0, None).await;
    let (status, body) = app.get("/api/public/menu", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_promo_code_applies_at_checkout() {
    let app = TestApp::new().await;
    let owner = app.owner_token().await;
    let qr = app.create_table(&owner, "T6").await;
    let latte = app.create_menu_item(&owner, "Latte", 25_000.0, None).await;

    let (status, body) = app
        .post(
            "/api/promos",
            Some(&owner),
            json!({
                "code": "HEMAT10",
                "name": "Hemat 10%",
                "discount_type": "percentage",
                "discount_value": 10.0,
                "min_order": 40_000.0,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, preview) = app
        .get("/api/public/promos/HEMAT10?subtotal=50000", None)
        .await;
    assert_eq!(status, StatusCode::OK, "{preview}");
    assert_eq!(preview["data"]["discount"], 5_000.0);

    let (status, body) = app
        .post(
            "/api/public/orders",
            None,
            json!({
                "qr_code": qr,
                "customer_name": "Dewi",
                "items": [{ "menu_item_id": latte, "quantity": 2 }],
                "promo_code": "HEMAT10",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["discount"], 5_000.0);
    assert_eq!(body["data"]["promo_code"], "HEMAT10");

    // below the minimum order
    let (status, _) = app
        .post(
            "/api/public/cart/quote",
            None,
            json!({
                "items": [{ "menu_item_id": latte, "quantity": 1 }],
                "promo_code": "HEMAT10",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_checkouts_share_the_write_lock() {
    let app = TestApp::with_file_database().await;
    let owner = app.owner_token().await;
    let (_, kasir) = app.create_employee(&owner, "kasir1", "kasir", 0.0).await;
    let qr = app.create_table(&owner, "T9").await;
    let latte = app.create_menu_item(&owner, "Latte", 25_000.0, Some(20)).await;

    let checkouts = (0..8).map(|i| {
        app.post(
            "/api/public/orders",
            None,
            json!({
                "qr_code": qr,
                "customer_name": format!("Guest {i}"),
                "items": [{ "menu_item_id": latte, "quantity": 1 }],
            }),
        )
    });
    let results = futures::future::join_all(checkouts).await;
    for (status, body) in &results {
        assert_eq!(*status, StatusCode::OK, "{body}");
    }
    assert_eq!(stock_of(&app, &owner, latte).await, 12);

    let order_id = results[0].1["data"]["id"].as_i64().unwrap();
    let total = results[0].1["data"]["total"].as_f64().unwrap();
    select_method(&app, order_id, "cash").await;

    let uri = format!("/api/orders/{order_id}/approve");
    let approvals = (0..4).map(|_| {
        app.post(&uri, Some(&kasir), json!({ "amount_received": total }))
    });
    let results = futures::future::join_all(approvals).await;
    let approved = results.iter().filter(|(s, _)| *s == StatusCode::OK).count();
    assert_eq!(approved, 1, "{results:?}");
    for (status, body) in results.iter().filter(|(s, _)| *s != StatusCode::OK) {
        assert_eq!(*status, StatusCode::CONFLICT, "{body}");
        assert_eq!(error_code(body), 4002);
    }
}
