//! Cart, checkout, instant buy and order history over HTTP.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;

use ecom_cart_core::{Price, ProductId, UserId};
use ecom_cart_integration_tests::{TestApp, access_token_for, signup_body};

#[tokio::test]
async fn test_signup_to_checkout() {
    let app = TestApp::new();
    let p1 = app.seed_product("Alpha", 100).await;
    let p2 = app.seed_product("Beta", 200).await;

    let user = app.sign_up("ada@example.com", "5551234567").await;
    let token = Some(user.token.as_str());

    let duplicate = app
        .post("/users/signup", None, signup_body("ada@example.com", "5551234567"))
        .await;
    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);

    for product in [&p1, &p2] {
        let response = app
            .get(
                &format!("/addtocart?id={}&userID={}", product.product_id, user.id),
                token,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        assert_eq!(response.body["message"], "product added to cart successfully");
    }

    let cart = app.get(&format!("/listcart?id={}", user.id), token).await;
    assert_eq!(cart.status, StatusCode::OK);
    assert_eq!(cart.body["message"], "Cart retrieved successfully");
    assert_eq!(cart.body["total"], 300);
    assert_eq!(cart.body["cart"].as_array().unwrap().len(), 2);

    let placed = app
        .get(&format!("/cartcheckout?userID={}", user.id), token)
        .await;
    assert_eq!(placed.status, StatusCode::OK, "{:?}", placed.body);
    assert_eq!(placed.body["message"], "all items purchased successfully");
    assert_eq!(placed.body["order"]["price"], 300);
    assert_eq!(placed.body["order"]["payment_method"], "cod");

    let cart = app.get(&format!("/listcart?id={}", user.id), token).await;
    assert_eq!(cart.status, StatusCode::OK);
    assert_eq!(cart.body["message"], "Cart is empty");
    assert_eq!(cart.body["total"], 0);

    let orders = app.get(&format!("/orders?userID={}", user.id), token).await;
    let orders = orders.body["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["price"], 300);
    assert_eq!(orders[0]["order_cart"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_checkout_of_empty_cart() {
    let app = TestApp::new();
    let user = app.sign_up("ada@example.com", "5551234567").await;

    let response = app
        .get(&format!("/cartcheckout?userID={}", user.id), Some(&user.token))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "cart is empty");

    let orders = app
        .get(&format!("/orders?userID={}", user.id), Some(&user.token))
        .await;
    assert!(orders.body["orders"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_remove_item() {
    let app = TestApp::new();
    let p1 = app.seed_product("Alpha", 100).await;
    let p2 = app.seed_product("Beta", 200).await;
    let user = app.sign_up("ada@example.com", "5551234567").await;
    let token = Some(user.token.as_str());

    app.get(&format!("/addtocart?id={}&userID={}", p1.product_id, user.id), token)
        .await;

    let absent = app
        .get(&format!("/removeitem?id={}&userID={}", p2.product_id, user.id), token)
        .await;
    assert_eq!(absent.status, StatusCode::NOT_FOUND);
    assert_eq!(absent.body["error"], "item not found in cart");

    let removed = app
        .get(&format!("/removeitem?id={}&userID={}", p1.product_id, user.id), token)
        .await;
    assert_eq!(removed.status, StatusCode::OK);
    assert_eq!(removed.body["message"], "product removed from cart successfully");

    let cart = app.get(&format!("/listcart?id={}", user.id), token).await;
    assert!(cart.body["cart"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_instant_buy_with_digital_payment() {
    let app = TestApp::new();
    let p1 = app.seed_product("Alpha", 100).await;
    let p2 = app.seed_product("Beta", 200).await;
    let user = app.sign_up("ada@example.com", "5551234567").await;
    let token = Some(user.token.as_str());

    app.get(&format!("/addtocart?id={}&userID={}", p1.product_id, user.id), token)
        .await;

    let bought = app
        .get(
            &format!(
                "/instantbuy?id={}&userID={}&payment=digital",
                p2.product_id, user.id
            ),
            token,
        )
        .await;
    assert_eq!(bought.status, StatusCode::OK, "{:?}", bought.body);
    assert_eq!(bought.body["message"], "product purchased successfully");
    assert_eq!(bought.body["order"]["price"], 200);
    assert_eq!(bought.body["order"]["payment_method"], "digital");

    let cart = app.get(&format!("/listcart?id={}", user.id), token).await;
    assert_eq!(cart.body["total"], 100);
}

#[tokio::test]
async fn test_cart_keeps_snapshot_price() {
    let app = TestApp::new();
    let product = app.seed_product("Alpha", 100).await;
    let user = app.sign_up("ada@example.com", "5551234567").await;
    let token = Some(user.token.as_str());

    app.get(
        &format!("/addtocart?id={}&userID={}", product.product_id, user.id),
        token,
    )
    .await;

    let cart = app.get(&format!("/listcart?id={}", user.id), token).await;
    let item = &cart.body["cart"][0];
    assert_eq!(item["product_name"], "Alpha");
    assert_eq!(item["price"], Price::new(100).amount());
}

#[tokio::test]
async fn test_query_parameter_errors() {
    let app = TestApp::new();
    let product = app.seed_product("Alpha", 100).await;
    let user = app.sign_up("ada@example.com", "5551234567").await;
    let token = Some(user.token.as_str());

    let missing = app
        .get(&format!("/addtocart?userID={}", user.id), token)
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.body["error"], "product id is empty");

    let malformed = app
        .get(&format!("/addtocart?id=xyz&userID={}", user.id), token)
        .await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
    assert_eq!(malformed.body["error"], "invalid product id");

    let no_user = app
        .get(&format!("/addtocart?id={}", product.product_id), token)
        .await;
    assert_eq!(no_user.status, StatusCode::BAD_REQUEST);
    assert_eq!(no_user.body["error"], "user id is empty");

    let bad_payment = app
        .get(
            &format!("/cartcheckout?userID={}&payment=barter", user.id),
            token,
        )
        .await;
    assert_eq!(bad_payment.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_payment.body["kind"], "validation");
}

#[tokio::test]
async fn test_unknown_user_and_product() {
    let app = TestApp::new();
    let product = app.seed_product("Alpha", 100).await;
    let user = app.sign_up("ada@example.com", "5551234567").await;
    let token = Some(user.token.as_str());

    let unknown_product = app
        .get(
            &format!("/addtocart?id={}&userID={}", ProductId::generate(), user.id),
            token,
        )
        .await;
    assert_eq!(unknown_product.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown_product.body["kind"], "not_found");

    let stranger = UserId::generate();
    let stranger_token = access_token_for(stranger);
    let unknown_user = app
        .get(
            &format!("/addtocart?id={}&userID={stranger}", product.product_id),
            Some(&stranger_token),
        )
        .await;
    assert_eq!(unknown_user.status, StatusCode::NOT_FOUND);

    let listing = app
        .get(&format!("/listcart?id={stranger}"), Some(&stranger_token))
        .await;
    assert_eq!(listing.status, StatusCode::NOT_FOUND);
    assert_eq!(listing.body["error"], "user not found");
}

#[tokio::test]
async fn test_cannot_touch_another_users_cart() {
    let app = TestApp::new();
    let product = app.seed_product("Alpha", 100).await;
    let owner = app.sign_up("ada@example.com", "5551234567").await;
    let intruder = app.sign_up("eve@example.com", "5557654321").await;
    let token = Some(intruder.token.as_str());

    let add = app
        .get(
            &format!("/addtocart?id={}&userID={}", product.product_id, owner.id),
            token,
        )
        .await;
    assert_eq!(add.status, StatusCode::UNAUTHORIZED);
    assert_eq!(add.body["error"], "token does not belong to this user");

    let checkout = app
        .get(&format!("/cartcheckout?userID={}", owner.id), token)
        .await;
    assert_eq!(checkout.status, StatusCode::UNAUTHORIZED);

    let listing = app.get(&format!("/listcart?id={}", owner.id), token).await;
    assert_eq!(listing.status, StatusCode::UNAUTHORIZED);

    let orders = app
        .get(&format!("/orders?userID={}", owner.id), Some(&owner.token))
        .await;
    assert!(orders.body["orders"].as_array().unwrap().is_empty());
}
