//! `PgStore` against a real database.
//!
//! These tests require:
//! - A running `PostgreSQL` database
//! - `DATABASE_URL` pointing at it (migrations are applied automatically)
//!
//! Run with: cargo test -p ecom-cart-integration-tests -- --ignored

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use chrono::Utc;
use secrecy::SecretString;
use tokio::task::JoinSet;

use ecom_cart_core::{
    Address, AddressId, CartItem, Email, OrderId, PaymentMethod, Phone, Price, Product, ProductId,
    UserId,
};
use ecom_cart_server::db::{
    AddressStore, CartStore, CheckoutOutcome, EMAIL_TAKEN, MIGRATOR, PHONE_TAKEN, PgStore,
    ProductStore, RepositoryError, UserStore, create_pool,
};
use ecom_cart_server::models::User;

async fn store() -> PgStore {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = create_pool(&SecretString::from(url)).await.unwrap();
    MIGRATOR.run(&pool).await.unwrap();
    PgStore::new(pool)
}

/// A user with an email and phone unlikely to collide with other runs.
fn new_user() -> User {
    let id = UserId::generate();
    let digits = id.as_uuid().as_u128() % 10_000_000_000;
    let now = Utc::now();
    User {
        id,
        first_name: "Ada".to_owned(),
        last_name: "Lovelace".to_owned(),
        email: Email::parse(&format!("{id}@example.com")).unwrap(),
        phone: Phone::parse(&format!("{digits:010}")).unwrap(),
        password_hash: "hash".to_owned(),
        token: None,
        refresh_token: None,
        created_at: now,
        updated_at: now,
    }
}

async fn inserted_user(store: &PgStore) -> User {
    let user = new_user();
    store.insert_user(&user).await.unwrap();
    user
}

fn item(name: &str, price: u64) -> CartItem {
    CartItem {
        product_id: ProductId::generate(),
        product_name: name.to_owned(),
        price: Price::new(price),
        rating: Some(3),
        image: None,
    }
}

#[tokio::test]
#[ignore = "Requires DATABASE_URL"]
async fn test_duplicate_email_and_phone_map_to_conflicts() {
    let store = store().await;
    let existing = inserted_user(&store).await;

    let mut same_email = new_user();
    same_email.email = existing.email.clone();
    let err = store.insert_user(&same_email).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(field) if field == EMAIL_TAKEN));

    let mut same_phone = new_user();
    same_phone.phone = existing.phone.clone();
    let err = store.insert_user(&same_phone).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(field) if field == PHONE_TAKEN));

    assert!(store.email_exists(&existing.email).await.unwrap());
    assert!(store.phone_exists(&existing.phone).await.unwrap());
}

#[tokio::test]
#[ignore = "Requires DATABASE_URL"]
async fn test_user_round_trip_and_token_update() {
    let store = store().await;
    let user = inserted_user(&store).await;

    store
        .update_tokens(user.id, "access", "refresh", Utc::now())
        .await
        .unwrap();
    let found = store.find_user_by_email(&user.email).await.unwrap().unwrap();
    assert_eq!(found.id, user.id);
    assert_eq!(found.phone, user.phone);
    assert_eq!(found.token.as_deref(), Some("access"));
    assert_eq!(found.refresh_token.as_deref(), Some("refresh"));

    let missing = store
        .update_tokens(UserId::generate(), "a", "r", Utc::now())
        .await;
    assert!(matches!(missing, Err(RepositoryError::NotFound)));
}

#[tokio::test]
#[ignore = "Requires DATABASE_URL"]
async fn test_products_insert_and_find() {
    let store = store().await;
    let product = Product {
        product_id: ProductId::generate(),
        product_name: "Harmonium".to_owned(),
        price: Price::new(1_250),
        rating: Some(5),
        image: Some("https://img.example.com/h.png".to_owned()),
    };
    store.insert_product(&product).await.unwrap();

    let found = store.find_product(product.product_id).await.unwrap();
    assert_eq!(found, Some(product.clone()));
    assert!(store.list_products().await.unwrap().contains(&product));
    assert_eq!(store.find_product(ProductId::generate()).await.unwrap(), None);
}

#[tokio::test]
#[ignore = "Requires DATABASE_URL"]
async fn test_checkout_moves_cart_into_one_order() {
    let store = store().await;
    let user = inserted_user(&store).await;
    store.push_cart_item(user.id, &item("P1", 100)).await.unwrap();
    store.push_cart_item(user.id, &item("P2", 200)).await.unwrap();

    let order_id = OrderId::generate();
    let outcome = store
        .checkout_cart(user.id, order_id, Utc::now(), PaymentMethod::Digital)
        .await
        .unwrap();
    let CheckoutOutcome::Placed(order) = outcome else {
        panic!("expected an order, got {outcome:?}");
    };

    assert_eq!(order.order_id, order_id);
    assert_eq!(order.price, Price::new(300));
    assert_eq!(order.order_cart.len(), 2);
    assert_eq!(order.payment_method, PaymentMethod::Digital);

    assert!(store.cart_items(user.id).await.unwrap().is_empty());
    assert_eq!(store.orders(user.id).await.unwrap(), vec![order]);
}

#[tokio::test]
#[ignore = "Requires DATABASE_URL"]
async fn test_checkout_empty_cart_and_unknown_user() {
    let store = store().await;
    let user = inserted_user(&store).await;

    let outcome = store
        .checkout_cart(user.id, OrderId::generate(), Utc::now(), PaymentMethod::Cod)
        .await
        .unwrap();
    assert_eq!(outcome, CheckoutOutcome::EmptyCart);
    assert!(store.orders(user.id).await.unwrap().is_empty());

    let missing = store
        .checkout_cart(
            UserId::generate(),
            OrderId::generate(),
            Utc::now(),
            PaymentMethod::Cod,
        )
        .await;
    assert!(matches!(missing, Err(RepositoryError::NotFound)));
}

#[tokio::test]
#[ignore = "Requires DATABASE_URL"]
async fn test_pull_cart_item_counts_removed_entries() {
    let store = store().await;
    let user = inserted_user(&store).await;
    let twice = item("Twice", 10);
    let once = item("Once", 20);
    store.push_cart_item(user.id, &twice).await.unwrap();
    store.push_cart_item(user.id, &twice).await.unwrap();
    store.push_cart_item(user.id, &once).await.unwrap();

    assert_eq!(store.pull_cart_item(user.id, twice.product_id).await.unwrap(), 2);
    assert_eq!(store.pull_cart_item(user.id, twice.product_id).await.unwrap(), 0);
    assert_eq!(store.cart_items(user.id).await.unwrap(), vec![once]);

    let missing = store
        .pull_cart_item(UserId::generate(), twice.product_id)
        .await;
    assert!(matches!(missing, Err(RepositoryError::NotFound)));
}

#[tokio::test]
#[ignore = "Requires DATABASE_URL"]
async fn test_concurrent_pulls_each_see_their_own_removal() {
    let store = store().await;
    let user = inserted_user(&store).await;
    let items: Vec<_> = (0..8).map(|n| item(&format!("Item {n}"), 10)).collect();
    for entry in &items {
        store.push_cart_item(user.id, entry).await.unwrap();
    }

    let mut pulls = JoinSet::new();
    for entry in &items {
        let store = store.clone();
        let product = entry.product_id;
        pulls.spawn(async move { store.pull_cart_item(user.id, product).await });
    }
    while let Some(joined) = pulls.join_next().await {
        assert_eq!(joined.unwrap().unwrap(), 1);
    }

    assert!(store.cart_items(user.id).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires DATABASE_URL"]
async fn test_pull_address() {
    let store = store().await;
    let user = inserted_user(&store).await;
    let address = Address {
        address_id: AddressId::generate(),
        house: "221B".to_owned(),
        street: "Baker Street".to_owned(),
        city: "London".to_owned(),
        pincode: "560001".to_owned(),
    };
    store.push_address(user.id, &address).await.unwrap();

    assert!(store.pull_address(user.id, address.address_id).await.unwrap());
    assert!(!store.pull_address(user.id, address.address_id).await.unwrap());

    let missing = store.pull_address(UserId::generate(), address.address_id).await;
    assert!(matches!(missing, Err(RepositoryError::NotFound)));
}
