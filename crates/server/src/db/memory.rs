//! In-process store.
//!
//! Keeps every user record (with its cart, addresses and orders) and the
//! catalog behind one async `RwLock`. Each trait method takes the lock once,
//! which gives the same per-user atomicity as a single-row `UPDATE`.
//!
//! Data is lost when the process exits.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use ecom_cart_core::{
    Address, AddressId, CartItem, Email, Order, OrderId, PaymentMethod, Phone, Product, ProductId,
    UserId,
};

use super::{
    AddressStore, CartStore, CheckoutOutcome, EMAIL_TAKEN, PHONE_TAKEN, ProductStore,
    RepositoryError, UserStore,
};
use crate::models::User;

#[derive(Debug)]
struct UserRecord {
    user: User,
    cart: Vec<CartItem>,
    addresses: Vec<Address>,
    orders: Vec<Order>,
}

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<UserId, UserRecord>,
    products: HashMap<ProductId, Product>,
}

impl Inner {
    fn record_mut(&mut self, id: UserId) -> Result<&mut UserRecord, RepositoryError> {
        self.users.get_mut(&id).ok_or(RepositoryError::NotFound)
    }

    fn record(&self, id: UserId) -> Result<&UserRecord, RepositoryError> {
        self.users.get(&id).ok_or(RepositoryError::NotFound)
    }
}

/// Store backed by process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Change a catalog price in place.
    #[cfg(test)]
    pub(crate) async fn set_price(&self, id: ProductId, price: ecom_cart_core::Price) {
        if let Some(product) = self.inner.write().await.products.get_mut(&id) {
            product.price = price;
        }
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn email_exists(&self, email: &Email) -> Result<bool, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().any(|r| &r.user.email == email))
    }

    async fn phone_exists(&self, phone: &Phone) -> Result<bool, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().any(|r| &r.user.phone == phone))
    }

    async fn insert_user(&self, user: &User) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|r| r.user.email == user.email) {
            return Err(RepositoryError::Conflict(EMAIL_TAKEN.to_owned()));
        }
        if inner.users.values().any(|r| r.user.phone == user.phone) {
            return Err(RepositoryError::Conflict(PHONE_TAKEN.to_owned()));
        }

        inner.users.insert(
            user.id,
            UserRecord {
                user: user.clone(),
                cart: Vec::new(),
                addresses: Vec::new(),
                orders: Vec::new(),
            },
        );
        Ok(())
    }

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|r| &r.user.email == email)
            .map(|r| r.user.clone()))
    }

    async fn update_tokens(
        &self,
        id: UserId,
        token: &str,
        refresh_token: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        let record = inner.record_mut(id)?;
        record.user.token = Some(token.to_owned());
        record.user.refresh_token = Some(refresh_token.to_owned());
        record.user.updated_at = updated_at;
        Ok(())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let inner = self.inner.read().await;
        let mut products: Vec<Product> = inner.products.values().cloned().collect();
        products.sort_by(|a, b| a.product_name.cmp(&b.product_name));
        Ok(products)
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner.products.get(&id).cloned())
    }

    async fn insert_product(&self, product: &Product) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        if inner.products.contains_key(&product.product_id) {
            return Err(RepositoryError::Conflict("product already exists".to_owned()));
        }
        inner.products.insert(product.product_id, product.clone());
        Ok(())
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn push_cart_item(&self, user: UserId, item: &CartItem) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        inner.record_mut(user)?.cart.push(item.clone());
        Ok(())
    }

    async fn pull_cart_item(
        &self,
        user: UserId,
        product: ProductId,
    ) -> Result<usize, RepositoryError> {
        let mut inner = self.inner.write().await;
        let cart = &mut inner.record_mut(user)?.cart;
        let before = cart.len();
        cart.retain(|item| item.product_id != product);
        Ok(before - cart.len())
    }

    async fn cart_items(&self, user: UserId) -> Result<Vec<CartItem>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner.record(user)?.cart.clone())
    }

    async fn checkout_cart(
        &self,
        user: UserId,
        order_id: OrderId,
        ordered_at: DateTime<Utc>,
        payment: PaymentMethod,
    ) -> Result<CheckoutOutcome, RepositoryError> {
        let mut inner = self.inner.write().await;
        let record = inner.record_mut(user)?;
        if record.cart.is_empty() {
            return Ok(CheckoutOutcome::EmptyCart);
        }

        let mut order = Order::from_items(std::mem::take(&mut record.cart), payment);
        order.order_id = order_id;
        order.ordered_at = ordered_at;
        record.orders.push(order.clone());
        Ok(CheckoutOutcome::Placed(order))
    }

    async fn push_order(&self, user: UserId, order: &Order) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        inner.record_mut(user)?.orders.push(order.clone());
        Ok(())
    }

    async fn orders(&self, user: UserId) -> Result<Vec<Order>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner.record(user)?.orders.clone())
    }
}

#[async_trait]
impl AddressStore for MemoryStore {
    async fn push_address(&self, user: UserId, address: &Address) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        inner.record_mut(user)?.addresses.push(address.clone());
        Ok(())
    }

    async fn pull_address(
        &self,
        user: UserId,
        address: AddressId,
    ) -> Result<bool, RepositoryError> {
        let mut inner = self.inner.write().await;
        let addresses = &mut inner.record_mut(user)?.addresses;
        let before = addresses.len();
        addresses.retain(|a| a.address_id != address);
        Ok(addresses.len() != before)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ecom_cart_core::{NewAddress, Price};

    fn user(email: &str, phone: &str) -> User {
        let now = Utc::now();
        User {
            id: UserId::generate(),
            first_name: "Test".to_owned(),
            last_name: "User".to_owned(),
            email: Email::parse(email).unwrap(),
            phone: Phone::parse(phone).unwrap(),
            password_hash: "hash".to_owned(),
            token: None,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn item(price: u64) -> CartItem {
        CartItem {
            product_id: ProductId::generate(),
            product_name: format!("p{price}"),
            price: Price::new(price),
            rating: None,
            image: None,
        }
    }

    #[tokio::test]
    async fn test_insert_user_rejects_duplicates() {
        let store = MemoryStore::new();
        store.insert_user(&user("a@x.com", "1234567890")).await.unwrap();

        let dup_email = store.insert_user(&user("a@x.com", "5555555555")).await;
        assert!(matches!(dup_email, Err(RepositoryError::Conflict(f)) if f == EMAIL_TAKEN));

        let dup_phone = store.insert_user(&user("b@x.com", "1234567890")).await;
        assert!(matches!(dup_phone, Err(RepositoryError::Conflict(f)) if f == PHONE_TAKEN));
    }

    #[tokio::test]
    async fn test_find_and_update_tokens() {
        let store = MemoryStore::new();
        let u = user("a@x.com", "1234567890");
        store.insert_user(&u).await.unwrap();

        let email = Email::parse("a@x.com").unwrap();
        assert!(store.email_exists(&email).await.unwrap());
        store.update_tokens(u.id, "t", "r", Utc::now()).await.unwrap();

        let found = store.find_user_by_email(&email).await.unwrap().unwrap();
        assert_eq!(found.token.as_deref(), Some("t"));
        assert_eq!(found.refresh_token.as_deref(), Some("r"));
    }

    #[tokio::test]
    async fn test_cart_operations_require_user() {
        let store = MemoryStore::new();
        let missing = UserId::generate();
        assert!(matches!(
            store.push_cart_item(missing, &item(1)).await,
            Err(RepositoryError::NotFound)
        ));
        assert!(matches!(
            store.cart_items(missing).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_pull_cart_item_removes_all_matches() {
        let store = MemoryStore::new();
        let u = user("a@x.com", "1234567890");
        store.insert_user(&u).await.unwrap();

        let twice = item(10);
        store.push_cart_item(u.id, &twice).await.unwrap();
        store.push_cart_item(u.id, &twice).await.unwrap();
        store.push_cart_item(u.id, &item(20)).await.unwrap();

        assert_eq!(store.pull_cart_item(u.id, twice.product_id).await.unwrap(), 2);
        assert_eq!(store.pull_cart_item(u.id, twice.product_id).await.unwrap(), 0);
        assert_eq!(store.cart_items(u.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_checkout_moves_cart_into_order() {
        let store = MemoryStore::new();
        let u = user("a@x.com", "1234567890");
        store.insert_user(&u).await.unwrap();
        store.push_cart_item(u.id, &item(100)).await.unwrap();
        store.push_cart_item(u.id, &item(200)).await.unwrap();

        let order_id = OrderId::generate();
        let outcome = store
            .checkout_cart(u.id, order_id, Utc::now(), PaymentMethod::Digital)
            .await
            .unwrap();

        let CheckoutOutcome::Placed(order) = outcome else {
            panic!("expected an order");
        };
        assert_eq!(order.order_id, order_id);
        assert_eq!(order.price, Price::new(300));
        assert!(store.cart_items(u.id).await.unwrap().is_empty());
        assert_eq!(store.orders(u.id).await.unwrap().len(), 1);

        let again = store
            .checkout_cart(u.id, OrderId::generate(), Utc::now(), PaymentMethod::Cod)
            .await
            .unwrap();
        assert_eq!(again, CheckoutOutcome::EmptyCart);
    }

    #[tokio::test]
    async fn test_address_push_and_pull() {
        let store = MemoryStore::new();
        let u = user("a@x.com", "1234567890");
        store.insert_user(&u).await.unwrap();

        let address = NewAddress {
            house: "1".to_owned(),
            street: "Main".to_owned(),
            city: "Pune".to_owned(),
            pincode: "411001".to_owned(),
        }
        .into_address()
        .unwrap();
        store.push_address(u.id, &address).await.unwrap();

        assert!(store.pull_address(u.id, address.address_id).await.unwrap());
        assert!(!store.pull_address(u.id, address.address_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_products_listed_by_name() {
        let store = MemoryStore::new();
        for name in ["pear", "apple", "mango"] {
            let product = Product {
                product_id: ProductId::generate(),
                product_name: name.to_owned(),
                price: Price::new(1),
                rating: None,
                image: None,
            };
            store.insert_product(&product).await.unwrap();
        }

        let names: Vec<String> = store
            .list_products()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.product_name)
            .collect();
        assert_eq!(names, ["apple", "mango", "pear"]);
    }
}
