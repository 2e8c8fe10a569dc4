//! Cart, checkout and order history.
//!
//! Cart items are product snapshots: adding copies the product as it is now,
//! so later catalog price changes never reach an existing cart. Checkout moves
//! the whole cart into one order in a single store call.

use std::time::Duration;

use chrono::Utc;

use ecom_cart_core::{CartItem, CartSummary, Order, OrderId, PaymentMethod, ProductId, UserId};

use super::ShopError;
use crate::db::{CheckoutOutcome, Store, with_deadline};

/// Cart mutations and order placement for one user at a time.
pub struct CartService<'a> {
    store: &'a dyn Store,
    timeout: Duration,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    async fn snapshot(&self, product_id: ProductId) -> Result<CartItem, ShopError> {
        let product = with_deadline(self.timeout, self.store.find_product(product_id))
            .await?
            .ok_or(ShopError::ProductNotFound)?;
        Ok(CartItem::from(&product))
    }

    /// Append a snapshot of a product to the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::ProductNotFound` or `ShopError::UserNotFound`.
    #[tracing::instrument(skip(self))]
    pub async fn add_to_cart(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<CartItem, ShopError> {
        let item = self.snapshot(product_id).await?;
        with_deadline(self.timeout, self.store.push_cart_item(user_id, &item))
            .await
            .map_err(ShopError::for_user)?;
        Ok(item)
    }

    /// Remove every cart entry for a product.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::ItemNotInCart` if nothing matched (the cart is left
    /// unchanged) and `ShopError::UserNotFound` if the user does not exist.
    #[tracing::instrument(skip(self))]
    pub async fn remove_from_cart(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), ShopError> {
        let removed = with_deadline(self.timeout, self.store.pull_cart_item(user_id, product_id))
            .await
            .map_err(ShopError::for_user)?;
        if removed == 0 {
            return Err(ShopError::ItemNotInCart);
        }
        Ok(())
    }

    /// The cart's items and their summed price.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::UserNotFound` if the user does not exist.
    pub async fn get_cart(&self, user_id: UserId) -> Result<CartSummary, ShopError> {
        let items = with_deadline(self.timeout, self.store.cart_items(user_id))
            .await
            .map_err(ShopError::for_user)?;
        Ok(CartSummary::new(user_id, items))
    }

    /// Turn the whole cart into one order and empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::EmptyCart` if there is nothing to buy and
    /// `ShopError::UserNotFound` if the user does not exist.
    #[tracing::instrument(skip(self))]
    pub async fn checkout(
        &self,
        user_id: UserId,
        payment: PaymentMethod,
    ) -> Result<Order, ShopError> {
        let outcome = with_deadline(
            self.timeout,
            self.store
                .checkout_cart(user_id, OrderId::generate(), Utc::now(), payment),
        )
        .await
        .map_err(ShopError::for_user)?;

        match outcome {
            CheckoutOutcome::Placed(order) => {
                tracing::info!(order_id = %order.order_id, total = %order.price, "Order placed");
                Ok(order)
            }
            CheckoutOutcome::EmptyCart => Err(ShopError::EmptyCart),
        }
    }

    /// Buy a single product directly, bypassing the cart.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::ProductNotFound` or `ShopError::UserNotFound`.
    #[tracing::instrument(skip(self))]
    pub async fn instant_buy(
        &self,
        user_id: UserId,
        product_id: ProductId,
        payment: PaymentMethod,
    ) -> Result<Order, ShopError> {
        let item = self.snapshot(product_id).await?;
        let order = Order::from_items(vec![item], payment);
        with_deadline(self.timeout, self.store.push_order(user_id, &order))
            .await
            .map_err(ShopError::for_user)?;

        tracing::info!(order_id = %order.order_id, total = %order.price, "Instant order placed");
        Ok(order)
    }

    /// All orders the user has placed, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::UserNotFound` if the user does not exist.
    pub async fn list_orders(&self, user_id: UserId) -> Result<Vec<Order>, ShopError> {
        with_deadline(self.timeout, self.store.orders(user_id))
            .await
            .map_err(ShopError::for_user)
    }
}
