//! `PostgreSQL` store.
//!
//! Embedded collections are `JSONB` arrays on `shop.users`; each mutation is
//! one `UPDATE` on one row. Pulls that report how much they removed lock the
//! row first, so the before and after lengths come from the same version.
//!
//! Queries are built at runtime with `query_as` and mapped through `FromRow`
//! row types, so the crate compiles without a database reachable at build
//! time.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use ecom_cart_core::{
    Address, AddressId, CartItem, Email, Order, OrderId, PaymentMethod, Phone, Price, Product,
    ProductId, UserId,
};

use super::{
    AddressStore, CartStore, CheckoutOutcome, EMAIL_TAKEN, PHONE_TAKEN, ProductStore,
    RepositoryError, UserStore,
};
use crate::models::User;

// =============================================================================
// Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    password_hash: String,
    token: Option<String>,
    refresh_token: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let phone = Phone::parse(&row.phone).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid phone in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email,
            phone,
            password_hash: row.password_hash,
            token: row.token,
            refresh_token: row.refresh_token,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    product_name: String,
    price: Price,
    rating: Option<i16>,
    image: Option<String>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let rating = row
            .rating
            .map(u8::try_from)
            .transpose()
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid rating: {e}")))?;

        Ok(Self {
            product_id: row.id,
            product_name: row.product_name,
            price: row.price,
            rating,
            image: row.image,
        })
    }
}

/// Map a unique-constraint violation on `shop.users` to the field it guards.
fn map_user_conflict(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        let field = match db_err.constraint() {
            Some("users_phone_key") => PHONE_TAKEN,
            _ => EMAIL_TAKEN,
        };
        return RepositoryError::Conflict(field.to_owned());
    }
    RepositoryError::Database(e)
}

const fn require_row(rows_affected: u64) -> Result<(), RepositoryError> {
    if rows_affected == 0 {
        Err(RepositoryError::NotFound)
    } else {
        Ok(())
    }
}

// =============================================================================
// Store
// =============================================================================

/// Store backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn user_exists(&self, id: UserId) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM shop.users WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn email_exists(&self, email: &Email) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM shop.users WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn phone_exists(&self, phone: &Phone) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM shop.users WHERE phone = $1)")
                .bind(phone.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn insert_user(&self, user: &User) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO shop.users
                (id, first_name, last_name, email, phone, password_hash,
                 token, refresh_token, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.email.as_str())
        .bind(user.phone.as_str())
        .bind(&user.password_hash)
        .bind(user.token.as_deref())
        .bind(user.refresh_token.as_deref())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_user_conflict)?;

        Ok(())
    }

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, first_name, last_name, email, phone, password_hash,
                   token, refresh_token, created_at, updated_at
            FROM shop.users
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn update_tokens(
        &self,
        id: UserId,
        token: &str,
        refresh_token: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.users
            SET token = $2, refresh_token = $3, updated_at = $4
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(token)
        .bind(refresh_token)
        .bind(updated_at)
        .execute(&self.pool)
        .await?;

        require_row(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ProductStore for PgStore {
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, product_name, price, rating, image
            FROM shop.products
            ORDER BY product_name, id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, product_name, price, rating, image FROM shop.products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    async fn insert_product(&self, product: &Product) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO shop.products (id, product_name, price, rating, image)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(product.product_id)
        .bind(&product.product_name)
        .bind(product.price)
        .bind(product.rating.map(i16::from))
        .bind(product.image.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("product already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(())
    }
}

#[async_trait]
impl CartStore for PgStore {
    async fn push_cart_item(&self, user: UserId, item: &CartItem) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.users
            SET user_cart = user_cart || jsonb_build_array($2::jsonb), updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(user)
        .bind(Json(item))
        .execute(&self.pool)
        .await?;

        require_row(result.rows_affected())
    }

    async fn pull_cart_item(
        &self,
        user: UserId,
        product: ProductId,
    ) -> Result<usize, RepositoryError> {
        let removed: Option<i32> = sqlx::query_scalar(
            r"
            WITH before AS (
                SELECT id, jsonb_array_length(user_cart) AS len
                FROM shop.users
                WHERE id = $1
                FOR UPDATE
            )
            UPDATE shop.users u
            SET user_cart = COALESCE(
                    (SELECT jsonb_agg(item)
                     FROM jsonb_array_elements(u.user_cart) AS item
                     WHERE item ->> 'product_id' <> $2::text),
                    '[]'::jsonb),
                updated_at = now()
            FROM before b
            WHERE u.id = b.id
            RETURNING b.len - jsonb_array_length(u.user_cart)
            ",
        )
        .bind(user)
        .bind(product.to_string())
        .fetch_optional(&self.pool)
        .await?;

        let removed = removed.ok_or(RepositoryError::NotFound)?;
        usize::try_from(removed)
            .map_err(|e| RepositoryError::DataCorruption(format!("negative removal count: {e}")))
    }

    async fn cart_items(&self, user: UserId) -> Result<Vec<CartItem>, RepositoryError> {
        let cart: Option<Json<Vec<CartItem>>> =
            sqlx::query_scalar("SELECT user_cart FROM shop.users WHERE id = $1")
                .bind(user)
                .fetch_optional(&self.pool)
                .await?;

        cart.map(|Json(items)| items).ok_or(RepositoryError::NotFound)
    }

    async fn checkout_cart(
        &self,
        user: UserId,
        order_id: OrderId,
        ordered_at: DateTime<Utc>,
        payment: PaymentMethod,
    ) -> Result<CheckoutOutcome, RepositoryError> {
        // Everything except the items and their total, which come from the row.
        let mut shell = Order::from_items(Vec::new(), payment);
        shell.order_id = order_id;
        shell.ordered_at = ordered_at;

        let placed: Option<Json<Order>> = sqlx::query_scalar(
            r"
            UPDATE shop.users
            SET order_status = order_status || jsonb_build_array(
                    $2::jsonb || jsonb_build_object(
                        'order_cart', user_cart,
                        'price', (SELECT COALESCE(SUM((item ->> 'price')::bigint), 0)
                                  FROM jsonb_array_elements(user_cart) AS item))),
                user_cart = '[]'::jsonb,
                updated_at = now()
            WHERE id = $1 AND jsonb_array_length(user_cart) > 0
            RETURNING order_status -> -1
            ",
        )
        .bind(user)
        .bind(Json(&shell))
        .fetch_optional(&self.pool)
        .await?;

        match placed {
            Some(Json(order)) => Ok(CheckoutOutcome::Placed(order)),
            None if self.user_exists(user).await? => Ok(CheckoutOutcome::EmptyCart),
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn push_order(&self, user: UserId, order: &Order) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.users
            SET order_status = order_status || jsonb_build_array($2::jsonb), updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(user)
        .bind(Json(order))
        .execute(&self.pool)
        .await?;

        require_row(result.rows_affected())
    }

    async fn orders(&self, user: UserId) -> Result<Vec<Order>, RepositoryError> {
        let orders: Option<Json<Vec<Order>>> =
            sqlx::query_scalar("SELECT order_status FROM shop.users WHERE id = $1")
                .bind(user)
                .fetch_optional(&self.pool)
                .await?;

        orders.map(|Json(list)| list).ok_or(RepositoryError::NotFound)
    }
}

#[async_trait]
impl AddressStore for PgStore {
    async fn push_address(&self, user: UserId, address: &Address) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.users
            SET address_details = address_details || jsonb_build_array($2::jsonb),
                updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(user)
        .bind(Json(address))
        .execute(&self.pool)
        .await?;

        require_row(result.rows_affected())
    }

    async fn pull_address(
        &self,
        user: UserId,
        address: AddressId,
    ) -> Result<bool, RepositoryError> {
        let removed: Option<i32> = sqlx::query_scalar(
            r"
            WITH before AS (
                SELECT id, jsonb_array_length(address_details) AS len
                FROM shop.users
                WHERE id = $1
                FOR UPDATE
            )
            UPDATE shop.users u
            SET address_details = COALESCE(
                    (SELECT jsonb_agg(entry)
                     FROM jsonb_array_elements(u.address_details) AS entry
                     WHERE entry ->> 'address_id' <> $2::text),
                    '[]'::jsonb),
                updated_at = now()
            FROM before b
            WHERE u.id = b.id
            RETURNING b.len - jsonb_array_length(u.address_details)
            ",
        )
        .bind(user)
        .bind(address.to_string())
        .fetch_optional(&self.pool)
        .await?;

        removed.map(|n| n > 0).ok_or(RepositoryError::NotFound)
    }
}
