//! Newtype IDs for type-safe entity references.
//!
//! Every document (user, product, address, order) is keyed by a UUID. The
//! `define_id!` macro wraps that UUID so a product id can never be passed where
//! a user id is expected, and gives each id the same parsing rules for values
//! that arrive as query parameters.

use thiserror::Error;

/// Error returned when a string is not a well-formed id.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid {kind}: {value:?}")]
pub struct IdError {
    /// Human-readable id kind (e.g. "user id").
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around [`uuid::Uuid`] with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - `generate()` for fresh v4 ids and `parse()` / `FromStr` for untrusted input
/// - `sqlx` `Type`, `Encode`, and `Decode` implementations (with `postgres` feature)
///
/// # Example
///
/// ```rust
/// # use ecom_cart_core::define_id;
/// define_id!(UserId, "user id");
/// define_id!(OrderId, "order id");
///
/// let user_id = UserId::generate();
/// let parsed = UserId::parse(&user_id.to_string()).unwrap();
/// assert_eq!(user_id, parsed);
///
/// // These are different types, so this won't compile:
/// // let _: UserId = OrderId::generate();
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident, $kind:literal) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(::uuid::Uuid);

        impl $name {
            /// Wrap an existing UUID.
            #[must_use]
            pub const fn new(id: ::uuid::Uuid) -> Self {
                Self(id)
            }

            /// Generate a fresh random id.
            #[must_use]
            pub fn generate() -> Self {
                Self(::uuid::Uuid::new_v4())
            }

            /// Parse an id from untrusted text (query parameters, path segments).
            ///
            /// # Errors
            ///
            /// Returns an `IdError` if the input is empty or not a UUID.
            pub fn parse(s: &str) -> ::core::result::Result<Self, $crate::IdError> {
                ::uuid::Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|_| $crate::IdError {
                        kind: $kind,
                        value: s.to_owned(),
                    })
            }

            /// Get the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> ::uuid::Uuid {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::IdError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl From<::uuid::Uuid> for $name {
            fn from(id: ::uuid::Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for ::uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <::uuid::Uuid as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <::uuid::Uuid as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                let id = <::uuid::Uuid as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self(id))
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <::uuid::Uuid as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

define_id!(UserId, "user id");
define_id!(ProductId, "product id");
define_id!(AddressId, "address id");
define_id!(OrderId, "order id");
