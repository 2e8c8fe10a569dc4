//! Address book embedded in each user.

use std::time::Duration;

use ecom_cart_core::{Address, AddressId, NewAddress, UserId};

use super::ShopError;
use crate::db::{Store, with_deadline};

/// Adds and removes a user's addresses.
pub struct AddressService<'a> {
    store: &'a dyn Store,
    timeout: Duration,
}

impl<'a> AddressService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Validate `address`, give it a fresh id and append it.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::InvalidAddress` for bad fields and
    /// `ShopError::UserNotFound` if the user does not exist.
    #[tracing::instrument(skip(self, address))]
    pub async fn add_address(
        &self,
        user_id: UserId,
        address: NewAddress,
    ) -> Result<Address, ShopError> {
        let address = address.into_address()?;
        with_deadline(self.timeout, self.store.push_address(user_id, &address))
            .await
            .map_err(ShopError::for_user)?;
        Ok(address)
    }

    /// Remove one address by id.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::AddressNotFound` if no address had that id and
    /// `ShopError::UserNotFound` if the user does not exist.
    #[tracing::instrument(skip(self))]
    pub async fn delete_address(
        &self,
        user_id: UserId,
        address_id: AddressId,
    ) -> Result<(), ShopError> {
        let removed = with_deadline(self.timeout, self.store.pull_address(user_id, address_id))
            .await
            .map_err(ShopError::for_user)?;
        if removed {
            Ok(())
        } else {
            Err(ShopError::AddressNotFound)
        }
    }
}
