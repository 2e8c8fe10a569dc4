//! Delivery addresses embedded in a user record.

use serde::{Deserialize, Serialize};

use super::id::AddressId;

/// Errors raised when validating a [`NewAddress`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// A required field is blank.
    #[error("{0} is required")]
    Missing(&'static str),
    /// Pincode is not exactly six characters.
    #[error("pincode must be exactly {len} characters")]
    PincodeLength {
        /// Required length.
        len: usize,
    },
}

/// A stored address, identified by its own id within the owning user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub address_id: AddressId,
    pub house: String,
    pub street: String,
    pub city: String,
    pub pincode: String,
}

/// Address fields as submitted by a client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewAddress {
    #[serde(default)]
    pub house: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub pincode: String,
}

impl NewAddress {
    /// Required pincode length.
    pub const PINCODE_LEN: usize = 6;

    /// Validate the fields and assign a fresh [`AddressId`].
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::Missing`] for the first blank field, or
    /// [`AddressError::PincodeLength`] if the pincode is the wrong length.
    pub fn into_address(self) -> Result<Address, AddressError> {
        let house = required("house", &self.house)?;
        let street = required("street", &self.street)?;
        let city = required("city", &self.city)?;
        let pincode = required("pincode", &self.pincode)?;

        if pincode.chars().count() != Self::PINCODE_LEN {
            return Err(AddressError::PincodeLength {
                len: Self::PINCODE_LEN,
            });
        }

        Ok(Address {
            address_id: AddressId::generate(),
            house,
            street,
            city,
            pincode,
        })
    }
}

fn required(field: &'static str, value: &str) -> Result<String, AddressError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AddressError::Missing(field));
    }
    Ok(value.to_owned())
}
