//! Phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone cannot be empty")]
    Empty,
    /// The input contains something other than digits and separators.
    #[error("phone may only contain digits, spaces, dashes and a leading +")]
    InvalidCharacter,
    /// Too few or too many digits.
    #[error("phone must have between {min} and {max} digits")]
    Length {
        /// Minimum digit count.
        min: usize,
        /// Maximum digit count.
        max: usize,
    },
}

/// A phone number, stored as digits with an optional leading `+`.
///
/// Separators (spaces, dashes, dots, parentheses) are stripped so that
/// `"123-456-7890"` and `"1234567890"` collide on the uniqueness check.
///
/// ```
/// use ecom_cart_core::Phone;
///
/// assert_eq!(Phone::parse("(123) 456-7890").unwrap().as_str(), "1234567890");
/// assert_eq!(Phone::parse("+44 20 7946 0958").unwrap().as_str(), "+442079460958");
/// assert!(Phone::parse("12ab").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Phone(String);

impl Phone {
    /// Minimum number of digits (short national numbers).
    pub const MIN_DIGITS: usize = 7;
    /// Maximum number of digits (E.164).
    pub const MAX_DIGITS: usize = 15;

    /// Parse a `Phone` from a string.
    ///
    /// # Errors
    ///
    /// Returns a [`PhoneError`] if the input is empty, contains letters, or
    /// has a digit count outside `MIN_DIGITS..=MAX_DIGITS`.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PhoneError::Empty);
        }

        let (plus, rest) = s.strip_prefix('+').map_or(("", s), |rest| ("+", rest));

        let mut digits = String::with_capacity(rest.len() + 1);
        digits.push_str(plus);
        for c in rest.chars() {
            match c {
                '0'..='9' => digits.push(c),
                ' ' | '-' | '.' | '(' | ')' => {}
                _ => return Err(PhoneError::InvalidCharacter),
            }
        }

        let count = digits.len() - plus.len();
        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&count) {
            return Err(PhoneError::Length {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
            });
        }

        Ok(Self(digits))
    }

    /// Returns the normalized number.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Phone {
    type Error = PhoneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Phone> for String {
    fn from(phone: Phone) -> Self {
        phone.0
    }
}
