//! Cart

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

/// Errors raised when a cart context is malformed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// The subtotal was below zero.
    #[error("subtotal must not be negative, got {0} cents")]
    NegativeSubtotal(i64),
}

/// Product identifier, compared exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a product identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Return the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// The cart a coupon stack is evaluated against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartContext {
    product_id: ProductId,
    subtotal_cents: i64,
}

impl CartContext {
    /// Create a cart context.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NegativeSubtotal`] if `subtotal_cents` is below zero.
    pub fn new(product_id: ProductId, subtotal_cents: i64) -> Result<Self, CartError> {
        if subtotal_cents < 0 {
            return Err(CartError::NegativeSubtotal(subtotal_cents));
        }

        Ok(Self {
            product_id,
            subtotal_cents,
        })
    }

    /// Product being purchased
    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    /// Cart subtotal before any coupon, in cents
    pub fn subtotal_cents(&self) -> i64 {
        self.subtotal_cents
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn new_accepts_zero_subtotal() -> TestResult {
        let cart = CartContext::new(ProductId::new("vault-pro"), 0)?;

        assert_eq!(cart.subtotal_cents(), 0);
        assert_eq!(cart.product_id().as_str(), "vault-pro");

        Ok(())
    }

    #[test]
    fn new_rejects_negative_subtotal() {
        let result = CartContext::new(ProductId::new("vault-pro"), -1);

        assert_eq!(result, Err(CartError::NegativeSubtotal(-1)));
    }

    #[test]
    fn product_ids_are_case_sensitive() {
        assert_ne!(ProductId::new("Vault"), ProductId::new("vault"));
    }
}
