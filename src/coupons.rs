//! Coupons

use jiff::Timestamp;
use serde::Deserialize;
use thiserror::Error;

pub mod code;
pub mod scope;

pub use code::CouponCode;
pub use scope::ProductScope;

/// Largest accepted `percent_off`.
pub const MAX_PERCENT_OFF: u8 = 100;

/// Errors for coupon definitions that break the engine's input contract.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CouponError {
    /// The code was empty after trimming.
    #[error("coupon code must not be blank")]
    BlankCode,

    /// `percent_off` was outside `0..=100`.
    #[error("percent off must be between 0 and 100, got {0}")]
    PercentOutOfRange(u8),

    /// A cent amount was below zero.
    #[error("{field} must not be negative, got {value} cents")]
    NegativeAmount {
        /// Name of the offending field
        field: &'static str,

        /// Offending value
        value: i64,
    },

    /// `applies_to` used a keyword other than `all`.
    #[error("unknown product scope: {0}")]
    UnknownScope(String),
}

/// Admin category a coupon was filed under. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponCategory {
    /// General promotion
    Promo,

    /// Partner offer
    Partner,

    /// Loyalty reward
    Loyalty,

    /// Seasonal campaign
    Seasonal,

    /// Referral reward
    Referral,

    /// Anything else
    Other,
}

/// A percentage coupon definition, as provided by the coupon repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coupon {
    /// Normalized code
    pub code: CouponCode,

    /// Percentage taken off the running balance, `0..=100`
    pub percent_off: u8,

    /// Disabled coupons are never eligible
    pub enabled: bool,

    /// Inclusive start of the validity window
    pub starts_at: Option<Timestamp>,

    /// Inclusive end of the validity window
    pub ends_at: Option<Timestamp>,

    /// Redemption cap
    pub max_redemptions: Option<u32>,

    /// Redemptions recorded so far by the order-commit step
    pub redeemed_count: u32,

    /// Minimum cart subtotal, in cents
    pub min_subtotal_cents: Option<i64>,

    /// Products the coupon applies to
    pub applies_to: ProductScope,

    /// Whether the coupon opts in to stacking; `None` means it does not
    pub stackable: Option<bool>,

    /// Exclusivity group label
    pub stack_group: Option<String>,

    /// Application priority, higher applies first
    pub priority: i32,

    /// Cap on the discount this coupon may contribute, in cents
    pub max_discount_cents: Option<i64>,

    /// Admin category
    pub category: Option<CouponCategory>,
}

impl Coupon {
    /// Create an enabled, unconstrained, non-stackable coupon.
    pub fn new(code: CouponCode, percent_off: u8) -> Self {
        Self {
            code,
            percent_off,
            enabled: true,
            starts_at: None,
            ends_at: None,
            max_redemptions: None,
            redeemed_count: 0,
            min_subtotal_cents: None,
            applies_to: ProductScope::All,
            stackable: None,
            stack_group: None,
            priority: 0,
            max_discount_cents: None,
            category: None,
        }
    }

    /// Set whether the coupon is enabled.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the inclusive validity window.
    #[must_use]
    pub fn window(mut self, starts_at: Option<Timestamp>, ends_at: Option<Timestamp>) -> Self {
        self.starts_at = starts_at;
        self.ends_at = ends_at;
        self
    }

    /// Set the redemption cap and current count.
    #[must_use]
    pub fn redemptions(mut self, max_redemptions: u32, redeemed_count: u32) -> Self {
        self.max_redemptions = Some(max_redemptions);
        self.redeemed_count = redeemed_count;
        self
    }

    /// Set the minimum subtotal.
    #[must_use]
    pub fn min_subtotal(mut self, cents: i64) -> Self {
        self.min_subtotal_cents = Some(cents);
        self
    }

    /// Restrict the coupon to a product scope.
    #[must_use]
    pub fn applies_to(mut self, scope: ProductScope) -> Self {
        self.applies_to = scope;
        self
    }

    /// Set the explicit stacking flag.
    #[must_use]
    pub fn stackable(mut self, stackable: bool) -> Self {
        self.stackable = Some(stackable);
        self
    }

    /// Place the coupon in an exclusivity group.
    #[must_use]
    pub fn stack_group(mut self, group: impl Into<String>) -> Self {
        self.stack_group = Some(group.into());
        self
    }

    /// Set the application priority.
    #[must_use]
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Cap the discount this coupon may contribute.
    #[must_use]
    pub fn max_discount(mut self, cents: i64) -> Self {
        self.max_discount_cents = Some(cents);
        self
    }

    /// File the coupon under an admin category.
    #[must_use]
    pub fn category(mut self, category: CouponCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Whether the coupon explicitly opts in to stacking.
    pub fn is_stackable(&self) -> bool {
        self.stackable == Some(true)
    }

    /// Check the definition against the engine's input contract.
    ///
    /// # Errors
    ///
    /// Returns a [`CouponError`] if `percent_off` exceeds 100 or any cent amount is negative.
    pub fn validate(&self) -> Result<(), CouponError> {
        if self.percent_off > MAX_PERCENT_OFF {
            return Err(CouponError::PercentOutOfRange(self.percent_off));
        }

        ensure_non_negative("min_subtotal_cents", self.min_subtotal_cents)?;
        ensure_non_negative("max_discount_cents", self.max_discount_cents)?;

        Ok(())
    }
}

fn ensure_non_negative(field: &'static str, value: Option<i64>) -> Result<(), CouponError> {
    match value {
        Some(value) if value < 0 => Err(CouponError::NegativeAmount { field, value }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn coupon(percent_off: u8) -> Result<Coupon, CouponError> {
        Ok(Coupon::new(CouponCode::parse("SAVE")?, percent_off))
    }

    #[test]
    fn new_coupon_defaults() -> TestResult {
        let coupon = coupon(10)?;

        assert!(coupon.enabled);
        assert!(!coupon.is_stackable());
        assert_eq!(coupon.priority, 0);
        assert_eq!(coupon.applies_to, ProductScope::All);
        assert_eq!(coupon.redeemed_count, 0);
        assert!(coupon.validate().is_ok());

        Ok(())
    }

    #[test]
    fn stackable_false_and_absent_are_equivalent() -> TestResult {
        assert!(!coupon(10)?.stackable(false).is_stackable());
        assert!(!coupon(10)?.is_stackable());
        assert!(coupon(10)?.stackable(true).is_stackable());

        Ok(())
    }

    #[test]
    fn validate_accepts_boundaries() -> TestResult {
        assert_eq!(coupon(0)?.validate(), Ok(()));
        assert_eq!(coupon(100)?.validate(), Ok(()));

        Ok(())
    }

    #[test]
    fn validate_rejects_percent_above_hundred() -> TestResult {
        assert_eq!(
            coupon(101)?.validate(),
            Err(CouponError::PercentOutOfRange(101))
        );

        Ok(())
    }

    #[test]
    fn validate_rejects_negative_amounts() -> TestResult {
        assert_eq!(
            coupon(10)?.min_subtotal(-5).validate(),
            Err(CouponError::NegativeAmount {
                field: "min_subtotal_cents",
                value: -5,
            })
        );

        assert_eq!(
            coupon(10)?.max_discount(-1).validate(),
            Err(CouponError::NegativeAmount {
                field: "max_discount_cents",
                value: -1,
            })
        );

        Ok(())
    }

    #[test]
    fn category_deserializes_snake_case() -> TestResult {
        let category: CouponCategory = serde_norway::from_str("seasonal")?;

        assert_eq!(category, CouponCategory::Seasonal);

        Ok(())
    }
}
