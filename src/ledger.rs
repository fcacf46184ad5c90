//! Ledger
//!
//! Applies surviving coupons one after another. Each coupon discounts the
//! balance left by the previous one, so application order changes the final
//! price whenever more than one coupon applies.

use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::coupons::{Coupon, CouponCode, CouponError};

/// Errors specific to discount arithmetic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// The discount could not be represented in cents.
    #[error("discount for {0} overflowed")]
    DiscountOverflow(CouponCode),

    /// The coupon broke the input contract.
    #[error("invalid coupon {0}: {1}")]
    InvalidCoupon(CouponCode, #[source] CouponError),

    /// The ledger was started from a negative subtotal.
    #[error("subtotal must not be negative, got {0} cents")]
    NegativeSubtotal(i64),

    /// The balance a coupon was applied to was below zero.
    #[error("cannot apply {code} to a negative balance of {running_cents} cents")]
    NegativeBalance {
        /// Coupon being applied
        code: CouponCode,

        /// Offending balance
        running_cents: i64,
    },
}

/// One step of the ledger: a coupon applied to the running balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedCoupon {
    /// Applied code
    pub code: CouponCode,

    /// Percentage the coupon takes off
    pub percent_off: u8,

    /// Amount taken off by this step, in cents
    pub discount_cents: i64,

    /// Balance after this step, in cents
    pub running_total_after_cents: i64,
}

impl AppliedCoupon {
    /// Apply `coupon` to a running balance.
    ///
    /// The raw discount is `floor(running × percent_off / 100)`, then capped by
    /// `max_discount_cents` when set. The balance never drops below zero.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidCoupon`] if the coupon fails validation,
    /// [`LedgerError::NegativeBalance`] if `running_cents` is below zero, or
    /// [`LedgerError::DiscountOverflow`] if the discount cannot be represented in cents.
    pub fn step(
        code: CouponCode,
        coupon: &Coupon,
        running_cents: i64,
    ) -> Result<Self, LedgerError> {
        if let Err(source) = coupon.validate() {
            return Err(LedgerError::InvalidCoupon(code, source));
        }

        if running_cents < 0 {
            return Err(LedgerError::NegativeBalance {
                code,
                running_cents,
            });
        }

        let Some(raw) = percent_of_cents(coupon.percent_off, running_cents) else {
            return Err(LedgerError::DiscountOverflow(code));
        };

        let discount_cents = coupon.max_discount_cents.map_or(raw, |cap| raw.min(cap));
        let running_total_after_cents = running_cents.saturating_sub(discount_cents).max(0);

        Ok(Self {
            code,
            percent_off: coupon.percent_off,
            discount_cents,
            running_total_after_cents,
        })
    }
}

/// Ordered record of discount applications over a subtotal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    subtotal_cents: i64,
    steps: Vec<AppliedCoupon>,
}

impl Ledger {
    /// Fold coupons, in application order, over `subtotal_cents`.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError`] if the subtotal is negative, a coupon is
    /// malformed, or any step overflows.
    pub fn apply<'a, I>(subtotal_cents: i64, coupons: I) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = (&'a CouponCode, &'a Coupon)>,
    {
        if subtotal_cents < 0 {
            return Err(LedgerError::NegativeSubtotal(subtotal_cents));
        }

        let steps = coupons.into_iter().try_fold(
            Vec::new(),
            |mut steps: Vec<AppliedCoupon>, (code, coupon)| {
                let running = steps
                    .last()
                    .map_or(subtotal_cents, |step| step.running_total_after_cents);

                steps.push(AppliedCoupon::step(code.clone(), coupon, running)?);

                Ok::<_, LedgerError>(steps)
            },
        )?;

        Ok(Self {
            subtotal_cents,
            steps,
        })
    }

    /// Balance the ledger started from
    pub fn subtotal_cents(&self) -> i64 {
        self.subtotal_cents
    }

    /// Steps in application order
    pub fn steps(&self) -> &[AppliedCoupon] {
        &self.steps
    }

    /// Consume the ledger, returning its steps
    pub fn into_steps(self) -> Vec<AppliedCoupon> {
        self.steps
    }

    /// Balance after the last step, or the subtotal when nothing applied
    pub fn final_cents(&self) -> i64 {
        self.steps
            .last()
            .map_or(self.subtotal_cents, |step| step.running_total_after_cents)
    }

    /// Total taken off the subtotal
    pub fn total_discount_cents(&self) -> i64 {
        self.subtotal_cents - self.final_cents()
    }
}

/// `floor(cents × percent / 100)`, computed in decimal space.
fn percent_of_cents(percent: u8, cents: i64) -> Option<i64> {
    let applied = Decimal::from(cents).checked_mul(Decimal::from(percent))?;
    let scaled = applied.checked_div(Decimal::ONE_HUNDRED)?;

    scaled.floor().to_i64()
}
