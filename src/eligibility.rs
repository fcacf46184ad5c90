//! Eligibility
//!
//! Static and contextual checks that decide whether a coupon could apply to a
//! cart at all, independent of any other coupon in the request. Checks run in
//! a fixed order and the first failure is the reported reason.

use jiff::Timestamp;
use tracing::debug;

use crate::{
    cart::CartContext,
    coupons::{Coupon, CouponCode},
    rejections::{PendingRejection, RejectedCoupon, RejectionReason},
};

/// A resolved coupon together with where its code appeared in the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    position: usize,
    code: CouponCode,
    coupon: Coupon,
}

impl Candidate {
    /// Create a candidate for the code at `position` in the request.
    pub fn new(position: usize, code: CouponCode, coupon: Coupon) -> Self {
        Self {
            position,
            code,
            coupon,
        }
    }

    /// Position of the code in the request
    pub fn position(&self) -> usize {
        self.position
    }

    /// Requested code
    pub fn code(&self) -> &CouponCode {
        &self.code
    }

    /// Resolved coupon definition
    pub fn coupon(&self) -> &Coupon {
        &self.coupon
    }

    pub(crate) fn reject(self, reason: RejectionReason) -> PendingRejection {
        debug!(code = %self.code, %reason, "rejected coupon");

        PendingRejection {
            position: self.position,
            rejected: RejectedCoupon::new(self.code, reason),
        }
    }
}

/// Candidates split by eligibility.
#[derive(Debug, Default)]
pub(crate) struct Screened {
    pub(crate) eligible: Vec<Candidate>,
    pub(crate) rejected: Vec<PendingRejection>,
}

/// Check a single coupon against the cart at `now`.
///
/// # Errors
///
/// Returns the [`RejectionReason`] for the first check that fails.
pub fn check(coupon: &Coupon, cart: &CartContext, now: Timestamp) -> Result<(), RejectionReason> {
    if !coupon.enabled {
        return Err(RejectionReason::Disabled);
    }

    if coupon.starts_at.is_some_and(|starts_at| now < starts_at) {
        return Err(RejectionReason::NotYetActive);
    }

    if coupon.ends_at.is_some_and(|ends_at| now > ends_at) {
        return Err(RejectionReason::Expired);
    }

    if coupon
        .max_redemptions
        .is_some_and(|max| coupon.redeemed_count >= max)
    {
        return Err(RejectionReason::RedemptionLimitReached);
    }

    if coupon
        .min_subtotal_cents
        .is_some_and(|min| cart.subtotal_cents() < min)
    {
        return Err(RejectionReason::SubtotalTooLow);
    }

    if !coupon.applies_to.includes(cart.product_id()) {
        return Err(RejectionReason::NotApplicableToProduct);
    }

    Ok(())
}

/// Partition candidates into eligible coupons and rejections, keeping request order.
pub(crate) fn screen(candidates: Vec<Candidate>, cart: &CartContext, now: Timestamp) -> Screened {
    candidates
        .into_iter()
        .fold(Screened::default(), |mut screened, candidate| {
            match check(candidate.coupon(), cart, now) {
                Ok(()) => screened.eligible.push(candidate),
                Err(reason) => screened.rejected.push(candidate.reject(reason)),
            }

            screened
        })
}
