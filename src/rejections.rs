//! Rejections

use std::fmt;

use crate::coupons::CouponCode;

/// Why a requested coupon did not make it into the stack.
///
/// The `Display` form is the shopper-facing reason string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    /// No coupon exists for the code.
    NotFound,

    /// The coupon is switched off.
    Disabled,

    /// The validity window has not opened yet.
    NotYetActive,

    /// The validity window has closed.
    Expired,

    /// The coupon has been redeemed as often as allowed.
    RedemptionLimitReached,

    /// The cart subtotal is below the coupon's floor.
    SubtotalTooLow,

    /// The coupon is restricted to other products.
    NotApplicableToProduct,

    /// Stackable and non-stackable coupons were requested together.
    CannotStack,

    /// Several coupons were requested and none of them opts in to stacking.
    OnlyOneAllowed,

    /// Another coupon from the same exclusivity group was kept.
    GroupConflict(String),
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::NotFound => f.write_str("not found"),
            RejectionReason::Disabled => f.write_str("disabled"),
            RejectionReason::NotYetActive => f.write_str("not yet active"),
            RejectionReason::Expired => f.write_str("expired"),
            RejectionReason::RedemptionLimitReached => f.write_str("redemption limit reached"),
            RejectionReason::SubtotalTooLow => f.write_str("subtotal too low"),
            RejectionReason::NotApplicableToProduct => f.write_str("not applicable to product"),
            RejectionReason::CannotStack => f.write_str("cannot stack with another coupon"),
            RejectionReason::OnlyOneAllowed => f.write_str("only one coupon allowed"),
            RejectionReason::GroupConflict(group) => {
                write!(f, "only one coupon allowed from group: {group}")
            }
        }
    }
}

/// A coupon left out of the stack, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedCoupon {
    /// Requested code
    pub code: CouponCode,

    /// Why it was left out
    pub reason: RejectionReason,
}

impl RejectedCoupon {
    /// Create a rejection record.
    pub fn new(code: CouponCode, reason: RejectionReason) -> Self {
        Self { code, reason }
    }
}

/// A rejection tagged with the position of its code in the request.
///
/// Rejections are produced by several stages; the position restores request order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingRejection {
    pub(crate) position: usize,
    pub(crate) rejected: RejectedCoupon,
}

/// Flatten pending rejections into request order.
pub(crate) fn in_request_order(mut pending: Vec<PendingRejection>) -> Vec<RejectedCoupon> {
    pending.sort_by_key(|rejection| rejection.position);

    pending
        .into_iter()
        .map(|rejection| rejection.rejected)
        .collect()
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn reasons_render_shopper_facing_strings() {
        let cases = [
            (RejectionReason::NotFound, "not found"),
            (RejectionReason::Disabled, "disabled"),
            (RejectionReason::NotYetActive, "not yet active"),
            (RejectionReason::Expired, "expired"),
            (
                RejectionReason::RedemptionLimitReached,
                "redemption limit reached",
            ),
            (RejectionReason::SubtotalTooLow, "subtotal too low"),
            (
                RejectionReason::NotApplicableToProduct,
                "not applicable to product",
            ),
            (
                RejectionReason::CannotStack,
                "cannot stack with another coupon",
            ),
            (RejectionReason::OnlyOneAllowed, "only one coupon allowed"),
            (
                RejectionReason::GroupConflict("seasonal".to_string()),
                "only one coupon allowed from group: seasonal",
            ),
        ];

        for (reason, expected) in cases {
            assert_eq!(reason.to_string(), expected, "reason {reason:?}");
        }
    }

    #[test]
    fn in_request_order_sorts_by_position() -> TestResult {
        let pending = vec![
            PendingRejection {
                position: 2,
                rejected: RejectedCoupon::new(CouponCode::parse("C")?, RejectionReason::Expired),
            },
            PendingRejection {
                position: 0,
                rejected: RejectedCoupon::new(CouponCode::parse("A")?, RejectionReason::NotFound),
            },
        ];

        let ordered = in_request_order(pending);
        let codes: Vec<&str> = ordered.iter().map(|r| r.code.as_str()).collect();

        assert_eq!(codes, ["A", "C"]);

        Ok(())
    }
}
