//! Coupon Stack prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    best_deal::{BestDeal, best_single_coupon},
    cart::{CartContext, CartError, ProductId},
    codes::{dedup_codes, parse_code_list},
    conflicts::{ResolverOptions, TieBreak},
    coupons::{Coupon, CouponCategory, CouponCode, CouponError, ProductScope},
    fixtures::{Fixture, FixtureError},
    ledger::{AppliedCoupon, Ledger, LedgerError},
    receipt::{ReceiptError, StackReceipt},
    rejections::{RejectedCoupon, RejectionReason},
    repository::{CouponCatalog, CouponRepository, InMemoryCouponRepository, RepositoryError},
    stack::{StackError, StackFailure, StackOutcome, StackRequest, StackResolver, StackResult},
};
