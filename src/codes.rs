//! Code Input
//!
//! Shoppers enter coupons as free text, and links carry stacks as a comma
//! separated list (`?coupon=OMG10,VIP5`). These helpers turn that input into
//! the ordered, deduplicated code list a [`StackRequest`](crate::stack::StackRequest)
//! expects. Order is significant: it is the caller's preference order.

use rustc_hash::FxHashSet;

use crate::coupons::CouponCode;

/// Separator between codes in a stacked coupon string.
pub const CODE_SEPARATOR: char = ',';

/// Parse a comma separated code list.
///
/// Entries are trimmed and upper-cased, blank entries are dropped, and repeated
/// codes keep only their first occurrence.
pub fn parse_code_list(input: &str) -> Vec<CouponCode> {
    dedup_codes(
        input
            .split(CODE_SEPARATOR)
            .filter_map(|raw| CouponCode::parse(raw).ok()),
    )
}

/// Drop repeated codes, keeping the first occurrence of each.
pub fn dedup_codes(codes: impl IntoIterator<Item = CouponCode>) -> Vec<CouponCode> {
    let mut seen = FxHashSet::default();

    codes
        .into_iter()
        .filter(|code| seen.insert(code.clone()))
        .collect()
}
