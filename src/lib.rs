//! Coupon Stack
//!
//! Coupon Stack decides which of the coupon codes a shopper entered at checkout
//! apply to a single-product cart, in what order, and what the final price is.
//!
//! Resolution runs in four stages over codes in the order the shopper gave them:
//! lookup, eligibility screening, conflict resolution (stackability, then stack
//! groups) and a sequential discount ledger. Every requested code ends up either
//! applied or rejected with exactly one reason.

pub mod best_deal;
pub mod cart;
pub mod codes;
pub mod config;
pub mod conflicts;
pub mod coupons;
pub mod eligibility;
pub mod fixtures;
pub mod ledger;
pub mod observability;
pub mod prelude;
pub mod receipt;
pub mod rejections;
pub mod repository;
pub mod stack;
