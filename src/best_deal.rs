//! Best Deal
//!
//! When a shopper has not entered any code, checkout can pick the single
//! enabled coupon that gives the lowest price and apply it automatically.

use jiff::Timestamp;
use tracing::info;

use crate::{
    cart::ProductId,
    coupons::CouponCode,
    repository::CouponCatalog,
    stack::{StackError, StackOutcome, StackRequest, StackResolver, StackResult},
};

/// The coupon picked by [`best_single_coupon`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestDeal {
    /// Chosen code
    pub code: CouponCode,

    /// Result of applying it alone
    pub outcome: StackOutcome,
}

/// Try every enabled coupon in the catalog on its own and return the one with the
/// lowest final price.
///
/// Ties keep the earlier catalog entry. Returns `None` if no coupon saves anything.
///
/// # Errors
///
/// Returns a [`StackError`] if the cart is malformed or a catalog coupon breaks
/// the input contract.
pub fn best_single_coupon<C: CouponCatalog>(
    resolver: &StackResolver<C>,
    product_id: &ProductId,
    subtotal_cents: i64,
    now: Timestamp,
) -> Result<Option<BestDeal>, StackError> {
    let mut best: Option<BestDeal> = None;

    for code in resolver.repository().enabled_codes() {
        let request = StackRequest::new([code.clone()], product_id.clone(), subtotal_cents)?;

        let StackResult::Applied(outcome) = resolver.resolve(&request, now)? else {
            continue;
        };

        if best
            .as_ref()
            .is_none_or(|held| outcome.final_cents() < held.outcome.final_cents())
        {
            best = Some(BestDeal { code, outcome });
        }
    }

    let best = best.filter(|deal| deal.outcome.total_discount_cents() > 0);

    if let Some(deal) = &best {
        info!(
            code = %deal.code,
            final_cents = deal.outcome.final_cents(),
            "picked best single coupon"
        );
    }

    Ok(best)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        coupons::{Coupon, ProductScope},
        repository::InMemoryCouponRepository,
    };

    use super::*;

    fn code(raw: &str) -> Result<CouponCode, crate::coupons::CouponError> {
        CouponCode::parse(raw)
    }

    fn resolver(coupons: Vec<Coupon>) -> TestResult<StackResolver<InMemoryCouponRepository>> {
        let repository = InMemoryCouponRepository::from_coupons(coupons)?;

        Ok(StackResolver::new(repository))
    }

    fn pick(
        resolver: &StackResolver<InMemoryCouponRepository>,
    ) -> Result<Option<BestDeal>, StackError> {
        best_single_coupon(
            resolver,
            &ProductId::new("vault-pro"),
            10_000,
            Timestamp::UNIX_EPOCH,
        )
    }

    #[test]
    fn picks_lowest_final_price() -> TestResult {
        let resolver = resolver(vec![
            Coupon::new(code("TEN")?, 10),
            Coupon::new(code("THIRTY")?, 30),
            Coupon::new(code("CAPPED")?, 50).max_discount(100),
        ])?;

        let deal = pick(&resolver)?;

        assert_eq!(deal.as_ref().map(|d| d.code.as_str()), Some("THIRTY"));
        assert_eq!(deal.map(|d| d.outcome.final_cents()), Some(7000));

        Ok(())
    }

    #[test]
    fn skips_ineligible_and_disabled_coupons() -> TestResult {
        let resolver = resolver(vec![
            Coupon::new(code("OTHER")?, 90).applies_to(ProductScope::only(["vault-team"])),
            Coupon::new(code("OFF")?, 80).enabled(false),
            Coupon::new(code("SMALL")?, 5),
        ])?;

        let deal = pick(&resolver)?;

        assert_eq!(deal.map(|d| d.code), Some(code("SMALL")?));

        Ok(())
    }

    #[test]
    fn ties_keep_first_catalog_entry() -> TestResult {
        let resolver = resolver(vec![
            Coupon::new(code("BETA")?, 20),
            Coupon::new(code("ALPHA")?, 20),
        ])?;

        let deal = pick(&resolver)?;

        assert_eq!(deal.map(|d| d.code), Some(code("ALPHA")?));

        Ok(())
    }

    #[test]
    fn nothing_that_saves_money_yields_none() -> TestResult {
        let resolver = resolver(vec![Coupon::new(code("ZERO")?, 0)])?;

        let deal = pick(&resolver)?;

        assert!(deal.is_none());

        Ok(())
    }

    #[test]
    fn empty_catalog_yields_none() -> TestResult {
        let resolver = resolver(Vec::new())?;

        let deal = pick(&resolver)?;

        assert!(deal.is_none());

        Ok(())
    }
}
