//! Coupon Stacks
//!
//! Entry point of the engine. A [`StackResolver`] looks every requested code up
//! in its repository, screens the coupons for eligibility, resolves stacking
//! conflicts, folds the survivors into a [`Ledger`] and assembles the
//! [`StackResult`].
//!
//! Business-rule rejections are always reported in the result. Malformed input
//! is a [`StackError`].

use decimal_percentage::Percentage;
use jiff::Timestamp;
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    cart::{CartContext, CartError, ProductId},
    codes::{dedup_codes, parse_code_list},
    conflicts::{self, ResolverOptions},
    coupons::{CouponCode, CouponError},
    eligibility::{self, Candidate},
    ledger::{AppliedCoupon, Ledger, LedgerError},
    rejections::{PendingRejection, RejectedCoupon, RejectionReason, in_request_order},
    repository::CouponRepository,
};

/// Contract violations. These are never encoded as a [`StackResult`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StackError {
    /// The cart context was malformed.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// The request carried no codes.
    #[error("no coupon codes requested")]
    NoCodes,

    /// A coupon from the repository broke the input contract.
    #[error("invalid coupon {code}: {source}")]
    InvalidCoupon {
        /// Requested code
        code: CouponCode,

        /// What was wrong with the definition
        #[source]
        source: CouponError,
    },

    /// Discount arithmetic failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// A checkout request: codes in preference order, and the cart they apply to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackRequest {
    codes: Vec<CouponCode>,
    cart: CartContext,
}

impl StackRequest {
    /// Create a request. Repeated codes keep their first occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::NoCodes`] if `codes` is empty, or
    /// [`StackError::Cart`] if the subtotal is negative.
    pub fn new(
        codes: impl IntoIterator<Item = CouponCode>,
        product_id: ProductId,
        subtotal_cents: i64,
    ) -> Result<Self, StackError> {
        let cart = CartContext::new(product_id, subtotal_cents)?;
        let codes = dedup_codes(codes);

        if codes.is_empty() {
            return Err(StackError::NoCodes);
        }

        Ok(Self { codes, cart })
    }

    /// Create a request from a comma separated code list, such as `OMG10, vip5`.
    ///
    /// # Errors
    ///
    /// See [`StackRequest::new`].
    pub fn from_input(
        input: &str,
        product_id: ProductId,
        subtotal_cents: i64,
    ) -> Result<Self, StackError> {
        Self::new(parse_code_list(input), product_id, subtotal_cents)
    }

    /// Deduplicated codes, in request order
    pub fn codes(&self) -> &[CouponCode] {
        &self.codes
    }

    /// Cart the codes apply to
    pub fn cart(&self) -> &CartContext {
        &self.cart
    }
}

/// A successfully applied stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackOutcome {
    subtotal_cents: i64,
    applied: Vec<AppliedCoupon>,
    rejected: Vec<RejectedCoupon>,
    final_cents: i64,
    total_discount_cents: i64,
}

impl StackOutcome {
    fn from_ledger(ledger: Ledger, rejected: Vec<RejectedCoupon>) -> Self {
        let subtotal_cents = ledger.subtotal_cents();
        let final_cents = ledger.final_cents();
        let total_discount_cents = ledger.total_discount_cents();

        Self {
            subtotal_cents,
            applied: ledger.into_steps(),
            rejected,
            final_cents,
            total_discount_cents,
        }
    }

    /// Subtotal before any coupon
    pub fn subtotal_cents(&self) -> i64 {
        self.subtotal_cents
    }

    /// Applied coupons in application order
    pub fn applied(&self) -> &[AppliedCoupon] {
        &self.applied
    }

    /// Rejected coupons in request order
    pub fn rejected(&self) -> &[RejectedCoupon] {
        &self.rejected
    }

    /// Price after every applied coupon
    pub fn final_cents(&self) -> i64 {
        self.final_cents
    }

    /// Subtotal minus final price
    pub fn total_discount_cents(&self) -> i64 {
        self.total_discount_cents
    }

    /// Savings as a fraction of the subtotal.
    pub fn savings_percent(&self) -> Percentage {
        if self.subtotal_cents == 0 {
            return Percentage::from(0.0);
        }

        let savings = Decimal::from_i64(self.total_discount_cents).unwrap_or(Decimal::ZERO);
        let subtotal = Decimal::from_i64(self.subtotal_cents).unwrap_or(Decimal::ZERO);

        Percentage::from(savings / subtotal)
    }
}

/// Every requested coupon was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFailure {
    reason: RejectionReason,
    rejected: Vec<RejectedCoupon>,
}

impl StackFailure {
    /// Reason of the first rejected code in request order
    pub fn reason(&self) -> &RejectionReason {
        &self.reason
    }

    /// Every rejection, in request order
    pub fn rejected(&self) -> &[RejectedCoupon] {
        &self.rejected
    }
}

/// Outcome of resolving a coupon stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackResult {
    /// At least one coupon was eligible.
    Applied(StackOutcome),

    /// No coupon was eligible.
    Failed(StackFailure),
}

impl StackResult {
    /// Whether the stack applied
    pub fn is_applied(&self) -> bool {
        matches!(self, StackResult::Applied(_))
    }

    /// The applied stack, if any
    pub fn outcome(&self) -> Option<&StackOutcome> {
        match self {
            StackResult::Applied(outcome) => Some(outcome),
            StackResult::Failed(_) => None,
        }
    }

    /// The failure, if any
    pub fn failure(&self) -> Option<&StackFailure> {
        match self {
            StackResult::Applied(_) => None,
            StackResult::Failed(failure) => Some(failure),
        }
    }

    /// Rejections in request order, on either path
    pub fn rejected(&self) -> &[RejectedCoupon] {
        match self {
            StackResult::Applied(outcome) => outcome.rejected(),
            StackResult::Failed(failure) => failure.rejected(),
        }
    }
}

/// Resolves coupon stacks against an injected repository.
#[derive(Debug, Clone)]
pub struct StackResolver<R> {
    repository: R,
    options: ResolverOptions,
}

impl<R: CouponRepository> StackResolver<R> {
    /// Create a resolver with default options.
    pub fn new(repository: R) -> Self {
        Self::with_options(repository, ResolverOptions::default())
    }

    /// Create a resolver with the given options.
    pub fn with_options(repository: R, options: ResolverOptions) -> Self {
        Self {
            repository,
            options,
        }
    }

    /// The repository coupons are looked up in
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Options used for conflict resolution
    pub fn options(&self) -> ResolverOptions {
        self.options
    }

    /// Resolve a request against the current time, sampled once.
    ///
    /// # Errors
    ///
    /// See [`StackResolver::resolve`].
    pub fn resolve_now(&self, request: &StackRequest) -> Result<StackResult, StackError> {
        self.resolve(request, Timestamp::now())
    }

    /// Resolve a request as of `now`.
    ///
    /// # Errors
    ///
    /// Returns a [`StackError`] if a looked-up coupon is malformed or the
    /// discount arithmetic overflows.
    #[tracing::instrument(
        name = "coupons.stack.resolve",
        skip(self, request),
        fields(
            product_id = %request.cart().product_id(),
            subtotal_cents = request.cart().subtotal_cents(),
            code_count = request.codes().len(),
        ),
        err
    )]
    pub fn resolve(
        &self,
        request: &StackRequest,
        now: Timestamp,
    ) -> Result<StackResult, StackError> {
        let (found, mut rejected) = self.lookup_all(request.codes())?;

        let screened = eligibility::screen(found, request.cart(), now);
        rejected.extend(screened.rejected);

        if screened.eligible.is_empty() {
            return fail(rejected);
        }

        let resolution = conflicts::resolve(screened.eligible, self.options);
        rejected.extend(resolution.rejected);

        let ledger = Ledger::apply(
            request.cart().subtotal_cents(),
            resolution
                .survivors
                .iter()
                .map(|candidate| (candidate.code(), candidate.coupon())),
        )?;

        let outcome = StackOutcome::from_ledger(ledger, in_request_order(rejected));

        info!(
            applied = outcome.applied().len(),
            rejected = outcome.rejected().len(),
            final_cents = outcome.final_cents(),
            total_discount_cents = outcome.total_discount_cents(),
            "applied coupon stack"
        );

        Ok(StackResult::Applied(outcome))
    }

    /// Look every code up once, folding misses into `not found` rejections.
    fn lookup_all(
        &self,
        codes: &[CouponCode],
    ) -> Result<(Vec<Candidate>, Vec<PendingRejection>), StackError> {
        let mut found = Vec::with_capacity(codes.len());
        let mut rejected = Vec::new();

        for (position, code) in codes.iter().enumerate() {
            let Some(coupon) = self.repository.lookup(code) else {
                debug!(%code, "coupon not found");

                rejected.push(PendingRejection {
                    position,
                    rejected: RejectedCoupon::new(code.clone(), RejectionReason::NotFound),
                });

                continue;
            };

            coupon
                .validate()
                .map_err(|source| StackError::InvalidCoupon {
                    code: code.clone(),
                    source,
                })?;

            found.push(Candidate::new(position, code.clone(), coupon));
        }

        Ok((found, rejected))
    }
}

fn fail(rejected: Vec<PendingRejection>) -> Result<StackResult, StackError> {
    let rejected = in_request_order(rejected);

    let Some(first) = rejected.first() else {
        return Err(StackError::NoCodes);
    };

    let reason = first.reason.clone();

    info!(%reason, rejected = rejected.len(), "no coupon in stack was eligible");

    Ok(StackResult::Failed(StackFailure { reason, rejected }))
}
