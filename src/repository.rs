//! Coupon Repository

use std::sync::Arc;

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::coupons::{Coupon, CouponCode};

/// Errors raised while building an in-memory repository.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// Two coupons normalize to the same code.
    #[error("duplicate coupon code: {0}")]
    DuplicateCode(CouponCode),
}

/// Read-only coupon lookup.
///
/// Lookups are case-insensitive by construction, since [`CouponCode`] is normalized.
#[cfg_attr(test, mockall::automock)]
pub trait CouponRepository: Send + Sync {
    /// Find the coupon for a code, if one exists.
    fn lookup(&self, code: &CouponCode) -> Option<Coupon>;
}

/// A repository that can also enumerate the coupons it holds.
pub trait CouponCatalog: CouponRepository {
    /// Codes of every enabled coupon, in a stable order.
    fn enabled_codes(&self) -> Vec<CouponCode>;
}

impl<R: CouponRepository + ?Sized> CouponRepository for &R {
    fn lookup(&self, code: &CouponCode) -> Option<Coupon> {
        (**self).lookup(code)
    }
}

impl<R: CouponRepository + ?Sized> CouponRepository for Arc<R> {
    fn lookup(&self, code: &CouponCode) -> Option<Coupon> {
        (**self).lookup(code)
    }
}

impl<R: CouponCatalog + ?Sized> CouponCatalog for &R {
    fn enabled_codes(&self) -> Vec<CouponCode> {
        (**self).enabled_codes()
    }
}

impl<R: CouponCatalog + ?Sized> CouponCatalog for Arc<R> {
    fn enabled_codes(&self) -> Vec<CouponCode> {
        (**self).enabled_codes()
    }
}

/// Coupon repository backed by a hash map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCouponRepository {
    coupons: FxHashMap<CouponCode, Coupon>,
}

impl InMemoryCouponRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a repository from a set of coupons.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::DuplicateCode`] if two coupons share a code.
    pub fn from_coupons(
        coupons: impl IntoIterator<Item = Coupon>,
    ) -> Result<Self, RepositoryError> {
        let mut repository = Self::new();

        for coupon in coupons {
            repository.insert(coupon)?;
        }

        Ok(repository)
    }

    /// Add a coupon.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::DuplicateCode`] if the code is already present.
    pub fn insert(&mut self, coupon: Coupon) -> Result<(), RepositoryError> {
        if self.coupons.contains_key(&coupon.code) {
            return Err(RepositoryError::DuplicateCode(coupon.code));
        }

        self.coupons.insert(coupon.code.clone(), coupon);

        Ok(())
    }

    /// Number of coupons held.
    pub fn len(&self) -> usize {
        self.coupons.len()
    }

    /// Whether the repository holds no coupons.
    pub fn is_empty(&self) -> bool {
        self.coupons.is_empty()
    }

    /// Iterate over the coupons in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Coupon> {
        self.coupons.values()
    }
}

impl CouponRepository for InMemoryCouponRepository {
    fn lookup(&self, code: &CouponCode) -> Option<Coupon> {
        self.coupons.get(code).cloned()
    }
}

impl CouponCatalog for InMemoryCouponRepository {
    fn enabled_codes(&self) -> Vec<CouponCode> {
        let mut codes: Vec<CouponCode> = self
            .coupons
            .values()
            .filter(|coupon| coupon.enabled)
            .map(|coupon| coupon.code.clone())
            .collect();

        codes.sort_unstable();

        codes
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn code(raw: &str) -> Result<CouponCode, crate::coupons::CouponError> {
        CouponCode::parse(raw)
    }

    #[test]
    fn lookup_is_case_insensitive() -> TestResult {
        let repository =
            InMemoryCouponRepository::from_coupons([Coupon::new(code("save10")?, 10)])?;

        let found = repository.lookup(&code("Save10")?);

        assert_eq!(found.map(|coupon| coupon.percent_off), Some(10));

        Ok(())
    }

    #[test]
    fn lookup_missing_code_is_none() -> TestResult {
        let repository = InMemoryCouponRepository::new();

        assert!(repository.lookup(&code("NOPE")?).is_none());
        assert!(repository.is_empty());

        Ok(())
    }

    #[test]
    fn insert_rejects_duplicate_codes() -> TestResult {
        let result = InMemoryCouponRepository::from_coupons([
            Coupon::new(code("vip5")?, 5),
            Coupon::new(code("VIP5")?, 10),
        ]);

        assert_eq!(result.err(), Some(RepositoryError::DuplicateCode(code("VIP5")?)));

        Ok(())
    }

    #[test]
    fn enabled_codes_are_sorted_and_skip_disabled() -> TestResult {
        let repository = InMemoryCouponRepository::from_coupons([
            Coupon::new(code("ZED")?, 5),
            Coupon::new(code("OFF")?, 5).enabled(false),
            Coupon::new(code("ALPHA")?, 5),
        ])?;

        assert_eq!(repository.enabled_codes(), [code("ALPHA")?, code("ZED")?]);
        assert_eq!(repository.len(), 3);

        Ok(())
    }

    #[test]
    fn references_and_arcs_delegate() -> TestResult {
        let repository = Arc::new(InMemoryCouponRepository::from_coupons([Coupon::new(
            code("SHARED")?,
            15,
        )])?);

        let by_ref = &*repository;

        assert!(by_ref.lookup(&code("shared")?).is_some());
        assert!(repository.lookup(&code("shared")?).is_some());
        assert_eq!(repository.enabled_codes().len(), 1);

        Ok(())
    }
}
