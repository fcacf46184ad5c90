//! Fixtures
//!
//! Coupon sets defined in YAML, keyed by code:
//!
//! ```yaml
//! coupons:
//!   SAVE10:
//!     percent_off: 10
//!   VIP5:
//!     percent_off: 5
//!     stackable: true
//!     stack_group: loyalty
//!     priority: 10
//!     applies_to: [vault-pro, vault-team]
//!     ends_at: 2026-12-31T23:59:59Z
//! ```

use std::{fs, path::PathBuf};

use jiff::Timestamp;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    coupons::{Coupon, CouponCategory, CouponCode, CouponError, ProductScope},
    repository::{InMemoryCouponRepository, RepositoryError},
};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// A coupon definition broke the input contract
    #[error("Invalid coupon {0}: {1}")]
    InvalidCoupon(String, #[source] CouponError),

    /// Two codes normalize to the same coupon
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Wrapper for coupons in YAML
#[derive(Debug, Deserialize)]
pub struct CouponsFixture {
    /// Map of code -> coupon fixture
    pub coupons: FxHashMap<String, CouponFixture>,
}

/// Coupon fixture from YAML
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CouponFixture {
    /// Percentage off
    pub percent_off: u8,

    /// Whether the coupon is enabled (default `true`)
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,

    /// Validity window start
    #[serde(default)]
    pub starts_at: Option<Timestamp>,

    /// Validity window end
    #[serde(default)]
    pub ends_at: Option<Timestamp>,

    /// Redemption cap
    #[serde(default)]
    pub max_redemptions: Option<u32>,

    /// Redemptions so far
    #[serde(default)]
    pub redeemed_count: u32,

    /// Subtotal floor in cents
    #[serde(default)]
    pub min_subtotal_cents: Option<i64>,

    /// `all` or a list of product ids
    #[serde(default)]
    pub applies_to: ProductScope,

    /// Explicit stacking flag
    #[serde(default)]
    pub stackable: Option<bool>,

    /// Exclusivity group
    #[serde(default)]
    pub stack_group: Option<String>,

    /// Application priority
    #[serde(default)]
    pub priority: i32,

    /// Discount cap in cents
    #[serde(default)]
    pub max_discount_cents: Option<i64>,

    /// Admin category
    #[serde(default)]
    pub category: Option<CouponCategory>,
}

fn enabled_by_default() -> bool {
    true
}

impl CouponFixture {
    /// Convert to a validated [`Coupon`].
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::InvalidCoupon`] if the code is blank or the
    /// definition is out of range.
    pub fn try_into_coupon(self, code: &str) -> Result<Coupon, FixtureError> {
        let invalid = |source| FixtureError::InvalidCoupon(code.to_string(), source);

        let coupon = Coupon {
            code: CouponCode::parse(code).map_err(invalid)?,
            percent_off: self.percent_off,
            enabled: self.enabled,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            max_redemptions: self.max_redemptions,
            redeemed_count: self.redeemed_count,
            min_subtotal_cents: self.min_subtotal_cents,
            applies_to: self.applies_to,
            stackable: self.stackable,
            stack_group: self.stack_group,
            priority: self.priority,
            max_discount_cents: self.max_discount_cents,
            category: self.category,
        };

        coupon.validate().map_err(invalid)?;

        Ok(coupon)
    }
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Coupons loaded so far
    repository: InMemoryCouponRepository,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            repository: InMemoryCouponRepository::new(),
        }
    }

    /// Load coupons from `<base>/coupons/<name>.yml`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, a coupon is
    /// invalid, or a code is already loaded.
    pub fn load_coupons(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("coupons").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        self.load_coupons_str(&contents)
    }

    /// Load coupons from a YAML document
    ///
    /// # Errors
    ///
    /// See [`Fixture::load_coupons`].
    pub fn load_coupons_str(&mut self, yaml: &str) -> Result<&mut Self, FixtureError> {
        let fixture: CouponsFixture = serde_norway::from_str(yaml)?;

        for (code, coupon_fixture) in fixture.coupons {
            let coupon = coupon_fixture.try_into_coupon(&code)?;

            self.repository.insert(coupon)?;
        }

        Ok(self)
    }

    /// Load a named coupon set from the default fixture directory
    ///
    /// # Errors
    ///
    /// Returns an error if the coupon set cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_coupons(name)?;

        Ok(fixture)
    }

    /// Coupons loaded so far
    pub fn repository(&self) -> &InMemoryCouponRepository {
        &self.repository
    }

    /// Consume the fixture, returning its repository
    pub fn into_repository(self) -> InMemoryCouponRepository {
        self.repository
    }
}
