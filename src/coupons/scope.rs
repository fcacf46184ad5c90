//! Product Scope

use rustc_hash::FxHashSet;
use serde::Deserialize;

use crate::{cart::ProductId, coupons::CouponError};

/// Products a coupon may be used against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "ProductScopeFixture")]
pub enum ProductScope {
    /// Every product.
    #[default]
    All,

    /// Only the listed products.
    Only(FxHashSet<ProductId>),
}

impl ProductScope {
    /// Restrict a coupon to the given products.
    pub fn only<I, P>(products: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<ProductId>,
    {
        Self::Only(products.into_iter().map(Into::into).collect())
    }

    /// Return whether the scope covers the product.
    pub fn includes(&self, product: &ProductId) -> bool {
        match self {
            ProductScope::All => true,
            ProductScope::Only(products) => products.contains(product),
        }
    }
}

/// `applies_to` is either the keyword `all` or a list of product ids.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProductScopeFixture {
    Keyword(String),
    Products(Vec<ProductId>),
}

impl TryFrom<ProductScopeFixture> for ProductScope {
    type Error = CouponError;

    fn try_from(value: ProductScopeFixture) -> Result<Self, Self::Error> {
        match value {
            ProductScopeFixture::Keyword(keyword) if keyword.eq_ignore_ascii_case("all") => {
                Ok(ProductScope::All)
            }
            ProductScopeFixture::Keyword(keyword) => Err(CouponError::UnknownScope(keyword)),
            ProductScopeFixture::Products(products) => Ok(ProductScope::only(products)),
        }
    }
}
