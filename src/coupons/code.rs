//! Coupon Codes

use std::{fmt, str::FromStr};

use serde::Deserialize;

use crate::coupons::CouponError;

/// Normalized coupon code.
///
/// Codes are compared case-insensitively, so the stored form is trimmed and
/// upper-cased on construction. A blank code cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub struct CouponCode(String);

impl CouponCode {
    /// Parse and normalize a raw code.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::BlankCode`] if the code is empty after trimming.
    pub fn parse(raw: &str) -> Result<Self, CouponError> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(CouponError::BlankCode);
        }

        Ok(Self(trimmed.to_uppercase()))
    }

    /// Return the normalized code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CouponCode {
    type Err = CouponError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CouponCode {
    type Error = CouponError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for CouponCode {
    type Error = CouponError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl AsRef<str> for CouponCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parse_trims_and_uppercases() -> TestResult {
        let code = CouponCode::parse("  save10 ")?;

        assert_eq!(code.as_str(), "SAVE10");

        Ok(())
    }

    #[test]
    fn codes_differing_only_in_case_are_equal() -> TestResult {
        assert_eq!(CouponCode::parse("Vip5")?, CouponCode::parse("VIP5")?);

        Ok(())
    }

    #[test]
    fn blank_code_is_rejected() {
        assert!(matches!(CouponCode::parse("   "), Err(CouponError::BlankCode)));
        assert!(matches!(CouponCode::parse(""), Err(CouponError::BlankCode)));
    }

    #[test]
    fn deserializes_through_normalization() -> TestResult {
        let code: CouponCode = serde_norway::from_str("omg10")?;

        assert_eq!(code.to_string(), "OMG10");

        Ok(())
    }

    #[test]
    fn deserializing_blank_code_fails() {
        let result: Result<CouponCode, _> = serde_norway::from_str("'  '");

        assert!(result.is_err());
    }
}
