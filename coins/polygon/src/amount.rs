use alloy::primitives::utils::{format_units, parse_units};
use alloy::primitives::U256;
use std::fmt;
use std::ops;

use crate::error::PolygonError;

const POL_DECIMALS: u8 = 18;
const GWEI: u64 = 1_000_000_000;

/// An amount of POL held as an integer number of wei.
///
/// Conversions from decimal POL go through string parsing, so no
/// floating point ever touches a balance.
#[derive(Default, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug, Hash)]
pub struct PolAmount {
    /// The number of wei in the amount
    pub wei: U256,
}

impl ops::Add<Self> for PolAmount {
    type Output = Result<Self, PolygonError>;

    fn add(self, rhs: Self) -> Self::Output {
        self.wei
            .checked_add(rhs.wei)
            .map(Self::from_wei)
            .ok_or_else(|| {
                PolygonError::InvalidAmount(format!(
                    "Overflow in U256 when adding {} to {}",
                    rhs.wei, self.wei
                ))
            })
    }
}

impl ops::Sub for PolAmount {
    type Output = Result<Self, PolygonError>;

    fn sub(self, rhs: Self) -> Self::Output {
        self.wei
            .checked_sub(rhs.wei)
            .map(Self::from_wei)
            .ok_or_else(|| {
                PolygonError::InvalidAmount(format!(
                    "Underflow in U256 when subtracting {} from {}",
                    rhs.wei, self.wei
                ))
            })
    }
}

impl PolAmount {
    pub fn zero() -> Self {
        Self { wei: U256::ZERO }
    }

    pub fn from_wei(wei: U256) -> Self {
        Self { wei }
    }

    pub fn from_gwei(gwei: u64) -> Self {
        Self {
            wei: U256::from(gwei) * U256::from(GWEI),
        }
    }

    /// Parses a decimal POL string such as `"0.1"` or `"25"`.
    pub fn from_pol(pol: &str) -> Result<Self, PolygonError> {
        let parsed = parse_units(pol.trim(), POL_DECIMALS)
            .map_err(|e| PolygonError::InvalidAmount(format!("{pol}: {e}")))?;
        if parsed.is_negative() {
            return Err(PolygonError::InvalidAmount(format!("{pol}: negative amount")));
        }
        Ok(Self {
            wei: parsed.get_absolute(),
        })
    }

    pub fn wei(&self) -> U256 {
        self.wei
    }

    /// Decimal POL representation, e.g. `"0.100000000000000000"`
    pub fn to_pol_string(&self) -> String {
        // Formatting a U256 with 18 decimals cannot fail
        format_units(self.wei, POL_DECIMALS).unwrap_or_else(|_| self.wei.to_string())
    }
}

impl fmt::Display for PolAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} POL", self.to_pol_string())
    }
}

impl From<U256> for PolAmount {
    fn from(wei: U256) -> Self {
        Self::from_wei(wei)
    }
}
