//! Monetary amounts and commission rates.
//!
//! Money is always integer cents. Rates are basis points so that a rate
//! such as 12.5% is exact.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

use super::ValidationError;

/// Amount of money in cents. May be negative for adjustments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Self = Self(0);

    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Floors the amount at zero.
    pub fn non_negative(self) -> Self {
        Self(self.0.max(0))
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}${}.{:02}", sign, abs / 100, abs % 100)
    }
}

/// Commission rate in basis points (1/100th of a percent), 0..=10000.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct CommissionRate(u32);

impl CommissionRate {
    pub const MAX_BPS: u32 = 10_000;

    pub fn from_bps(bps: u32) -> Result<Self, ValidationError> {
        if bps > Self::MAX_BPS {
            return Err(ValidationError::out_of_range(
                "commission_rate",
                0,
                Self::MAX_BPS as i32,
                bps as i32,
            ));
        }
        Ok(Self(bps))
    }

    /// Whole-percent rate, clamped to 100%.
    pub const fn whole_percent(pct: u8) -> Self {
        if pct > 100 {
            Self(Self::MAX_BPS)
        } else {
            Self(pct as u32 * 100)
        }
    }

    /// Whole-percent constructor, e.g. `percent(20)` for 20%.
    pub fn percent(pct: u8) -> Result<Self, ValidationError> {
        Self::from_bps(u32::from(pct) * 100)
    }

    pub fn bps(&self) -> u32 {
        self.0
    }

    /// Applies the rate to an amount, rounding half away from zero.
    pub fn apply(&self, amount: Money) -> Money {
        let scaled = i128::from(amount.cents()) * i128::from(self.0);
        let denom = i128::from(Self::MAX_BPS);
        let half = denom / 2;
        let rounded = if scaled >= 0 {
            (scaled + half) / denom
        } else {
            (scaled - half) / denom
        };
        Money::from_cents(rounded as i64)
    }
}

impl TryFrom<u32> for CommissionRate {
    type Error = ValidationError;

    fn try_from(bps: u32) -> Result<Self, Self::Error> {
        Self::from_bps(bps)
    }
}

impl From<CommissionRate> for u32 {
    fn from(rate: CommissionRate) -> Self {
        rate.0
    }
}

impl fmt::Display for CommissionRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 100 == 0 {
            write!(f, "{}%", self.0 / 100)
        } else {
            write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
        }
    }
}
