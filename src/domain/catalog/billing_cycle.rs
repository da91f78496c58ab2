//! Billing cycle lengths.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Money, ValidationError};

/// How often a tier is billed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingCycle {
    Monthly,
    Quarterly,
    Yearly,
}

impl BillingCycle {
    /// Length of one billing period in days. Months are 30 days.
    pub fn days(&self) -> i64 {
        match self {
            BillingCycle::Monthly => 30,
            BillingCycle::Quarterly => 90,
            BillingCycle::Yearly => 365,
        }
    }

    /// Price of `days` worth of a period priced at `price`, rounded down.
    pub fn prorate(&self, price: Money, days: u32) -> Money {
        Money::from_cents(price.cents() * i64::from(days) / self.days())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "MONTHLY",
            BillingCycle::Quarterly => "QUARTERLY",
            BillingCycle::Yearly => "YEARLY",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.to_ascii_uppercase().as_str() {
            "MONTHLY" => Ok(BillingCycle::Monthly),
            "QUARTERLY" => Ok(BillingCycle::Quarterly),
            "YEARLY" => Ok(BillingCycle::Yearly),
            _ => Err(ValidationError::invalid_format(
                "billing_cycle",
                format!("unknown billing cycle '{}'", s),
            )),
        }
    }
}
