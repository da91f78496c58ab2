//! Commission payouts.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{InstitutionId, Money, PayoutId, Timestamp, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayoutMethod {
    BankTransfer,
    Paypal,
    Stripe,
    Manual,
}

impl PayoutMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayoutMethod::BankTransfer => "BANK_TRANSFER",
            PayoutMethod::Paypal => "PAYPAL",
            PayoutMethod::Stripe => "STRIPE",
            PayoutMethod::Manual => "MANUAL",
        }
    }

    /// Accepts the stored names plus the short `BANK` form.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.to_ascii_uppercase().as_str() {
            "BANK_TRANSFER" | "BANK" => Ok(PayoutMethod::BankTransfer),
            "PAYPAL" => Ok(PayoutMethod::Paypal),
            "STRIPE" => Ok(PayoutMethod::Stripe),
            "MANUAL" => Ok(PayoutMethod::Manual),
            _ => Err(ValidationError::invalid_format(
                "payout_method",
                format!("unknown payout method '{}'", s),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayoutStatus {
    Completed,
}

impl PayoutStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayoutStatus::Completed => "COMPLETED",
        }
    }
}

/// One transfer to an institution, settling its pending commissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub id: PayoutId,
    pub institution_id: InstitutionId,
    pub amount: Money,
    pub method: PayoutMethod,
    pub reference: String,
    pub status: PayoutStatus,
    /// Number of commissions marked paid by this payout.
    pub commission_count: u32,
    pub created_at: Timestamp,
}

impl Payout {
    pub fn completed(
        institution_id: InstitutionId,
        amount: Money,
        method: PayoutMethod,
        reference: impl Into<String>,
        commission_count: u32,
        now: Timestamp,
    ) -> Self {
        Self {
            id: PayoutId::new(),
            institution_id,
            amount,
            method,
            reference: reference.into(),
            status: PayoutStatus::Completed,
            commission_count,
            created_at: now,
        }
    }
}
