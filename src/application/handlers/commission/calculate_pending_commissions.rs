//! CalculatePendingCommissionsHandler - Batch over uncommissioned payments.

use std::sync::Arc;

use crate::application::handlers::batch::BatchReport;
use crate::domain::commission::CommissionError;
use crate::ports::PaymentReader;

use super::{CalculateCommissionCommand, CalculateCommissionHandler};

/// Computes a commission for every completed payment that has none.
///
/// Each payment is independent; failures are logged and counted.
pub struct CalculatePendingCommissionsHandler {
    payments: Arc<dyn PaymentReader>,
    calculator: Arc<CalculateCommissionHandler>,
}

impl CalculatePendingCommissionsHandler {
    pub fn new(payments: Arc<dyn PaymentReader>, calculator: Arc<CalculateCommissionHandler>) -> Self {
        Self {
            payments,
            calculator,
        }
    }

    pub async fn handle(&self) -> Result<BatchReport, CommissionError> {
        let payments = self.payments.find_uncommissioned().await?;
        tracing::info!(count = payments.len(), "Calculating pending commissions");

        let mut report = BatchReport::default();
        for payment in payments {
            let cmd = CalculateCommissionCommand {
                payment_id: payment.id,
            };
            match self.calculator.handle(cmd).await {
                Ok(_) => report.record_success(),
                Err(e) => {
                    tracing::error!(payment_id = %payment.id, error = %e, "Commission calculation failed");
                    report.record_failure(*payment.id.as_uuid(), e);
                }
            }
        }

        tracing::info!(
            attempted = report.attempted,
            succeeded = report.succeeded,
            failed = report.failed(),
            "Pending commissions calculated"
        );
        Ok(report)
    }
}
