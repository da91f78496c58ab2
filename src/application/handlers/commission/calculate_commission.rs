//! CalculateCommissionHandler - Commission for one completed course payment.

use serde::Serialize;
use std::sync::Arc;

use crate::domain::commission::{CommissionBreakdown, CommissionError, CommissionRecord};
use crate::domain::foundation::{PaymentId, Timestamp};
use crate::ports::{CommissionRepository, CourseRepository, EnrollmentRepository, PaymentReader};

use super::CommissionRateResolver;

#[derive(Debug, Clone)]
pub struct CalculateCommissionCommand {
    pub payment_id: PaymentId,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalculateCommissionResult {
    pub record: CommissionRecord,
    /// False when an existing record was recalculated.
    pub created: bool,
}

/// Walks payment → enrollment → course → institution → subscription →
/// commission tier and upserts the commission record for the payment.
///
/// Idempotent: a second run updates the existing record in place.
pub struct CalculateCommissionHandler {
    payments: Arc<dyn PaymentReader>,
    enrollments: Arc<dyn EnrollmentRepository>,
    courses: Arc<dyn CourseRepository>,
    commissions: Arc<dyn CommissionRepository>,
    rates: Arc<CommissionRateResolver>,
}

impl CalculateCommissionHandler {
    pub fn new(
        payments: Arc<dyn PaymentReader>,
        enrollments: Arc<dyn EnrollmentRepository>,
        courses: Arc<dyn CourseRepository>,
        commissions: Arc<dyn CommissionRepository>,
        rates: Arc<CommissionRateResolver>,
    ) -> Self {
        Self {
            payments,
            enrollments,
            courses,
            commissions,
            rates,
        }
    }

    pub async fn handle(
        &self,
        cmd: CalculateCommissionCommand,
    ) -> Result<CalculateCommissionResult, CommissionError> {
        let now = Timestamp::now();

        let payment = self
            .payments
            .find_payment(cmd.payment_id)
            .await?
            .ok_or(CommissionError::PaymentNotFound(cmd.payment_id))?;
        if !payment.is_completed() {
            return Err(CommissionError::PaymentNotCompleted {
                payment: payment.id,
                status: payment.status,
            });
        }

        let enrollment_id = payment
            .enrollment_id
            .ok_or(CommissionError::PaymentWithoutEnrollment(payment.id))?;
        let enrollment = self
            .enrollments
            .find_by_id(enrollment_id)
            .await?
            .ok_or(CommissionError::EnrollmentNotFound(enrollment_id))?;
        let course = self
            .courses
            .find_by_id(enrollment.course_id)
            .await?
            .ok_or(CommissionError::CourseNotFound(enrollment.course_id))?;
        let institution_id = course
            .institution_id
            .ok_or(CommissionError::CourseWithoutInstitution(course.id))?;

        let (_, rate) = self.rates.tier_rate(institution_id).await?;
        let breakdown = CommissionBreakdown::compute(payment.amount, rate);

        let existing = self.commissions.find_by_payment(payment.id).await?;
        let created = existing.is_none();
        let record = match existing {
            Some(record) if !record.is_pending() => {
                return Err(CommissionError::AlreadyPaid(record.id));
            }
            Some(mut record) => {
                record.apply_breakdown(breakdown, now);
                record
            }
            None => CommissionRecord::pending(institution_id, payment.id, breakdown, now),
        };

        let stored = self.commissions.upsert(&record).await?;

        tracing::info!(
            payment_id = %payment.id,
            institution_id = %institution_id,
            rate = %rate,
            commission = %stored.commission_amount,
            created,
            "Commission calculated"
        );

        Ok(CalculateCommissionResult {
            record: stored,
            created,
        })
    }
}
