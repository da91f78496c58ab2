//! QuotaTracker - Admission decisions and usage counting against tier limits.
//!
//! Admission requires an ACTIVE subscription with room on both enrollment
//! counters (or the attendance counter for live classes). Counting goes
//! through the repository's conditional increment, so the check and the
//! increment are one step. Crossing the alert threshold only produces an
//! advisory notification; reaching the quota is what blocks.

use serde::Serialize;
use std::sync::Arc;

use crate::domain::foundation::{
    CourseId, DomainError, ErrorCode, Percentage, SubscriptionId, UserId,
};
use crate::domain::subscription::{Subject, Subscription, UsageCounters, UsageMetric};
use crate::ports::{EnrollmentRepository, Notification, Notifier, SubscriptionRepository};

/// Outcome of an admission check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdmissionCheck {
    pub allowed: bool,
    /// Why admission was refused.
    pub reason: Option<String>,
}

impl AdmissionCheck {
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

pub struct QuotaTracker {
    subscriptions: Arc<dyn SubscriptionRepository>,
    enrollments: Arc<dyn EnrollmentRepository>,
    notifier: Arc<dyn Notifier>,
    alert_threshold: Percentage,
}

impl QuotaTracker {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        enrollments: Arc<dyn EnrollmentRepository>,
        notifier: Arc<dyn Notifier>,
        alert_threshold: Percentage,
    ) -> Self {
        Self {
            subscriptions,
            enrollments,
            notifier,
            alert_threshold,
        }
    }

    /// Whether `user_id` may take a quota-consuming enrollment in `course_id`.
    pub async fn can_enroll_in_course(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<AdmissionCheck, DomainError> {
        let subscription = match self.active_subscription(user_id).await? {
            Ok(subscription) => subscription,
            Err(denied) => return Ok(denied),
        };

        if !subscription.can_admit_enrollment() {
            return Ok(AdmissionCheck::denied(format!(
                "Enrollment quota of {} reached ({} active, {} this month)",
                subscription.limits.enrollment_quota,
                subscription.usage.current_enrollments,
                subscription.usage.monthly_enrollments
            )));
        }

        if self
            .enrollments
            .find_active(user_id, course_id)
            .await?
            .is_some()
        {
            return Ok(AdmissionCheck::denied("Already enrolled in this course"));
        }

        Ok(AdmissionCheck::allowed())
    }

    /// Whether `user_id`'s subscription admits another live-class attendance.
    ///
    /// Only the subscription is consulted. Session state (ACTIVE, cap,
    /// already joined) is checked by `ValidateJoinHandler`.
    pub async fn can_join_live_class(&self, user_id: UserId) -> Result<AdmissionCheck, DomainError> {
        let subscription = match self.active_subscription(user_id).await? {
            Ok(subscription) => subscription,
            Err(denied) => return Ok(denied),
        };

        if !subscription.can_admit_attendance() {
            return Ok(AdmissionCheck::denied(format!(
                "Monthly live class attendance quota of {} reached",
                subscription.limits.attendance_quota
            )));
        }

        Ok(AdmissionCheck::allowed())
    }

    /// Count one enrollment.
    ///
    /// # Errors
    ///
    /// `CapacityExceeded` when either enrollment counter is at quota or the
    /// subscription is not ACTIVE. Counters are unchanged on error.
    pub async fn track_enrollment_usage(
        &self,
        subscription_id: SubscriptionId,
    ) -> Result<UsageCounters, DomainError> {
        let usage = self
            .subscriptions
            .try_consume_enrollment(subscription_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::CapacityExceeded,
                    format!(
                        "Subscription {} cannot take another enrollment",
                        subscription_id
                    ),
                )
            })?;

        tracing::debug!(
            subscription_id = %subscription_id,
            current = usage.current_enrollments,
            monthly = usage.monthly_enrollments,
            "Enrollment usage tracked"
        );
        self.raise_alerts(
            subscription_id,
            &[UsageMetric::CurrentEnrollments, UsageMetric::MonthlyEnrollments],
        )
        .await;
        Ok(usage)
    }

    /// Count one live-class attendance.
    ///
    /// # Errors
    ///
    /// `CapacityExceeded` when the attendance counter is at quota or the
    /// subscription is not ACTIVE.
    pub async fn track_attendance_usage(
        &self,
        subscription_id: SubscriptionId,
    ) -> Result<UsageCounters, DomainError> {
        let usage = self
            .subscriptions
            .try_consume_attendance(subscription_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::CapacityExceeded,
                    format!(
                        "Subscription {} cannot take another live class attendance",
                        subscription_id
                    ),
                )
            })?;

        tracing::debug!(
            subscription_id = %subscription_id,
            monthly_attendance = usage.monthly_attendance,
            "Attendance usage tracked"
        );
        self.raise_alerts(subscription_id, &[UsageMetric::MonthlyAttendance])
            .await;
        Ok(usage)
    }

    /// Give back one held enrollment.
    pub async fn release_enrollment(&self, subscription_id: SubscriptionId) -> Result<(), DomainError> {
        self.subscriptions.release_enrollment(subscription_id).await
    }

    async fn active_subscription(
        &self,
        user_id: UserId,
    ) -> Result<Result<Subscription, AdmissionCheck>, DomainError> {
        let Some(subscription) = self
            .subscriptions
            .find_current(Subject::Student(user_id))
            .await?
        else {
            return Ok(Err(AdmissionCheck::denied("No subscription found")));
        };
        if !subscription.is_active() {
            return Ok(Err(AdmissionCheck::denied(format!(
                "Subscription is {}, not ACTIVE",
                subscription.status
            ))));
        }
        Ok(Ok(subscription))
    }

    /// Advisory only: failures are logged and swallowed.
    async fn raise_alerts(&self, subscription_id: SubscriptionId, metrics: &[UsageMetric]) {
        let subscription = match self.subscriptions.find_by_id(subscription_id).await {
            Ok(Some(subscription)) => subscription,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(subscription_id = %subscription_id, error = %e, "Usage alert check failed");
                return;
            }
        };

        let readings = subscription
            .usage
            .readings(&subscription.limits, self.alert_threshold);
        for reading in readings.iter().filter(|r| metrics.contains(&r.metric)) {
            let Some(message) = reading.alert_message() else {
                continue;
            };
            let notification = Notification::UsageAlert {
                subject: subscription.subject,
                message,
            };
            if let Err(e) = self.notifier.notify(notification).await {
                tracing::warn!(
                    subscription_id = %subscription_id,
                    error = %e,
                    "Usage alert could not be delivered"
                );
            }
        }
    }
}
