//! Usage counters and their status relative to a quota.

use serde::{Deserialize, Serialize};

use crate::domain::catalog::QuotaLimits;
use crate::domain::foundation::Percentage;

/// Running usage counters of a subscription.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCounters {
    /// Enrollments currently held.
    pub current_enrollments: u32,
    /// Enrollments started since the last monthly reset.
    pub monthly_enrollments: u32,
    /// Live classes attended since the last monthly reset.
    pub monthly_attendance: u32,
}

impl UsageCounters {
    /// Every quota-bound counter read against `limits`.
    ///
    /// Attendance is skipped when the limits carry no attendance quota
    /// (institution subscriptions).
    pub fn readings(&self, limits: &QuotaLimits, threshold: Percentage) -> Vec<QuotaReading> {
        let mut readings = vec![
            QuotaReading::new(
                UsageMetric::CurrentEnrollments,
                self.current_enrollments,
                limits.enrollment_quota,
                threshold,
            ),
            QuotaReading::new(
                UsageMetric::MonthlyEnrollments,
                self.monthly_enrollments,
                limits.enrollment_quota,
                threshold,
            ),
        ];
        if limits.attendance_quota > 0 {
            readings.push(QuotaReading::new(
                UsageMetric::MonthlyAttendance,
                self.monthly_attendance,
                limits.attendance_quota,
                threshold,
            ));
        }
        readings
    }
}

/// A usage counter that is measured against a quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageMetric {
    CurrentEnrollments,
    MonthlyEnrollments,
    MonthlyAttendance,
}

impl UsageMetric {
    pub fn label(&self) -> &'static str {
        match self {
            UsageMetric::CurrentEnrollments => "active course enrollments",
            UsageMetric::MonthlyEnrollments => "course enrollments this month",
            UsageMetric::MonthlyAttendance => "live class attendances this month",
        }
    }
}

/// One counter read against its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaReading {
    pub metric: UsageMetric,
    pub used: u32,
    pub limit: u32,
    pub percent_used: Percentage,
    pub status: QuotaStatus,
}

impl QuotaReading {
    pub fn new(metric: UsageMetric, used: u32, limit: u32, threshold: Percentage) -> Self {
        Self {
            metric,
            used,
            limit,
            percent_used: Percentage::of_usage(used, limit),
            status: QuotaStatus::from_usage(used, limit, threshold),
        }
    }

    /// Advisory text for readings at or above the alert threshold.
    pub fn alert_message(&self) -> Option<String> {
        match self.status {
            QuotaStatus::UnderLimit { .. } => None,
            QuotaStatus::Warning {
                remaining,
                percent_used,
            } => Some(format!(
                "You have used {}% of your {} ({} of {}), {} remaining",
                percent_used.value(),
                self.metric.label(),
                self.used,
                self.limit,
                remaining
            )),
            QuotaStatus::AtLimit => Some(format!(
                "You have reached your limit of {} {}",
                self.limit,
                self.metric.label()
            )),
        }
    }
}

/// Status of one counter relative to its quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QuotaStatus {
    /// Below the alert threshold.
    UnderLimit { remaining: u32 },
    /// At or above the alert threshold but still admitting.
    Warning { remaining: u32, percent_used: Percentage },
    /// Quota exhausted; further admissions are refused.
    AtLimit,
}

impl QuotaStatus {
    /// Calculates status from usage, quota and alert threshold.
    ///
    /// - below `threshold`: `UnderLimit`
    /// - `threshold` up to but excluding the quota: `Warning`
    /// - quota reached: `AtLimit`
    pub fn from_usage(used: u32, limit: u32, threshold: Percentage) -> Self {
        if used >= limit {
            return Self::AtLimit;
        }
        let remaining = limit - used;
        let percent_used = Percentage::of_usage(used, limit);
        if percent_used >= threshold {
            Self::Warning {
                remaining,
                percent_used,
            }
        } else {
            Self::UnderLimit { remaining }
        }
    }

    /// True for `Warning` and `AtLimit`.
    pub fn needs_alert(&self) -> bool {
        !matches!(self, QuotaStatus::UnderLimit { .. })
    }
}
