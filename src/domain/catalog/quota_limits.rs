//! Tier-derived quota limits.
//!
//! A subscription carries a copy of the limits of the tier it is on, taken
//! at the time it moved onto that tier.

use serde::{Deserialize, Serialize};

/// Usage limits attached to a subscription.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaLimits {
    /// Maximum concurrent enrollments, and maximum new enrollments per month.
    pub enrollment_quota: u32,
    /// Maximum live-class attendances per month.
    pub attendance_quota: u32,
    /// Maximum upcoming live classes the holder may host.
    pub max_live_classes: u32,
    /// Days of continued access after `end_date`.
    pub grace_period_days: u32,
}

impl QuotaLimits {
    /// Check if the enrollment quota has been reached.
    ///
    /// Both the running total and the monthly count must stay under quota.
    pub fn enrollment_limit_reached(&self, current: u32, monthly: u32) -> bool {
        current >= self.enrollment_quota || monthly >= self.enrollment_quota
    }

    /// Check if the monthly attendance quota has been reached.
    pub fn attendance_limit_reached(&self, monthly_attendance: u32) -> bool {
        monthly_attendance >= self.attendance_quota
    }

    /// Check if the live-class hosting limit has been reached.
    pub fn live_class_limit_reached(&self, upcoming: u32) -> bool {
        upcoming >= self.max_live_classes
    }
}
