//! Governance configuration
//!
//! Rates, thresholds and time bounds used by the governance services.

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::catalog::{InstitutionPlan, StudentPlan};
use crate::domain::foundation::{CommissionRate, Percentage};
use crate::domain::live_class::LiveClassPolicy;

use super::error::ValidationError;

/// Governance configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GovernanceConfig {
    /// Rate reported for institutions without a derivable tier rate (bps)
    #[serde(default = "default_commission_rate_bps")]
    pub default_commission_rate_bps: u32,

    /// Rate stored on an institution when its subscription is cancelled (bps)
    #[serde(default = "default_cancelled_commission_rate_bps")]
    pub cancelled_commission_rate_bps: u32,

    /// Usage share at which advisory alerts are raised
    #[serde(default = "default_usage_alert_threshold")]
    pub usage_alert_threshold_percent: u8,

    /// Minimum advance notice for a new live class
    #[serde(default = "default_min_notice")]
    pub live_class_min_notice_minutes: i64,

    /// Maximum live class duration
    #[serde(default = "default_max_duration")]
    pub live_class_max_duration_minutes: i64,

    #[serde(default = "default_min_participants")]
    pub live_class_min_participants: u32,

    #[serde(default = "default_max_participants")]
    pub live_class_max_participants: u32,

    /// Live class limit for instructors without any subscription tier
    #[serde(default = "default_max_live_classes")]
    pub default_max_live_classes: u32,

    /// Plan a lapsed student trial falls back to
    #[serde(default = "default_fallback_student_plan")]
    pub fallback_student_plan: StudentPlan,

    /// Plan a lapsed institution trial falls back to
    #[serde(default = "default_fallback_institution_plan")]
    pub fallback_institution_plan: InstitutionPlan,

    /// Length of a fallback subscription
    #[serde(default = "default_fallback_period_days")]
    pub fallback_period_days: i64,

    /// UTC day of month on which monthly usage counters are reset
    #[serde(default = "default_quota_reset_day")]
    pub quota_reset_day_of_month: u32,

    /// YAML file replacing the built-in tier catalog
    pub tier_catalog_path: Option<PathBuf>,
}

impl GovernanceConfig {
    pub fn default_commission_rate(&self) -> CommissionRate {
        CommissionRate::from_bps(self.default_commission_rate_bps)
            .unwrap_or(CommissionRate::whole_percent(20))
    }

    pub fn cancelled_commission_rate(&self) -> CommissionRate {
        CommissionRate::from_bps(self.cancelled_commission_rate_bps)
            .unwrap_or(CommissionRate::whole_percent(25))
    }

    pub fn usage_alert_threshold(&self) -> Percentage {
        Percentage::new(self.usage_alert_threshold_percent)
    }

    pub fn live_class_policy(&self) -> LiveClassPolicy {
        LiveClassPolicy {
            min_notice_minutes: self.live_class_min_notice_minutes,
            max_duration_minutes: self.live_class_max_duration_minutes,
            min_participants: self.live_class_min_participants,
            max_participants: self.live_class_max_participants,
        }
    }

    /// Validate governance configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, actual) in [
            ("default_commission_rate_bps", self.default_commission_rate_bps),
            ("cancelled_commission_rate_bps", self.cancelled_commission_rate_bps),
        ] {
            if actual > CommissionRate::MAX_BPS {
                return Err(ValidationError::InvalidCommissionRate { field, actual });
            }
        }
        if self.usage_alert_threshold_percent == 0 || self.usage_alert_threshold_percent > 100 {
            return Err(ValidationError::InvalidAlertThreshold(
                self.usage_alert_threshold_percent,
            ));
        }
        if self.live_class_min_notice_minutes < 0 || self.live_class_max_duration_minutes <= 0 {
            return Err(ValidationError::InvalidLiveClassDuration);
        }
        if self.live_class_min_participants == 0
            || self.live_class_min_participants > self.live_class_max_participants
        {
            return Err(ValidationError::InvalidParticipantBounds {
                min: self.live_class_min_participants,
                max: self.live_class_max_participants,
            });
        }
        if !(1..=28).contains(&self.quota_reset_day_of_month) {
            return Err(ValidationError::InvalidResetDay(self.quota_reset_day_of_month));
        }
        if self.fallback_period_days < 1 {
            return Err(ValidationError::InvalidFallbackPeriod);
        }
        Ok(())
    }
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            default_commission_rate_bps: default_commission_rate_bps(),
            cancelled_commission_rate_bps: default_cancelled_commission_rate_bps(),
            usage_alert_threshold_percent: default_usage_alert_threshold(),
            live_class_min_notice_minutes: default_min_notice(),
            live_class_max_duration_minutes: default_max_duration(),
            live_class_min_participants: default_min_participants(),
            live_class_max_participants: default_max_participants(),
            default_max_live_classes: default_max_live_classes(),
            fallback_student_plan: default_fallback_student_plan(),
            fallback_institution_plan: default_fallback_institution_plan(),
            fallback_period_days: default_fallback_period_days(),
            quota_reset_day_of_month: default_quota_reset_day(),
            tier_catalog_path: None,
        }
    }
}

fn default_commission_rate_bps() -> u32 {
    2_000
}

fn default_cancelled_commission_rate_bps() -> u32 {
    2_500
}

fn default_usage_alert_threshold() -> u8 {
    80
}

fn default_min_notice() -> i64 {
    30
}

fn default_max_duration() -> i64 {
    240
}

fn default_min_participants() -> u32 {
    1
}

fn default_max_participants() -> u32 {
    100
}

fn default_max_live_classes() -> u32 {
    5
}

fn default_fallback_student_plan() -> StudentPlan {
    StudentPlan::Free
}

fn default_fallback_institution_plan() -> InstitutionPlan {
    InstitutionPlan::Starter
}

fn default_fallback_period_days() -> i64 {
    365
}

fn default_quota_reset_day() -> u32 {
    1
}
