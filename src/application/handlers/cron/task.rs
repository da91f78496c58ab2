//! Cron task selector.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown cron task '{0}', expected one of commissions, report, subscriptions, all")]
pub struct UnknownCronTask(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CronTask {
    /// Calculate commissions for completed payments without one.
    Commissions,
    /// Commission report over the trailing 30 days.
    Report,
    /// Expire lapsed trials and reset monthly usage on reset day.
    Subscriptions,
    /// The three tasks above, in order.
    All,
}

impl CronTask {
    /// The concrete tasks this selector runs, in execution order.
    pub fn expand(self) -> Vec<CronTask> {
        match self {
            CronTask::All => vec![CronTask::Commissions, CronTask::Report, CronTask::Subscriptions],
            task => vec![task],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CronTask::Commissions => "commissions",
            CronTask::Report => "report",
            CronTask::Subscriptions => "subscriptions",
            CronTask::All => "all",
        }
    }
}

impl fmt::Display for CronTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CronTask {
    type Err = UnknownCronTask;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "commissions" => Ok(CronTask::Commissions),
            "report" => Ok(CronTask::Report),
            "subscriptions" => Ok(CronTask::Subscriptions),
            "all" => Ok(CronTask::All),
            other => Err(UnknownCronTask(other.to_string())),
        }
    }
}
