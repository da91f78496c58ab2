//! Usage and commission reporting.

mod commission_report;
mod usage_alerts;
mod usage_dashboard;

pub use commission_report::{CommissionReportHandler, CommissionReportQuery};
pub use usage_alerts::UsageAlertsHandler;
pub use usage_dashboard::{UsageDashboardHandler, UsageDashboardQuery};
