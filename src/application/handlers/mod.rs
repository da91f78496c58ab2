//! Application handlers.
//!
//! Command and query handlers grouped by governance area.

pub mod analytics;
pub mod batch;
pub mod commission;
pub mod cron;
pub mod live_class;
pub mod platform_course;
pub mod quota;
pub mod subscription;

#[cfg(test)]
pub(crate) mod test_support;
