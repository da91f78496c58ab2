//! Domain layer containing the governance business rules.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, money, errors)
//! - `catalog` - Student and institution tiers, commission tiers
//! - `subscription` - Subscription aggregate, usage counters and audit trail
//! - `commission` - Per-payment commission ledger and payouts
//! - `live_class` - Live-class sessions and scheduling rules
//! - `enrollment` - Courses, enrollments and access resolution
//! - `directory` - Users, institutions and payments read by governance
//! - `analytics` - Usage dashboards and commission reports

pub mod analytics;
pub mod catalog;
pub mod commission;
pub mod directory;
pub mod enrollment;
pub mod foundation;
pub mod live_class;
pub mod subscription;
