//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the governance services and the outside world. Adapters implement these
//! ports (`adapters::postgres` for production, `adapters::memory` for tests
//! and local dry runs).
//!
//! ## Catalog and Subscription Ports
//!
//! - `TierCatalog` - Tier and commission-tier lookups
//! - `SubscriptionRepository` - Subscription rows and atomic quota admission
//! - `SubscriptionLogWriter` - Append-only audit trail and billing history
//!
//! ## Commission Ports
//!
//! - `PaymentReader` - Completed course payments
//! - `CommissionRepository` - Commission ledger and payouts
//!
//! ## Course and Live-Class Ports
//!
//! - `CourseRepository`, `EnrollmentRepository` - Courses and enrollments
//! - `LiveClassRepository` - Live-class sessions
//!
//! ## Platform Ports
//!
//! - `Directory` - Users and institutions
//! - `Notifier` - Advisory notifications

mod commission_repository;
mod course_repository;
mod directory;
mod live_class_repository;
mod notifier;
mod subscription_log;
mod subscription_repository;
mod tier_catalog;

pub use commission_repository::CommissionRepository;
pub use course_repository::{CourseRepository, EnrollmentRepository};
pub use directory::{Directory, PaymentReader};
pub use live_class_repository::LiveClassRepository;
pub use notifier::{Notification, Notifier};
pub use subscription_log::SubscriptionLogWriter;
pub use subscription_repository::SubscriptionRepository;
pub use tier_catalog::TierCatalog;
