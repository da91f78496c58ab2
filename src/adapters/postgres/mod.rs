//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresSubscriptionRepository`, `PostgresSubscriptionLog` - Subscriptions and audit trail
//! - `PostgresCommissionRepository` - Commission ledger and payouts
//! - `PostgresCourseRepository`, `PostgresEnrollmentRepository` - Courses and enrollments
//! - `PostgresLiveClassRepository` - Live-class sessions
//! - `PostgresDirectory`, `PostgresPayments` - Users, institutions and payments

mod commission_repository;
mod course_repository;
mod directory;
mod live_class_repository;
mod subscription_repository;
mod support;

pub use commission_repository::PostgresCommissionRepository;
pub use course_repository::{PostgresCourseRepository, PostgresEnrollmentRepository};
pub use directory::{PostgresDirectory, PostgresPayments};
pub use live_class_repository::PostgresLiveClassRepository;
pub use subscription_repository::{PostgresSubscriptionLog, PostgresSubscriptionRepository};

use std::sync::Arc;

use secrecy::ExposeSecret;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::application::Ports;
use crate::config::DatabaseConfig;
use crate::ports::{Notifier, TierCatalog};

/// Opens a connection pool sized from `config`.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .max_lifetime(config.max_lifetime())
        .connect(config.url.expose_secret())
        .await
}

/// Applies the bundled `migrations/` directory.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Every persistence port backed by `pool`.
pub fn ports(pool: PgPool, catalog: Arc<dyn TierCatalog>, notifier: Arc<dyn Notifier>) -> Ports {
    Ports {
        catalog,
        subscriptions: Arc::new(PostgresSubscriptionRepository::new(pool.clone())),
        log: Arc::new(PostgresSubscriptionLog::new(pool.clone())),
        directory: Arc::new(PostgresDirectory::new(pool.clone())),
        payments: Arc::new(PostgresPayments::new(pool.clone())),
        commissions: Arc::new(PostgresCommissionRepository::new(pool.clone())),
        courses: Arc::new(PostgresCourseRepository::new(pool.clone())),
        enrollments: Arc::new(PostgresEnrollmentRepository::new(pool.clone())),
        live_classes: Arc::new(PostgresLiveClassRepository::new(pool)),
        notifier,
    }
}
