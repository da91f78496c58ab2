//! Lingua Platform - subscription governance for a multi-tenant
//! language-learning platform.
//!
//! Students and institutions hold tiered subscriptions with usage quotas;
//! institutions pay the platform a tier-dependent commission on course
//! sales; live classes and platform courses are admitted against those
//! quotas.
//!
//! The crate follows a hexagonal layout:
//!
//! - [`domain`] - tiers, subscriptions, commissions, live classes, enrollments
//! - [`ports`] - repository and notifier traits
//! - [`application`] - command/query handlers and the cron runner
//! - [`adapters`] - Postgres, in-memory, tier catalog and HTTP implementations
//! - [`config`] - environment-driven configuration

pub mod adapters;
pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod ports;
