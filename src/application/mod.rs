//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers (write) and query handlers (read) live side by side per
//! governance area; `GovernanceServices` wires them over one set of ports.

pub mod handlers;
pub mod services;

pub use handlers::batch::{BatchFailure, BatchReport};
pub use handlers::cron::{CronError, CronOutcome, CronRunner, CronTask};
pub use services::{GovernanceServices, Ports};
