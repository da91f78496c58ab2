//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the governance services to external systems:
//! - `catalog` - Built-in and YAML tier catalogs
//! - `http` - Axum JSON API
//! - `memory` - In-memory stores for tests and dry runs
//! - `notification` - Log-based and recording notifiers
//! - `postgres` - PostgreSQL persistence

pub mod catalog;
pub mod http;
pub mod memory;
pub mod notification;
pub mod postgres;
