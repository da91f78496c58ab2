//! In-memory adapters for every governance port.
//!
//! Used by tests and local dry runs. Semantics match the Postgres adapters,
//! including atomic quota admission and one active enrollment per course.

mod commission_store;
mod course_store;
mod directory;
mod live_class_store;
mod subscription_store;

pub use commission_store::InMemoryCommissionRepository;
pub use course_store::{InMemoryCourseRepository, InMemoryEnrollmentRepository};
pub use directory::{InMemoryDirectory, InMemoryPayments};
pub use live_class_store::InMemoryLiveClassRepository;
pub use subscription_store::{InMemorySubscriptionLog, InMemorySubscriptionRepository};
