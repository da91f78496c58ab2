//! Notification adapters.
//!
//! Delivery is out of scope for the governance services; these adapters
//! either log notifications or record them for tests.

mod recording;
mod tracing_notifier;

pub use recording::RecordingNotifier;
pub use tracing_notifier::TracingNotifier;
