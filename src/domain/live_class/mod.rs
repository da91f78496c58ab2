//! Live-class domain - sessions, scheduling bounds and overlap rules.

mod errors;
mod policy;
mod session;
mod status;
mod window;

pub use errors::LiveClassError;
pub use policy::LiveClassPolicy;
pub use session::{LiveClass, LiveClassProposal};
pub use status::LiveClassStatus;
pub use window::TimeWindow;
