//! Scheduled batch tasks run by the `automated-commission-cron` binary.

mod runner;
mod task;

pub use runner::{CronError, CronOutcome, CronRunner};
pub use task::{CronTask, UnknownCronTask};
