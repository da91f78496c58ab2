//! Continue-on-error batch reporting.

use serde::Serialize;
use uuid::Uuid;

/// One item a batch job could not process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    pub id: Uuid,
    pub error: String,
}

/// Outcome of a batch job. Item failures are collected, never re-raised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn record_success(&mut self) {
        self.attempted += 1;
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self, id: Uuid, error: impl ToString) {
        self.attempted += 1;
        self.failures.push(BatchFailure {
            id,
            error: error.to_string(),
        });
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}
