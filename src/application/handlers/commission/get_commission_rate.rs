//! GetCommissionRateHandler - Reporting rate of an institution.

use std::sync::Arc;

use crate::domain::commission::CommissionError;
use crate::domain::foundation::InstitutionId;

use super::{CommissionRateResolver, ResolvedRate};

#[derive(Debug, Clone)]
pub struct GetCommissionRateQuery {
    pub institution_id: InstitutionId,
}

pub struct GetCommissionRateHandler {
    rates: Arc<CommissionRateResolver>,
}

impl GetCommissionRateHandler {
    pub fn new(rates: Arc<CommissionRateResolver>) -> Self {
        Self { rates }
    }

    pub async fn handle(&self, query: GetCommissionRateQuery) -> Result<ResolvedRate, CommissionError> {
        self.rates.reporting_rate(query.institution_id).await
    }
}
