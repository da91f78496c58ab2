//! In-memory subscription repository and audit log.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, SubscriptionId, Timestamp};
use crate::domain::subscription::{
    BillingRecord, LifecycleChange, Subject, Subscription, SubscriptionLog, SubscriptionStatus,
    UsageCounters,
};
use crate::ports::{Directory, SubscriptionLogWriter, SubscriptionRepository};

use super::InMemoryDirectory;

/// In-memory subscription store.
///
/// Quota admission runs under the write lock, so check and increment are
/// one step exactly like the conditional update of the Postgres adapter.
/// Lifecycle commits validate every part before writing any of it.
#[derive(Debug, Clone)]
pub struct InMemorySubscriptionRepository {
    rows: Arc<RwLock<HashMap<SubscriptionId, Subscription>>>,
    log: InMemorySubscriptionLog,
    directory: InMemoryDirectory,
}

impl InMemorySubscriptionRepository {
    pub fn new(log: InMemorySubscriptionLog, directory: InMemoryDirectory) -> Self {
        Self {
            rows: Arc::new(RwLock::new(HashMap::new())),
            log,
            directory,
        }
    }

    /// Replace a row wholesale, usage counters included. For seeding state.
    pub async fn put(&self, subscription: &Subscription) {
        self.rows
            .write()
            .await
            .insert(subscription.id, subscription.clone());
    }

    /// Every row of a subject, oldest first.
    pub async fn history(&self, subject: Subject) -> Vec<Subscription> {
        let mut rows: Vec<Subscription> = self
            .rows
            .read()
            .await
            .values()
            .filter(|s| s.subject == subject)
            .cloned()
            .collect();
        rows.sort_by_key(|s| s.created_at);
        rows
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    fn not_found(id: SubscriptionId) -> DomainError {
        DomainError::new(
            ErrorCode::SubscriptionNotFound,
            format!("Subscription not found: {}", id),
        )
    }

    fn duplicate(id: SubscriptionId) -> DomainError {
        DomainError::new(
            ErrorCode::Conflict,
            format!("Subscription {} already exists", id),
        )
    }

    /// Overwrite `row` with `next`, keeping the stored usage counters.
    fn overwrite(row: &mut Subscription, next: &Subscription) {
        let usage = row.usage;
        *row = next.clone();
        row.usage = usage;
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let mut rows = self.rows.write().await;
        if rows.contains_key(&subscription.id) {
            return Err(Self::duplicate(subscription.id));
        }
        rows.insert(subscription.id, subscription.clone());
        Ok(())
    }

    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&subscription.id) {
            Some(row) => {
                Self::overwrite(row, subscription);
                Ok(())
            }
            None => Err(Self::not_found(subscription.id)),
        }
    }

    async fn commit(&self, change: &LifecycleChange) -> Result<(), DomainError> {
        let mut rows = self.rows.write().await;

        if let Some(missing) = change.updated.iter().find(|s| !rows.contains_key(&s.id)) {
            return Err(Self::not_found(missing.id));
        }
        if let Some(taken) = change.inserted.iter().find(|s| rows.contains_key(&s.id)) {
            return Err(Self::duplicate(taken.id));
        }
        if let Some((institution, _)) = change.commission_rate {
            if self.directory.find_institution(institution).await?.is_none() {
                return Err(DomainError::new(
                    ErrorCode::InstitutionNotFound,
                    format!("Institution not found: {}", institution),
                ));
            }
        }

        for next in &change.updated {
            if let Some(row) = rows.get_mut(&next.id) {
                Self::overwrite(row, next);
            }
        }
        for added in &change.inserted {
            rows.insert(added.id, added.clone());
        }
        if let Some((institution, rate)) = change.commission_rate {
            self.directory.set_commission_rate(institution, rate).await?;
        }
        for entry in &change.log {
            self.log.append(entry).await?;
        }
        for record in &change.billing {
            self.log.append_billing(record).await?;
        }
        Ok(())
    }

    async fn find_by_id(&self, id: SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn find_current(&self, subject: Subject) -> Result<Option<Subscription>, DomainError> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .filter(|s| s.subject == subject && s.status != SubscriptionStatus::Expired)
            .max_by_key(|s| s.created_at)
            .cloned())
    }

    async fn find_lapsed_trials(&self, now: Timestamp) -> Result<Vec<Subscription>, DomainError> {
        let mut trials: Vec<Subscription> = self
            .rows
            .read()
            .await
            .values()
            .filter(|s| s.trial_has_lapsed(now))
            .cloned()
            .collect();
        trials.sort_by_key(|s| s.end_date);
        Ok(trials)
    }

    async fn find_active(&self) -> Result<Vec<Subscription>, DomainError> {
        let mut active: Vec<Subscription> = self
            .rows
            .read()
            .await
            .values()
            .filter(|s| s.is_active())
            .cloned()
            .collect();
        active.sort_by_key(|s| s.created_at);
        Ok(active)
    }

    async fn try_consume_enrollment(
        &self,
        id: SubscriptionId,
    ) -> Result<Option<UsageCounters>, DomainError> {
        let mut rows = self.rows.write().await;
        let row = rows.get_mut(&id).ok_or_else(|| Self::not_found(id))?;
        Ok(row.record_enrollment(Timestamp::now()).ok())
    }

    async fn try_consume_attendance(
        &self,
        id: SubscriptionId,
    ) -> Result<Option<UsageCounters>, DomainError> {
        let mut rows = self.rows.write().await;
        let row = rows.get_mut(&id).ok_or_else(|| Self::not_found(id))?;
        Ok(row.record_attendance(Timestamp::now()).ok())
    }

    async fn release_enrollment(&self, id: SubscriptionId) -> Result<(), DomainError> {
        let mut rows = self.rows.write().await;
        let row = rows.get_mut(&id).ok_or_else(|| Self::not_found(id))?;
        row.release_enrollment(Timestamp::now());
        Ok(())
    }

    async fn reset_monthly_usage(&self) -> Result<u64, DomainError> {
        let now = Timestamp::now();
        let mut count = 0;
        for row in self.rows.write().await.values_mut().filter(|s| s.is_active()) {
            row.reset_monthly_usage(now);
            count += 1;
        }
        Ok(count)
    }
}

/// In-memory audit trail.
#[derive(Debug, Clone, Default)]
pub struct InMemorySubscriptionLog {
    entries: Arc<RwLock<Vec<SubscriptionLog>>>,
    billing: Arc<RwLock<Vec<BillingRecord>>>,
}

impl InMemorySubscriptionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all_entries(&self) -> Vec<SubscriptionLog> {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl SubscriptionLogWriter for InMemorySubscriptionLog {
    async fn append(&self, entry: &SubscriptionLog) -> Result<(), DomainError> {
        self.entries.write().await.push(entry.clone());
        Ok(())
    }

    async fn append_billing(&self, record: &BillingRecord) -> Result<(), DomainError> {
        self.billing.write().await.push(record.clone());
        Ok(())
    }

    async fn entries_for(
        &self,
        subscription_id: SubscriptionId,
    ) -> Result<Vec<SubscriptionLog>, DomainError> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .filter(|e| e.subscription_id == subscription_id)
            .cloned()
            .collect())
    }

    async fn billing_for(
        &self,
        subscription_id: SubscriptionId,
    ) -> Result<Vec<BillingRecord>, DomainError> {
        Ok(self
            .billing
            .read()
            .await
            .iter()
            .filter(|b| b.subscription_id == subscription_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{StudentPlan, Tier, TierCatalogData};
    use crate::domain::directory::Institution;
    use crate::domain::foundation::{CommissionRate, InstitutionId, UserId};
    use crate::domain::subscription::LogAction;

    fn repo() -> InMemorySubscriptionRepository {
        InMemorySubscriptionRepository::new(InMemorySubscriptionLog::new(), InMemoryDirectory::new())
    }

    fn basic_sub() -> Subscription {
        let tier = Tier::Student(
            TierCatalogData::builtin()
                .student_tier(StudentPlan::Basic)
                .unwrap()
                .clone(),
        );
        Subscription::create_paid(Subject::Student(UserId::new()), &tier, Timestamp::now())
    }

    #[tokio::test]
    async fn consume_stops_at_quota() {
        let repo = repo();
        let sub = basic_sub();
        repo.save(&sub).await.unwrap();

        for expected in 1..=5 {
            let counters = repo.try_consume_enrollment(sub.id).await.unwrap().unwrap();
            assert_eq!(counters.current_enrollments, expected);
        }
        assert_eq!(repo.try_consume_enrollment(sub.id).await.unwrap(), None);

        let stored = repo.find_by_id(sub.id).await.unwrap().unwrap();
        assert_eq!(stored.usage.current_enrollments, 5);
    }

    #[tokio::test]
    async fn concurrent_admissions_never_exceed_quota() {
        let repo = repo();
        let sub = basic_sub();
        repo.save(&sub).await.unwrap();

        let mut tasks = Vec::new();
        for _ in 0..20 {
            let repo = repo.clone();
            tasks.push(tokio::spawn(async move {
                repo.try_consume_enrollment(sub.id).await.unwrap()
            }));
        }
        let mut admitted = 0;
        for task in tasks {
            if task.await.unwrap().is_some() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 5);
    }

    #[tokio::test]
    async fn current_skips_expired_rows() {
        let repo = repo();
        let mut old = basic_sub();
        old.expire(Timestamp::now()).unwrap();
        repo.save(&old).await.unwrap();
        assert!(repo.find_current(old.subject).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reset_only_touches_active_rows() {
        let repo = repo();
        let active = basic_sub();
        let mut cancelled = basic_sub();
        cancelled.cancel(Timestamp::now()).unwrap();
        repo.save(&active).await.unwrap();
        repo.save(&cancelled).await.unwrap();
        repo.try_consume_enrollment(active.id).await.unwrap();

        assert_eq!(repo.reset_monthly_usage().await.unwrap(), 1);
        let stored = repo.find_by_id(active.id).await.unwrap().unwrap();
        assert_eq!(stored.usage.monthly_enrollments, 0);
        assert_eq!(stored.usage.current_enrollments, 1);
    }

    #[tokio::test]
    async fn update_keeps_stored_usage() {
        let repo = repo();
        let sub = basic_sub();
        repo.save(&sub).await.unwrap();
        repo.try_consume_enrollment(sub.id).await.unwrap();

        let mut stale = sub.clone();
        stale.cancel(Timestamp::now()).unwrap();
        repo.update(&stale).await.unwrap();

        let stored = repo.find_by_id(sub.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SubscriptionStatus::Cancelled);
        assert_eq!(stored.usage.current_enrollments, 1);
    }

    #[tokio::test]
    async fn commit_with_unknown_institution_writes_nothing() {
        let log = InMemorySubscriptionLog::new();
        let repo = InMemorySubscriptionRepository::new(log.clone(), InMemoryDirectory::new());
        let sub = basic_sub();
        repo.save(&sub).await.unwrap();

        let mut cancelled = sub.clone();
        cancelled.cancel(Timestamp::now()).unwrap();
        let change = LifecycleChange::new()
            .update(&cancelled)
            .set_commission_rate(InstitutionId::new(), CommissionRate::whole_percent(25))
            .log(SubscriptionLog::entry(&sub, LogAction::Cancelled, Timestamp::now()));

        let err = repo.commit(&change).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InstitutionNotFound);

        let stored = repo.find_by_id(sub.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SubscriptionStatus::Active);
        assert!(log.all_entries().await.is_empty());
    }

    #[tokio::test]
    async fn commit_applies_rows_rate_and_audit_together() {
        let log = InMemorySubscriptionLog::new();
        let directory = InMemoryDirectory::new();
        let institution = Institution {
            id: InstitutionId::new(),
            name: "Escuela".to_string(),
            commission_rate: None,
            is_active: true,
        };
        directory.insert_institution(institution.clone()).await;
        let repo = InMemorySubscriptionRepository::new(log.clone(), directory.clone());
        let sub = basic_sub();
        repo.save(&sub).await.unwrap();
        let extra = basic_sub();

        let change = LifecycleChange::new()
            .insert(&extra)
            .set_commission_rate(institution.id, CommissionRate::whole_percent(15))
            .log(SubscriptionLog::entry(&extra, LogAction::FallbackCreated, Timestamp::now()))
            .bill(BillingRecord::for_period(&extra, "fallback"));
        repo.commit(&change).await.unwrap();

        assert_eq!(repo.len().await, 2);
        let stored = directory.find_institution(institution.id).await.unwrap().unwrap();
        assert_eq!(stored.commission_rate, Some(CommissionRate::whole_percent(15)));
        assert_eq!(log.all_entries().await.len(), 1);
        assert_eq!(log.billing_for(extra.id).await.unwrap().len(), 1);
    }
}
