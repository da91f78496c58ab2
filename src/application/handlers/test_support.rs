//! Shared fixture for handler tests: every port backed by in-memory adapters.

use std::sync::Arc;

use crate::adapters::catalog::StaticTierCatalog;
use crate::adapters::memory::{
    InMemoryCommissionRepository, InMemoryCourseRepository, InMemoryDirectory,
    InMemoryEnrollmentRepository, InMemoryLiveClassRepository, InMemoryPayments,
    InMemorySubscriptionLog, InMemorySubscriptionRepository,
};
use crate::adapters::notification::RecordingNotifier;
use crate::application::services::Ports;
use crate::config::GovernanceConfig;
use crate::domain::catalog::{InstitutionPlan, StudentPlan, Tier};
use crate::domain::directory::{Institution, Payment, PaymentStatus, User, UserRole};
use crate::domain::enrollment::{Course, Enrollment};
use crate::domain::foundation::{
    CourseId, EnrollmentId, InstitutionId, Money, PaymentId, Timestamp, UserId,
};
use crate::domain::subscription::{Subject, Subscription};
use crate::ports::{
    CommissionRepository, CourseRepository, Directory, EnrollmentRepository, LiveClassRepository,
    Notifier, PaymentReader, SubscriptionLogWriter, SubscriptionRepository, TierCatalog,
};

use super::commission::CommissionRateResolver;
use super::quota::QuotaTracker;

pub struct TestPlatform {
    pub catalog: StaticTierCatalog,
    pub subscriptions: InMemorySubscriptionRepository,
    pub log: InMemorySubscriptionLog,
    pub directory: InMemoryDirectory,
    pub commissions: InMemoryCommissionRepository,
    pub payments: InMemoryPayments,
    pub courses: InMemoryCourseRepository,
    pub enrollments: InMemoryEnrollmentRepository,
    pub live_classes: InMemoryLiveClassRepository,
    pub notifier: RecordingNotifier,
    pub config: GovernanceConfig,
}

impl TestPlatform {
    pub fn new() -> Self {
        let commissions = InMemoryCommissionRepository::new();
        let courses = InMemoryCourseRepository::new();
        let log = InMemorySubscriptionLog::new();
        let directory = InMemoryDirectory::new();
        Self {
            catalog: StaticTierCatalog::builtin(),
            subscriptions: InMemorySubscriptionRepository::new(log.clone(), directory.clone()),
            log,
            directory,
            payments: InMemoryPayments::new(commissions.clone()),
            commissions,
            enrollments: InMemoryEnrollmentRepository::new(courses.clone()),
            courses,
            live_classes: InMemoryLiveClassRepository::new(),
            notifier: RecordingNotifier::new(),
            config: GovernanceConfig::default(),
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Ports
    // ════════════════════════════════════════════════════════════════════════

    pub fn catalog_port(&self) -> Arc<dyn TierCatalog> {
        Arc::new(self.catalog.clone())
    }

    pub fn subscription_port(&self) -> Arc<dyn SubscriptionRepository> {
        Arc::new(self.subscriptions.clone())
    }

    pub fn log_port(&self) -> Arc<dyn SubscriptionLogWriter> {
        Arc::new(self.log.clone())
    }

    pub fn directory_port(&self) -> Arc<dyn Directory> {
        Arc::new(self.directory.clone())
    }

    pub fn commission_port(&self) -> Arc<dyn CommissionRepository> {
        Arc::new(self.commissions.clone())
    }

    pub fn payment_port(&self) -> Arc<dyn PaymentReader> {
        Arc::new(self.payments.clone())
    }

    pub fn course_port(&self) -> Arc<dyn CourseRepository> {
        Arc::new(self.courses.clone())
    }

    pub fn enrollment_port(&self) -> Arc<dyn EnrollmentRepository> {
        Arc::new(self.enrollments.clone())
    }

    pub fn live_class_port(&self) -> Arc<dyn LiveClassRepository> {
        Arc::new(self.live_classes.clone())
    }

    pub fn notifier_port(&self) -> Arc<dyn Notifier> {
        Arc::new(self.notifier.clone())
    }

    pub fn ports(&self) -> Ports {
        Ports {
            catalog: self.catalog_port(),
            subscriptions: self.subscription_port(),
            log: self.log_port(),
            directory: self.directory_port(),
            payments: self.payment_port(),
            commissions: self.commission_port(),
            courses: self.course_port(),
            enrollments: self.enrollment_port(),
            live_classes: self.live_class_port(),
            notifier: self.notifier_port(),
        }
    }

    pub fn quota_tracker(&self) -> QuotaTracker {
        QuotaTracker::new(
            self.subscription_port(),
            self.enrollment_port(),
            self.notifier_port(),
            self.config.usage_alert_threshold(),
        )
    }

    pub fn rate_resolver(&self) -> Arc<CommissionRateResolver> {
        Arc::new(CommissionRateResolver::new(
            self.subscription_port(),
            self.catalog_port(),
            self.directory_port(),
            self.config.default_commission_rate(),
        ))
    }

    // ════════════════════════════════════════════════════════════════════════
    // Seed data
    // ════════════════════════════════════════════════════════════════════════

    pub fn student_tier(&self, plan: StudentPlan) -> Tier {
        Tier::Student(self.catalog.data().student_tier(plan).cloned().unwrap())
    }

    pub fn institution_tier(&self, plan: InstitutionPlan) -> Tier {
        Tier::Institution(self.catalog.data().institution_tier(plan).cloned().unwrap())
    }

    pub async fn user(&self, role: UserRole, institution_id: Option<InstitutionId>) -> User {
        let id = UserId::new();
        let user = User {
            id,
            name: format!("User {}", id),
            email: format!("{}@example.com", id),
            role,
            institution_id,
        };
        self.directory.insert_user(user.clone()).await;
        user
    }

    pub async fn student_with_plan(&self, plan: StudentPlan) -> (User, Subscription) {
        let user = self.user(UserRole::Student, None).await;
        let sub = Subscription::create_paid(
            Subject::Student(user.id),
            &self.student_tier(plan),
            Timestamp::now(),
        );
        self.subscriptions.save(&sub).await.unwrap();
        (user, sub)
    }

    pub async fn institution(&self) -> Institution {
        let institution = Institution {
            id: InstitutionId::new(),
            name: "Lingua Academy".to_string(),
            commission_rate: None,
            is_active: true,
        };
        self.directory.insert_institution(institution.clone()).await;
        institution
    }

    pub async fn institution_with_plan(&self, plan: InstitutionPlan) -> (Institution, Subscription) {
        let institution = self.institution().await;
        let sub = Subscription::create_paid(
            Subject::Institution(institution.id),
            &self.institution_tier(plan),
            Timestamp::now(),
        );
        self.subscriptions.save(&sub).await.unwrap();
        (institution, sub)
    }

    pub async fn course(&self, institution_id: Option<InstitutionId>) -> Course {
        let course = Course {
            id: CourseId::new(),
            title: "Spanish A2".to_string(),
            institution_id,
            is_platform_course: institution_id.is_none(),
            requires_subscription: false,
            subscription_tier: None,
            max_students: None,
            current_enrollments: 0,
        };
        self.courses.insert(course.clone()).await;
        course
    }

    pub async fn completed_payment(&self, enrollment_id: Option<EnrollmentId>, cents: i64) -> Payment {
        let now = Timestamp::now();
        let payment = Payment {
            id: PaymentId::new(),
            user_id: UserId::new(),
            enrollment_id,
            amount: Money::from_cents(cents),
            status: PaymentStatus::Completed,
            created_at: now,
            completed_at: Some(now),
        };
        self.payments.insert(payment.clone()).await;
        payment
    }

    /// A completed payment for a direct enrollment in one of the
    /// institution's courses.
    pub async fn course_sale(&self, institution_id: InstitutionId, cents: i64) -> Payment {
        let course = self.course(Some(institution_id)).await;
        let student = self.user(UserRole::Student, None).await;
        let enrollment = Enrollment::direct(student.id, course.id, Timestamp::now());
        self.enrollments.create(&enrollment).await.unwrap();
        self.completed_payment(Some(enrollment.id), cents).await
    }
}
