//! End-to-end governance scenarios over the in-memory adapters.

use std::sync::Arc;

use lingua_platform::adapters::catalog::StaticTierCatalog;
use lingua_platform::adapters::memory::{
    InMemoryCommissionRepository, InMemoryCourseRepository, InMemoryDirectory,
    InMemoryEnrollmentRepository, InMemoryLiveClassRepository, InMemoryPayments,
    InMemorySubscriptionLog, InMemorySubscriptionRepository,
};
use lingua_platform::adapters::notification::RecordingNotifier;
use lingua_platform::application::handlers::commission::{
    CalculateCommissionCommand, ProcessPayoutCommand,
};
use lingua_platform::application::handlers::subscription::DowngradeSubscriptionCommand;
use lingua_platform::application::{GovernanceServices, Ports};
use lingua_platform::config::GovernanceConfig;
use lingua_platform::domain::catalog::{InstitutionPlan, StudentPlan, Tier};
use lingua_platform::domain::commission::{CommissionError, CommissionStatus, PayoutMethod};
use lingua_platform::domain::directory::{Institution, Payment, PaymentStatus, User, UserRole};
use lingua_platform::domain::enrollment::{Course, Enrollment};
use lingua_platform::domain::foundation::{
    CourseId, ErrorKind, InstitutionId, Money, PaymentId, Timestamp, UserId,
};
use lingua_platform::domain::live_class::{LiveClassError, LiveClassProposal, TimeWindow};
use lingua_platform::domain::subscription::{
    Subject, Subscription, SubscriptionError, SubscriptionOrigin, SubscriptionStatus,
};
use lingua_platform::ports::{CommissionRepository, EnrollmentRepository, SubscriptionRepository};

// ════════════════════════════════════════════════════════════════════════════════
// Fixture
// ════════════════════════════════════════════════════════════════════════════════

struct Platform {
    catalog: StaticTierCatalog,
    subscriptions: InMemorySubscriptionRepository,
    directory: InMemoryDirectory,
    commissions: InMemoryCommissionRepository,
    payments: InMemoryPayments,
    courses: InMemoryCourseRepository,
    enrollments: InMemoryEnrollmentRepository,
    services: GovernanceServices,
}

impl Platform {
    fn new() -> Self {
        let catalog = StaticTierCatalog::builtin();
        let log = InMemorySubscriptionLog::new();
        let directory = InMemoryDirectory::new();
        let subscriptions = InMemorySubscriptionRepository::new(log.clone(), directory.clone());
        let commissions = InMemoryCommissionRepository::new();
        let payments = InMemoryPayments::new(commissions.clone());
        let courses = InMemoryCourseRepository::new();
        let enrollments = InMemoryEnrollmentRepository::new(courses.clone());

        let ports = Ports {
            catalog: Arc::new(catalog.clone()),
            subscriptions: Arc::new(subscriptions.clone()),
            log: Arc::new(log),
            directory: Arc::new(directory.clone()),
            payments: Arc::new(payments.clone()),
            commissions: Arc::new(commissions.clone()),
            courses: Arc::new(courses.clone()),
            enrollments: Arc::new(enrollments.clone()),
            live_classes: Arc::new(InMemoryLiveClassRepository::new()),
            notifier: Arc::new(RecordingNotifier::new()),
        };
        let services = GovernanceServices::new(ports, &GovernanceConfig::default());

        Self {
            catalog,
            subscriptions,
            directory,
            commissions,
            payments,
            courses,
            enrollments,
            services,
        }
    }

    fn student_tier(&self, plan: StudentPlan) -> Tier {
        Tier::Student(self.catalog.data().student_tier(plan).cloned().unwrap())
    }

    fn institution_tier(&self, plan: InstitutionPlan) -> Tier {
        Tier::Institution(self.catalog.data().institution_tier(plan).cloned().unwrap())
    }

    async fn user(&self, role: UserRole) -> User {
        let id = UserId::new();
        let user = User {
            id,
            name: format!("User {}", id),
            email: format!("{}@example.com", id),
            role,
            institution_id: None,
        };
        self.directory.insert_user(user.clone()).await;
        user
    }

    async fn student_subscription(&self, plan: StudentPlan) -> (User, Subscription) {
        let user = self.user(UserRole::Student).await;
        let sub = Subscription::create_paid(
            Subject::Student(user.id),
            &self.student_tier(plan),
            Timestamp::now(),
        );
        self.subscriptions.save(&sub).await.unwrap();
        (user, sub)
    }

    async fn institution(&self, plan: InstitutionPlan) -> InstitutionId {
        let institution = Institution {
            id: InstitutionId::new(),
            name: "Escuela Norte".to_string(),
            commission_rate: None,
            is_active: true,
        };
        self.directory.insert_institution(institution.clone()).await;
        let sub = Subscription::create_paid(
            Subject::Institution(institution.id),
            &self.institution_tier(plan),
            Timestamp::now(),
        );
        self.subscriptions.save(&sub).await.unwrap();
        institution.id
    }

    async fn course(&self, institution_id: Option<InstitutionId>, gated: bool) -> Course {
        let course = Course {
            id: CourseId::new(),
            title: "Italiano B1".to_string(),
            institution_id,
            is_platform_course: institution_id.is_none(),
            requires_subscription: gated,
            subscription_tier: None,
            max_students: None,
            current_enrollments: 0,
        };
        self.courses.insert(course.clone()).await;
        course
    }

    /// A completed payment for a direct enrollment in an institution course.
    async fn course_sale(&self, institution_id: InstitutionId, cents: i64) -> PaymentId {
        let course = self.course(Some(institution_id), false).await;
        let student = self.user(UserRole::Student).await;
        let enrollment = Enrollment::direct(student.id, course.id, Timestamp::now());
        self.enrollments.create(&enrollment).await.unwrap();

        let now = Timestamp::now();
        let payment = Payment {
            id: PaymentId::new(),
            user_id: student.id,
            enrollment_id: Some(enrollment.id),
            amount: Money::from_cents(cents),
            status: PaymentStatus::Completed,
            created_at: now,
            completed_at: Some(now),
        };
        self.payments.insert(payment.clone()).await;
        payment.id
    }
}

fn one_hour_from(start: Timestamp, instructor: UserId) -> LiveClassProposal {
    LiveClassProposal {
        title: "Conversation club".to_string(),
        instructor_id: instructor,
        institution_id: None,
        course_id: None,
        window: TimeWindow::new(start, start.add_hours(1)),
        max_participants: 10,
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Quotas
// ════════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn full_enrollment_quota_refuses_enrollment() {
    let platform = Platform::new();
    let (student, mut sub) = platform.student_subscription(StudentPlan::Basic).await;
    sub.usage.current_enrollments = 5;
    sub.usage.monthly_enrollments = 5;
    platform.subscriptions.put(&sub).await;
    let course = platform.course(None, true).await;

    let check = platform
        .services
        .quota
        .can_enroll_in_course(student.id, course.id)
        .await
        .unwrap();

    assert!(!check.allowed);
}

#[tokio::test]
async fn enrollments_stop_at_the_quota() {
    let platform = Platform::new();
    let (student, _) = platform.student_subscription(StudentPlan::Basic).await;

    let mut admitted = 0;
    let mut refused = 0;
    for _ in 0..7 {
        let course = platform.course(None, true).await;
        match platform
            .services
            .enroll
            .handle(lingua_platform::application::handlers::platform_course::EnrollInCourseCommand {
                user_id: student.id,
                course_id: course.id,
            })
            .await
        {
            Ok(_) => admitted += 1,
            Err(e) => {
                assert_eq!(e.kind(), ErrorKind::CapacityExceeded);
                refused += 1;
            }
        }
    }

    assert_eq!(admitted, 5);
    assert_eq!(refused, 2);
    let current = platform
        .subscriptions
        .find_current(Subject::Student(student.id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(current.usage.current_enrollments, 5);
}

// ════════════════════════════════════════════════════════════════════════════════
// Subscription lifecycle
// ════════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn downgrade_below_usage_is_refused_and_changes_nothing() {
    let platform = Platform::new();
    let (student, mut sub) = platform.student_subscription(StudentPlan::Premium).await;
    sub.usage.current_enrollments = 6;
    platform.subscriptions.put(&sub).await;
    let basic = platform.student_tier(StudentPlan::Basic);

    let err = platform
        .services
        .downgrade_subscription
        .handle(DowngradeSubscriptionCommand {
            subject: Subject::Student(student.id),
            new_tier_id: basic.id(),
            reason: None,
            effective_date: None,
            actor_id: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, SubscriptionError::CapacityExceeded { .. }));
    let after = platform.subscriptions.find_by_id(sub.id).await.unwrap().unwrap();
    assert_eq!(after, sub);
}

#[tokio::test]
async fn lapsed_trial_is_expired_and_replaced_by_one_fallback() {
    let platform = Platform::new();
    let student = platform.user(UserRole::Student).await;
    let subject = Subject::Student(student.id);
    let trial = Subscription::create_trial(
        subject,
        &platform.student_tier(StudentPlan::Premium),
        Timestamp::now().minus_days(20),
        14,
    );
    platform.subscriptions.save(&trial).await.unwrap();

    let report = platform.services.expired_trials.handle().await.unwrap();
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed(), 0);

    let history = platform.subscriptions.history(subject).await;
    assert_eq!(history.len(), 2);

    let original = history.iter().find(|s| s.id == trial.id).unwrap();
    assert_eq!(original.status, SubscriptionStatus::Expired);

    let fallbacks: Vec<_> = history
        .iter()
        .filter(|s| s.origin == SubscriptionOrigin::Fallback { original_id: trial.id })
        .collect();
    assert_eq!(fallbacks.len(), 1);
    assert!(fallbacks[0].is_active());

    // A second sweep finds nothing left to do.
    let again = platform.services.expired_trials.handle().await.unwrap();
    assert_eq!(again.succeeded, 0);
    assert_eq!(platform.subscriptions.history(subject).await.len(), 2);
}

// ════════════════════════════════════════════════════════════════════════════════
// Commissions
// ════════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn commission_calculation_is_idempotent_per_payment() {
    let platform = Platform::new();
    let institution = platform.institution(InstitutionPlan::Professional).await;
    let payment_id = platform.course_sale(institution, 10_000).await;

    let first = platform
        .services
        .calculate_commission
        .handle(CalculateCommissionCommand { payment_id })
        .await
        .unwrap();
    let second = platform
        .services
        .calculate_commission
        .handle(CalculateCommissionCommand { payment_id })
        .await
        .unwrap();

    assert!(first.created);
    assert!(!second.created);
    assert_eq!(first.record.id, second.record.id);
    assert_eq!(second.record.commission_amount, Money::from_cents(2_000));
    assert_eq!(platform.commissions.record_count().await, 1);
}

#[tokio::test]
async fn payout_of_the_full_pending_total_settles_every_commission() {
    let platform = Platform::new();
    let institution = platform.institution(InstitutionPlan::Professional).await;
    // 20% of $500, $250 and $125.
    for cents in [50_000, 25_000, 12_500] {
        let payment_id = platform.course_sale(institution, cents).await;
        platform
            .services
            .calculate_commission
            .handle(CalculateCommissionCommand { payment_id })
            .await
            .unwrap();
    }

    let result = platform
        .services
        .process_payout
        .handle(ProcessPayoutCommand {
            institution_id: institution,
            amount: Money::from_cents(17_500),
            method: PayoutMethod::BankTransfer,
            reference: "ref1".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(result.payout.amount, Money::from_cents(17_500));
    assert_eq!(result.settled.len(), 3);

    let records = platform
        .commissions
        .list_for_institution(institution)
        .await
        .unwrap();
    assert_eq!(records.len(), 3);
    for record in records {
        assert_eq!(record.status, CommissionStatus::Paid);
        assert_eq!(record.payout_id, Some(result.payout.id));
    }
}

#[tokio::test]
async fn payout_above_pending_total_changes_nothing() {
    let platform = Platform::new();
    let institution = platform.institution(InstitutionPlan::Professional).await;
    let payment_id = platform.course_sale(institution, 50_000).await;
    platform
        .services
        .calculate_commission
        .handle(CalculateCommissionCommand { payment_id })
        .await
        .unwrap();

    let err = platform
        .services
        .process_payout
        .handle(ProcessPayoutCommand {
            institution_id: institution,
            amount: Money::from_cents(10_001),
            method: PayoutMethod::BankTransfer,
            reference: "ref2".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, CommissionError::PayoutExceedsPending { .. }));
    let pending = platform
        .commissions
        .pending_for_institution(institution)
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert!(platform
        .commissions
        .payouts_for_institution(institution)
        .await
        .unwrap()
        .is_empty());
}

// ════════════════════════════════════════════════════════════════════════════════
// Live classes
// ════════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn overlapping_session_is_refused_and_adjacent_one_accepted() {
    let platform = Platform::new();
    let instructor = platform.user(UserRole::Instructor).await;
    let ten = Timestamp::now().add_hours(3);

    platform
        .services
        .create_live_class
        .handle(one_hour_from(ten, instructor.id))
        .await
        .unwrap();

    let overlapping = platform
        .services
        .create_live_class
        .handle(one_hour_from(ten.add_minutes(30), instructor.id))
        .await
        .unwrap_err();
    assert!(matches!(overlapping, LiveClassError::InstructorConflict { .. }));
    assert_eq!(overlapping.kind(), ErrorKind::Conflict);

    let adjacent = platform
        .services
        .create_live_class
        .handle(one_hour_from(ten.add_hours(1), instructor.id))
        .await;
    assert!(adjacent.is_ok());
}

#[tokio::test]
async fn overlap_is_refused_whichever_session_came_first() {
    let platform = Platform::new();
    let instructor = platform.user(UserRole::Instructor).await;
    let later = Timestamp::now().add_hours(5);

    platform
        .services
        .create_live_class
        .handle(one_hour_from(later, instructor.id))
        .await
        .unwrap();

    let earlier = platform
        .services
        .validate_live_class
        .handle(&one_hour_from(later.add_minutes(-30), instructor.id))
        .await
        .unwrap_err();
    assert!(matches!(earlier, LiveClassError::InstructorConflict { .. }));
}

#[tokio::test]
async fn minimum_notice_applies_to_new_sessions() {
    let platform = Platform::new();
    let instructor = platform.user(UserRole::Instructor).await;

    let too_soon = platform
        .services
        .validate_live_class
        .handle(&one_hour_from(Timestamp::now().add_minutes(10), instructor.id))
        .await
        .unwrap_err();
    assert_eq!(too_soon, LiveClassError::InsufficientNotice { min_minutes: 30 });

    let in_time = platform
        .services
        .validate_live_class
        .handle(&one_hour_from(Timestamp::now().add_minutes(31), instructor.id))
        .await;
    assert!(in_time.is_ok());
}
