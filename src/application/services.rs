//! Service wiring - every handler built once over a shared set of ports.

use std::sync::Arc;

use crate::config::GovernanceConfig;
use crate::ports::{
    CommissionRepository, CourseRepository, Directory, EnrollmentRepository, LiveClassRepository,
    Notifier, PaymentReader, SubscriptionLogWriter, SubscriptionRepository, TierCatalog,
};

use super::handlers::analytics::{CommissionReportHandler, UsageAlertsHandler, UsageDashboardHandler};
use super::handlers::commission::{
    CalculateCommissionHandler, CalculatePendingCommissionsHandler, CommissionRateResolver,
    GetCommissionRateHandler, GetCommissionSummaryHandler, GetSubscriptionStatusHandler,
    ProcessPayoutHandler, RecalculateInstitutionCommissionsHandler,
};
use super::handlers::cron::CronRunner;
use super::handlers::live_class::{
    CancelLiveClassHandler, CompleteLiveClassHandler, CreateLiveClassHandler,
    HandleInstructorUnavailabilityHandler, JoinLiveClassHandler, StartLiveClassHandler,
    ValidateJoinHandler, ValidateLiveClassCreationHandler,
};
use super::handlers::platform_course::{
    CancelEnrollmentHandler, CheckCourseAccessHandler, EnrollInCourseHandler,
};
use super::handlers::quota::{QuotaTracker, ResetMonthlyQuotasHandler};
use super::handlers::subscription::{
    CancelSubscriptionHandler, DowngradeSubscriptionHandler, GetGracePeriodHandler,
    HandleTrialExpirationHandler, ProcessExpiredTrialsHandler, ReactivateSubscriptionHandler,
    TrialFallbackPolicy, UpgradeSubscriptionHandler,
};

/// The outbound ports a deployment provides.
#[derive(Clone)]
pub struct Ports {
    pub catalog: Arc<dyn TierCatalog>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub log: Arc<dyn SubscriptionLogWriter>,
    pub directory: Arc<dyn Directory>,
    pub payments: Arc<dyn PaymentReader>,
    pub commissions: Arc<dyn CommissionRepository>,
    pub courses: Arc<dyn CourseRepository>,
    pub enrollments: Arc<dyn EnrollmentRepository>,
    pub live_classes: Arc<dyn LiveClassRepository>,
    pub notifier: Arc<dyn Notifier>,
}

/// All governance handlers, shared by the HTTP API and the cron binary.
#[derive(Clone)]
pub struct GovernanceServices {
    // Quota
    pub quota: Arc<QuotaTracker>,
    pub reset_monthly_quotas: Arc<ResetMonthlyQuotasHandler>,

    // Subscription lifecycle
    pub upgrade_subscription: Arc<UpgradeSubscriptionHandler>,
    pub downgrade_subscription: Arc<DowngradeSubscriptionHandler>,
    pub cancel_subscription: Arc<CancelSubscriptionHandler>,
    pub reactivate_subscription: Arc<ReactivateSubscriptionHandler>,
    pub trial_expiration: Arc<HandleTrialExpirationHandler>,
    pub expired_trials: Arc<ProcessExpiredTrialsHandler>,
    pub grace_period: Arc<GetGracePeriodHandler>,

    // Commissions
    pub calculate_commission: Arc<CalculateCommissionHandler>,
    pub pending_commissions: Arc<CalculatePendingCommissionsHandler>,
    pub recalculate_commissions: Arc<RecalculateInstitutionCommissionsHandler>,
    pub process_payout: Arc<ProcessPayoutHandler>,
    pub commission_rate: Arc<GetCommissionRateHandler>,
    pub commission_summary: Arc<GetCommissionSummaryHandler>,
    pub subscription_status: Arc<GetSubscriptionStatusHandler>,

    // Live classes
    pub validate_live_class: Arc<ValidateLiveClassCreationHandler>,
    pub create_live_class: Arc<CreateLiveClassHandler>,
    pub start_live_class: Arc<StartLiveClassHandler>,
    pub complete_live_class: Arc<CompleteLiveClassHandler>,
    pub cancel_live_class: Arc<CancelLiveClassHandler>,
    pub validate_join: Arc<ValidateJoinHandler>,
    pub join_live_class: Arc<JoinLiveClassHandler>,
    pub instructor_unavailability: Arc<HandleInstructorUnavailabilityHandler>,

    // Platform courses
    pub course_access: Arc<CheckCourseAccessHandler>,
    pub enroll: Arc<EnrollInCourseHandler>,
    pub cancel_enrollment: Arc<CancelEnrollmentHandler>,

    // Analytics
    pub usage_dashboard: Arc<UsageDashboardHandler>,
    pub usage_alerts: Arc<UsageAlertsHandler>,
    pub commission_report: Arc<CommissionReportHandler>,

    pub cron: Arc<CronRunner>,
}

impl GovernanceServices {
    pub fn new(ports: Ports, config: &GovernanceConfig) -> Self {
        let threshold = config.usage_alert_threshold();

        let quota = Arc::new(QuotaTracker::new(
            ports.subscriptions.clone(),
            ports.enrollments.clone(),
            ports.notifier.clone(),
            threshold,
        ));
        let reset_monthly_quotas = Arc::new(ResetMonthlyQuotasHandler::new(ports.subscriptions.clone()));

        let trial_expiration = Arc::new(HandleTrialExpirationHandler::new(
            ports.subscriptions.clone(),
            ports.catalog.clone(),
            TrialFallbackPolicy::from_config(config),
        ));
        let expired_trials = Arc::new(ProcessExpiredTrialsHandler::new(
            ports.subscriptions.clone(),
            trial_expiration.clone(),
        ));

        let rates = Arc::new(CommissionRateResolver::new(
            ports.subscriptions.clone(),
            ports.catalog.clone(),
            ports.directory.clone(),
            config.default_commission_rate(),
        ));
        let calculate_commission = Arc::new(CalculateCommissionHandler::new(
            ports.payments.clone(),
            ports.enrollments.clone(),
            ports.courses.clone(),
            ports.commissions.clone(),
            rates.clone(),
        ));
        let pending_commissions = Arc::new(CalculatePendingCommissionsHandler::new(
            ports.payments.clone(),
            calculate_commission.clone(),
        ));

        let validate_live_class = Arc::new(ValidateLiveClassCreationHandler::new(
            ports.directory.clone(),
            ports.courses.clone(),
            ports.live_classes.clone(),
            ports.subscriptions.clone(),
            config.live_class_policy(),
            config.default_max_live_classes,
        ));
        let validate_join = Arc::new(ValidateJoinHandler::new(ports.live_classes.clone(), quota.clone()));

        let commission_report = Arc::new(CommissionReportHandler::new(
            ports.commissions.clone(),
            ports.directory.clone(),
        ));

        let cron = Arc::new(CronRunner::new(
            pending_commissions.clone(),
            commission_report.clone(),
            expired_trials.clone(),
            reset_monthly_quotas.clone(),
            config.quota_reset_day_of_month,
        ));

        Self {
            upgrade_subscription: Arc::new(UpgradeSubscriptionHandler::new(
                ports.subscriptions.clone(),
                ports.catalog.clone(),
                ports.log.clone(),
            )),
            downgrade_subscription: Arc::new(DowngradeSubscriptionHandler::new(
                ports.subscriptions.clone(),
                ports.enrollments.clone(),
                ports.catalog.clone(),
                ports.log.clone(),
            )),
            cancel_subscription: Arc::new(CancelSubscriptionHandler::new(
                ports.subscriptions.clone(),
                config.cancelled_commission_rate(),
            )),
            reactivate_subscription: Arc::new(ReactivateSubscriptionHandler::new(
                ports.subscriptions.clone(),
                ports.catalog.clone(),
                config.default_commission_rate(),
            )),
            grace_period: Arc::new(GetGracePeriodHandler::new(ports.subscriptions.clone())),
            recalculate_commissions: Arc::new(RecalculateInstitutionCommissionsHandler::new(
                ports.commissions.clone(),
                rates.clone(),
            )),
            process_payout: Arc::new(ProcessPayoutHandler::new(
                ports.commissions.clone(),
                ports.directory.clone(),
            )),
            commission_rate: Arc::new(GetCommissionRateHandler::new(rates.clone())),
            commission_summary: Arc::new(GetCommissionSummaryHandler::new(
                ports.commissions.clone(),
                rates.clone(),
            )),
            subscription_status: Arc::new(GetSubscriptionStatusHandler::new(
                ports.subscriptions.clone(),
                rates,
            )),
            create_live_class: Arc::new(CreateLiveClassHandler::new(
                validate_live_class.clone(),
                ports.live_classes.clone(),
            )),
            start_live_class: Arc::new(StartLiveClassHandler::new(ports.live_classes.clone())),
            complete_live_class: Arc::new(CompleteLiveClassHandler::new(ports.live_classes.clone())),
            cancel_live_class: Arc::new(CancelLiveClassHandler::new(
                ports.live_classes.clone(),
                ports.notifier.clone(),
            )),
            join_live_class: Arc::new(JoinLiveClassHandler::new(
                validate_join.clone(),
                ports.live_classes.clone(),
                ports.subscriptions.clone(),
                quota.clone(),
            )),
            instructor_unavailability: Arc::new(HandleInstructorUnavailabilityHandler::new(
                ports.live_classes.clone(),
                ports.notifier.clone(),
            )),
            course_access: Arc::new(CheckCourseAccessHandler::new(
                ports.courses.clone(),
                ports.enrollments.clone(),
                ports.subscriptions.clone(),
                ports.directory.clone(),
            )),
            enroll: Arc::new(EnrollInCourseHandler::new(
                ports.courses.clone(),
                ports.enrollments.clone(),
                ports.subscriptions.clone(),
                ports.directory.clone(),
                quota.clone(),
            )),
            cancel_enrollment: Arc::new(CancelEnrollmentHandler::new(
                ports.courses.clone(),
                ports.enrollments.clone(),
                quota.clone(),
            )),
            usage_dashboard: Arc::new(UsageDashboardHandler::new(ports.subscriptions.clone(), threshold)),
            usage_alerts: Arc::new(UsageAlertsHandler::new(ports.subscriptions.clone(), threshold)),
            quota,
            reset_monthly_quotas,
            trial_expiration,
            expired_trials,
            calculate_commission,
            pending_commissions,
            validate_live_class,
            validate_join,
            commission_report,
            cron,
        }
    }
}
