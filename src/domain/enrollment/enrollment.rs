//! Enrollment entity and course-access resolution result.

use serde::{Deserialize, Serialize};

use crate::domain::catalog::PlanType;
use crate::domain::foundation::{
    CourseId, EnrollmentId, InstitutionId, SubscriptionId, Timestamp, UserId, ValidationError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrollmentStatus {
    Active,
    Completed,
    Cancelled,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Active => "ACTIVE",
            EnrollmentStatus::Completed => "COMPLETED",
            EnrollmentStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(EnrollmentStatus::Active),
            "COMPLETED" => Ok(EnrollmentStatus::Completed),
            "CANCELLED" => Ok(EnrollmentStatus::Cancelled),
            _ => Err(ValidationError::invalid_format(
                "enrollment_status",
                format!("unknown status '{}'", s),
            )),
        }
    }
}

/// How a student obtained access to a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessMethod {
    Direct,
    Subscription,
    Institution,
    None,
}

impl AccessMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMethod::Direct => "DIRECT",
            AccessMethod::Subscription => "SUBSCRIPTION",
            AccessMethod::Institution => "INSTITUTION",
            AccessMethod::None => "NONE",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.to_ascii_uppercase().as_str() {
            "DIRECT" => Ok(AccessMethod::Direct),
            "SUBSCRIPTION" => Ok(AccessMethod::Subscription),
            "INSTITUTION" => Ok(AccessMethod::Institution),
            "NONE" => Ok(AccessMethod::None),
            _ => Err(ValidationError::invalid_format(
                "access_method",
                format!("unknown access method '{}'", s),
            )),
        }
    }
}

/// A student's enrollment in a course.
///
/// At most one Active enrollment exists per (student, course).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub user_id: UserId,
    pub course_id: CourseId,
    pub status: EnrollmentStatus,
    pub access_method: AccessMethod,
    /// Set when the enrollment consumed subscription quota.
    pub subscription_id: Option<SubscriptionId>,
    pub subscription_tier: Option<PlanType>,
    pub enrolled_at: Timestamp,
    pub ended_at: Option<Timestamp>,
}

impl Enrollment {
    /// Enrollment on the basic path.
    pub fn direct(user_id: UserId, course_id: CourseId, now: Timestamp) -> Self {
        Self {
            id: EnrollmentId::new(),
            user_id,
            course_id,
            status: EnrollmentStatus::Active,
            access_method: AccessMethod::Direct,
            subscription_id: None,
            subscription_tier: None,
            enrolled_at: now,
            ended_at: None,
        }
    }

    /// Enrollment that consumed quota on `subscription_id`.
    pub fn via_subscription(
        user_id: UserId,
        course_id: CourseId,
        subscription_id: SubscriptionId,
        plan: PlanType,
        now: Timestamp,
    ) -> Self {
        Self {
            access_method: AccessMethod::Subscription,
            subscription_id: Some(subscription_id),
            subscription_tier: Some(plan),
            ..Self::direct(user_id, course_id, now)
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == EnrollmentStatus::Active
    }

    pub fn consumed_quota(&self) -> bool {
        self.access_method == AccessMethod::Subscription && self.subscription_id.is_some()
    }

    pub fn cancel(&mut self, now: Timestamp) {
        self.status = EnrollmentStatus::Cancelled;
        self.ended_at = Some(now);
    }
}

/// Resolved access of a user to a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseAccess {
    pub has_access: bool,
    pub access_method: AccessMethod,
    pub enrollment_id: Option<EnrollmentId>,
    pub subscription_id: Option<SubscriptionId>,
    /// Institution through which the user is a member, reported only.
    pub institution_id: Option<InstitutionId>,
    pub reason: String,
}

impl CourseAccess {
    pub fn enrolled(enrollment: &Enrollment) -> Self {
        Self {
            has_access: true,
            access_method: enrollment.access_method,
            enrollment_id: Some(enrollment.id),
            subscription_id: enrollment.subscription_id,
            institution_id: None,
            reason: "Active enrollment".to_string(),
        }
    }

    pub fn subscribed(subscription_id: SubscriptionId, plan: PlanType) -> Self {
        Self {
            has_access: true,
            access_method: AccessMethod::Subscription,
            enrollment_id: None,
            subscription_id: Some(subscription_id),
            institution_id: None,
            reason: format!("Active {} subscription", plan),
        }
    }

    /// Membership is reported but does not itself grant access.
    pub fn institution_member(institution_id: InstitutionId) -> Self {
        Self {
            has_access: false,
            access_method: AccessMethod::Institution,
            enrollment_id: None,
            subscription_id: None,
            institution_id: Some(institution_id),
            reason: "Institution member; enrollment required".to_string(),
        }
    }

    pub fn none() -> Self {
        Self {
            has_access: false,
            access_method: AccessMethod::None,
            enrollment_id: None,
            subscription_id: None,
            institution_id: None,
            reason: "No enrollment or qualifying subscription".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::StudentPlan;

    #[test]
    fn subscription_enrollment_consumes_quota() {
        let e = Enrollment::via_subscription(
            UserId::new(),
            CourseId::new(),
            SubscriptionId::new(),
            PlanType::Student(StudentPlan::Basic),
            Timestamp::now(),
        );
        assert!(e.consumed_quota());
        assert!(e.is_active());
        assert!(!Enrollment::direct(UserId::new(), CourseId::new(), Timestamp::now()).consumed_quota());
    }

    #[test]
    fn cancel_stamps_end_date() {
        let now = Timestamp::now();
        let mut e = Enrollment::direct(UserId::new(), CourseId::new(), now);
        e.cancel(now);
        assert_eq!(e.status, EnrollmentStatus::Cancelled);
        assert_eq!(e.ended_at, Some(now));
        assert!(!e.is_active());
    }

    #[test]
    fn institution_membership_does_not_grant_access() {
        let access = CourseAccess::institution_member(InstitutionId::new());
        assert!(!access.has_access);
        assert_eq!(access.access_method, AccessMethod::Institution);
    }
}
