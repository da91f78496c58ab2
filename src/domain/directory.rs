//! Platform directory records read by the governance services.
//!
//! Users, institutions and payments are owned by other parts of the
//! platform; governance only reads them (and updates an institution's
//! stored commission rate).

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    CommissionRate, EnrollmentId, InstitutionId, Money, PaymentId, Timestamp, UserId,
    ValidationError,
};

/// Platform role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Student,
    Instructor,
    InstitutionStaff,
    Admin,
}

impl UserRole {
    /// Roles allowed to host live classes.
    pub fn can_host_live_classes(&self) -> bool {
        matches!(self, UserRole::Instructor | UserRole::InstitutionStaff)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "STUDENT",
            UserRole::Instructor => "INSTRUCTOR",
            UserRole::InstitutionStaff => "INSTITUTION_STAFF",
            UserRole::Admin => "ADMIN",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.to_ascii_uppercase().as_str() {
            "STUDENT" => Ok(UserRole::Student),
            "INSTRUCTOR" => Ok(UserRole::Instructor),
            "INSTITUTION_STAFF" => Ok(UserRole::InstitutionStaff),
            "ADMIN" => Ok(UserRole::Admin),
            _ => Err(ValidationError::invalid_format(
                "role",
                format!("unknown role '{}'", s),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    /// Institution the user belongs to, if any.
    pub institution_id: Option<InstitutionId>,
}

impl User {
    pub fn belongs_to(&self, institution: InstitutionId) -> bool {
        self.institution_id == Some(institution)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Institution {
    pub id: InstitutionId,
    pub name: String,
    /// Stored rate used by reporting when no tier rate can be derived.
    /// Unset until the institution's subscription first assigns one.
    pub commission_rate: Option<CommissionRate>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Completed => "COMPLETED",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Refunded => "REFUNDED",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(PaymentStatus::Pending),
            "COMPLETED" => Ok(PaymentStatus::Completed),
            "FAILED" => Ok(PaymentStatus::Failed),
            "REFUNDED" => Ok(PaymentStatus::Refunded),
            _ => Err(ValidationError::invalid_format(
                "payment_status",
                format!("unknown status '{}'", s),
            )),
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A student's payment for a course enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub user_id: UserId,
    pub enrollment_id: Option<EnrollmentId>,
    pub amount: Money,
    pub status: PaymentStatus,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

impl Payment {
    pub fn is_completed(&self) -> bool {
        self.status == PaymentStatus::Completed
    }
}
