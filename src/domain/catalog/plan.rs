//! Subscription plan types.
//!
//! Students and institutions subscribe to disjoint plan families. A
//! [`PlanType`] carries which family a plan belongs to so that a student
//! can never be moved onto an institution tier.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Student subscription plans, ordered by rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StudentPlan {
    /// Zero-cost plan, also the trial fallback.
    Free,
    Basic,
    Premium,
    Pro,
}

impl StudentPlan {
    pub const ALL: [StudentPlan; 4] = [
        StudentPlan::Free,
        StudentPlan::Basic,
        StudentPlan::Premium,
        StudentPlan::Pro,
    ];

    pub fn is_paid(&self) -> bool {
        !matches!(self, StudentPlan::Free)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StudentPlan::Free => "FREE",
            StudentPlan::Basic => "BASIC",
            StudentPlan::Premium => "PREMIUM",
            StudentPlan::Pro => "PRO",
        }
    }

    /// Numeric rank used to tell upgrades from downgrades.
    pub fn rank(&self) -> u8 {
        match self {
            StudentPlan::Free => 0,
            StudentPlan::Basic => 1,
            StudentPlan::Premium => 2,
            StudentPlan::Pro => 3,
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ValidationError::invalid_format("student_plan", format!("unknown plan '{}'", s)))
    }
}

/// Institution subscription plans, ordered by rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstitutionPlan {
    Starter,
    Professional,
    Enterprise,
}

impl InstitutionPlan {
    pub const ALL: [InstitutionPlan; 3] = [
        InstitutionPlan::Starter,
        InstitutionPlan::Professional,
        InstitutionPlan::Enterprise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InstitutionPlan::Starter => "STARTER",
            InstitutionPlan::Professional => "PROFESSIONAL",
            InstitutionPlan::Enterprise => "ENTERPRISE",
        }
    }

    pub fn rank(&self) -> u8 {
        match self {
            InstitutionPlan::Starter => 0,
            InstitutionPlan::Professional => 1,
            InstitutionPlan::Enterprise => 2,
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                ValidationError::invalid_format("institution_plan", format!("unknown plan '{}'", s))
            })
    }
}

/// A plan from either family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "family", content = "plan", rename_all = "snake_case")]
pub enum PlanType {
    Student(StudentPlan),
    Institution(InstitutionPlan),
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Student(p) => p.as_str(),
            PlanType::Institution(p) => p.as_str(),
        }
    }

    pub fn rank(&self) -> u8 {
        match self {
            PlanType::Student(p) => p.rank(),
            PlanType::Institution(p) => p.rank(),
        }
    }

    pub fn as_student(&self) -> Option<StudentPlan> {
        match self {
            PlanType::Student(p) => Some(*p),
            PlanType::Institution(_) => None,
        }
    }

    pub fn as_institution(&self) -> Option<InstitutionPlan> {
        match self {
            PlanType::Institution(p) => Some(*p),
            PlanType::Student(_) => None,
        }
    }

    /// True when both plans belong to the same family.
    pub fn same_family(&self, other: &PlanType) -> bool {
        matches!(
            (self, other),
            (PlanType::Student(_), PlanType::Student(_))
                | (PlanType::Institution(_), PlanType::Institution(_))
        )
    }
}

impl fmt::Display for StudentPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for InstitutionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
