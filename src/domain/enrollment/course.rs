//! Course as seen by enrollment governance.

use serde::{Deserialize, Serialize};

use crate::domain::catalog::StudentPlan;
use crate::domain::foundation::{CourseId, InstitutionId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    /// Owning institution. Platform courses may have none.
    pub institution_id: Option<InstitutionId>,
    /// Offered platform-wide rather than by one institution only.
    pub is_platform_course: bool,
    /// Enrollment consumes subscription quota.
    pub requires_subscription: bool,
    /// Plan a subscriber must be on, when the course is plan-restricted.
    pub subscription_tier: Option<StudentPlan>,
    /// Seat cap for the basic (non-subscription) path.
    pub max_students: Option<u32>,
    pub current_enrollments: u32,
}

impl Course {
    /// Seats left on the basic path. `None` means uncapped.
    pub fn seats_remaining(&self) -> Option<u32> {
        self.max_students
            .map(|max| max.saturating_sub(self.current_enrollments))
    }

    pub fn is_full(&self) -> bool {
        self.seats_remaining() == Some(0)
    }

    /// Whether a subscriber on `plan` satisfies the course's plan restriction.
    pub fn accepts_plan(&self, plan: StudentPlan) -> bool {
        self.subscription_tier.map_or(true, |required| required == plan)
    }
}
