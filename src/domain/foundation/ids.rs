//! Strongly-typed identifier value objects.
//!
//! Every persisted entity is keyed by a UUID wrapped in its own newtype so
//! that a `CourseId` can never be passed where an `InstitutionId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Declares a UUID-backed identifier newtype with the standard impls.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

uuid_id!(
    /// Platform user (student, instructor or staff member).
    UserId
);
uuid_id!(
    /// Institution (school, academy) selling courses on the marketplace.
    InstitutionId
);
uuid_id!(
    /// Course offered by an institution or by the platform itself.
    CourseId
);
uuid_id!(
    /// Tier catalog entry.
    TierId
);
uuid_id!(
    /// Subscription row (student or institution).
    SubscriptionId
);
uuid_id!(
    /// Payment captured by the payment provider.
    PaymentId
);
uuid_id!(
    /// Commission ledger entry.
    CommissionId
);
uuid_id!(
    /// Payout transfer to an institution.
    PayoutId
);
uuid_id!(
    /// Course enrollment.
    EnrollmentId
);
uuid_id!(
    /// Scheduled live class (video session).
    LiveClassId
);
uuid_id!(
    /// Subscription audit log or billing history row.
    LogEntryId
);
