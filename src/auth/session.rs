//! The signed-in staff member and when their session ends.

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::backend::{StaffRole, StaffUser};

/// How long a session lasts after log-in.
pub const SESSION_DURATION: Duration = Duration::hours(24);

mod datetime_format {
    //! Specifies how to serialize a [time::OffsetDateTime] in a custom format that
    //! avoids serialisations with datetimes containing midnight.
    //!
    //! The default serializer for [time::OffsetDateTime] will serialize
    //! "00:00:00.000000" as "0:00:00.0" and the deserializer would error out
    //! because it expects the hours to be two digits, not one.
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{
        OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
    };

    /// Date time format for the session expiry, e.g. "2021-01-01 00:00:00.000000 +00:00:00".
    const DATE_TIME_FORMAT: &[BorrowedFormatItem] = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour \
             sign:mandatory]:[offset_minute]:[offset_second]"
    );

    pub fn serialize<S>(dt: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = dt
            .format(DATE_TIME_FORMAT)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        OffsetDateTime::parse(&s, DATE_TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// A signed-in staff member, stored in the session cookie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Who is signed in.
    pub user: StaffUser,

    /// When the session stops being accepted.
    #[serde(with = "datetime_format")]
    pub expires_at: OffsetDateTime,
}

impl Session {
    /// A session for `user` lasting [SESSION_DURATION] from `now`.
    pub fn start(user: StaffUser, now: OffsetDateTime) -> Self {
        Self {
            user,
            expires_at: now + SESSION_DURATION,
        }
    }

    /// Which customers the staff member may see.
    pub fn branch_scope(&self) -> BranchScope {
        match (&self.user.role, &self.user.branch_name) {
            (StaffRole::SuperAdmin, _) => BranchScope::AllBranches,
            (_, Some(branch)) => BranchScope::Branch(branch.clone()),
            (_, None) => BranchScope::NoBranch,
        }
    }
}

/// Whether `session` is still accepted at `now`.
pub fn is_valid(session: &Session, now: OffsetDateTime) -> bool {
    now < session.expires_at
}

/// The branches whose customers a staff member may see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchScope {
    /// Every branch.
    AllBranches,
    /// One branch, matched exactly.
    Branch(String),
    /// The staff member has no branch and sees nothing.
    NoBranch,
}

impl BranchScope {
    /// Whether a customer of `branch` may be shown.
    pub fn admits(&self, branch: Option<&str>) -> bool {
        match self {
            BranchScope::AllBranches => true,
            BranchScope::Branch(own) => branch == Some(own.as_str()),
            BranchScope::NoBranch => false,
        }
    }
}

#[cfg(test)]
mod session_tests {
    use time::{Duration, UtcOffset, macros::datetime};

    use crate::backend::{StaffRole, StaffUser};

    use super::{BranchScope, Session, is_valid};

    fn staff(role: StaffRole, branch: Option<&str>) -> StaffUser {
        StaffUser {
            name: "Priya".to_owned(),
            branch_name: branch.map(str::to_owned),
            role,
        }
    }

    #[test]
    fn session_expires_after_a_day() {
        let now = datetime!(2025-12-21 09:30:00).assume_offset(UtcOffset::UTC);
        let session = Session::start(staff(StaffRole::Admin, Some("Pune")), now);

        assert!(is_valid(&session, now));
        assert!(is_valid(&session, now + Duration::hours(23)));
        assert!(!is_valid(&session, now + Duration::hours(24)));
    }

    #[test]
    fn session_with_midnight_expiry_survives_serialisation() {
        let now = datetime!(2025-12-21 00:00:00).assume_offset(UtcOffset::UTC);
        let session = Session::start(staff(StaffRole::Staff, None), now);

        let json = serde_json::to_string(&session).unwrap();

        assert!(json.contains(r#""expires_at":"2025-12-22 00:00:00.0 +00:00:00""#));
        assert_eq!(serde_json::from_str::<Session>(&json).unwrap(), session);
    }

    #[test]
    fn branch_scope_follows_role_and_branch() {
        let now = datetime!(2025-12-21 09:30:00).assume_offset(UtcOffset::UTC);
        let scope = |role, branch| Session::start(staff(role, branch), now).branch_scope();

        assert_eq!(
            scope(StaffRole::SuperAdmin, None),
            BranchScope::AllBranches
        );
        assert_eq!(
            scope(StaffRole::Admin, Some("Pune")),
            BranchScope::Branch("Pune".to_owned())
        );
        assert_eq!(scope(StaffRole::Staff, None), BranchScope::NoBranch);
    }

    #[test]
    fn branch_match_is_exact() {
        let scope = BranchScope::Branch("Pune".to_owned());

        assert!(scope.admits(Some("Pune")));
        assert!(!scope.admits(Some("Pune East")));
        assert!(!scope.admits(None));
        assert!(BranchScope::AllBranches.admits(None));
        assert!(!BranchScope::NoBranch.admits(Some("Pune")));
    }
}
