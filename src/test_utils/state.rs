use std::sync::Arc;

use time::OffsetDateTime;

use crate::{
    AppState,
    auth::Session,
    backend::{FakeBackend, StaffRole, StaffUser},
};

const TEST_TIMEZONE: &str = "Asia/Kolkata";

/// App state talking to `backend`, with empty caches.
pub(crate) fn test_app_state(backend: Arc<FakeBackend>) -> AppState {
    AppState::new("foobar", TEST_TIMEZONE, backend)
}

/// A fresh session for a staff member with `role` at `branch`.
pub(crate) fn staff_session(role: StaffRole, branch: Option<&str>) -> Session {
    Session::start(
        StaffUser {
            name: "Priya".to_owned(),
            branch_name: branch.map(str::to_owned),
            role,
        },
        OffsetDateTime::now_utc(),
    )
}
