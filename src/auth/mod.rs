//! Staff sessions: log-in against the banking backend, the session cookie
//! and the middleware that guards every other page.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod redirect;
mod session;

pub(crate) use cookie::{invalidate_session_cookie, set_session_cookie};
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{auth_guard, auth_guard_hx};
pub use redirect::{build_log_in_redirect_url, normalize_redirect_url};
pub use session::{BranchScope, SESSION_DURATION, Session, is_valid};

#[cfg(test)]
pub(crate) use cookie::COOKIE_SESSION;

#[cfg(test)]
pub use middleware::AuthState;
