//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    alert::Alert, backend::BackendError, internal_server_error::InternalServerError,
    not_found::NotFoundError, search::SearchField,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A call to the REST backend failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The session cookie is missing from the cookie jar in the request.
    #[error("no session cookie in the cookie jar :(")]
    CookieMissing,

    /// The session cookie could not be read, e.g. because it was tampered with.
    #[error("the session cookie is invalid: {0}")]
    InvalidSession(String),

    /// The session has passed its expiry time.
    #[error("the session has expired")]
    SessionExpired,

    /// The session could not be written to a cookie.
    #[error("could not serialize the session: {0}")]
    SessionSerializationError(String),

    /// A search field name that does not exist was requested.
    #[error("\"{0}\" is not a search field")]
    UnknownSearchField(String),

    /// A search field was requested for records that do not have it.
    #[error("these records cannot be searched by {0}")]
    UnsupportedSearchField(SearchField),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., account number) are correct.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the lock on a cached list.
    #[error("could not acquire the cache lock")]
    CacheLockError,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::Backend(error) => {
                tracing::error!("Could not load page data from the backend: {error}");
                InternalServerError {
                    description: "The banking service is unavailable",
                    fix: "Try again in a few minutes. If the problem persists, contact the backend team.",
                }
                .into_response()
            }
            Error::CacheLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            Error::Backend(BackendError::Timeout) => (
                StatusCode::GATEWAY_TIMEOUT,
                Alert::Error {
                    message: "The banking service did not respond".to_owned(),
                    details: "The request took too long. Check whether it went through \
                        before trying again."
                        .to_owned(),
                },
            ),
            Error::Backend(error) => {
                tracing::error!("Backend request failed: {error}");
                (
                    StatusCode::BAD_GATEWAY,
                    Alert::Error {
                        message: "Could not reach the banking service".to_owned(),
                        details: error.to_string(),
                    },
                )
            }
            Error::UnknownSearchField(field) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid search".to_owned(),
                    details: format!("\"{field}\" is not a field that can be searched."),
                },
            ),
            Error::UnsupportedSearchField(field) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid search".to_owned(),
                    details: format!("These records cannot be searched by {}.", field.label()),
                },
            ),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Not found".to_owned(),
                    details: "The record could not be found. \
                    Try refreshing the page to see if it has been deleted."
                        .to_owned(),
                },
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Something went wrong".to_owned(),
                    details:
                        "An unexpected error occurred, check the server logs for more details."
                            .to_owned(),
                },
            ),
        };

        (status_code, alert.into_html()).into_response()
    }
}
