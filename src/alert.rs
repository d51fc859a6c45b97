//! Alert system for displaying success and error messages to users.
//!
//! Alerts are swapped out-of-band into the `#alert-container` element that
//! every page has, so an alert can be returned alongside any other fragment.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

/// A transient notification shown at the bottom of the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    /// An operation succeeded, with an explanation.
    Success {
        /// The headline.
        message: String,
        /// The explanation below the headline.
        details: String,
    },
    /// An operation succeeded.
    SuccessSimple {
        /// The headline.
        message: String,
    },
    /// An operation failed, with an explanation or a fix.
    Error {
        /// The headline.
        message: String,
        /// The explanation below the headline.
        details: String,
    },
    /// An operation failed.
    ErrorSimple {
        /// The headline.
        message: String,
    },
}

const SUCCESS_STYLE: &str = "flex items-start gap-3 p-4 mb-4 text-sm text-green-800 \
    rounded-lg bg-green-50 border border-green-300 dark:bg-gray-800 \
    dark:text-green-400 dark:border-green-800 shadow";

const ERROR_STYLE: &str = "flex items-start gap-3 p-4 mb-4 text-sm text-red-800 \
    rounded-lg bg-red-50 border border-red-300 dark:bg-gray-800 \
    dark:text-red-400 dark:border-red-800 shadow";

impl Alert {
    /// Render the alert as an out-of-band swap for `#alert-container`.
    pub fn into_html(self) -> Markup {
        let (style, message, details) = match self {
            Alert::Success { message, details } => (SUCCESS_STYLE, message, Some(details)),
            Alert::SuccessSimple { message } => (SUCCESS_STYLE, message, None),
            Alert::Error { message, details } => (ERROR_STYLE, message, Some(details)),
            Alert::ErrorSimple { message } => (ERROR_STYLE, message, None),
        };

        html! {
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div class=(style) role="alert"
                {
                    div class="flex-1"
                    {
                        p class="font-semibold" { (message) }

                        @if let Some(details) = details.filter(|details| !details.is_empty())
                        {
                            p class="mt-1" { (details) }
                        }
                    }

                    button
                        type="button"
                        aria-label="Dismiss"
                        class="font-bold leading-none"
                        onclick="this.closest('#alert-container').classList.add('hidden')"
                    {
                        "×"
                    }
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}
