//! Branch Desk is a web dashboard for the staff of a co-operative bank branch.
//!
//! Staff log in against the bank's REST backend and then work with savings
//! accounts, fixed and recurring deposits and sanctioned loans. The backend
//! owns all data; this library is a REST API that directly serves HTML pages
//! and HTMX fragments on top of it.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod account_check;
mod alert;
mod app_state;
mod auth;
mod backend;
mod browser;
mod cache;
mod dashboard;
mod debounce;
mod deposit_kind;
mod deposits;
mod endpoints;
mod error;
mod history;
mod html;
mod internal_server_error;
mod loans;
mod logging;
mod maturity;
mod modal;
mod navigation;
mod not_found;
mod priority;
mod routing;
mod savings;
mod search;
mod sentinel;
mod timestamp;
mod timezone;
mod validation;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use backend::{
    ApiPaths, Backend, BackendError, DashboardPaths, DepositPaths, HttpBackend,
};
pub use error::Error;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use timezone::get_local_offset;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!("Failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
