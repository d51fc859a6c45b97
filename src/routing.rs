//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::{Html, Redirect},
    routing::{delete, get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{auth_guard, auth_guard_hx, get_log_in_page, get_log_out, post_log_in},
    dashboard::get_dashboard_page,
    deposits::{
        delete_customer_deposits, delete_deposit, get_customer_deposits,
        get_delete_customer_deposits_confirm, get_delete_deposit_confirm, get_deposit_form,
        get_deposit_rows, get_deposits_page, post_deposit, post_deposit_edit,
        post_deposit_review,
    },
    endpoints,
    internal_server_error::get_internal_server_error_page,
    loans::{get_loan_profile, get_loan_rows, get_loans_page},
    not_found::get_404_not_found,
    savings::{
        get_payment_form, get_savings_history, get_savings_page, get_savings_rows, post_payment,
        post_payment_edit, post_payment_review,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::SAVINGS_VIEW, get(get_savings_page))
        .route(endpoints::DEPOSITS_VIEW, get(get_deposits_page))
        .route(endpoints::LOANS_VIEW, get(get_loans_page))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // Fragments requested by HTMX need the HX-REDIRECT header for auth redirects to work properly.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(endpoints::MODAL_CLOSE, get(close_modal))
            .route(endpoints::SAVINGS_ROWS, get(get_savings_rows))
            .route(endpoints::PAYMENT_FORM, get(get_payment_form))
            .route(endpoints::PAYMENT_REVIEW, post(post_payment_review))
            .route(endpoints::PAYMENT_EDIT, post(post_payment_edit))
            .route(endpoints::PAYMENTS, post(post_payment))
            .route(endpoints::SAVINGS_HISTORY, get(get_savings_history))
            .route(endpoints::DEPOSIT_ROWS, get(get_deposit_rows))
            .route(endpoints::DEPOSIT_FORM, get(get_deposit_form))
            .route(endpoints::DEPOSIT_REVIEW, post(post_deposit_review))
            .route(endpoints::DEPOSIT_EDIT, post(post_deposit_edit))
            .route(endpoints::DEPOSITS_API, post(post_deposit))
            .route(endpoints::DEPOSIT, delete(delete_deposit))
            .route(
                endpoints::DEPOSIT_DELETE_CONFIRM,
                get(get_delete_deposit_confirm),
            )
            .route(
                endpoints::CUSTOMER_DEPOSITS,
                get(get_customer_deposits).delete(delete_customer_deposits),
            )
            .route(
                endpoints::CUSTOMER_DEPOSITS_DELETE_CONFIRM,
                get(get_delete_customer_deposits_confirm),
            )
            .route(endpoints::LOAN_ROWS, get(get_loan_rows))
            .route(endpoints::LOAN_PROFILE, get(get_loan_profile))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the savings page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::SAVINGS_VIEW)
}

/// Empties the modal container, closing whichever modal is open.
async fn close_modal() -> Html<&'static str> {
    Html("")
}

#[cfg(test)]
mod root_route_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{endpoints, routing::get_index_page};

    #[tokio::test]
    async fn root_redirects_to_savings() {
        let response = get_index_page().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers().get("location").unwrap();
        assert_eq!(location, endpoints::SAVINGS_VIEW);
    }
}
