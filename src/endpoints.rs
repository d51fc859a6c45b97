//! The API endpoints URIs.
//!
//! For endpoints that take parameters, e.g., '/api/deposits/{kind}/rows', use [format_endpoint].

/// The root route which redirects to the savings page or log in page.
pub const ROOT: &str = "/";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The page with branch totals, trend charts and the newest customers.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page listing savings accounts.
pub const SAVINGS_VIEW: &str = "/savings";
/// The page listing customers with their fixed or recurring deposits.
pub const DEPOSITS_VIEW: &str = "/deposits/{kind}";
/// The page listing sanctioned loans.
pub const LOANS_VIEW: &str = "/loans";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for logging in a staff member.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current staff member.
pub const LOG_OUT: &str = "/api/log_out";
/// The route that closes whichever modal is open.
pub const MODAL_CLOSE: &str = "/api/modal/close";
/// The filtered rows of the savings accounts table.
pub const SAVINGS_ROWS: &str = "/api/savings/rows";
/// The form for a deposit into or withdrawal from a savings account.
pub const PAYMENT_FORM: &str = "/api/savings/{account_number}/payments/{direction}/form";
/// Validates a payment form and asks for confirmation.
pub const PAYMENT_REVIEW: &str = "/api/savings/{account_number}/payments/{direction}/review";
/// Goes back from the payment confirmation to the payment form.
pub const PAYMENT_EDIT: &str = "/api/savings/{account_number}/payments/{direction}/edit";
/// Records a confirmed payment.
pub const PAYMENTS: &str = "/api/savings/{account_number}/payments/{direction}";
/// The transaction history of a savings account.
pub const SAVINGS_HISTORY: &str = "/api/savings/{account_number}/history";
/// The filtered rows of the customer table on a deposits page.
pub const DEPOSIT_ROWS: &str = "/api/deposits/{kind}/rows";
/// The form for opening or changing a deposit.
pub const DEPOSIT_FORM: &str = "/api/deposits/{kind}/form";
/// Validates a deposit form and asks for confirmation.
pub const DEPOSIT_REVIEW: &str = "/api/deposits/{kind}/review";
/// Goes back from the deposit confirmation to the deposit form.
pub const DEPOSIT_EDIT: &str = "/api/deposits/{kind}/edit";
/// Opens or changes a confirmed deposit.
pub const DEPOSITS_API: &str = "/api/deposits/{kind}";
/// A single deposit account.
pub const DEPOSIT: &str = "/api/deposits/{kind}/accounts/{account_number}";
/// Asks for confirmation before closing a single deposit account.
pub const DEPOSIT_DELETE_CONFIRM: &str = "/api/deposits/{kind}/accounts/{account_number}/delete";
/// Every deposit account of a customer.
pub const CUSTOMER_DEPOSITS: &str = "/api/deposits/{kind}/customers/{customer_id}";
/// Asks for confirmation before closing every deposit account of a customer.
pub const CUSTOMER_DEPOSITS_DELETE_CONFIRM: &str =
    "/api/deposits/{kind}/customers/{customer_id}/delete";
/// The filtered rows of the loans table.
pub const LOAN_ROWS: &str = "/api/loans/rows";
/// The profile of a single loan.
pub const LOAN_PROFILE: &str = "/api/loans/{loan_id}";

/// Replace the parameters in `endpoint_path` with `params`, in order.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// Parameters without a matching value are left as they are, and extra
/// values are ignored.
pub fn format_endpoint(endpoint_path: &str, params: &[&str]) -> String {
    let mut formatted = String::with_capacity(endpoint_path.len());
    let mut rest = endpoint_path;
    let mut params = params.iter();

    while let Some(param_start) = rest.find('{') {
        let Some(param_length) = rest[param_start..].find('}') else {
            break;
        };
        let Some(param) = params.next() else {
            break;
        };

        formatted.push_str(&rest[..param_start]);
        formatted.push_str(param);
        rest = &rest[param_start + param_length + 1..];
    }

    formatted.push_str(rest);

    formatted
}
