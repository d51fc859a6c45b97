//! The savings accounts page: searching accounts, recording deposits and
//! withdrawals, and browsing an account's transaction history.

mod accounts_page;
mod history_modal;
mod payment;

pub use accounts_page::{SavingsState, get_savings_page, get_savings_rows};
pub use history_modal::get_savings_history;
pub use payment::{
    PaymentDirection, get_payment_form, post_payment, post_payment_edit, post_payment_review,
};
