//! The fixed and recurring deposit pages: customers of the staff member's
//! branch, the accounts each holds, and opening, changing and closing
//! accounts.

mod accounts_modal;
mod customers_page;
mod delete;
mod form;

pub use accounts_modal::get_customer_deposits;
pub use customers_page::{DepositsState, get_deposit_rows, get_deposits_page};
pub use delete::{
    delete_customer_deposits, delete_deposit, get_delete_customer_deposits_confirm,
    get_delete_deposit_confirm,
};
pub use form::{get_deposit_form, post_deposit, post_deposit_edit, post_deposit_review};
