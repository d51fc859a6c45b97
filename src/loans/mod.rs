//! The sanctioned loans page and the loan profile.

mod loans_page;
mod profile_modal;

pub use loans_page::{LoanQuery, LoansState, get_loan_rows, get_loans_page};
pub use profile_modal::get_loan_profile;
