//! Estimated maturity amounts shown before a deposit is submitted.
//!
//! These are previews only. The maturity amount stored with an account is
//! always the one computed by the backend.

use crate::{deposit_kind::DepositKind, validation::DepositTerms};

/// Estimate the amount payable at maturity for `terms`.
///
/// Fixed deposits use simple interest on the principal. Recurring deposits
/// use the flat-rate approximation `P * n * (1 + (r / 1200 * n) / 2)` where
/// `P` is the monthly amount and `n` the number of months.
pub fn estimate_maturity_amount(kind: DepositKind, terms: &DepositTerms) -> f64 {
    let principal = terms.amount;
    let rate = terms.interest_rate;
    let months = f64::from(terms.tenure_months);

    match kind {
        DepositKind::Fixed => principal + principal * rate * months / 1200.0,
        DepositKind::Recurring => principal * months * (1.0 + (rate / 100.0 / 12.0 * months) / 2.0),
    }
}
