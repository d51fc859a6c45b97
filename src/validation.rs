//! Submit-time validation of the deposit and payment forms.
//!
//! Forms are deserialized into drafts that keep the raw text the user typed,
//! so that a rejected submission can be shown again exactly as entered.

use serde::{Deserialize, Serialize};

use crate::{
    backend::{PaymentMode, PaymentRequest, TransactionType},
    deposit_kind::DepositKind,
};

/// Why a form submission was rejected. The messages are shown to staff as is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required field was left blank.
    #[error("Please fill in all required fields")]
    MissingFields,

    /// A numeric field could not be read as a number.
    #[error("Please enter valid numeric values")]
    NotNumeric,

    /// The deposited amount is below the minimum for the deposit kind.
    #[error("{label} must be at least ₹{minimum}")]
    AmountTooSmall {
        /// "Principal amount" or "Deposit amount".
        label: &'static str,
        /// The minimum in whole rupees.
        minimum: u32,
    },

    /// The interest rate is outside the allowed range for the deposit kind.
    #[error("Interest rate must be between {min}% and {max}%")]
    RateOutOfRange {
        /// The lowest allowed rate.
        min: u32,
        /// The highest allowed rate.
        max: u32,
    },

    /// The tenure is outside the allowed range for the deposit kind.
    #[error("Tenure must be between {min} and {max} months")]
    TenureOutOfRange {
        /// The shortest allowed tenure.
        min: u32,
        /// The longest allowed tenure.
        max: u32,
    },

    /// A payment amount was missing, not a number, or not positive.
    #[error("Please enter a valid amount")]
    InvalidAmount,

    /// A withdrawal is larger than the balance shown to the user.
    #[error("Withdrawal amount exceeds account balance")]
    ExceedsBalance,

    /// No payment mode was chosen.
    #[error("Please select a payment mode")]
    MissingPaymentMode,

    /// An IMPS payment is missing its UTR number.
    #[error("Please enter the UTR number")]
    MissingUtrNumber,

    /// A cheque payment is missing its cheque number.
    #[error("Please enter the cheque number")]
    MissingChequeNumber,
}

/// The raw contents of a deposit form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DepositDraft {
    /// The principal or monthly amount.
    #[serde(default)]
    pub amount: String,
    /// The annual interest rate in percent.
    #[serde(default)]
    pub interest_rate: String,
    /// The tenure in months.
    #[serde(default)]
    pub tenure_months: String,
}

/// Validated deposit terms, ready to send to the backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepositTerms {
    /// The principal or monthly amount in rupees.
    pub amount: f64,
    /// The annual interest rate in percent.
    pub interest_rate: f64,
    /// The tenure in months.
    pub tenure_months: u32,
}

impl From<DepositTerms> for DepositDraft {
    fn from(terms: DepositTerms) -> Self {
        Self {
            amount: terms.amount.to_string(),
            interest_rate: terms.interest_rate.to_string(),
            tenure_months: terms.tenure_months.to_string(),
        }
    }
}

fn parse_number(raw: &str) -> Result<f64, ValidationError> {
    raw.parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
        .ok_or(ValidationError::NotNumeric)
}

/// Check a deposit form against the limits for `kind`.
///
/// Blank fields are reported first, then values that are not numbers, then
/// the amount, rate and tenure ranges in that order.
pub fn validate_deposit(
    kind: DepositKind,
    draft: &DepositDraft,
) -> Result<DepositTerms, ValidationError> {
    let amount = draft.amount.trim();
    let interest_rate = draft.interest_rate.trim();
    let tenure_months = draft.tenure_months.trim();

    if amount.is_empty() || interest_rate.is_empty() || tenure_months.is_empty() {
        return Err(ValidationError::MissingFields);
    }

    let amount = parse_number(amount)?;
    let interest_rate = parse_number(interest_rate)?;
    let tenure_months: i64 = tenure_months
        .parse()
        .map_err(|_| ValidationError::NotNumeric)?;

    let limits = kind.limits();

    if amount < limits.min_amount {
        let label = match kind {
            DepositKind::Fixed => "Principal amount",
            DepositKind::Recurring => "Deposit amount",
        };

        return Err(ValidationError::AmountTooSmall {
            label,
            minimum: limits.min_amount as u32,
        });
    }

    if interest_rate < limits.min_rate || interest_rate > limits.max_rate {
        return Err(ValidationError::RateOutOfRange {
            min: limits.min_rate as u32,
            max: limits.max_rate as u32,
        });
    }

    let tenure_range = i64::from(limits.min_tenure_months)..=i64::from(limits.max_tenure_months);

    if !tenure_range.contains(&tenure_months) {
        return Err(ValidationError::TenureOutOfRange {
            min: limits.min_tenure_months,
            max: limits.max_tenure_months,
        });
    }

    Ok(DepositTerms {
        amount,
        interest_rate,
        tenure_months: u32::try_from(tenure_months).map_err(|_| ValidationError::NotNumeric)?,
    })
}

/// The raw contents of a credit or withdrawal form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentDraft {
    /// The amount in rupees.
    #[serde(default)]
    pub amount: String,
    /// One of the [PaymentMode] wire values.
    #[serde(default)]
    pub pay_mode: String,
    /// The UTR number for IMPS payments.
    #[serde(default)]
    pub utr_no: String,
    /// The cheque number for cheque payments.
    #[serde(default)]
    pub cheque_number: String,
    /// An optional note.
    #[serde(default)]
    pub note: String,
}

/// Check a payment form and build the request body for the backend.
///
/// Withdrawals are also checked against `balance`, the balance the staff
/// member was shown when they opened the form.
pub fn validate_payment(
    direction: TransactionType,
    draft: &PaymentDraft,
    balance: f64,
) -> Result<PaymentRequest, ValidationError> {
    let amount = draft
        .amount
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite() && *amount > 0.0)
        .ok_or(ValidationError::InvalidAmount)?;

    if direction == TransactionType::Debit && amount > balance {
        return Err(ValidationError::ExceedsBalance);
    }

    let pay_mode =
        PaymentMode::from_wire(draft.pay_mode.trim()).ok_or(ValidationError::MissingPaymentMode)?;

    let non_blank = |value: &str| {
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_owned())
    };

    let (utr_no, cash, cheque_number) = match pay_mode {
        PaymentMode::Cash => (None, Some(draft.amount.trim().to_owned()), None),
        PaymentMode::Imps => (
            Some(non_blank(&draft.utr_no).ok_or(ValidationError::MissingUtrNumber)?),
            None,
            None,
        ),
        PaymentMode::Cheque => (
            None,
            None,
            Some(non_blank(&draft.cheque_number).ok_or(ValidationError::MissingChequeNumber)?),
        ),
    };

    Ok(PaymentRequest {
        amount,
        pay_mode,
        utr_no,
        cash,
        cheque_number,
        note: non_blank(&draft.note),
        transaction_type: direction,
    })
}

#[cfg(test)]
mod validate_deposit_tests {
    use crate::deposit_kind::DepositKind;

    use super::{DepositDraft, DepositTerms, ValidationError, validate_deposit};

    fn draft(amount: &str, interest_rate: &str, tenure_months: &str) -> DepositDraft {
        DepositDraft {
            amount: amount.to_owned(),
            interest_rate: interest_rate.to_owned(),
            tenure_months: tenure_months.to_owned(),
        }
    }

    #[test]
    fn accepts_values_on_the_boundaries() {
        let got = validate_deposit(DepositKind::Fixed, &draft("1000", "15", "120"));

        assert_eq!(
            got,
            Ok(DepositTerms {
                amount: 1000.0,
                interest_rate: 15.0,
                tenure_months: 120
            })
        );

        let got = validate_deposit(DepositKind::Recurring, &draft("100", "1", "6"));

        assert_eq!(
            got,
            Ok(DepositTerms {
                amount: 100.0,
                interest_rate: 1.0,
                tenure_months: 6
            })
        );
    }

    #[test]
    fn blank_fields_are_reported_before_anything_else() {
        for kind in DepositKind::ALL {
            assert_eq!(
                validate_deposit(kind, &draft("abc", "  ", "12")),
                Err(ValidationError::MissingFields)
            );
        }
    }

    #[test]
    fn non_numeric_input_is_rejected_before_range_checks() {
        for input in [
            draft("ten", "7", "12"),
            draft("5000", "NaN", "12"),
            draft("5000", "7", "inf"),
            draft("5000", "7", "12.5"),
        ] {
            assert_eq!(
                validate_deposit(DepositKind::Fixed, &input),
                Err(ValidationError::NotNumeric),
                "{input:?}"
            );
        }
    }

    #[test]
    fn recurring_amount_below_minimum() {
        let got = validate_deposit(DepositKind::Recurring, &draft("50", "6", "12"));

        let error = got.unwrap_err();
        assert_eq!(error.to_string(), "Deposit amount must be at least ₹100");
    }

    #[test]
    fn fixed_amount_below_minimum() {
        let got = validate_deposit(DepositKind::Fixed, &draft("999.99", "6", "12"));

        let error = got.unwrap_err();
        assert_eq!(error.to_string(), "Principal amount must be at least ₹1000");
    }

    #[test]
    fn rate_limits_differ_by_kind() {
        assert_eq!(
            validate_deposit(DepositKind::Fixed, &draft("5000", "15.01", "12"))
                .unwrap_err()
                .to_string(),
            "Interest rate must be between 1% and 15%"
        );
        assert_eq!(
            validate_deposit(DepositKind::Recurring, &draft("500", "11", "12"))
                .unwrap_err()
                .to_string(),
            "Interest rate must be between 1% and 10%"
        );
        assert_eq!(
            validate_deposit(DepositKind::Fixed, &draft("5000", "0.5", "12")),
            Err(ValidationError::RateOutOfRange { min: 1, max: 15 })
        );
    }

    #[test]
    fn tenure_limits_differ_by_kind() {
        assert_eq!(
            validate_deposit(DepositKind::Recurring, &draft("500", "6", "5"))
                .unwrap_err()
                .to_string(),
            "Tenure must be between 6 and 120 months"
        );
        assert_eq!(
            validate_deposit(DepositKind::Fixed, &draft("5000", "6", "0")),
            Err(ValidationError::TenureOutOfRange { min: 1, max: 120 })
        );
        assert_eq!(
            validate_deposit(DepositKind::Fixed, &draft("5000", "6", "-3")),
            Err(ValidationError::TenureOutOfRange { min: 1, max: 120 })
        );
        assert_eq!(
            validate_deposit(DepositKind::Fixed, &draft("5000", "6", "121")),
            Err(ValidationError::TenureOutOfRange { min: 1, max: 120 })
        );
    }
}

#[cfg(test)]
mod validate_payment_tests {
    use crate::backend::{PaymentMode, PaymentRequest, TransactionType};

    use super::{PaymentDraft, ValidationError, validate_payment};

    fn cash(amount: &str) -> PaymentDraft {
        PaymentDraft {
            amount: amount.to_owned(),
            pay_mode: "CASH".to_owned(),
            ..Default::default()
        }
    }

    #[test]
    fn withdrawal_larger_than_balance_is_rejected() {
        let got = validate_payment(TransactionType::Debit, &cash("500"), 300.0);

        assert_eq!(got, Err(ValidationError::ExceedsBalance));
    }

    #[test]
    fn withdrawal_of_whole_balance_is_allowed() {
        let got = validate_payment(TransactionType::Debit, &cash("300"), 300.0);

        assert!(got.is_ok());
    }

    #[test]
    fn credit_is_not_limited_by_balance() {
        let got = validate_payment(TransactionType::Credit, &cash("500"), 0.0);

        assert!(got.is_ok());
    }

    #[test]
    fn amount_must_be_positive_number() {
        for amount in ["", "0", "-20", "abc", "NaN"] {
            assert_eq!(
                validate_payment(TransactionType::Credit, &cash(amount), 1000.0),
                Err(ValidationError::InvalidAmount),
                "{amount:?}"
            );
        }
    }

    #[test]
    fn cash_payment_fills_cash_and_leaves_references_empty() {
        let draft = PaymentDraft {
            note: "  ".to_owned(),
            ..cash("250.50")
        };

        let got = validate_payment(TransactionType::Credit, &draft, 0.0);

        assert_eq!(
            got,
            Ok(PaymentRequest {
                amount: 250.5,
                pay_mode: PaymentMode::Cash,
                utr_no: None,
                cash: Some("250.50".to_owned()),
                cheque_number: None,
                note: None,
                transaction_type: TransactionType::Credit,
            })
        );
    }

    #[test]
    fn imps_requires_utr_number() {
        let mut draft = PaymentDraft {
            amount: "100".to_owned(),
            pay_mode: "IMPS".to_owned(),
            ..Default::default()
        };

        assert_eq!(
            validate_payment(TransactionType::Credit, &draft, 0.0),
            Err(ValidationError::MissingUtrNumber)
        );

        draft.utr_no = "UTR9".to_owned();
        draft.cheque_number = "ignored".to_owned();
        let got = validate_payment(TransactionType::Credit, &draft, 0.0).unwrap();

        assert_eq!(got.utr_no.as_deref(), Some("UTR9"));
        assert_eq!(got.cheque_number, None);
        assert_eq!(got.cash, None);
    }

    #[test]
    fn cheque_requires_cheque_number() {
        let draft = PaymentDraft {
            amount: "100".to_owned(),
            pay_mode: "Cheque".to_owned(),
            ..Default::default()
        };

        assert_eq!(
            validate_payment(TransactionType::Credit, &draft, 0.0),
            Err(ValidationError::MissingChequeNumber)
        );
    }

    #[test]
    fn payment_mode_is_required() {
        let draft = PaymentDraft {
            amount: "100".to_owned(),
            ..Default::default()
        };

        assert_eq!(
            validate_payment(TransactionType::Credit, &draft, 0.0),
            Err(ValidationError::MissingPaymentMode)
        );
    }
}
