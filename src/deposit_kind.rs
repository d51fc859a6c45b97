//! The two kinds of term deposit and the rules that differ between them.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer};

use crate::Error;

/// A fixed-term savings instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepositKind {
    /// A lump sum deposited once for a fixed tenure.
    Fixed,
    /// A fixed amount deposited every month for the tenure.
    Recurring,
}

/// Inclusive bounds checked when a deposit form is submitted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepositLimits {
    /// The smallest amount that may be deposited.
    pub min_amount: f64,
    /// The lowest annual interest rate in percent.
    pub min_rate: f64,
    /// The highest annual interest rate in percent.
    pub max_rate: f64,
    /// The shortest tenure in months.
    pub min_tenure_months: u32,
    /// The longest tenure in months.
    pub max_tenure_months: u32,
}

impl DepositKind {
    /// Both kinds, in the order they appear in the navigation bar.
    pub const ALL: [DepositKind; 2] = [DepositKind::Fixed, DepositKind::Recurring];

    /// The value used for this kind in URLs.
    pub fn as_path_segment(self) -> &'static str {
        match self {
            DepositKind::Fixed => "fixed",
            DepositKind::Recurring => "recurring",
        }
    }

    /// The short name shown to staff, e.g. "FD".
    pub fn abbreviation(self) -> &'static str {
        match self {
            DepositKind::Fixed => "FD",
            DepositKind::Recurring => "RD",
        }
    }

    /// The full name shown in page titles.
    pub fn title(self) -> &'static str {
        match self {
            DepositKind::Fixed => "Fixed Deposits",
            DepositKind::Recurring => "Recurring Deposits",
        }
    }

    /// The name of a single account of this kind, e.g. "Fixed Deposit".
    pub fn name(self) -> &'static str {
        match self {
            DepositKind::Fixed => "Fixed Deposit",
            DepositKind::Recurring => "Recurring Deposit",
        }
    }

    /// The label of the amount field in forms.
    pub fn amount_label(self) -> &'static str {
        match self {
            DepositKind::Fixed => "Principal Amount",
            DepositKind::Recurring => "Monthly Deposit Amount",
        }
    }

    /// The JSON key the backend uses for the deposited amount.
    pub fn amount_field(self) -> &'static str {
        match self {
            DepositKind::Fixed => "principalAmount",
            DepositKind::Recurring => "depositAmount",
        }
    }

    /// The bounds a form submission must satisfy.
    pub fn limits(self) -> DepositLimits {
        match self {
            DepositKind::Fixed => DepositLimits {
                min_amount: 1000.0,
                min_rate: 1.0,
                max_rate: 15.0,
                min_tenure_months: 1,
                max_tenure_months: 120,
            },
            DepositKind::Recurring => DepositLimits {
                min_amount: 100.0,
                min_rate: 1.0,
                max_rate: 10.0,
                min_tenure_months: 6,
                max_tenure_months: 120,
            },
        }
    }
}

impl fmt::Display for DepositKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path_segment())
    }
}

impl FromStr for DepositKind {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "fixed" => Ok(DepositKind::Fixed),
            "recurring" => Ok(DepositKind::Recurring),
            _ => Err(Error::NotFound),
        }
    }
}

impl<'de> Deserialize<'de> for DepositKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse()
            .map_err(|_| serde::de::Error::custom(format!("unknown deposit kind \"{raw}\"")))
    }
}

#[cfg(test)]
mod deposit_kind_tests {
    use super::DepositKind;

    #[test]
    fn path_segments_parse_back() {
        for kind in DepositKind::ALL {
            assert_eq!(kind.as_path_segment().parse::<DepositKind>(), Ok(kind));
        }
    }

    #[test]
    fn rejects_unknown_kind() {
        assert!("savings".parse::<DepositKind>().is_err());
    }

    #[test]
    fn recurring_limits_are_looser_on_amount_and_tighter_on_tenure() {
        let fixed = DepositKind::Fixed.limits();
        let recurring = DepositKind::Recurring.limits();

        assert_eq!(fixed.min_amount, 1000.0);
        assert_eq!(recurring.min_amount, 100.0);
        assert_eq!(fixed.max_rate, 15.0);
        assert_eq!(recurring.max_rate, 10.0);
        assert_eq!(fixed.min_tenure_months, 1);
        assert_eq!(recurring.min_tenure_months, 6);
    }
}
