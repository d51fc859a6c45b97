//! Filtering of a savings account's transaction history by date and payment mode.

use serde::{Deserialize, Deserializer};
use time::{
    Date, OffsetDateTime, UtcOffset, format_description::BorrowedFormatItem,
    macros::format_description,
};

use crate::{
    backend::SavingsTransaction,
    timestamp::parse_timestamp,
    timezone::{end_of_day, start_of_day},
};

const DATE_INPUT_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// The optional filters of the history view, as sent by its filter form.
///
/// Empty form fields are read as absent filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HistoryFilter {
    /// Only keep transactions on or after the start of this local day.
    #[serde(default, deserialize_with = "deserialize_date_input")]
    pub from: Option<Date>,
    /// Only keep transactions on or before the end of this local day.
    #[serde(default, deserialize_with = "deserialize_date_input")]
    pub to: Option<Date>,
    /// Only keep transactions with this payment mode, ignoring case.
    #[serde(default)]
    pub mode: Option<String>,
}

fn deserialize_date_input<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;

    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => Date::parse(raw, DATE_INPUT_FORMAT)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

impl HistoryFilter {
    /// The payment mode filter, if one was given.
    pub fn mode(&self) -> Option<&str> {
        self.mode
            .as_deref()
            .map(str::trim)
            .filter(|mode| !mode.is_empty())
    }

    /// Whether any filter is set.
    pub fn is_active(&self) -> bool {
        self.from.is_some() || self.to.is_some() || self.mode().is_some()
    }

    /// Return the transactions that pass every set filter, newest first.
    ///
    /// Timestamps are read with [parse_timestamp], so a transaction with an
    /// unreadable timestamp sorts last and fails any `from` bound. A range
    /// whose `from` is after its `to` keeps nothing. Transactions with equal
    /// timestamps keep their original relative order.
    pub fn apply(
        &self,
        transactions: &[SavingsTransaction],
        local_offset: UtcOffset,
    ) -> Vec<SavingsTransaction> {
        let from = self.from.map(|date| start_of_day(date, local_offset));
        let to = self.to.map(|date| end_of_day(date, local_offset));
        let mode = self.mode().map(str::to_lowercase);

        let mut kept: Vec<(OffsetDateTime, &SavingsTransaction)> = transactions
            .iter()
            .map(|transaction| {
                (
                    parse_timestamp(&transaction.created_at, local_offset),
                    transaction,
                )
            })
            .filter(|(timestamp, _)| {
                from.is_none_or(|from| *timestamp >= from) && to.is_none_or(|to| *timestamp <= to)
            })
            .filter(|(_, transaction)| {
                mode.as_deref()
                    .is_none_or(|mode| transaction.pay_mode.to_lowercase() == mode)
            })
            .collect();

        kept.sort_by(|(left, _), (right, _)| right.cmp(left));

        kept.into_iter()
            .map(|(_, transaction)| transaction.clone())
            .collect()
    }
}
