//! Ordering of customer rows on the deposit pages.

use std::cmp::Reverse;

use time::UtcOffset;

use crate::{account_check::CustomerHoldings, timestamp::parse_timestamp};

/// Sort `rows` so customers without an account come first, then by
/// registration time with the newest first.
///
/// The sort is stable: rows with the same account status and the same
/// registration time keep their relative order.
pub fn sort_by_account_priority(rows: &mut [CustomerHoldings], local_offset: UtcOffset) {
    rows.sort_by_cached_key(|row| {
        (
            row.has_account(),
            Reverse(parse_timestamp(&row.customer.created_at, local_offset)),
        )
    });
}

#[cfg(test)]
mod sort_by_account_priority_tests {
    use time::UtcOffset;

    use crate::{
        account_check::CustomerHoldings,
        backend::{Customer, DepositAccount},
    };

    use super::sort_by_account_priority;

    fn row(user_id: i64, created_at: &str, has_account: bool) -> CustomerHoldings {
        let accounts = if has_account {
            vec![DepositAccount {
                account_number: format!("FD{user_id}"),
                amount: 5000.0,
                interest_rate: 7.0,
                tenure_months: 12,
                maturity_amount: None,
                maturity_date: None,
                status: "ACTIVE".to_owned(),
                created_at: created_at.to_owned(),
            }]
        } else {
            Vec::new()
        };

        CustomerHoldings {
            customer: Customer {
                user_id,
                first_name: format!("Customer {user_id}"),
                middle_name: None,
                last_name: String::new(),
                mobile: None,
                email: None,
                address: None,
                branch: None,
                created_at: created_at.to_owned(),
            },
            accounts,
        }
    }

    fn ids(rows: &[CustomerHoldings]) -> Vec<i64> {
        rows.iter().map(|row| row.customer.user_id).collect()
    }

    #[test]
    fn customers_without_accounts_come_first_newest_first() {
        let mut rows = vec![
            row(1, "2024-01-01T10:00:00", true),
            row(2, "2024-01-02T10:00:00", false),
            row(3, "2024-01-03T10:00:00", true),
            row(4, "2024-01-01T10:00:00", false),
        ];

        sort_by_account_priority(&mut rows, UtcOffset::UTC);

        assert_eq!(ids(&rows), vec![2, 4, 3, 1]);
    }

    #[test]
    fn ties_keep_input_order() {
        let mut rows = vec![
            row(5, "2024-01-01 9:30 AM", false),
            row(3, "2024-01-01T09:30:00", false),
            row(9, "2024-01-01 9:30 AM", false),
            row(1, "2024-01-01 9:30 AM", true),
            row(2, "2024-01-01 9:30 AM", true),
        ];

        sort_by_account_priority(&mut rows, UtcOffset::UTC);

        assert_eq!(ids(&rows), vec![5, 3, 9, 1, 2]);
    }

    #[test]
    fn unreadable_timestamps_sort_last_within_their_group() {
        let mut rows = vec![
            row(1, "garbage", false),
            row(2, "2024-01-01T00:00:00", false),
        ];

        sort_by_account_priority(&mut rows, UtcOffset::UTC);

        assert_eq!(ids(&rows), vec![2, 1]);
    }
}
