//! The modal showing every detail of one sanctioned loan.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::UtcOffset;

use crate::{
    Error,
    backend::Loan,
    html::{format_currency, format_date, modal},
    timestamp::parse_timestamp,
    timezone::local_offset,
};

use super::loans_page::LoansState;

fn field(label: &str, value: &str) -> Markup {
    html! {
        div
        {
            dt class="text-xs text-gray-500 dark:text-gray-400" { (label) }
            dd class="font-medium break-words" { (value) }
        }
    }
}

fn or_dash(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

fn section(title: &str, fields: Markup) -> Markup {
    html! {
        section
        {
            h3 class="text-base font-medium mb-2 border-b pb-1 dark:border-gray-700" { (title) }
            dl class="grid grid-cols-2 gap-2 text-sm" { (fields) }
        }
    }
}

fn profile_modal(loan: &Loan, local_offset: UtcOffset) -> Markup {
    let date = |raw: &str| format_date(parse_timestamp(raw, local_offset), local_offset);

    let content = html! {
        (section("Loan Information", html! {
            (field("Application No", &loan.application_no))
            (field("Purpose of Loan", or_dash(&loan.purpose_of_loan)))
            (field("Loan Scheme", or_dash(&loan.loan_scheme)))
            (field("Loan Amount", &format_currency(loan.loan_amount)))
            (field("ROI", &format!("{}%", loan.roi)))
            (field("Applied Date", &date(&loan.applied_date)))
            (field("Tenure", &format!("{} months", loan.tenure)))
            (field("EMI Amount", &format_currency(loan.emi_amount)))
            (field("Processing Fee", &format_currency(loan.processing_fee)))
            (field("Disbursed Amount", &format_currency(loan.disbursed_amount)))
        }))

        (section("Member Information", html! {
            (field("Member Name", &loan.member_name))
            (field("Father's Name", or_dash(&loan.father_name)))
            (field("Mobile", or_dash(&loan.mobile)))
            (field("Date of Joining", &date(&loan.date_of_joining)))
            (field("Member Type", or_dash(&loan.member_type)))
            (field("Branch", &loan.branch_name))
            (field("Address", or_dash(&loan.address)))
            (field("PAN Number", or_dash(&loan.pan_number)))
            (field("Aadhaar Number", or_dash(&loan.adhaar_number)))
        }))

        (section("Guarantor", html! {
            (field("Guarantor Name", or_dash(&loan.grantor_name)))
            (field("Guarantor Mobile", or_dash(&loan.grantor_mobile)))
            (field("Guarantor Address", or_dash(&loan.grantor_address)))
        }))

        (section("Nominee", html! {
            (field("Nominee Name", or_dash(&loan.nominee_name)))
            (field("Nominee Mobile", or_dash(&loan.nominee_mobile)))
            (field("Nominee Address", or_dash(&loan.nominee_address)))
        }))
    };

    modal(&format!("Loan Details - {}", loan.application_no), &content)
}

/// Shows the details of a loan from the cached loan list.
pub async fn get_loan_profile(
    State(state): State<LoansState>,
    Path(loan_id): Path<i64>,
) -> Response {
    let result = async {
        let local_offset = local_offset(&state.local_timezone)?;
        let backend = state.backend.clone();
        let loan = state
            .loans
            .cache()
            .get_or_refresh(async move { backend.list_loans().await })
            .await?
            .into_iter()
            .find(|loan| loan.id == loan_id)
            .ok_or(Error::NotFound)?;

        Ok::<_, Error>(profile_modal(&loan, local_offset))
    }
    .await;

    match result {
        Ok(markup) => markup.into_response(),
        Err(error) => error.into_alert_response(),
    }
}

#[cfg(test)]
mod profile_modal_tests {
    use std::sync::Arc;

    use axum::{
        extract::{FromRef, Path, State},
        http::StatusCode,
    };
    use scraper::Selector;

    use crate::{
        backend::{FakeBackend, Loan},
        test_utils::{must_get_text, parse_html_fragment, test_app_state},
    };

    use super::{LoansState, get_loan_profile};

    fn get_test_state() -> LoansState {
        let backend = Arc::new(FakeBackend::default());
        backend.add_loan(Loan {
            id: 7,
            application_no: "LN-007".to_owned(),
            member_name: "Ravi Patil".to_owned(),
            father_name: Some("Suresh Patil".to_owned()),
            branch_name: "Pune".to_owned(),
            loan_scheme: None,
            tenure: 36,
            applied_date: "2024-02-10".to_owned(),
            ..Loan::default()
        });

        LoansState::from_ref(&test_app_state(backend))
    }

    fn value_of(html: &scraper::Html, label: &str) -> Option<String> {
        let labels = Selector::parse("dt").unwrap();

        html.select(&labels)
            .find(|dt| dt.text().collect::<String>() == label)
            .and_then(|dt| dt.next_siblings().find_map(scraper::ElementRef::wrap))
            .map(|dd| dd.text().collect::<String>())
    }

    #[tokio::test]
    async fn shows_loan_and_member_details() {
        let response = get_loan_profile(State(get_test_state()), Path(7)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_eq!(must_get_text(&html, "h2"), "Loan Details - LN-007");
        assert_eq!(value_of(&html, "Father's Name").as_deref(), Some("Suresh Patil"));
        assert_eq!(value_of(&html, "Loan Scheme").as_deref(), Some("-"));
        assert_eq!(value_of(&html, "Guarantor Name").as_deref(), Some("-"));
        assert_eq!(value_of(&html, "Tenure").as_deref(), Some("36 months"));
        assert_eq!(value_of(&html, "Applied Date").as_deref(), Some("10 Feb 2024"));
    }

    #[tokio::test]
    async fn unknown_loan_is_not_found() {
        let response = get_loan_profile(State(get_test_state()), Path(99)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
