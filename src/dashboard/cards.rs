//! The headline stat cards at the top of the dashboard.

use maud::{Markup, html};

use crate::{backend::DashboardStats, html::format_currency};

/// One headline number.
struct StatCard {
    title: &'static str,
    value: String,
    accent: &'static str,
}

fn stat_cards(stats: &DashboardStats) -> [StatCard; 5] {
    [
        StatCard {
            title: "Total Customers",
            value: stats.total_users.to_string(),
            accent: "border-blue-500",
        },
        StatCard {
            title: "Total Savings Balance",
            value: format_currency(stats.total_savings),
            accent: "border-amber-500",
        },
        StatCard {
            title: "Total FD Balance",
            value: format_currency(stats.total_fd),
            accent: "border-rose-500",
        },
        StatCard {
            title: "Total RD Balance",
            value: format_currency(stats.total_rd),
            accent: "border-emerald-500",
        },
        StatCard {
            title: "Total Loan Disbursed",
            value: format_currency(stats.total_loans),
            accent: "border-orange-500",
        },
    ]
}

pub(super) fn stat_cards_view(stats: &DashboardStats) -> Markup {
    html! {
        section
            id="stat-cards"
            class="w-full grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-5 gap-4 mb-6"
        {
            @for card in stat_cards(stats) {
                div
                    class={ "bg-white dark:bg-gray-800 rounded-lg shadow-md p-4 border-l-4 " (card.accent) }
                    aria-label=(format!("{}: {}", card.title, card.value))
                {
                    h3 class="text-sm text-gray-500 dark:text-gray-400" { (card.title) }
                    p class="mt-1 text-2xl font-semibold tabular-nums" { (card.value) }
                }
            }
        }
    }
}
