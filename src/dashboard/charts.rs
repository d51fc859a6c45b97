//! ECharts configurations for the dashboard, built with charming.
//!
//! Each chart is rendered as an empty container plus a script that feeds the
//! chart options to ECharts once the page has loaded.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisLabel, AxisPointer, AxisPointerType, AxisType, JsFunction, Tooltip, Trigger},
    series::{Line, Pie, bar::Bar},
};
use maud::{Markup, PreEscaped, html};

use crate::{
    backend::{AccountTrend, ChartSlice, LoanTrend},
    html::HeadElement,
};

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID of the chart container.
    pub id: &'static str,
    /// The ECharts options as JSON.
    pub options: String,
}

pub(super) fn charts_view(charts: &[DashboardChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="min-h-[340px] rounded dark:bg-gray-100"
                    {}
                }
            }
        }
    )
}

/// The script that starts ECharts on every chart container, following the
/// browser's dark mode and resizing with the window.
pub(super) fn charts_script(charts: &[DashboardChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chart = echarts.init(document.getElementById("{}"));
                    chart.setOption({});

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        chart.setTheme(darkModeMediaQuery.matches ? 'dark' : 'default');
                    }};
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    HeadElement::ScriptSource(PreEscaped(format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{script_content}\n}});"
    )))
}

/// Savings, fixed deposit and recurring deposit balances by month.
pub(super) fn account_growth_chart(trends: &[AccountTrend]) -> Chart {
    let labels: Vec<String> = trends.iter().map(|trend| trend.name.clone()).collect();
    let savings: Vec<f64> = trends.iter().map(|trend| trend.savings).collect();
    let fd: Vec<f64> = trends.iter().map(|trend| trend.fd).collect();
    let rd: Vec<f64> = trends.iter().map(|trend| trend.rd).collect();

    Chart::new()
        .title(
            Title::new()
                .text("Account Growth")
                .subtext("Monthly account balance trends"),
        )
        .tooltip(rupee_tooltip())
        .legend(Legend::new().top("8%"))
        .grid(month_grid())
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(rupee_axis())
        .series(Line::new().name("Savings").data(savings))
        .series(Line::new().name("FD").data(fd))
        .series(Line::new().name("RD").data(rd))
}

/// Loan disbursements next to repayments by month.
pub(super) fn loan_activity_chart(trends: &[LoanTrend]) -> Chart {
    let labels: Vec<String> = trends.iter().map(|trend| trend.name.clone()).collect();
    let disbursed: Vec<f64> = trends.iter().map(|trend| trend.loans).collect();
    let repaid: Vec<f64> = trends.iter().map(|trend| trend.repaid).collect();

    Chart::new()
        .title(
            Title::new()
                .text("Loan Activity")
                .subtext("Monthly loan disbursements and repayments"),
        )
        .tooltip(rupee_tooltip())
        .legend(Legend::new().top("8%"))
        .grid(month_grid())
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(rupee_axis())
        .series(Bar::new().name("Disbursed").data(disbursed))
        .series(Bar::new().name("Repaid").data(repaid))
}

/// How the accounts split between savings, FD and RD.
pub(super) fn account_distribution_chart(slices: &[ChartSlice]) -> Chart {
    share_chart(
        "Account Distribution",
        "Distribution of account types",
        Pie::new().name("Accounts").radius("65%"),
        slices,
    )
}

/// How the loans split between loan types, drawn as a doughnut.
pub(super) fn loan_types_chart(slices: &[ChartSlice]) -> Chart {
    share_chart(
        "Loan Types",
        "Distribution of different loan types",
        Pie::new().name("Loans").radius(vec!["45%", "65%"]),
        slices,
    )
}

fn share_chart(title: &str, subtitle: &str, pie: Pie, slices: &[ChartSlice]) -> Chart {
    let data: Vec<(f64, &str)> = slices
        .iter()
        .map(|slice| (slice.value, slice.name.as_str()))
        .collect();

    Chart::new()
        .title(Title::new().text(title).subtext(subtitle))
        .tooltip(Tooltip::new().trigger(Trigger::Item))
        .legend(Legend::new().bottom("2%"))
        .series(pie.center(vec!["50%", "55%"]).data(data))
}

fn month_grid() -> Grid {
    Grid::new()
        .left("3%")
        .right("4%")
        .bottom("3%")
        .top(90)
        .contain_label(true)
}

fn rupee_axis() -> Axis {
    Axis::new()
        .type_(AxisType::Value)
        .axis_label(AxisLabel::new().formatter(rupee_formatter()))
}

#[inline]
fn rupee_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const rupeeFormatter = new Intl.NumberFormat('en-IN', {
              style: 'currency',
              currency: 'INR',
              maximumFractionDigits: 0
            });
            return (number) ? rupeeFormatter.format(number) : \"-\";",
    )
}

fn rupee_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(rupee_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}
