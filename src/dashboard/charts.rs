//! Pie charts for the dashboard, rendered client-side with ECharts.
//!
//! Each chart is serialized to its ECharts JSON configuration and mounted
//! into a container div by a small initialization script.

use charming::{
    Chart,
    component::{Legend, Title},
    element::{Tooltip, Trigger},
    series::Pie,
};
use maud::{Markup, PreEscaped, html};

use crate::{dashboard::aggregation::PeriodTotals, html::HeadElement};

/// A dashboard chart with its container element ID and ECharts options.
pub(super) struct DashboardChart {
    pub id: &'static str,
    pub options: String,
}

/// Renders the container divs the charts are mounted into.
pub(super) fn charts_view(charts: &[DashboardChart]) -> Markup {
    html!(
        section class="w-full grid grid-cols-1 xl:grid-cols-2 gap-4 mb-4"
        {
            @for chart in charts {
                div
                    id=(chart.id)
                    class="min-h-[380px] rounded dark:bg-gray-100"
                {}
            }
        }
    )
}

/// Generates the script that initializes each chart and keeps it sized to
/// its container.
pub(super) fn charts_script(charts: &[DashboardChart]) -> HeadElement {
    let init_blocks = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chart = echarts.init(document.getElementById("{}"));
                    chart.setOption({});
                    window.addEventListener('resize', chart.resize);
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    HeadElement::ScriptSource(PreEscaped(format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{init_blocks}\n}});"
    )))
}

pub(super) fn expenses_pie(period_name: &str, breakdown: &[(String, f64)]) -> Chart {
    let data: Vec<_> = breakdown
        .iter()
        .map(|(label, total)| (*total, label.as_str()))
        .collect();

    Chart::new()
        .title(
            Title::new()
                .text("Expenses by category")
                .subtext(period_name),
        )
        .tooltip(Tooltip::new().trigger(Trigger::Item))
        .legend(Legend::new().left("center").top("bottom"))
        .series(Pie::new().name("Expenses").radius("60%").data(data))
}

pub(super) fn income_expense_pie(period_name: &str, totals: &PeriodTotals) -> Chart {
    Chart::new()
        .title(
            Title::new()
                .text("Income vs expenses")
                .subtext(period_name),
        )
        .tooltip(Tooltip::new().trigger(Trigger::Item))
        .legend(Legend::new().left("center").top("bottom"))
        .series(Pie::new().name("Totals").radius("60%").data(vec![
            (totals.income, "Income"),
            (totals.expense, "Expenses"),
        ]))
}
