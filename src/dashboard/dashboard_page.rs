//! The dashboard page: totals, charts, and recent activity for the active
//! period.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    category::get_all_categories,
    dashboard::{
        aggregation::{PeriodTotals, expenses_by_category, period_totals},
        charts::{DashboardChart, charts_script, charts_view, expenses_pie, income_expense_pie},
        entries::{DashboardEntry, get_entries_for_period},
    },
    endpoints,
    html::{HeadElement, LINK_STYLE, PAGE_CONTAINER_STYLE, base, format_currency},
    navigation::NavBar,
    period::get_active_period,
};

/// How many transactions the recent-activity list shows.
const RECENT_ENTRY_COUNT: usize = 8;

/// The state needed for the [get_dashboard_page](crate::dashboard::get_dashboard_page) route handler.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Displays an overview of the active period.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let period = match get_active_period(user_id.as_i64(), &connection)
        .inspect_err(|error| tracing::error!("could not get active period: {error}"))?
    {
        Some(period) => period,
        None => return Ok(no_active_period_view().into_response()),
    };

    let entries = get_entries_for_period(&period, user_id.as_i64(), &connection)
        .inspect_err(|error| tracing::error!("could not get dashboard transactions: {error}"))?;

    if entries.is_empty() {
        return Ok(no_data_view(&period.name).into_response());
    }

    let categories = get_all_categories(user_id.as_i64(), &connection)
        .inspect_err(|error| tracing::error!("could not get categories: {error}"))?;

    let totals = period_totals(&entries);
    let breakdown = expenses_by_category(&entries, &categories);

    Ok(dashboard_view(&period.name, &totals, &breakdown, &entries).into_response())
}

fn dashboard_view(
    period_name: &str,
    totals: &PeriodTotals,
    breakdown: &[(String, f64)],
    entries: &[DashboardEntry],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let mut charts = vec![DashboardChart {
        id: "income-expense-chart",
        options: income_expense_pie(period_name, totals).to_string(),
    }];

    if !breakdown.is_empty() {
        charts.push(DashboardChart {
            id: "expenses-chart",
            options: expenses_pie(period_name, breakdown).to_string(),
        });
    }

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-xl space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { (period_name) }

                    a href=(endpoints::PERIODS_VIEW) class=(LINK_STYLE)
                    {
                        "Change period"
                    }
                }

                (totals_cards(totals))

                (charts_view(&charts))

                (recent_activity(entries))
            }
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(&charts),
    ];

    base("Dashboard", &scripts, &content)
}

fn totals_cards(totals: &PeriodTotals) -> Markup {
    let card = |label: &str, value: String, value_style: &str| {
        html!(
            div class="rounded-lg bg-white p-4 shadow-sm dark:bg-gray-800"
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { (label) }
                p class=(format!("text-2xl font-semibold {value_style}")) { (value) }
            }
        )
    };

    html!(
        section class="grid grid-cols-1 sm:grid-cols-3 gap-4"
        {
            (card("Income", format_currency(totals.income), "text-green-600 dark:text-green-400"))
            (card("Expenses", format_currency(totals.expense), "text-red-600 dark:text-red-400"))
            (card("Balance", format_currency(totals.balance()), "text-gray-900 dark:text-white"))
        }
    )
}

fn recent_activity(entries: &[DashboardEntry]) -> Markup {
    html!(
        section class="rounded-lg bg-white p-4 shadow-sm dark:bg-gray-800"
        {
            header class="flex justify-between flex-wrap items-end mb-2"
            {
                h2 class="text-lg font-semibold" { "Recent transactions" }

                a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "See all" }
            }

            ul class="divide-y divide-gray-100 dark:divide-gray-700"
            {
                @for entry in entries.iter().take(RECENT_ENTRY_COUNT) {
                    li class="flex justify-between gap-4 py-2"
                    {
                        div
                        {
                            p class="text-gray-900 dark:text-white"
                            {
                                @if entry.description.is_empty() {
                                    (entry.kind.label())
                                } @else {
                                    (entry.description)
                                }
                            }
                            p class="text-sm text-gray-500 dark:text-gray-400" { (entry.date) }
                        }

                        @if entry.is_incoming {
                            span class="font-medium text-green-600 dark:text-green-400"
                            {
                                "+" (format_currency(entry.amount))
                            }
                        } @else {
                            span class="font-medium text-red-600 dark:text-red-400"
                            {
                                (format_currency(-entry.amount))
                            }
                        }
                    }
                }
            }
        }
    )
}

fn no_active_period_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold" { "No active period" }

            p
            {
                "The dashboard summarizes your active financial period. Pick one on the "
                a href=(endpoints::PERIODS_VIEW) class=(LINK_STYLE) { "periods page" }
                "."
            }
        }
    );

    base("Dashboard", &[], &content)
}

fn no_data_view(period_name: &str) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold" { "Nothing here yet..." }

            p
            {
                "Charts will show up here once " (period_name) " has some transactions. "
                "Add one "
                a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE) { "here" }
                "."
            }
        }
    );

    base("Dashboard", &[], &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        account::{Account, AccountKind, AccountOwner, create_account},
        auth::UserID,
        category::create_category,
        dashboard::dashboard_page::{DashboardState, get_dashboard_page},
        member::create_member,
        period::{create_period, set_active_period},
        test_utils::{assert_valid_html, must_create_test_connection, parse_html},
        transaction::{
            Recurrence, TransactionData, TransactionKind, TransactionStatus, TransferData,
            create_transaction, record_transfer,
        },
    };

    #[tokio::test]
    async fn shows_totals_and_charts_for_the_active_period() {
        let connection = must_create_test_connection();
        let (everyday, savings) = must_create_accounts(&connection);
        let groceries = create_category("Groceries", None, 1, &connection).unwrap();
        let january = create_period(
            "January",
            date!(2025 - 01 - 01),
            date!(2025 - 01 - 31),
            1,
            &connection,
        )
        .unwrap();
        set_active_period(january.id, 1, &connection).unwrap();
        create_transaction(
            &TransactionData {
                amount: 1000.0,
                date: date!(2025 - 01 - 01),
                kind: TransactionKind::Income,
                status: TransactionStatus::Completed,
                recurrence: Recurrence::Monthly,
                description: "Salary",
                category_id: None,
                account_id: everyday.id,
                counterpart_account_id: None,
                responsible: None,
                period_id: Some(january.id),
            },
            1,
            &connection,
        )
        .unwrap();
        create_transaction(
            &TransactionData {
                amount: 250.0,
                date: date!(2025 - 01 - 10),
                kind: TransactionKind::Expense,
                status: TransactionStatus::Completed,
                recurrence: Recurrence::OneOff,
                description: "Weekly shop",
                category_id: Some(groceries.id),
                account_id: everyday.id,
                counterpart_account_id: None,
                responsible: None,
                period_id: Some(january.id),
            },
            1,
            &connection,
        )
        .unwrap();
        // Transfers must not move the totals.
        record_transfer(
            &TransferData {
                amount: 500.0,
                date: date!(2025 - 01 - 15),
                source_account_id: everyday.id,
                counterpart_account_id: savings.id,
                description: "",
                period_id: Some(january.id),
            },
            1,
            &connection,
        )
        .unwrap();
        let state = DashboardState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_dashboard_page(State(state), Extension(UserID::new(1)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html(response).await;
        assert_valid_html(&html);
        let text: String = html.root_element().text().collect();
        assert!(text.contains("$1,000.00"));
        assert!(text.contains("$250.00"));
        assert!(text.contains("$750.00"));
        for chart_id in ["#income-expense-chart", "#expenses-chart"] {
            let selector = Selector::parse(chart_id).unwrap();
            assert!(
                html.select(&selector).next().is_some(),
                "missing chart container {chart_id}"
            );
        }
    }

    #[tokio::test]
    async fn prompts_for_a_period_when_none_is_active() {
        let state = DashboardState {
            db_connection: Arc::new(Mutex::new(must_create_test_connection())),
        };

        let response = get_dashboard_page(State(state), Extension(UserID::new(1)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html(response).await;
        let text: String = html.root_element().text().collect();
        assert!(text.contains("No active period"));
    }

    #[tokio::test]
    async fn prompts_to_add_transactions_when_the_period_is_empty() {
        let connection = must_create_test_connection();
        let january = create_period(
            "January",
            date!(2025 - 01 - 01),
            date!(2025 - 01 - 31),
            1,
            &connection,
        )
        .unwrap();
        set_active_period(january.id, 1, &connection).unwrap();
        let state = DashboardState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_dashboard_page(State(state), Extension(UserID::new(1)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html(response).await;
        let text: String = html.root_element().text().collect();
        assert!(text.contains("Nothing here yet"));
    }

    fn must_create_accounts(connection: &rusqlite::Connection) -> (Account, Account) {
        let member = create_member("Alice", 1, connection).expect("could not create test member");
        let everyday = create_account(
            "Everyday",
            AccountKind::Checking,
            0.0,
            AccountOwner::Member(member.id),
            1,
            connection,
        )
        .expect("could not create test account");
        let savings = create_account(
            "Savings",
            AccountKind::Savings,
            0.0,
            AccountOwner::Member(member.id),
            1,
            connection,
        )
        .expect("could not create test account");

        (everyday, savings)
    }
}
