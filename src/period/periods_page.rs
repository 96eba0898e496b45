//! Lists the user's financial periods and lets them activate one.

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
    endpoints::{self, format_endpoint},
    html::{
        ACTIVE_BADGE_STYLE, BUTTON_SECONDARY_STYLE, INACTIVE_BADGE_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        delete_confirm_message, edit_delete_action_links,
    },
    navigation::NavBar,
    period::core::{Period, count_period_references, get_all_periods},
};

/// The state needed for the [get_periods_page](crate::period::get_periods_page) route handler.
#[derive(Debug, Clone)]
pub struct PeriodsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for PeriodsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn periods_view(periods: &[(Period, i64)]) -> Markup {
    let create_period_page_url = endpoints::NEW_PERIOD_VIEW;
    let nav_bar = NavBar::new(endpoints::PERIODS_VIEW).into_html();

    let table_row = |period: &Period, reference_count: i64| {
        let action_links = edit_delete_action_links(
            &format_endpoint(endpoints::EDIT_PERIOD_VIEW, period.id),
            &format_endpoint(endpoints::PERIOD, period.id),
            &delete_confirm_message("period", &period.name, reference_count),
        );

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                th
                    scope="row"
                    class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
                {
                    (period.name)
                    @if period.is_active {
                        " "
                        span class=(ACTIVE_BADGE_STYLE) { "Active" }
                    }
                    @if period.is_archived {
                        " "
                        span class=(INACTIVE_BADGE_STYLE) { "Archived" }
                    }
                }

                td class=(TABLE_CELL_STYLE) { (period.start) }

                td class=(TABLE_CELL_STYLE) { (period.end) }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4 items-center"
                    {
                        @if !period.is_active && !period.is_archived {
                            button
                                hx-post=(format_endpoint(endpoints::ACTIVATE_PERIOD, period.id))
                                hx-target-error="#alert-container"
                                class=(BUTTON_SECONDARY_STYLE)
                            {
                                "Activate"
                            }
                        }

                        (action_links)
                    }
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Periods" }

                    a href=(create_period_page_url) class=(LINK_STYLE)
                    {
                        "Add Period"
                    }
                }

                section class="w-full overflow-x-auto dark:bg-gray-800 lg:max-w-5xl lg:mx-auto"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Start" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "End" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for (period, reference_count) in periods {
                                (table_row(period, *reference_count))
                            }

                            @if periods.is_empty() {
                                tr
                                {
                                    td
                                        colspan="4"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No periods found. Create a period "
                                        a href=(create_period_page_url) class=(LINK_STYLE)
                                        {
                                            "here"
                                        }
                                        "."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Periods", &[], &content)
}

/// Renders the periods page.
pub async fn get_periods_page(
    State(state): State<PeriodsPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let periods = get_all_periods(user_id.as_i64(), &connection)
        .inspect_err(|error| tracing::error!("could not get periods: {error}"))?
        .into_iter()
        .map(|period| {
            let references = count_period_references(period.id, user_id.as_i64(), &connection)?;
            Ok((period, references))
        })
        .collect::<Result<Vec<_>, Error>>()
        .inspect_err(|error| tracing::error!("could not count period references: {error}"))?;

    Ok(periods_view(&periods).into_response())
}

#[cfg(test)]
mod periods_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        auth::UserID,
        category::create_category,
        goal::create_goal,
        period::{
            core::{create_period, set_active_period},
            periods_page::{PeriodsPageState, get_periods_page},
        },
        test_utils::{assert_valid_html, must_create_test_connection, parse_html},
    };

    #[tokio::test]
    async fn lists_periods_and_marks_the_active_one() {
        let connection = must_create_test_connection();
        let january = create_period(
            "January",
            date!(2025 - 01 - 01),
            date!(2025 - 01 - 31),
            1,
            &connection,
        )
        .unwrap();
        create_period(
            "February",
            date!(2025 - 02 - 01),
            date!(2025 - 02 - 28),
            1,
            &connection,
        )
        .unwrap();
        set_active_period(january.id, 1, &connection).unwrap();
        let state = PeriodsPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_periods_page(State(state), Extension(UserID::new(1)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html(response).await;
        assert_valid_html(&html);
        let row_selector = Selector::parse("tbody tr").unwrap();
        let rows: Vec<String> = html
            .select(&row_selector)
            .map(|row| row.text().collect())
            .collect();
        assert_eq!(rows.len(), 2);
        // Most recent first.
        assert!(rows[0].contains("February"));
        assert!(!rows[0].contains("Active"));
        assert!(rows[1].contains("January"));
        assert!(rows[1].contains("Active"));
    }

    #[tokio::test]
    async fn active_period_has_no_activate_button() {
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
        let state = PeriodsPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_periods_page(State(state), Extension(UserID::new(1)))
            .await
            .unwrap();

        let html = parse_html(response).await;
        let button_selector = Selector::parse("button[hx-post]").unwrap();
        assert_eq!(html.select(&button_selector).count(), 0);
    }

    #[tokio::test]
    async fn archived_period_is_badged_and_cannot_be_activated() {
        let connection = must_create_test_connection();
        let january = create_period(
            "January",
            date!(2025 - 01 - 01),
            date!(2025 - 01 - 31),
            1,
            &connection,
        )
        .unwrap();
        connection
            .execute(
                "UPDATE period SET is_archived = 1 WHERE id = ?1",
                [january.id],
            )
            .unwrap();
        let state = PeriodsPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_periods_page(State(state), Extension(UserID::new(1)))
            .await
            .unwrap();

        let html = parse_html(response).await;
        let row_selector = Selector::parse("tbody tr").unwrap();
        let row_text: String = html
            .select(&row_selector)
            .next()
            .expect("want a table row for the archived period")
            .text()
            .collect();
        assert!(row_text.contains("Archived"));
        let button_selector = Selector::parse("button[hx-post]").unwrap();
        assert_eq!(
            html.select(&button_selector).count(),
            0,
            "archived periods must not offer an Activate button"
        );
    }

    #[tokio::test]
    async fn delete_confirmation_states_reference_count() {
        let connection = must_create_test_connection();
        let january = create_period(
            "January",
            date!(2025 - 01 - 01),
            date!(2025 - 01 - 31),
            1,
            &connection,
        )
        .unwrap();
        create_period(
            "February",
            date!(2025 - 02 - 01),
            date!(2025 - 02 - 28),
            1,
            &connection,
        )
        .unwrap();
        let groceries = create_category("Groceries", None, 1, &connection).unwrap();
        create_goal(january.id, groceries.id, 500.0, 1, &connection).unwrap();
        let state = PeriodsPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_periods_page(State(state), Extension(UserID::new(1)))
            .await
            .unwrap();

        let html = parse_html(response).await;
        let button_selector = Selector::parse("button[hx-delete]").unwrap();
        let confirmations: Vec<_> = html
            .select(&button_selector)
            .map(|button| button.attr("hx-confirm").unwrap_or_default().to_owned())
            .collect();
        assert_eq!(confirmations.len(), 2);
        // Most recent first, so February (no goals) comes before January.
        assert!(
            confirmations[0].contains("cannot be undone"),
            "unreferenced period: {}",
            confirmations[0]
        );
        assert!(
            confirmations[1].contains("referenced by 1 record"),
            "period with a goal: {}",
            confirmations[1]
        );
    }
}
