//! Defines the route handler for the page for editing a period.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints::{self, format_endpoint},
    html::{PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    period::{
        core::{PeriodId, get_period},
        form::{PeriodFormConfig, date_follow_script, period_form},
    },
};

/// The state needed for the edit period page.
#[derive(Debug, Clone)]
pub struct EditPeriodPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditPeriodPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for editing a period.
pub async fn get_edit_period_page(
    State(state): State<EditPeriodPageState>,
    Extension(user_id): Extension<UserID>,
    Path(period_id): Path<PeriodId>,
) -> Result<Response, Error> {
    let nav_bar = NavBar::new(endpoints::EDIT_PERIOD_VIEW).into_html();

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let period = get_period(period_id, user_id.as_i64(), &connection)?;

    let form = period_form(&PeriodFormConfig {
        action: &format_endpoint(endpoints::PERIOD, period.id),
        use_put: true,
        name: &period.name,
        start: period.start,
        end: period.end,
        confirmed: false,
    });

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-md"
            {
                h1 class="text-xl font-bold" { "Edit Period" }
                (form)
            }
        }
    );

    Ok(base("Edit Period", &[date_follow_script()], &content).into_response())
}

#[cfg(test)]
mod edit_period_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::Path, extract::State, http::StatusCode};
    use time::macros::date;

    use crate::{
        Error,
        auth::UserID,
        endpoints::{self, format_endpoint},
        period::{
            core::create_period,
            edit_page::{EditPeriodPageState, get_edit_period_page},
        },
        test_utils::{
            assert_form_input, assert_hx_endpoint, assert_valid_html,
            must_create_test_connection, must_get_form, parse_html,
        },
    };

    #[tokio::test]
    async fn renders_form_with_existing_period() {
        let connection = must_create_test_connection();
        let period = create_period(
            "January",
            date!(2025 - 01 - 01),
            date!(2025 - 01 - 31),
            1,
            &connection,
        )
        .unwrap();
        let state = EditPeriodPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_edit_period_page(State(state), Extension(UserID::new(1)), Path(period.id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, &format_endpoint(endpoints::PERIOD, period.id), "hx-put");
        assert_form_input(&form, "name", "text");
    }

    #[tokio::test]
    async fn missing_period_returns_not_found() {
        let state = EditPeriodPageState {
            db_connection: Arc::new(Mutex::new(must_create_test_connection())),
        };

        let result = get_edit_period_page(State(state), Extension(UserID::new(1)), Path(999)).await;

        assert!(matches!(result, Err(Error::NotFound)));
    }
}
