//! Defines the route handler for the page for creating a period.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    html::{PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    period::{
        checker::suggest_range,
        core::get_selectable_periods,
        form::{PeriodFormConfig, date_follow_script, period_form},
    },
    timezone::get_local_offset,
};

/// The state needed for the create period page.
#[derive(Debug, Clone)]
pub struct NewPeriodPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for NewPeriodPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Renders the page for creating a period.
///
/// The date inputs default to the day after the latest existing period ends,
/// or the first of the current month when there are no periods yet.
pub async fn get_new_period_page(
    State(state): State<NewPeriodPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let nav_bar = NavBar::new(endpoints::NEW_PERIOD_VIEW).into_html();

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let local_offset = get_local_offset(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;
    let today = OffsetDateTime::now_utc().to_offset(local_offset).date();

    let latest_end = get_selectable_periods(user_id.as_i64(), &connection)?
        .into_iter()
        .map(|period| period.end)
        .max();
    let (start, end) = suggest_range(latest_end, today);

    let form = period_form(&PeriodFormConfig {
        action: endpoints::PERIODS_API,
        use_put: false,
        name: "",
        start,
        end,
        confirmed: false,
    });

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-md"
            {
                h1 class="text-xl font-bold" { "New Period" }
                (form)
            }
        }
    );

    Ok(base("New Period", &[date_follow_script()], &content).into_response())
}
