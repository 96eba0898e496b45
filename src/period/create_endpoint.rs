//! Defines the endpoint for creating a period.
//!
//! Overlapping dates are rejected outright. Dates that leave uncovered days
//! between periods only produce a warning: the first submission returns the
//! form with its confirmed flag set, and an identical resubmission commits.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    auth::UserID,
    database_id::DatabaseId,
    endpoints,
    period::{
        checker::find_gaps,
        core::{PeriodId, create_period, get_period_spans},
        form::{PeriodFormConfig, gap_warning_response, period_form},
    },
};

/// The state needed to create a period.
#[derive(Debug, Clone)]
pub struct CreatePeriodState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreatePeriodState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating or editing a period.
#[derive(Debug, Deserialize)]
pub struct PeriodForm {
    pub name: String,
    pub start: Date,
    pub end: Date,
    /// Set when the user has already seen the gap warning.
    #[serde(default)]
    pub confirmed: bool,
}

/// A route handler for creating a period.
pub async fn create_period_endpoint(
    State(state): State<CreatePeriodState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<PeriodForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if !form.confirmed {
        if let Err(error) = check_gaps(&form, None, user_id.as_i64(), &connection) {
            return match error {
                Error::PeriodGap(gaps) => gap_warning_response(
                    &PeriodFormConfig {
                        action: endpoints::PERIODS_API,
                        use_put: false,
                        name: &form.name,
                        start: form.start,
                        end: form.end,
                        confirmed: true,
                    },
                    &gaps,
                ),
                error => {
                    tracing::error!("could not check for period gaps: {error}");
                    error.into_alert_response()
                }
            };
        }
    }

    match create_period(&form.name, form.start, form.end, user_id.as_i64(), &connection) {
        Ok(_) => (
            HxRedirect(endpoints::PERIODS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(
            error @ (Error::EmptyName(_) | Error::InvalidDateRange | Error::PeriodOverlap(_)),
        ) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("could not create period: {error}");
            error.into_alert_response()
        }
    }
}

/// Errors with [Error::PeriodGap] when the form's dates would leave
/// uncovered days between periods.
pub(super) fn check_gaps(
    form: &PeriodForm,
    exclude_id: Option<PeriodId>,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<(), Error> {
    let spans = get_period_spans(exclude_id, user_id, connection)?;
    let gaps = find_gaps(form.start, form.end, &spans);

    if gaps.is_empty() {
        Ok(())
    } else {
        Err(Error::PeriodGap(gaps))
    }
}
