//! Defines the endpoint for updating a period.
//!
//! The same overlap and gap rules as creation apply, except the period's own
//! dates are ignored when checking.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints::{self, format_endpoint},
    period::{
        core::{PeriodId, update_period},
        create_endpoint::{PeriodForm, check_gaps},
        form::{PeriodFormConfig, gap_warning_response},
    },
};

/// The state needed to edit a period.
#[derive(Debug, Clone)]
pub struct EditPeriodState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditPeriodState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for updating a period.
pub async fn edit_period_endpoint(
    State(state): State<EditPeriodState>,
    Extension(user_id): Extension<UserID>,
    Path(period_id): Path<PeriodId>,
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
        if let Err(error) = check_gaps(&form, Some(period_id), user_id.as_i64(), &connection) {
            return match error {
                Error::PeriodGap(gaps) => gap_warning_response(
                    &PeriodFormConfig {
                        action: &format_endpoint(endpoints::PERIOD, period_id),
                        use_put: true,
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

    match update_period(
        period_id,
        &form.name,
        form.start,
        form.end,
        user_id.as_i64(),
        &connection,
    ) {
        Ok(rows_affected) if rows_affected != 0 => (
            HxRedirect(endpoints::PERIODS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Ok(_) => Error::UpdateMissingPeriod.into_alert_response(),
        Err(
            error @ (Error::EmptyName(_) | Error::InvalidDateRange | Error::PeriodOverlap(_)),
        ) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("could not update period {period_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Form, extract::Path, extract::State, http::StatusCode};
    use time::macros::date;

    use crate::{
        auth::UserID,
        endpoints,
        period::{
            core::{create_period, get_period},
            create_endpoint::PeriodForm,
            edit_endpoint::{EditPeriodState, edit_period_endpoint},
        },
        test_utils::{assert_hx_redirect, must_create_test_connection},
    };

    #[tokio::test]
    async fn updates_period_and_redirects() {
        let connection = must_create_test_connection();
        let period = create_period(
            "January",
            date!(2025 - 01 - 01),
            date!(2025 - 01 - 31),
            1,
            &connection,
        )
        .unwrap();
        let state = EditPeriodState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = edit_period_endpoint(
            State(state.clone()),
            Extension(UserID::new(1)),
            Path(period.id),
            Form(PeriodForm {
                name: "January (pay cycle)".to_owned(),
                start: date!(2025 - 01 - 01),
                end: date!(2025 - 01 - 31),
                confirmed: false,
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::PERIODS_VIEW);
        let connection = state.db_connection.lock().unwrap();
        let updated = get_period(period.id, 1, &connection).unwrap();
        assert_eq!(updated.name, "January (pay cycle)");
    }

    #[tokio::test]
    async fn shrinking_a_period_warns_about_the_gap() {
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
        let state = EditPeriodState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = edit_period_endpoint(
            State(state.clone()),
            Extension(UserID::new(1)),
            Path(january.id),
            Form(PeriodForm {
                name: "January".to_owned(),
                start: date!(2025 - 01 - 01),
                end: date!(2025 - 01 - 20),
                confirmed: false,
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let connection = state.db_connection.lock().unwrap();
        let unchanged = get_period(january.id, 1, &connection).unwrap();
        assert_eq!(unchanged.end, date!(2025 - 01 - 31));
    }

    #[tokio::test]
    async fn missing_period_returns_not_found_alert() {
        let state = EditPeriodState {
            db_connection: Arc::new(Mutex::new(must_create_test_connection())),
        };

        let response = edit_period_endpoint(
            State(state),
            Extension(UserID::new(1)),
            Path(999),
            Form(PeriodForm {
                name: "January".to_owned(),
                start: date!(2025 - 01 - 01),
                end: date!(2025 - 01 - 31),
                confirmed: true,
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
