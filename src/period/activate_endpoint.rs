//! Defines the endpoint for marking a period as the active one.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    period::core::{PeriodId, set_active_period},
};

/// The state needed to activate a period.
#[derive(Debug, Clone)]
pub struct ActivatePeriodState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ActivatePeriodState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for making a period the active one.
///
/// Any previously active period is deactivated in the same transaction.
pub async fn activate_period_endpoint(
    State(state): State<ActivatePeriodState>,
    Extension(user_id): Extension<UserID>,
    Path(period_id): Path<PeriodId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match set_active_period(period_id, user_id.as_i64(), &connection) {
        Ok(()) => (
            HxRedirect(endpoints::PERIODS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ Error::NotFound) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("could not activate period {period_id}: {error}");
            error.into_alert_response()
        }
    }
}
