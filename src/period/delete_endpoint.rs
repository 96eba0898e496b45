//! Defines the endpoint for deleting a period.
//!
//! Periods with transactions or goals are archived rather than deleted so
//! that historical records keep their period.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::{Connection, params};

use crate::{
    AppState, Error,
    auth::UserID,
    database_id::DatabaseId,
    endpoints,
    period::core::{PeriodId, count_period_references},
    soft_delete::DeleteOutcome,
};

/// The state needed to delete a period.
#[derive(Debug, Clone)]
pub struct DeletePeriodState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeletePeriodState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting (or archiving) a period.
pub async fn delete_period_endpoint(
    State(state): State<DeletePeriodState>,
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

    match delete_or_archive_period(period_id, user_id.as_i64(), &connection) {
        Ok(outcome) => {
            tracing::info!("period {period_id}: {outcome:?}");
            (
                HxRedirect(endpoints::PERIODS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(Error::NotFound) => Error::DeleteMissingPeriod.into_alert_response(),
        Err(error) => {
            tracing::error!("could not delete period {period_id}: {error}");
            error.into_alert_response()
        }
    }
}

pub(crate) fn delete_or_archive_period(
    id: PeriodId,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<DeleteOutcome, Error> {
    let references = count_period_references(id, user_id, connection)?;

    let (query, outcome) = if references == 0 {
        (
            "DELETE FROM period WHERE id = ?1 AND user_id = ?2",
            DeleteOutcome::Deleted,
        )
    } else {
        (
            "UPDATE period SET is_active = 0, is_archived = 1 WHERE id = ?1 AND user_id = ?2",
            DeleteOutcome::Archived,
        )
    };

    let rows_affected = connection.execute(query, params![id, user_id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(outcome)
}
