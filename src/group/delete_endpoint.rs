//! Defines the endpoint for deleting a group.
//!
//! Groups that own accounts or are responsible for transactions are archived
//! rather than deleted. Deleting a group removes its member links but never
//! the members themselves.

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
    group::core::{GroupId, count_group_references},
    soft_delete::DeleteOutcome,
};

/// The state needed to delete a group.
#[derive(Debug, Clone)]
pub struct DeleteGroupState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteGroupState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting (or archiving) a group.
pub async fn delete_group_endpoint(
    State(state): State<DeleteGroupState>,
    Extension(user_id): Extension<UserID>,
    Path(group_id): Path<GroupId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_or_archive_group(group_id, user_id.as_i64(), &connection) {
        Ok(outcome) => {
            tracing::info!("group {group_id}: {outcome:?}");
            (
                HxRedirect(endpoints::GROUPS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(Error::NotFound) => Error::DeleteMissingGroup.into_alert_response(),
        Err(error) => {
            tracing::error!("could not delete group {group_id}: {error}");
            error.into_alert_response()
        }
    }
}

pub(crate) fn delete_or_archive_group(
    id: GroupId,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<DeleteOutcome, Error> {
    let references = count_group_references(id, user_id, connection)?;

    let (query, outcome) = if references == 0 {
        (
            "DELETE FROM \"group\" WHERE id = ?1 AND user_id = ?2",
            DeleteOutcome::Deleted,
        )
    } else {
        (
            "UPDATE \"group\" SET is_active = 0 WHERE id = ?1 AND user_id = ?2",
            DeleteOutcome::Archived,
        )
    };

    let rows_affected = connection.execute(query, params![id, user_id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(outcome)
}
