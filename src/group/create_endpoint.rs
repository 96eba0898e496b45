//! Defines the endpoint for creating a group.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    group::core::{ApportionmentMode, create_group},
    member::MemberId,
};

/// The state needed to create a group.
#[derive(Debug, Clone)]
pub struct CreateGroupState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateGroupState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating or editing a group.
///
/// Uses axum-extra's `Form` so the repeated `member_ids` checkbox values
/// collect into a `Vec`.
#[derive(Debug, Deserialize)]
pub struct GroupForm {
    pub name: String,
    pub apportionment_mode: ApportionmentMode,
    #[serde(default)]
    pub member_ids: Vec<MemberId>,
}

/// A route handler for creating a group.
pub async fn create_group_endpoint(
    State(state): State<CreateGroupState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<GroupForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_group(
        &form.name,
        form.apportionment_mode,
        &form.member_ids,
        user_id.as_i64(),
        &connection,
    ) {
        Ok(_) => (
            HxRedirect(endpoints::GROUPS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ (Error::EmptyName(_) | Error::EmptyGroup | Error::InvalidReference)) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!("could not create group: {error}");
            error.into_alert_response()
        }
    }
}
