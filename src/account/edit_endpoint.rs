//! Defines the endpoint for updating an account.

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
    account::{
        core::{AccountId, AccountOwner, update_account},
        create_endpoint::AccountForm,
    },
    auth::UserID,
    endpoints,
};

/// The state needed to edit an account.
#[derive(Debug, Clone)]
pub struct EditAccountState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for updating an account.
pub async fn edit_account_endpoint(
    State(state): State<EditAccountState>,
    Extension(user_id): Extension<UserID>,
    Path(account_id): Path<AccountId>,
    Form(form): Form<AccountForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let owner = match AccountOwner::parse(&form.owner) {
        Ok(owner) => owner,
        Err(error) => return error.into_alert_response(),
    };

    match update_account(
        account_id,
        &form.name,
        form.kind,
        form.opening_balance,
        owner,
        user_id.as_i64(),
        &connection,
    ) {
        Ok(rows_affected) if rows_affected != 0 => (
            HxRedirect(endpoints::ACCOUNTS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Ok(_) => Error::UpdateMissingAccount.into_alert_response(),
        Err(error @ (Error::EmptyName(_) | Error::InvalidReference)) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!("could not update account {account_id}: {error}");
            error.into_alert_response()
        }
    }
}
