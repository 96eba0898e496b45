//! Defines the endpoint for creating an account.

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

use crate::{
    AppState, Error,
    account::core::{Account, AccountKind, AccountOwner, create_account},
    auth::UserID,
    database_id::DatabaseId,
    endpoints,
};

/// The state needed to create an account.
#[derive(Debug, Clone)]
pub struct CreateAccountState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating or editing an account.
#[derive(Debug, Deserialize)]
pub struct AccountForm {
    pub name: String,
    pub kind: AccountKind,
    pub opening_balance: f64,
    /// Owner select value, e.g. `member:3` or `group:2`.
    pub owner: String,
}

/// A route handler for creating an account.
pub async fn create_account_endpoint(
    State(state): State<CreateAccountState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<AccountForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_account_from_form(&form, user_id.as_i64(), &connection) {
        Ok(_) => (
            HxRedirect(endpoints::ACCOUNTS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ (Error::EmptyName(_) | Error::InvalidReference)) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!("could not create account: {error}");
            error.into_alert_response()
        }
    }
}

pub(crate) fn create_account_from_form(
    form: &AccountForm,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<Account, Error> {
    let owner = AccountOwner::parse(&form.owner)?;

    create_account(
        &form.name,
        form.kind,
        form.opening_balance,
        owner,
        user_id,
        connection,
    )
}
