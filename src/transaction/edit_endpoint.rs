//! Defines the endpoint for updating a transaction.
//!
//! Editing a transfer leg updates only the edited row and always leaves it
//! completed. The other leg is untouched.

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
    endpoints,
    transaction::{
        core::{TransactionId, TransactionKind, TransactionStatus, update_transaction},
        create_endpoint::{TransactionForm, transaction_data},
    },
};

/// The state needed to edit a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for updating a transaction.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let mut data = match transaction_data(&form) {
        Ok(data) => data,
        Err(error) => return error.into_alert_response(),
    };

    if form.kind == TransactionKind::Transfer {
        let counterpart_account_id = match form.counterpart_account_id {
            Some(id) => id,
            None => return Error::MissingCounterpartAccount.into_alert_response(),
        };

        data.counterpart_account_id = Some(counterpart_account_id);
        data.status = TransactionStatus::Completed;
        data.category_id = None;
        data.responsible = None;
    }

    match update_transaction(transaction_id, &data, user_id.as_i64(), &connection) {
        Ok(rows_affected) if rows_affected != 0 => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Ok(_) => Error::UpdateMissingTransaction.into_alert_response(),
        Err(
            error @ (Error::NonPositiveAmount(_)
            | Error::SameTransferAccounts
            | Error::MissingCounterpartAccount
            | Error::InvalidReference),
        ) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("could not update transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}
