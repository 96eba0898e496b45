//! Defines the endpoint for creating a transaction.
//!
//! Transfers fan out to the transfer recorder, which writes both legs.

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
    account::AccountId,
    auth::UserID,
    category::CategoryId,
    database_id::DatabaseId,
    endpoints,
    forms::empty_string_as_none,
    period::PeriodId,
    transaction::{
        core::{
            Recurrence, ResponsibleParty, TransactionData, TransactionKind, TransactionStatus,
            create_transaction,
        },
        transfer::{TransferData, record_transfer},
    },
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating or editing a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    pub kind: TransactionKind,
    pub amount: f64,
    pub date: Date,
    pub status: TransactionStatus,
    pub recurrence: Recurrence,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub category_id: Option<CategoryId>,
    pub account_id: AccountId,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub counterpart_account_id: Option<AccountId>,
    /// Responsible select value, e.g. `member:3` or `group:2`.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub responsible: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub period_id: Option<PeriodId>,
}

/// A route handler for creating a transaction.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_from_form(&form, user_id.as_i64(), &connection) {
        Ok(()) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(
            error @ (Error::NonPositiveAmount(_)
            | Error::SameTransferAccounts
            | Error::MissingCounterpartAccount
            | Error::InvalidReference),
        ) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("could not create transaction: {error}");
            error.into_alert_response()
        }
    }
}

fn create_from_form(
    form: &TransactionForm,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<(), Error> {
    if form.kind == TransactionKind::Transfer {
        let counterpart_account_id = form
            .counterpart_account_id
            .ok_or(Error::MissingCounterpartAccount)?;

        record_transfer(
            &TransferData {
                amount: form.amount,
                date: form.date,
                source_account_id: form.account_id,
                counterpart_account_id,
                description: &form.description,
                period_id: form.period_id,
            },
            user_id,
            connection,
        )?;

        return Ok(());
    }

    create_transaction(&transaction_data(form)?, user_id, connection)?;

    Ok(())
}

/// Builds the row data for a non-transfer transaction.
pub(super) fn transaction_data(form: &TransactionForm) -> Result<TransactionData<'_>, Error> {
    let responsible = form
        .responsible
        .as_deref()
        .map(ResponsibleParty::parse)
        .transpose()?;

    Ok(TransactionData {
        amount: form.amount,
        date: form.date,
        kind: form.kind,
        status: form.status,
        recurrence: form.recurrence,
        description: &form.description,
        category_id: form.category_id,
        account_id: form.account_id,
        counterpart_account_id: None,
        responsible,
        period_id: form.period_id,
    })
}
