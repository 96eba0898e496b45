//! Defines the endpoint for deleting an account.
//!
//! Accounts with transactions are archived rather than deleted, so the
//! transaction history stays intact.

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
    account::core::{AccountId, count_account_references},
    auth::UserID,
    database_id::DatabaseId,
    endpoints,
    soft_delete::DeleteOutcome,
};

/// The state needed to delete an account.
#[derive(Debug, Clone)]
pub struct DeleteAccountState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting (or archiving) an account.
pub async fn delete_account_endpoint(
    State(state): State<DeleteAccountState>,
    Extension(user_id): Extension<UserID>,
    Path(account_id): Path<AccountId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_or_archive_account(account_id, user_id.as_i64(), &connection) {
        Ok(outcome) => {
            tracing::info!("account {account_id}: {outcome:?}");
            (
                HxRedirect(endpoints::ACCOUNTS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(Error::NotFound) => Error::DeleteMissingAccount.into_alert_response(),
        Err(error) => {
            tracing::error!("could not delete account {account_id}: {error}");
            error.into_alert_response()
        }
    }
}

pub(crate) fn delete_or_archive_account(
    id: AccountId,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<DeleteOutcome, Error> {
    let references = count_account_references(id, user_id, connection)?;

    let (query, outcome) = if references == 0 {
        (
            "DELETE FROM account WHERE id = ?1 AND user_id = ?2",
            DeleteOutcome::Deleted,
        )
    } else {
        (
            "UPDATE account SET is_active = 0 WHERE id = ?1 AND user_id = ?2",
            DeleteOutcome::Archived,
        )
    };

    let rows_affected = connection.execute(query, params![id, user_id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        Error,
        account::{
            core::{AccountKind, AccountOwner, create_account, get_account},
            delete_endpoint::delete_or_archive_account,
        },
        member::create_member,
        soft_delete::DeleteOutcome,
        test_utils::must_create_test_connection,
        transaction::{
            Recurrence, TransactionData, TransactionKind, TransactionStatus, create_transaction,
        },
    };

    #[test]
    fn deletes_account_without_transactions() {
        let connection = must_create_test_connection();
        let member = create_member("Alice", 1, &connection).unwrap();
        let account = create_account(
            "Everyday",
            AccountKind::Checking,
            0.0,
            AccountOwner::Member(member.id),
            1,
            &connection,
        )
        .unwrap();

        let outcome = delete_or_archive_account(account.id, 1, &connection).unwrap();

        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert_eq!(get_account(account.id, 1, &connection), Err(Error::NotFound));
    }

    #[test]
    fn archives_account_with_transactions() {
        let connection = must_create_test_connection();
        let member = create_member("Alice", 1, &connection).unwrap();
        let account = create_account(
            "Everyday",
            AccountKind::Checking,
            0.0,
            AccountOwner::Member(member.id),
            1,
            &connection,
        )
        .unwrap();
        create_transaction(
            &TransactionData {
                amount: 42.5,
                date: date!(2025 - 01 - 10),
                kind: TransactionKind::Expense,
                status: TransactionStatus::Completed,
                recurrence: Recurrence::OneOff,
                description: "",
                category_id: None,
                account_id: account.id,
                counterpart_account_id: None,
                responsible: None,
                period_id: None,
            },
            1,
            &connection,
        )
        .unwrap();

        let outcome = delete_or_archive_account(account.id, 1, &connection).unwrap();

        assert_eq!(outcome, DeleteOutcome::Archived);
        assert!(!get_account(account.id, 1, &connection).unwrap().is_active);
    }

    #[test]
    fn errors_for_missing_account() {
        let connection = must_create_test_connection();

        assert_eq!(
            delete_or_archive_account(999, 1, &connection),
            Err(Error::NotFound)
        );
    }
}
