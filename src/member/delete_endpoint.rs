//! Defines the endpoint for deleting a member.
//!
//! Members that are referenced by transactions, accounts or groups are
//! archived (marked inactive) instead of deleted so that historical records
//! keep their names.

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
    member::core::{MemberId, count_member_references},
    soft_delete::DeleteOutcome,
};

/// The state needed to delete a member.
#[derive(Debug, Clone)]
pub struct DeleteMemberState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteMemberState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting (or archiving) a member.
pub async fn delete_member_endpoint(
    State(state): State<DeleteMemberState>,
    Extension(user_id): Extension<UserID>,
    Path(member_id): Path<MemberId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_or_archive_member(member_id, user_id.as_i64(), &connection) {
        Ok(outcome) => {
            tracing::info!("member {member_id}: {outcome:?}");
            (
                HxRedirect(endpoints::MEMBERS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(Error::NotFound) => Error::DeleteMissingMember.into_alert_response(),
        Err(error) => {
            tracing::error!("could not delete member {member_id}: {error}");
            error.into_alert_response()
        }
    }
}

pub(crate) fn delete_or_archive_member(
    id: MemberId,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<DeleteOutcome, Error> {
    let references = count_member_references(id, user_id, connection)?;

    let (query, outcome) = if references == 0 {
        (
            "DELETE FROM member WHERE id = ?1 AND user_id = ?2",
            DeleteOutcome::Deleted,
        )
    } else {
        (
            "UPDATE member SET is_active = 0 WHERE id = ?1 AND user_id = ?2",
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
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        account::{AccountKind, AccountOwner, create_account},
        member::{
            core::{create_member, get_member},
            delete_endpoint::delete_or_archive_member,
        },
        soft_delete::DeleteOutcome,
        test_utils::must_create_test_connection,
        transaction::{
            Recurrence, ResponsibleParty, TransactionData, TransactionKind, TransactionStatus,
            create_transaction,
        },
    };

    #[test]
    fn deletes_unreferenced_member() {
        let connection = must_create_test_connection();
        let member = create_member("Alice", 1, &connection).unwrap();

        let outcome = delete_or_archive_member(member.id, 1, &connection).unwrap();

        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert_eq!(get_member(member.id, 1, &connection), Err(Error::NotFound));
    }

    #[test]
    fn archives_member_in_a_group() {
        let connection = must_create_test_connection();
        let member = create_member("Alice", 1, &connection).unwrap();
        must_add_member_to_group(&connection, member.id);

        let outcome = delete_or_archive_member(member.id, 1, &connection).unwrap();

        assert_eq!(outcome, DeleteOutcome::Archived);
        let archived = get_member(member.id, 1, &connection).unwrap();
        assert!(!archived.is_active);
    }

    #[test]
    fn archives_member_responsible_for_a_transaction() {
        let connection = must_create_test_connection();
        let alice = create_member("Alice", 1, &connection).unwrap();
        let bob = create_member("Bob", 1, &connection).unwrap();
        let account = create_account(
            "Everyday",
            AccountKind::Checking,
            0.0,
            AccountOwner::Member(bob.id),
            1,
            &connection,
        )
        .unwrap();
        create_transaction(
            &TransactionData {
                amount: 25.0,
                date: date!(2026 - 03 - 01),
                kind: TransactionKind::Expense,
                status: TransactionStatus::Completed,
                recurrence: Recurrence::OneOff,
                description: "Groceries",
                category_id: None,
                account_id: account.id,
                counterpart_account_id: None,
                responsible: Some(ResponsibleParty::Member(alice.id)),
                period_id: None,
            },
            1,
            &connection,
        )
        .unwrap();

        let outcome = delete_or_archive_member(alice.id, 1, &connection).unwrap();

        assert_eq!(outcome, DeleteOutcome::Archived);
        assert!(!get_member(alice.id, 1, &connection).unwrap().is_active);
    }

    #[test]
    fn errors_for_missing_member() {
        let connection = must_create_test_connection();

        let result = delete_or_archive_member(999, 1, &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    fn must_add_member_to_group(connection: &Connection, member_id: i64) {
        connection
            .execute(
                "INSERT INTO \"group\" (user_id, name, apportionment_mode)
                VALUES (1, 'Household', 'fixed')",
                (),
            )
            .unwrap();
        let group_id = connection.last_insert_rowid();
        connection
            .execute(
                "INSERT INTO group_member (group_id, member_id) VALUES (?1, ?2)",
                [group_id, member_id],
            )
            .unwrap();
    }
}
