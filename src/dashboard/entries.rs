//! The lean transaction view the dashboard aggregates over.

use rusqlite::{Connection, params};
use time::Date;

use crate::{
    Error, category::CategoryId, database_id::DatabaseId, period::Period,
    transaction::TransactionKind,
};

/// One transaction in the active period, reduced to the fields the
/// dashboard needs.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct DashboardEntry {
    pub amount: f64,
    pub date: Date,
    pub kind: TransactionKind,
    pub description: String,
    pub category_id: Option<CategoryId>,
    /// Whether the amount flows into the user's accounts. For a transfer,
    /// the sent leg is outgoing and the received leg is incoming.
    pub is_incoming: bool,
}

/// Retrieve the transactions belonging to `period`, most recent first.
///
/// A transaction belongs to the period if it is assigned to it explicitly,
/// or if it has no period and its date falls inside the period's range.
pub(super) fn get_entries_for_period(
    period: &Period,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<Vec<DashboardEntry>, Error> {
    connection
        .prepare(
            "SELECT amount, date, kind, description, category_id,
                CASE
                    WHEN kind = 'income' THEN 1
                    WHEN kind = 'expense' THEN 0
                    WHEN id < linked_transaction_id THEN 0
                    ELSE 1
                END
            FROM \"transaction\"
            WHERE user_id = ?1
                AND (period_id = ?2 OR (period_id IS NULL AND date BETWEEN ?3 AND ?4))
            ORDER BY date DESC, id DESC",
        )?
        .query_map(
            params![user_id, period.id, period.start, period.end],
            |row| {
                Ok(DashboardEntry {
                    amount: row.get(0)?,
                    date: row.get(1)?,
                    kind: row.get(2)?,
                    description: row.get(3)?,
                    category_id: row.get(4)?,
                    is_incoming: row.get(5)?,
                })
            },
        )?
        .map(|entry_result| entry_result.map_err(Error::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        account::{AccountKind, AccountOwner, create_account},
        dashboard::entries::get_entries_for_period,
        member::create_member,
        period::create_period,
        test_utils::must_create_test_connection,
        transaction::{
            Recurrence, TransactionData, TransactionKind, TransactionStatus, TransferData,
            create_transaction, record_transfer,
        },
    };

    #[test]
    fn collects_assigned_and_in_range_transactions() {
        let connection = must_create_test_connection();
        let member = create_member("Alice", 1, &connection).unwrap();
        let everyday = create_account(
            "Everyday",
            AccountKind::Checking,
            0.0,
            AccountOwner::Member(member.id),
            1,
            &connection,
        )
        .unwrap();
        let savings = create_account(
            "Savings",
            AccountKind::Savings,
            0.0,
            AccountOwner::Member(member.id),
            1,
            &connection,
        )
        .unwrap();
        let january = create_period(
            "January",
            date!(2025 - 01 - 01),
            date!(2025 - 01 - 31),
            1,
            &connection,
        )
        .unwrap();
        let expense = |date, period_id| TransactionData {
            amount: 10.0,
            date,
            kind: TransactionKind::Expense,
            status: TransactionStatus::Completed,
            recurrence: Recurrence::OneOff,
            description: "",
            category_id: None,
            account_id: everyday.id,
            counterpart_account_id: None,
            responsible: None,
            period_id,
        };
        // Assigned to the period, in range without a period, and out of
        // range without a period.
        create_transaction(&expense(date!(2025 - 02 - 05), Some(january.id)), 1, &connection)
            .unwrap();
        create_transaction(&expense(date!(2025 - 01 - 10), None), 1, &connection).unwrap();
        create_transaction(&expense(date!(2025 - 02 - 05), None), 1, &connection).unwrap();
        record_transfer(
            &TransferData {
                amount: 50.0,
                date: date!(2025 - 01 - 15),
                source_account_id: everyday.id,
                counterpart_account_id: savings.id,
                description: "",
                period_id: Some(january.id),
            },
            1,
            &connection,
        )
        .unwrap();

        let entries = get_entries_for_period(&january, 1, &connection).unwrap();

        assert_eq!(entries.len(), 4);
        let transfers: Vec<_> = entries
            .iter()
            .filter(|entry| entry.kind == TransactionKind::Transfer)
            .collect();
        assert_eq!(transfers.len(), 2);
        // The sent leg is outgoing, the received leg incoming.
        assert!(transfers.iter().any(|entry| !entry.is_incoming));
        assert!(transfers.iter().any(|entry| entry.is_incoming));
    }
}
