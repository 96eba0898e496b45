//! Transactions: income, expenses, and the legs of inter-account transfers.

use rusqlite::{
    Connection, params,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::Deserialize;
use time::Date;

use crate::{
    Error, account::AccountId, category::CategoryId, database_id::DatabaseId, period::PeriodId,
};

/// Alias for integers used as transaction IDs.
pub type TransactionId = DatabaseId;

/// What a transaction is. Stored as kebab-case TEXT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransactionKind {
    Income,
    Expense,
    Transfer,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
            TransactionKind::Transfer => "transfer",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
            TransactionKind::Transfer => "Transfer",
        }
    }

    fn from_str(text: &str) -> Option<Self> {
        [
            TransactionKind::Income,
            TransactionKind::Expense,
            TransactionKind::Transfer,
        ]
        .into_iter()
        .find(|kind| kind.as_str() == text)
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        Self::from_str(text).ok_or_else(|| {
            FromSqlError::Other(format!("unknown transaction kind {text:?}").into())
        })
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

/// Whether the money has moved yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransactionStatus {
    Completed,
    Planned,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Completed => "completed",
            TransactionStatus::Planned => "planned",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TransactionStatus::Completed => "Completed",
            TransactionStatus::Planned => "Planned",
        }
    }

    fn from_str(text: &str) -> Option<Self> {
        [TransactionStatus::Completed, TransactionStatus::Planned]
            .into_iter()
            .find(|status| status.as_str() == text)
    }
}

impl FromSql for TransactionStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        Self::from_str(text).ok_or_else(|| {
            FromSqlError::Other(format!("unknown transaction status {text:?}").into())
        })
    }
}

impl ToSql for TransactionStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

/// How often a transaction repeats. Informational only: no materialization
/// of future occurrences happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Recurrence {
    OneOff,
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Yearly,
}

impl Recurrence {
    /// Every recurrence, in the order they appear in pickers.
    pub const ALL: [Recurrence; 6] = [
        Recurrence::OneOff,
        Recurrence::Daily,
        Recurrence::Weekly,
        Recurrence::Biweekly,
        Recurrence::Monthly,
        Recurrence::Yearly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Recurrence::OneOff => "one-off",
            Recurrence::Daily => "daily",
            Recurrence::Weekly => "weekly",
            Recurrence::Biweekly => "biweekly",
            Recurrence::Monthly => "monthly",
            Recurrence::Yearly => "yearly",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Recurrence::OneOff => "One-off",
            Recurrence::Daily => "Daily",
            Recurrence::Weekly => "Weekly",
            Recurrence::Biweekly => "Biweekly",
            Recurrence::Monthly => "Monthly",
            Recurrence::Yearly => "Yearly",
        }
    }

    fn from_str(text: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|recurrence| recurrence.as_str() == text)
    }
}

impl FromSql for Recurrence {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        Self::from_str(text)
            .ok_or_else(|| FromSqlError::Other(format!("unknown recurrence {text:?}").into()))
    }
}

impl ToSql for Recurrence {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

/// Who a transaction is for: one member or one group, if anyone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponsibleParty {
    Member(DatabaseId),
    Group(DatabaseId),
}

impl ResponsibleParty {
    /// The value used in the responsible select, e.g. `member:3` or `group:2`.
    pub fn form_value(&self) -> String {
        match self {
            ResponsibleParty::Member(id) => format!("member:{id}"),
            ResponsibleParty::Group(id) => format!("group:{id}"),
        }
    }

    /// Parses a form value produced by [ResponsibleParty::form_value].
    pub fn parse(text: &str) -> Result<Self, Error> {
        let (prefix, id) = text.split_once(':').ok_or(Error::InvalidReference)?;
        let id: DatabaseId = id.parse().map_err(|_| Error::InvalidReference)?;

        match prefix {
            "member" => Ok(ResponsibleParty::Member(id)),
            "group" => Ok(ResponsibleParty::Group(id)),
            _ => Err(Error::InvalidReference),
        }
    }
}

/// A single money movement.
///
/// A transfer is two of these linked both ways via `linked_transaction_id`,
/// with the sent leg inserted first (so the sent leg's ID is the lower of
/// the pair).
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: TransactionId,
    pub user_id: DatabaseId,
    pub amount: f64,
    pub date: Date,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub recurrence: Recurrence,
    pub description: String,
    pub category_id: Option<CategoryId>,
    pub account_id: AccountId,
    pub counterpart_account_id: Option<AccountId>,
    pub responsible: Option<ResponsibleParty>,
    pub period_id: Option<PeriodId>,
    pub linked_transaction_id: Option<TransactionId>,
}

/// The fields for creating or updating a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionData<'a> {
    pub amount: f64,
    pub date: Date,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub recurrence: Recurrence,
    pub description: &'a str,
    pub category_id: Option<CategoryId>,
    pub account_id: AccountId,
    pub counterpart_account_id: Option<AccountId>,
    pub responsible: Option<ResponsibleParty>,
    pub period_id: Option<PeriodId>,
}

/// Create the transaction table if it does not exist.
///
/// Deleting a category sets its transactions' category to NULL. Deleting a
/// transfer leg cascades to its linked leg so no half of a transfer is left
/// behind.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id),
            amount REAL NOT NULL CHECK (amount > 0),
            date TEXT NOT NULL,
            kind TEXT NOT NULL,
            status TEXT NOT NULL,
            recurrence TEXT NOT NULL DEFAULT 'one-off',
            description TEXT NOT NULL DEFAULT '',
            category_id INTEGER REFERENCES category(id) ON DELETE SET NULL,
            account_id INTEGER NOT NULL REFERENCES account(id),
            counterpart_account_id INTEGER REFERENCES account(id),
            responsible_member_id INTEGER REFERENCES member(id),
            responsible_group_id INTEGER REFERENCES \"group\"(id),
            period_id INTEGER REFERENCES period(id),
            linked_transaction_id INTEGER REFERENCES \"transaction\"(id) ON DELETE CASCADE,
            CHECK (responsible_member_id IS NULL OR responsible_group_id IS NULL)
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_transaction(row: &rusqlite::Row) -> Result<Transaction, rusqlite::Error> {
    let responsible_member_id: Option<DatabaseId> = row.get(11)?;
    let responsible_group_id: Option<DatabaseId> = row.get(12)?;

    let responsible = match (responsible_member_id, responsible_group_id) {
        (Some(member_id), None) => Some(ResponsibleParty::Member(member_id)),
        (None, Some(group_id)) => Some(ResponsibleParty::Group(group_id)),
        _ => None,
    };

    Ok(Transaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        amount: row.get(2)?,
        date: row.get(3)?,
        kind: row.get(4)?,
        status: row.get(5)?,
        recurrence: row.get(6)?,
        description: row.get(7)?,
        category_id: row.get(8)?,
        account_id: row.get(9)?,
        counterpart_account_id: row.get(10)?,
        responsible,
        period_id: row.get(13)?,
        linked_transaction_id: row.get(14)?,
    })
}

const TRANSACTION_COLUMNS: &str = "id, user_id, amount, date, kind, status, recurrence, \
    description, category_id, account_id, counterpart_account_id, \
    responsible_member_id, responsible_group_id, period_id, linked_transaction_id";

/// Create a new transaction.
///
/// # Errors
/// Returns [Error::NonPositiveAmount] if the amount is zero or negative,
/// [Error::MissingCounterpartAccount]/[Error::SameTransferAccounts] for
/// malformed transfers, [Error::InvalidReference] if a referenced record
/// does not exist for this user, or [Error::SqlError] for other SQL errors.
pub fn create_transaction(
    data: &TransactionData,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    validate_transaction(data, user_id, connection)?;

    let (responsible_member_id, responsible_group_id) = split_responsible(data.responsible);

    let transaction = connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" (user_id, amount, date, kind, status, recurrence, \
                description, category_id, account_id, counterpart_account_id, \
                responsible_member_id, responsible_group_id, period_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_one(
            params![
                user_id,
                data.amount,
                data.date,
                data.kind,
                data.status,
                data.recurrence,
                data.description,
                data.category_id,
                data.account_id,
                data.counterpart_account_id,
                responsible_member_id,
                responsible_group_id,
                data.period_id,
            ],
            map_row_to_transaction,
        )?;

    Ok(transaction)
}

/// Retrieve a transaction by its `id`.
pub fn get_transaction(
    id: TransactionId,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_one((id, user_id), map_row_to_transaction)?;

    Ok(transaction)
}

/// Retrieve all of the user's transactions, newest first.
pub fn get_all_transactions(
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\"
            WHERE user_id = ?1 ORDER BY date DESC, id DESC"
        ))?
        .query_map([user_id], map_row_to_transaction)?
        .map(|transaction_result| transaction_result.map_err(Error::from))
        .collect()
}

/// Update a transaction's fields. The link to a transfer's other leg is
/// never touched by updates.
pub fn update_transaction(
    id: TransactionId,
    data: &TransactionData,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<usize, Error> {
    validate_transaction(data, user_id, connection)?;

    let (responsible_member_id, responsible_group_id) = split_responsible(data.responsible);

    connection
        .execute(
            "UPDATE \"transaction\" SET \
                amount = ?1, \
                date = ?2, \
                kind = ?3, \
                status = ?4, \
                recurrence = ?5, \
                description = ?6, \
                category_id = ?7, \
                account_id = ?8, \
                counterpart_account_id = ?9, \
                responsible_member_id = ?10, \
                responsible_group_id = ?11, \
                period_id = ?12 \
            WHERE id = ?13 AND user_id = ?14",
            params![
                data.amount,
                data.date,
                data.kind,
                data.status,
                data.recurrence,
                data.description,
                data.category_id,
                data.account_id,
                data.counterpart_account_id,
                responsible_member_id,
                responsible_group_id,
                data.period_id,
                id,
                user_id,
            ],
        )
        .map_err(Error::from)
}

/// Delete a transaction. Deleting a transfer leg deletes the linked leg too.
///
/// # Errors
/// Returns [Error::NotFound] if `id` does not refer to one of the user's
/// transactions.
pub fn delete_transaction(
    id: TransactionId,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

fn split_responsible(
    responsible: Option<ResponsibleParty>,
) -> (Option<DatabaseId>, Option<DatabaseId>) {
    match responsible {
        Some(ResponsibleParty::Member(id)) => (Some(id), None),
        Some(ResponsibleParty::Group(id)) => (None, Some(id)),
        None => (None, None),
    }
}

fn validate_transaction(
    data: &TransactionData,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<(), Error> {
    if data.amount <= 0.0 {
        return Err(Error::NonPositiveAmount(data.amount));
    }

    if data.kind == TransactionKind::Transfer {
        let counterpart_account_id = data
            .counterpart_account_id
            .ok_or(Error::MissingCounterpartAccount)?;

        if counterpart_account_id == data.account_id {
            return Err(Error::SameTransferAccounts);
        }
    }

    assert_owned(
        "SELECT COUNT(*) FROM account WHERE id = ?1 AND user_id = ?2",
        data.account_id,
        user_id,
        connection,
    )?;

    if let Some(counterpart_account_id) = data.counterpart_account_id {
        assert_owned(
            "SELECT COUNT(*) FROM account WHERE id = ?1 AND user_id = ?2",
            counterpart_account_id,
            user_id,
            connection,
        )?;
    }

    if let Some(category_id) = data.category_id {
        assert_owned(
            "SELECT COUNT(*) FROM category WHERE id = ?1 AND user_id = ?2",
            category_id,
            user_id,
            connection,
        )?;
    }

    if let Some(period_id) = data.period_id {
        assert_owned(
            "SELECT COUNT(*) FROM period WHERE id = ?1 AND user_id = ?2",
            period_id,
            user_id,
            connection,
        )?;
    }

    match data.responsible {
        Some(ResponsibleParty::Member(member_id)) => assert_owned(
            "SELECT COUNT(*) FROM member WHERE id = ?1 AND user_id = ?2",
            member_id,
            user_id,
            connection,
        ),
        Some(ResponsibleParty::Group(group_id)) => assert_owned(
            "SELECT COUNT(*) FROM \"group\" WHERE id = ?1 AND user_id = ?2",
            group_id,
            user_id,
            connection,
        ),
        None => Ok(()),
    }
}

fn assert_owned(
    query: &str,
    id: DatabaseId,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<(), Error> {
    let count: i64 = connection
        .prepare(query)?
        .query_one((id, user_id), |row| row.get(0))?;

    if count == 0 {
        return Err(Error::InvalidReference);
    }

    Ok(())
}

#[cfg(test)]
mod transaction_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        account::{Account, AccountKind, AccountOwner, create_account},
        category::{create_category, delete_category},
        member::create_member,
        test_utils::must_create_test_connection,
        transaction::core::{
            Recurrence, ResponsibleParty, TransactionData, TransactionKind, TransactionStatus,
            create_transaction, delete_transaction, get_all_transactions, get_transaction,
            update_transaction,
        },
    };

    #[test]
    fn creates_expense() {
        let connection = must_create_test_connection();
        let account = must_create_account(&connection, "Everyday");

        let transaction = create_transaction(
            &TransactionData {
                description: "Weekly shop",
                ..expense(&account)
            },
            1,
            &connection,
        )
        .unwrap();

        assert_eq!(transaction.kind, TransactionKind::Expense);
        assert_eq!(transaction.amount, 42.5);
        assert_eq!(transaction.description, "Weekly shop");
        assert_eq!(transaction.linked_transaction_id, None);
    }

    #[test]
    fn rejects_non_positive_amount() {
        let connection = must_create_test_connection();
        let account = must_create_account(&connection, "Everyday");

        let result = create_transaction(
            &TransactionData {
                amount: 0.0,
                ..expense(&account)
            },
            1,
            &connection,
        );

        assert_eq!(result, Err(Error::NonPositiveAmount(0.0)));
    }

    #[test]
    fn rejects_transfer_without_counterpart() {
        let connection = must_create_test_connection();
        let account = must_create_account(&connection, "Everyday");

        let result = create_transaction(
            &TransactionData {
                kind: TransactionKind::Transfer,
                counterpart_account_id: None,
                ..expense(&account)
            },
            1,
            &connection,
        );

        assert_eq!(result, Err(Error::MissingCounterpartAccount));
    }

    #[test]
    fn rejects_transfer_to_same_account() {
        let connection = must_create_test_connection();
        let account = must_create_account(&connection, "Everyday");

        let result = create_transaction(
            &TransactionData {
                kind: TransactionKind::Transfer,
                counterpart_account_id: Some(account.id),
                ..expense(&account)
            },
            1,
            &connection,
        );

        assert_eq!(result, Err(Error::SameTransferAccounts));
    }

    #[test]
    fn rejects_account_from_another_user() {
        let connection = must_create_test_connection();
        let account = must_create_account(&connection, "Everyday");

        let result = create_transaction(&expense(&account), 2, &connection);

        assert_eq!(result, Err(Error::InvalidReference));
    }

    #[test]
    fn records_responsible_member() {
        let connection = must_create_test_connection();
        let account = must_create_account(&connection, "Everyday");
        let bob = create_member("Bob", 1, &connection).unwrap();

        let transaction = create_transaction(
            &TransactionData {
                responsible: Some(ResponsibleParty::Member(bob.id)),
                ..expense(&account)
            },
            1,
            &connection,
        )
        .unwrap();

        assert_eq!(
            transaction.responsible,
            Some(ResponsibleParty::Member(bob.id))
        );
    }

    #[test]
    fn updates_transaction() {
        let connection = must_create_test_connection();
        let account = must_create_account(&connection, "Everyday");
        let transaction = create_transaction(&expense(&account), 1, &connection).unwrap();

        let rows_affected = update_transaction(
            transaction.id,
            &TransactionData {
                amount: 99.0,
                status: TransactionStatus::Planned,
                ..expense(&account)
            },
            1,
            &connection,
        )
        .unwrap();

        assert_eq!(rows_affected, 1);
        let updated = get_transaction(transaction.id, 1, &connection).unwrap();
        assert_eq!(updated.amount, 99.0);
        assert_eq!(updated.status, TransactionStatus::Planned);
    }

    #[test]
    fn deletes_transaction() {
        let connection = must_create_test_connection();
        let account = must_create_account(&connection, "Everyday");
        let transaction = create_transaction(&expense(&account), 1, &connection).unwrap();

        delete_transaction(transaction.id, 1, &connection).unwrap();

        assert!(get_all_transactions(1, &connection).unwrap().is_empty());
    }

    #[test]
    fn deleting_missing_transaction_errors() {
        let connection = must_create_test_connection();

        assert_eq!(delete_transaction(999, 1, &connection), Err(Error::NotFound));
    }

    #[test]
    fn deleting_category_clears_transaction_reference() {
        let connection = must_create_test_connection();
        let account = must_create_account(&connection, "Everyday");
        let groceries = create_category("Groceries", None, 1, &connection).unwrap();
        let transaction = create_transaction(
            &TransactionData {
                category_id: Some(groceries.id),
                ..expense(&account)
            },
            1,
            &connection,
        )
        .unwrap();

        delete_category(groceries.id, 1, &connection).unwrap();

        let reloaded = get_transaction(transaction.id, 1, &connection).unwrap();
        assert_eq!(reloaded.category_id, None);
    }

    fn expense(account: &Account) -> TransactionData<'static> {
        TransactionData {
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
        }
    }

    #[track_caller]
    fn must_create_account(connection: &Connection, name: &str) -> Account {
        let member = create_member(&format!("{name} owner"), 1, connection)
            .expect("could not create test member");

        create_account(
            name,
            AccountKind::Checking,
            0.0,
            AccountOwner::Member(member.id),
            1,
            connection,
        )
        .expect("could not create test account")
    }
}
