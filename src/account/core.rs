//! The money accounts (bank accounts, cards, cash floats) that transactions
//! move money between.

use rusqlite::{
    Connection, params,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::Deserialize;

use crate::{Error, database_id::DatabaseId};

/// Alias for integers used as account IDs.
pub type AccountId = DatabaseId;

/// What sort of account this is. Stored as kebab-case TEXT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccountKind {
    Checking,
    Savings,
    CreditCard,
    Cash,
    Investment,
    Other,
}

impl AccountKind {
    /// Every kind, in the order they appear in pickers.
    pub const ALL: [AccountKind; 6] = [
        AccountKind::Checking,
        AccountKind::Savings,
        AccountKind::CreditCard,
        AccountKind::Cash,
        AccountKind::Investment,
        AccountKind::Other,
    ];

    /// The kebab-case form used in the database and form values.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Checking => "checking",
            AccountKind::Savings => "savings",
            AccountKind::CreditCard => "credit-card",
            AccountKind::Cash => "cash",
            AccountKind::Investment => "investment",
            AccountKind::Other => "other",
        }
    }

    /// The human-readable form shown in pages.
    pub fn label(&self) -> &'static str {
        match self {
            AccountKind::Checking => "Checking",
            AccountKind::Savings => "Savings",
            AccountKind::CreditCard => "Credit card",
            AccountKind::Cash => "Cash",
            AccountKind::Investment => "Investment",
            AccountKind::Other => "Other",
        }
    }

    fn from_str(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == text)
    }
}

impl FromSql for AccountKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        Self::from_str(text).ok_or_else(|| FromSqlError::Other(
            format!("unknown account kind {text:?}").into(),
        ))
    }
}

impl ToSql for AccountKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

/// Who an account belongs to: exactly one member or one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountOwner {
    Member(DatabaseId),
    Group(DatabaseId),
}

impl AccountOwner {
    /// The value used in the owner select, e.g. `member:3` or `group:2`.
    pub fn form_value(&self) -> String {
        match self {
            AccountOwner::Member(id) => format!("member:{id}"),
            AccountOwner::Group(id) => format!("group:{id}"),
        }
    }

    /// Parses a form value produced by [AccountOwner::form_value].
    ///
    /// # Errors
    /// Returns [Error::InvalidReference] for anything else, since a
    /// well-behaved client only submits values the server rendered.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let (prefix, id) = text.split_once(':').ok_or(Error::InvalidReference)?;
        let id: DatabaseId = id.parse().map_err(|_| Error::InvalidReference)?;

        match prefix {
            "member" => Ok(AccountOwner::Member(id)),
            "group" => Ok(AccountOwner::Group(id)),
            _ => Err(Error::InvalidReference),
        }
    }
}

/// A money account.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: AccountId,
    pub user_id: DatabaseId,
    pub name: String,
    pub kind: AccountKind,
    pub opening_balance: f64,
    pub owner: AccountOwner,
    pub is_active: bool,
}

/// Create the account table if it does not exist.
pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id),
            name TEXT NOT NULL,
            kind TEXT NOT NULL,
            opening_balance REAL NOT NULL DEFAULT 0,
            owner_member_id INTEGER REFERENCES member(id),
            owner_group_id INTEGER REFERENCES \"group\"(id),
            is_active INTEGER NOT NULL DEFAULT 1,
            CHECK ((owner_member_id IS NULL) <> (owner_group_id IS NULL))
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_account(row: &rusqlite::Row) -> Result<Account, rusqlite::Error> {
    let owner_member_id: Option<DatabaseId> = row.get(5)?;
    let owner_group_id: Option<DatabaseId> = row.get(6)?;

    let owner = match (owner_member_id, owner_group_id) {
        (Some(member_id), None) => AccountOwner::Member(member_id),
        (None, Some(group_id)) => AccountOwner::Group(group_id),
        // The CHECK constraint makes the other combinations unreachable.
        _ => {
            return Err(rusqlite::Error::FromSqlConversionFailure(
                5,
                rusqlite::types::Type::Integer,
                "account owner columns are inconsistent".into(),
            ));
        }
    };

    Ok(Account {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        kind: row.get(3)?,
        opening_balance: row.get(4)?,
        owner,
        is_active: row.get(7)?,
    })
}

const SELECT_ACCOUNT: &str = "SELECT id, user_id, name, kind, opening_balance, \
    owner_member_id, owner_group_id, is_active FROM account";

/// Create a new account.
///
/// # Errors
/// Returns [Error::EmptyName] if `name` is blank,
/// [Error::InvalidReference] if the owner does not exist for this user, or
/// [Error::SqlError] for other SQL errors.
pub fn create_account(
    name: &str,
    kind: AccountKind,
    opening_balance: f64,
    owner: AccountOwner,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<Account, Error> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::EmptyName("account"));
    }

    validate_owner(owner, user_id, connection)?;

    let (owner_member_id, owner_group_id) = match owner {
        AccountOwner::Member(id) => (Some(id), None),
        AccountOwner::Group(id) => (None, Some(id)),
    };

    let account = connection
        .prepare(
            "INSERT INTO account \
                (user_id, name, kind, opening_balance, owner_member_id, owner_group_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING id, user_id, name, kind, opening_balance, \
                owner_member_id, owner_group_id, is_active",
        )?
        .query_one(
            params![
                user_id,
                name,
                kind,
                opening_balance,
                owner_member_id,
                owner_group_id
            ],
            map_row_to_account,
        )?;

    Ok(account)
}

/// Retrieve an account by its `id`.
pub fn get_account(
    id: AccountId,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<Account, Error> {
    let account = connection
        .prepare(&format!("{SELECT_ACCOUNT} WHERE id = ?1 AND user_id = ?2"))?
        .query_one((id, user_id), map_row_to_account)?;

    Ok(account)
}

/// Retrieve all of the user's accounts, active and inactive.
pub fn get_all_accounts(
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<Vec<Account>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_ACCOUNT} WHERE user_id = ?1 ORDER BY is_active DESC, name ASC"
        ))?
        .query_map([user_id], map_row_to_account)?
        .map(|account_result| account_result.map_err(Error::from))
        .collect()
}

/// Retrieve the user's active accounts, for use in pickers.
pub fn get_active_accounts(
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<Vec<Account>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_ACCOUNT} WHERE user_id = ?1 AND is_active = 1 ORDER BY name ASC"
        ))?
        .query_map([user_id], map_row_to_account)?
        .map(|account_result| account_result.map_err(Error::from))
        .collect()
}

/// Update an account's details.
pub fn update_account(
    id: AccountId,
    name: &str,
    kind: AccountKind,
    opening_balance: f64,
    owner: AccountOwner,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<usize, Error> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::EmptyName("account"));
    }

    validate_owner(owner, user_id, connection)?;

    let (owner_member_id, owner_group_id) = match owner {
        AccountOwner::Member(id) => (Some(id), None),
        AccountOwner::Group(id) => (None, Some(id)),
    };

    connection
        .execute(
            "UPDATE account SET \
                name = ?1, \
                kind = ?2, \
                opening_balance = ?3, \
                owner_member_id = ?4, \
                owner_group_id = ?5 \
            WHERE id = ?6 AND user_id = ?7",
            params![
                name,
                kind,
                opening_balance,
                owner_member_id,
                owner_group_id,
                id,
                user_id
            ],
        )
        .map_err(Error::from)
}

/// Count the transactions that touch an account, either directly or as the
/// other side of a transfer. An account with a non-zero count must be
/// archived instead of deleted.
pub fn count_account_references(
    id: AccountId,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<i64, Error> {
    let count = connection
        .prepare(
            "SELECT COUNT(*) FROM \"transaction\"
            WHERE (account_id = ?1 OR counterpart_account_id = ?1) AND user_id = ?2",
        )?
        .query_one((id, user_id), |row| row.get(0))?;

    Ok(count)
}

/// The current balance of each account: the opening balance plus all
/// completed transactions. Transfer legs are signed by direction: the
/// sent leg (inserted first, so its ID is below its linked leg's) subtracts,
/// the received leg adds.
pub fn get_account_balance(
    id: AccountId,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<f64, Error> {
    let balance = connection
        .prepare(
            "SELECT
                (SELECT opening_balance FROM account WHERE id = ?1 AND user_id = ?2)
                + COALESCE((SELECT SUM(CASE
                    WHEN kind = 'income' THEN amount
                    WHEN kind = 'expense' THEN -amount
                    WHEN id < linked_transaction_id THEN -amount
                    ELSE amount
                END)
                FROM \"transaction\"
                WHERE account_id = ?1 AND user_id = ?2 AND status = 'completed'), 0)",
        )?
        .query_one((id, user_id), |row| {
            row.get::<_, Option<f64>>(0)
        })?
        .ok_or(Error::NotFound)?;

    Ok(balance)
}

fn validate_owner(
    owner: AccountOwner,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<(), Error> {
    let (query, id) = match owner {
        AccountOwner::Member(id) => (
            "SELECT COUNT(*) FROM member WHERE id = ?1 AND user_id = ?2",
            id,
        ),
        AccountOwner::Group(id) => (
            "SELECT COUNT(*) FROM \"group\" WHERE id = ?1 AND user_id = ?2",
            id,
        ),
    };

    let count: i64 = connection
        .prepare(query)?
        .query_one((id, user_id), |row| row.get(0))?;

    if count == 0 {
        return Err(Error::InvalidReference);
    }

    Ok(())
}

#[cfg(test)]
mod account_kind_tests {
    use super::AccountKind;

    #[test]
    fn round_trips_kebab_case() {
        for kind in AccountKind::ALL {
            assert_eq!(AccountKind::from_str(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn deserializes_credit_card_from_form_value() {
        let kind: AccountKind = serde_urlencoded::from_str::<Wrapper>("kind=credit-card")
            .unwrap()
            .kind;

        assert_eq!(kind, AccountKind::CreditCard);
    }

    #[derive(serde::Deserialize)]
    struct Wrapper {
        kind: AccountKind,
    }
}
