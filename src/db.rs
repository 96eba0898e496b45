//! Database initialization and demo data seeding.

use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    account::{AccountKind, AccountOwner, create_account, create_account_table},
    auth::{PasswordHash, ValidatedPassword, create_user, create_user_table},
    category::{create_category, create_category_table},
    goal::{create_goal, create_goal_table},
    group::{ApportionmentMode, create_group, create_group_table},
    member::{create_member, create_member_table},
    period::{create_period, create_period_table, set_active_period},
    transaction::{
        Recurrence, ResponsibleParty, TransactionData, TransactionKind, TransactionStatus,
        TransferData, create_transaction, create_transaction_table, record_transfer,
    },
};

/// Create the application schema.
///
/// Tables are created inside a single exclusive transaction, in foreign key
/// dependency order.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.execute_batch("PRAGMA foreign_keys = ON")?;

    let sql_transaction = rusqlite::Transaction::new_unchecked(
        connection,
        rusqlite::TransactionBehavior::Exclusive,
    )?;

    create_user_table(&sql_transaction)?;
    create_member_table(&sql_transaction)?;
    create_group_table(&sql_transaction)?;
    create_category_table(&sql_transaction)?;
    create_account_table(&sql_transaction)?;
    create_period_table(&sql_transaction)?;
    create_goal_table(&sql_transaction)?;
    create_transaction_table(&sql_transaction)?;

    sql_transaction.commit()?;

    Ok(())
}

/// The email address of the demo mode user.
pub const DEMO_EMAIL: &str = "demo@example.com";

/// The password of the demo mode user.
pub const DEMO_PASSWORD: &str = "demo";

/// Populate a freshly initialized database with sample data for demo mode.
///
/// Creates a demo user, two members sharing a household group, two accounts,
/// a category tree, an active period covering today, and a handful of
/// transactions including a transfer.
///
/// # Errors
/// Returns an error if the schema is missing or if there is an SQL error.
pub fn seed_demo_data(connection: &Connection) -> Result<(), Error> {
    // The demo database is in-memory and throwaway, so the minimum bcrypt
    // cost keeps startup snappy.
    let password_hash = PasswordHash::new(ValidatedPassword::new_unchecked(DEMO_PASSWORD), 4)?;
    let user = create_user(DEMO_EMAIL, password_hash, connection)?;
    let user_id = user.id.as_i64();

    let alice = create_member("Alice", user_id, connection)?;
    let bob = create_member("Bob", user_id, connection)?;
    let household = create_group(
        "Household",
        ApportionmentMode::ProportionalToIncome,
        &[alice.id, bob.id],
        user_id,
        connection,
    )?;

    let everyday = create_account(
        "Everyday",
        AccountKind::Checking,
        1250.0,
        AccountOwner::Member(alice.id),
        user_id,
        connection,
    )?;
    let savings = create_account(
        "Savings",
        AccountKind::Savings,
        8000.0,
        AccountOwner::Group(household.id),
        user_id,
        connection,
    )?;

    let groceries = create_category("Groceries", None, user_id, connection)?;
    let home = create_category("Home", None, user_id, connection)?;
    let utilities = create_category("Utilities", Some(home.id), user_id, connection)?;

    let today = OffsetDateTime::now_utc().date();
    let period_start = today.replace_day(1).unwrap_or(today);
    let period = create_period(
        "This month",
        period_start,
        period_start + Duration::days(30),
        user_id,
        connection,
    )?;
    set_active_period(period.id, user_id, connection)?;

    create_goal(period.id, groceries.id, 600.0, user_id, connection)?;

    create_transaction(
        &TransactionData {
            amount: 4200.0,
            date: period_start,
            kind: TransactionKind::Income,
            status: TransactionStatus::Completed,
            recurrence: Recurrence::Monthly,
            description: "Salary",
            category_id: None,
            account_id: everyday.id,
            counterpart_account_id: None,
            responsible: Some(ResponsibleParty::Member(alice.id)),
            period_id: Some(period.id),
        },
        user_id,
        connection,
    )?;
    create_transaction(
        &TransactionData {
            amount: 87.4,
            date: period_start + Duration::days(2),
            kind: TransactionKind::Expense,
            status: TransactionStatus::Completed,
            recurrence: Recurrence::Weekly,
            description: "Weekly shop",
            category_id: Some(groceries.id),
            account_id: everyday.id,
            counterpart_account_id: None,
            responsible: Some(ResponsibleParty::Group(household.id)),
            period_id: Some(period.id),
        },
        user_id,
        connection,
    )?;
    create_transaction(
        &TransactionData {
            amount: 142.1,
            date: period_start + Duration::days(14),
            kind: TransactionKind::Expense,
            status: TransactionStatus::Planned,
            recurrence: Recurrence::Monthly,
            description: "Power bill",
            category_id: Some(utilities.id),
            account_id: everyday.id,
            counterpart_account_id: None,
            responsible: Some(ResponsibleParty::Group(household.id)),
            period_id: Some(period.id),
        },
        user_id,
        connection,
    )?;

    record_transfer(
        &TransferData {
            amount: 500.0,
            date: period_start + Duration::days(5),
            source_account_id: everyday.id,
            counterpart_account_id: savings.id,
            description: "Monthly savings",
            period_id: Some(period.id),
        },
        user_id,
        connection,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{
        db::{initialize, seed_demo_data},
        period::get_active_period,
        transaction::{TransactionKind, get_all_transactions},
    };

    #[test]
    fn initialize_creates_all_tables() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).unwrap();

        let table_count: i64 = connection
            .prepare(
                "SELECT COUNT(*) FROM sqlite_master
                WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
            )
            .unwrap()
            .query_one((), |row| row.get(0))
            .unwrap();
        // user, member, group, group_member, category, account, period,
        // goal and transaction.
        assert_eq!(table_count, 9);
    }

    #[test]
    fn seed_creates_an_active_period_and_transactions() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        seed_demo_data(&connection).unwrap();

        assert!(get_active_period(1, &connection).unwrap().is_some());
        let transactions = get_all_transactions(1, &connection).unwrap();
        assert_eq!(transactions.len(), 5);
        assert_eq!(
            transactions
                .iter()
                .filter(|transaction| transaction.kind == TransactionKind::Transfer)
                .count(),
            2
        );
    }
}
