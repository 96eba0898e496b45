//! Per-period spending goals.
//!
//! Goals cap how much should be spent on a category within a financial
//! period. They have no pages of their own yet, but they count as references
//! when deciding whether a period can be deleted outright.

use rusqlite::{Connection, params};

use crate::{Error, database_id::DatabaseId};

/// Alias for integers used as goal IDs.
pub type GoalId = DatabaseId;

/// A spending target for one category within one period.
#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    pub id: GoalId,
    pub user_id: DatabaseId,
    pub period_id: DatabaseId,
    pub category_id: DatabaseId,
    pub amount: f64,
}

/// Create the goal table if it does not exist.
///
/// Goals are meaningless without their category, so they are removed along
/// with it.
pub fn create_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS goal (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id),
            period_id INTEGER NOT NULL REFERENCES period(id),
            category_id INTEGER NOT NULL REFERENCES category(id) ON DELETE CASCADE,
            amount REAL NOT NULL CHECK (amount > 0)
        )",
        (),
    )?;

    Ok(())
}

fn map_row_to_goal(row: &rusqlite::Row) -> Result<Goal, rusqlite::Error> {
    Ok(Goal {
        id: row.get(0)?,
        user_id: row.get(1)?,
        period_id: row.get(2)?,
        category_id: row.get(3)?,
        amount: row.get(4)?,
    })
}

/// Create a new goal.
///
/// # Errors
/// Returns [Error::NonPositiveAmount] if `amount` is zero or negative,
/// [Error::InvalidReference] if the period or category does not exist, or
/// [Error::SqlError] for other SQL errors.
pub fn create_goal(
    period_id: DatabaseId,
    category_id: DatabaseId,
    amount: f64,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<Goal, Error> {
    if amount <= 0.0 {
        return Err(Error::NonPositiveAmount(amount));
    }

    let goal = connection
        .prepare(
            "INSERT INTO goal (user_id, period_id, category_id, amount)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, user_id, period_id, category_id, amount",
        )?
        .query_one(
            params![user_id, period_id, category_id, amount],
            map_row_to_goal,
        )?;

    Ok(goal)
}

/// Count the goals attached to a period. A period with goals is archived
/// instead of deleted.
pub fn count_goals_for_period(
    period_id: DatabaseId,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<i64, Error> {
    let count = connection
        .prepare("SELECT COUNT(*) FROM goal WHERE period_id = ?1 AND user_id = ?2")?
        .query_one((period_id, user_id), |row| row.get(0))?;

    Ok(count)
}
