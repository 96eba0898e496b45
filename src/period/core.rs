//! Financial periods: the named date ranges transactions are grouped under.

use rusqlite::{Connection, params};
use time::Date;

use crate::{
    Error,
    database_id::DatabaseId,
    goal::count_goals_for_period,
    period::checker::{PeriodSpan, find_overlap},
};

/// Alias for integers used as period IDs.
pub type PeriodId = DatabaseId;

/// A named date range, e.g. a month or a pay cycle.
///
/// At most one period per user is active at a time. The active period scopes
/// the dashboard. An archived period was soft-deleted while still referenced:
/// it stays attached to its historical records but is hidden from pickers,
/// cannot be activated, and no longer constrains new periods' dates.
#[derive(Debug, Clone, PartialEq)]
pub struct Period {
    pub id: PeriodId,
    pub user_id: DatabaseId,
    pub name: String,
    pub start: Date,
    pub end: Date,
    pub is_active: bool,
    pub is_archived: bool,
}

/// Create the period table if it does not exist.
pub fn create_period_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS period (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id),
            name TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 0,
            is_archived INTEGER NOT NULL DEFAULT 0
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_period(row: &rusqlite::Row) -> Result<Period, rusqlite::Error> {
    Ok(Period {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        start: row.get(3)?,
        end: row.get(4)?,
        is_active: row.get(5)?,
        is_archived: row.get(6)?,
    })
}

const SELECT_PERIOD: &str =
    "SELECT id, user_id, name, start_date, end_date, is_active, is_archived FROM period";

/// Create a new period. New periods start inactive.
///
/// # Errors
/// Returns [Error::EmptyName] if `name` is blank, [Error::InvalidDateRange]
/// if `end` is not after `start`, [Error::PeriodOverlap] if the dates
/// overlap an existing period, or [Error::SqlError] for other SQL errors.
pub fn create_period(
    name: &str,
    start: Date,
    end: Date,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<Period, Error> {
    let name = validate_dates(name, start, end)?;
    check_overlap(start, end, None, user_id, connection)?;

    let period = connection
        .prepare(
            "INSERT INTO period (user_id, name, start_date, end_date) VALUES (?1, ?2, ?3, ?4)
            RETURNING id, user_id, name, start_date, end_date, is_active, is_archived",
        )?
        .query_one(params![user_id, name, start, end], map_row_to_period)?;

    Ok(period)
}

/// Retrieve a period by its `id`.
pub fn get_period(
    id: PeriodId,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<Period, Error> {
    let period = connection
        .prepare(&format!("{SELECT_PERIOD} WHERE id = ?1 AND user_id = ?2"))?
        .query_one((id, user_id), map_row_to_period)?;

    Ok(period)
}

/// Retrieve all of the user's periods, most recent first. Includes archived
/// periods, for listing history.
pub fn get_all_periods(
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<Vec<Period>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_PERIOD} WHERE user_id = ?1 ORDER BY start_date DESC"
        ))?
        .query_map([user_id], map_row_to_period)?
        .map(|period_result| period_result.map_err(Error::from))
        .collect()
}

/// Retrieve the user's periods that may still be assigned to transactions,
/// most recent first. Archived periods are excluded.
pub fn get_selectable_periods(
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<Vec<Period>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_PERIOD} WHERE user_id = ?1 AND is_archived = 0 ORDER BY start_date DESC"
        ))?
        .query_map([user_id], map_row_to_period)?
        .map(|period_result| period_result.map_err(Error::from))
        .collect()
}

/// Retrieve the user's active period, if any.
pub fn get_active_period(
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<Option<Period>, Error> {
    match connection
        .prepare(&format!(
            "{SELECT_PERIOD} WHERE user_id = ?1 AND is_active = 1"
        ))?
        .query_one([user_id], map_row_to_period)
    {
        Ok(period) => Ok(Some(period)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(error) => Err(error.into()),
    }
}

/// The dates of the user's periods, excluding `exclude_id` when editing.
/// Archived periods are hidden, so their dates do not constrain new ones.
pub fn get_period_spans(
    exclude_id: Option<PeriodId>,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<Vec<PeriodSpan>, Error> {
    connection
        .prepare(
            "SELECT name, start_date, end_date FROM period
            WHERE user_id = ?1 AND id IS NOT ?2 AND is_archived = 0
            ORDER BY start_date ASC",
        )?
        .query_map(params![user_id, exclude_id], |row| {
            Ok(PeriodSpan {
                name: row.get(0)?,
                start: row.get(1)?,
                end: row.get(2)?,
            })
        })?
        .map(|span_result| span_result.map_err(Error::from))
        .collect()
}

/// Update a period's name and dates.
pub fn update_period(
    id: PeriodId,
    name: &str,
    start: Date,
    end: Date,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<usize, Error> {
    let name = validate_dates(name, start, end)?;
    check_overlap(start, end, Some(id), user_id, connection)?;

    connection
        .execute(
            "UPDATE period SET name = ?1, start_date = ?2, end_date = ?3
            WHERE id = ?4 AND user_id = ?5",
            params![name, start, end, id, user_id],
        )
        .map_err(Error::from)
}

/// Make `id` the user's active period, deactivating any other.
///
/// # Errors
/// Returns [Error::NotFound] if `id` does not refer to one of the user's
/// periods, or if the period is archived.
pub fn set_active_period(
    id: PeriodId,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<(), Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    sql_transaction.execute(
        "UPDATE period SET is_active = 0 WHERE user_id = ?1",
        [user_id],
    )?;

    let rows_affected = sql_transaction.execute(
        "UPDATE period SET is_active = 1 WHERE id = ?1 AND user_id = ?2 AND is_archived = 0",
        params![id, user_id],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    sql_transaction.commit()?;

    Ok(())
}

/// Count the records that reference a period: its transactions and goals.
/// A period with a non-zero count must be archived instead of deleted.
pub fn count_period_references(
    id: PeriodId,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<i64, Error> {
    let transaction_count: i64 = connection
        .prepare("SELECT COUNT(*) FROM \"transaction\" WHERE period_id = ?1 AND user_id = ?2")?
        .query_one((id, user_id), |row| row.get(0))?;

    let goal_count = count_goals_for_period(id, user_id, connection)?;

    Ok(transaction_count + goal_count)
}

fn validate_dates<'a>(name: &'a str, start: Date, end: Date) -> Result<&'a str, Error> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::EmptyName("period"));
    }

    if end <= start {
        return Err(Error::InvalidDateRange);
    }

    Ok(name)
}

fn check_overlap(
    start: Date,
    end: Date,
    exclude_id: Option<PeriodId>,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<(), Error> {
    let spans = get_period_spans(exclude_id, user_id, connection)?;

    if let Some(conflict) = find_overlap(start, end, &spans) {
        return Err(Error::PeriodOverlap(conflict.name.clone()));
    }

    Ok(())
}
