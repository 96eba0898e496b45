//! The household members that own accounts and are responsible for spending.

use rusqlite::Connection;

use crate::{Error, database_id::DatabaseId};

/// Alias for integers used as member IDs.
pub type MemberId = DatabaseId;

/// A person in the household.
///
/// Members that are still referenced by transactions, accounts or groups are
/// never deleted outright. Instead they are marked inactive, which hides them
/// from pickers while keeping historical records intact.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub id: MemberId,
    pub user_id: DatabaseId,
    pub name: String,
    pub is_active: bool,
}

/// Create the member table if it does not exist.
pub fn create_member_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS member (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id),
            name TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_member(row: &rusqlite::Row) -> Result<Member, rusqlite::Error> {
    Ok(Member {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        is_active: row.get(3)?,
    })
}

/// Create a new, active member.
///
/// # Errors
/// Returns [Error::EmptyName] if `name` is blank, or [Error::SqlError] for
/// SQL errors.
pub fn create_member(
    name: &str,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<Member, Error> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::EmptyName("member"));
    }

    let member = connection
        .prepare(
            "INSERT INTO member (user_id, name) VALUES (?1, ?2)
            RETURNING id, user_id, name, is_active",
        )?
        .query_one((user_id, name), map_row_to_member)?;

    Ok(member)
}

/// Retrieve a member by its `id`.
///
/// # Errors
/// Returns [Error::NotFound] if `id` does not refer to one of the user's
/// members, or [Error::SqlError] for other SQL errors.
pub fn get_member(
    id: MemberId,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<Member, Error> {
    let member = connection
        .prepare(
            "SELECT id, user_id, name, is_active FROM member
            WHERE id = ?1 AND user_id = ?2",
        )?
        .query_one((id, user_id), map_row_to_member)?;

    Ok(member)
}

/// Retrieve all of the user's members, active and inactive.
pub fn get_all_members(
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<Vec<Member>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, is_active FROM member
            WHERE user_id = ?1
            ORDER BY is_active DESC, name ASC",
        )?
        .query_map([user_id], map_row_to_member)?
        .map(|member_result| member_result.map_err(Error::from))
        .collect()
}

/// Retrieve the user's active members, for use in pickers.
pub fn get_active_members(
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<Vec<Member>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, is_active FROM member
            WHERE user_id = ?1 AND is_active = 1
            ORDER BY name ASC",
        )?
        .query_map([user_id], map_row_to_member)?
        .map(|member_result| member_result.map_err(Error::from))
        .collect()
}

/// Count the records that reference a member: transactions the member is
/// responsible for, accounts the member owns and groups the member belongs
/// to. A member with a non-zero count must be archived instead of deleted.
pub fn count_member_references(
    id: MemberId,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<i64, Error> {
    let count = connection
        .prepare(
            "SELECT
                (SELECT COUNT(*) FROM \"transaction\"
                    WHERE responsible_member_id = ?1 AND user_id = ?2)
                + (SELECT COUNT(*) FROM account
                    WHERE owner_member_id = ?1 AND user_id = ?2)
                + (SELECT COUNT(*) FROM group_member WHERE member_id = ?1)",
        )?
        .query_one((id, user_id), |row| row.get(0))?;

    Ok(count)
}
