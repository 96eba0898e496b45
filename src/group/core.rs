//! Cost-sharing groups of members.

use rusqlite::{
    Connection, params,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::Deserialize;

use crate::{
    Error,
    database_id::DatabaseId,
    member::{Member, MemberId},
};

/// Alias for integers used as group IDs.
pub type GroupId = DatabaseId;

/// How a group's shared costs are split between its members. Stored as
/// kebab-case TEXT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApportionmentMode {
    /// Each member pays in proportion to their income.
    ProportionalToIncome,
    /// Costs are split by fixed shares.
    Fixed,
}

impl ApportionmentMode {
    pub const ALL: [ApportionmentMode; 2] =
        [ApportionmentMode::ProportionalToIncome, ApportionmentMode::Fixed];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApportionmentMode::ProportionalToIncome => "proportional-to-income",
            ApportionmentMode::Fixed => "fixed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ApportionmentMode::ProportionalToIncome => "Proportional to income",
            ApportionmentMode::Fixed => "Fixed shares",
        }
    }

    fn from_str(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.as_str() == text)
    }
}

impl FromSql for ApportionmentMode {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        Self::from_str(text).ok_or_else(|| {
            FromSqlError::Other(format!("unknown apportionment mode {text:?}").into())
        })
    }
}

impl ToSql for ApportionmentMode {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

/// A named set of members that shares costs.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub id: GroupId,
    pub user_id: DatabaseId,
    pub name: String,
    pub apportionment_mode: ApportionmentMode,
    pub is_active: bool,
}

/// Create the group and group membership tables if they do not exist.
///
/// `group` is a SQL keyword, so the table name is quoted everywhere.
pub fn create_group_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"group\" (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id),
            name TEXT NOT NULL,
            apportionment_mode TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1
        )",
        (),
    )?;

    connection.execute(
        "CREATE TABLE IF NOT EXISTS group_member (
            group_id INTEGER NOT NULL REFERENCES \"group\"(id) ON DELETE CASCADE,
            member_id INTEGER NOT NULL REFERENCES member(id),
            PRIMARY KEY (group_id, member_id)
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_group(row: &rusqlite::Row) -> Result<Group, rusqlite::Error> {
    Ok(Group {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        apportionment_mode: row.get(3)?,
        is_active: row.get(4)?,
    })
}

const SELECT_GROUP: &str =
    "SELECT id, user_id, name, apportionment_mode, is_active FROM \"group\"";

/// Create a new group with its member links, atomically.
///
/// # Errors
/// Returns [Error::EmptyName] if `name` is blank, [Error::EmptyGroup] if
/// `member_ids` is empty, [Error::InvalidReference] if any member does not
/// exist for this user, or [Error::SqlError] for other SQL errors.
pub fn create_group(
    name: &str,
    apportionment_mode: ApportionmentMode,
    member_ids: &[MemberId],
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<Group, Error> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::EmptyName("group"));
    }

    if member_ids.is_empty() {
        return Err(Error::EmptyGroup);
    }

    validate_members(member_ids, user_id, connection)?;

    let sql_transaction = connection.unchecked_transaction()?;

    let group = sql_transaction
        .prepare(
            "INSERT INTO \"group\" (user_id, name, apportionment_mode) VALUES (?1, ?2, ?3)
            RETURNING id, user_id, name, apportionment_mode, is_active",
        )?
        .query_one(params![user_id, name, apportionment_mode], map_row_to_group)?;

    for member_id in member_ids {
        sql_transaction.execute(
            "INSERT INTO group_member (group_id, member_id) VALUES (?1, ?2)",
            params![group.id, member_id],
        )?;
    }

    sql_transaction.commit()?;

    Ok(group)
}

/// Retrieve a group by its `id`.
pub fn get_group(
    id: GroupId,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<Group, Error> {
    let group = connection
        .prepare(&format!("{SELECT_GROUP} WHERE id = ?1 AND user_id = ?2"))?
        .query_one((id, user_id), map_row_to_group)?;

    Ok(group)
}

/// Retrieve all of the user's groups, active and inactive.
pub fn get_all_groups(user_id: DatabaseId, connection: &Connection) -> Result<Vec<Group>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_GROUP} WHERE user_id = ?1 ORDER BY is_active DESC, name ASC"
        ))?
        .query_map([user_id], map_row_to_group)?
        .map(|group_result| group_result.map_err(Error::from))
        .collect()
}

/// Retrieve the user's active groups, for use in pickers.
pub fn get_active_groups(
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<Vec<Group>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_GROUP} WHERE user_id = ?1 AND is_active = 1 ORDER BY name ASC"
        ))?
        .query_map([user_id], map_row_to_group)?
        .map(|group_result| group_result.map_err(Error::from))
        .collect()
}

/// Retrieve a group's members.
pub fn get_group_members(
    group_id: GroupId,
    connection: &Connection,
) -> Result<Vec<Member>, Error> {
    connection
        .prepare(
            "SELECT m.id, m.user_id, m.name, m.is_active
            FROM member m
            JOIN group_member gm ON gm.member_id = m.id
            WHERE gm.group_id = ?1
            ORDER BY m.name ASC",
        )?
        .query_map([group_id], crate::member::map_row_to_member)?
        .map(|member_result| member_result.map_err(Error::from))
        .collect()
}

/// Update a group's details and replace its member links, atomically.
pub fn update_group(
    id: GroupId,
    name: &str,
    apportionment_mode: ApportionmentMode,
    member_ids: &[MemberId],
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<usize, Error> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::EmptyName("group"));
    }

    if member_ids.is_empty() {
        return Err(Error::EmptyGroup);
    }

    validate_members(member_ids, user_id, connection)?;

    let sql_transaction = connection.unchecked_transaction()?;

    let rows_affected = sql_transaction.execute(
        "UPDATE \"group\" SET name = ?1, apportionment_mode = ?2
        WHERE id = ?3 AND user_id = ?4",
        params![name, apportionment_mode, id, user_id],
    )?;

    if rows_affected != 0 {
        sql_transaction.execute("DELETE FROM group_member WHERE group_id = ?1", [id])?;

        for member_id in member_ids {
            sql_transaction.execute(
                "INSERT INTO group_member (group_id, member_id) VALUES (?1, ?2)",
                params![id, member_id],
            )?;
        }
    }

    sql_transaction.commit()?;

    Ok(rows_affected)
}

/// Count the records that reference a group: accounts the group owns and
/// transactions the group is responsible for. A group with a non-zero count
/// must be archived instead of deleted.
pub fn count_group_references(
    id: GroupId,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<i64, Error> {
    let count = connection
        .prepare(
            "SELECT
                (SELECT COUNT(*) FROM account
                    WHERE owner_group_id = ?1 AND user_id = ?2)
                + (SELECT COUNT(*) FROM \"transaction\"
                    WHERE responsible_group_id = ?1 AND user_id = ?2)",
        )?
        .query_one((id, user_id), |row| row.get(0))?;

    Ok(count)
}

fn validate_members(
    member_ids: &[MemberId],
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<(), Error> {
    for member_id in member_ids {
        let count: i64 = connection
            .prepare("SELECT COUNT(*) FROM member WHERE id = ?1 AND user_id = ?2")?
            .query_one((member_id, user_id), |row| row.get(0))?;

        if count == 0 {
            return Err(Error::InvalidReference);
        }
    }

    Ok(())
}
