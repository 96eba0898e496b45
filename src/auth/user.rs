//! The user account that owns all data in the application.

use std::fmt::Display;

use rusqlite::Connection;

use crate::{Error, auth::PasswordHash};

/// The ID of a registered user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// The underlying integer ID.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered user. Every other record in the database belongs to exactly
/// one user.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserID,
    pub email: String,
    pub password_hash: PasswordHash,
}

pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
            id INTEGER PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

fn map_row_to_user(row: &rusqlite::Row) -> Result<User, rusqlite::Error> {
    let id = row.get(0)?;
    let email = row.get(1)?;
    let raw_password_hash: String = row.get(2)?;

    Ok(User {
        id: UserID::new(id),
        email,
        password_hash: PasswordHash::new_unchecked(raw_password_hash),
    })
}

/// Create a new user account.
///
/// # Errors
/// Returns [Error::DuplicateEmail] if `email` is already registered, or
/// [Error::SqlError] for other SQL errors.
pub fn create_user(
    email: &str,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    let (id, email) = connection
        .prepare("INSERT INTO user (email, password) VALUES (?1, ?2) RETURNING id, email")?
        .query_row((email, password_hash.to_string()), |row| {
            Ok((row.get(0)?, row.get::<_, String>(1)?))
        })?;

    Ok(User {
        id: UserID::new(id),
        email,
        password_hash,
    })
}

/// Look up a user by their email address.
///
/// # Errors
/// Returns [Error::NotFound] if no user has the given email.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<User, Error> {
    let user = connection
        .prepare("SELECT id, email, password FROM user WHERE email = :email")?
        .query_row(&[(":email", email)], map_row_to_user)?;

    Ok(user)
}

/// Replace the password hash for the user with `email`.
///
/// Used by the reset_password binary.
///
/// # Errors
/// Returns [Error::NotFound] if no user has the given email.
pub fn set_user_password(
    email: &str,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_updated = connection.execute(
        "UPDATE user SET password = ?1 WHERE email = ?2",
        (password_hash.to_string(), email),
    )?;

    if rows_updated == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}
