use rusqlite::Connection;

use crate::db::initialize;

/// Creates an in-memory database with the full schema and a single user
/// (ID 1) that test records can belong to.
#[track_caller]
pub(crate) fn must_create_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("could not create in-memory SQLite database");
    initialize(&connection).expect("could not initialize test DB");
    connection
        .execute(
            "INSERT INTO user (email, password) VALUES ('test@example.com', 'hunter2')",
            (),
        )
        .expect("could not create test user");

    connection
}
