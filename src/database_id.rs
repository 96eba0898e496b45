/// The integer row ID type used by the SQLite database.
pub type DatabaseId = i64;
