//! CasaBooks is a web app for tracking a household's shared finances.
//!
//! Income, expenses and inter-account transfers are recorded against named
//! financial periods, and every account is owned by either an individual
//! member or a cost-sharing group. The library serves HTML pages directly.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use time::Date;
use tokio::signal;

mod account;
mod alert;
mod app_state;
mod auth;
mod category;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod forms;
mod goal;
mod group;
mod html;
mod logging;
mod member;
mod navigation;
mod not_found;
mod period;
mod routing;
mod shared_templates;
mod soft_delete;
#[cfg(test)]
mod test_utils;
mod timezone;
mod transaction;

pub use app_state::AppState;
pub use auth::{PasswordHash, UserID, ValidatedPassword, create_user, set_user_password};
pub use db::{DEMO_EMAIL, DEMO_PASSWORD, initialize as initialize_db, seed_demo_data};
pub use logging::logging_middleware;
pub use routing::build_router;

use crate::{
    alert::AlertTemplate,
    not_found::{get_404_not_found_response, render_internal_server_error},
    shared_templates::render,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid email/password combination.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Either the user ID or expiry cookie is missing from the cookie jar in
    /// the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// There was an error parsing the date in the cookie or creating the new
    /// expiry date time.
    ///
    /// Callers should pass in the original error as a string and the date
    /// string that caused the error.
    #[error("could not format expiry cookie date-time string \"{1}\": {0}")]
    InvalidDateFormat(String, String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The specified email address is already registered.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// An empty string was used where a name is required.
    #[error("{0} name cannot be empty")]
    EmptyName(&'static str),

    /// A transaction amount must be greater than zero.
    #[error("{0} is not a valid amount, amounts must be greater than zero")]
    NonPositiveAmount(f64),

    /// A transfer's source and destination accounts must differ.
    #[error("the source and destination accounts of a transfer must differ")]
    SameTransferAccounts,

    /// A transfer was submitted without a destination account.
    #[error("a transfer requires a destination account")]
    MissingCounterpartAccount,

    /// A period's end date must come after its start date.
    #[error("the end date must be after the start date")]
    InvalidDateRange,

    /// The candidate period dates overlap an existing period.
    ///
    /// Carries the name of the first conflicting period.
    #[error("the dates overlap the period \"{0}\"")]
    PeriodOverlap(String),

    /// The candidate period leaves uncovered days between periods.
    ///
    /// Carries the gap date ranges. This is a warning, not a hard error:
    /// resubmitting the same form commits anyway.
    #[error("the period leaves gaps in coverage: {}", format_gap_list(.0))]
    PeriodGap(Vec<(Date, Date)>),

    /// The selected parent category already has a parent of its own.
    ///
    /// Categories may only be nested one level deep.
    #[error("the selected parent category is itself a subcategory")]
    NestedCategoryParent,

    /// A group must contain at least one member.
    #[error("a group must have at least one member")]
    EmptyGroup,

    /// A form referenced a row (account, member, group, category or period)
    /// that does not exist for this user.
    #[error("a referenced record does not exist")]
    InvalidReference,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update an account that does not exist
    #[error("tried to update an account that is not in the database")]
    UpdateMissingAccount,

    /// Tried to delete an account that does not exist
    #[error("tried to delete an account that is not in the database")]
    DeleteMissingAccount,

    /// Tried to update a member that does not exist
    #[error("tried to update a member that is not in the database")]
    UpdateMissingMember,

    /// Tried to delete a member that does not exist
    #[error("tried to delete a member that is not in the database")]
    DeleteMissingMember,

    /// Tried to update a group that does not exist
    #[error("tried to update a group that is not in the database")]
    UpdateMissingGroup,

    /// Tried to delete a group that does not exist
    #[error("tried to delete a group that is not in the database")]
    DeleteMissingGroup,

    /// Tried to update a category that does not exist
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// Tried to update a period that does not exist
    #[error("tried to update a period that is not in the database")]
    UpdateMissingPeriod,

    /// Tried to delete a period that does not exist
    #[error("tried to delete a period that is not in the database")]
    DeleteMissingPeriod,
}

fn format_gap_list(gaps: &[(Date, Date)]) -> String {
    gaps.iter()
        .map(|(start, end)| format!("{start} to {end}"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidReference,
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => render_internal_server_error(
                "Invalid Timezone Settings",
                &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to a valid, canonical timezone string"
                ),
            ),
            Error::DatabaseLockError => render_internal_server_error(
                "Sorry, something went wrong.",
                "Try again later or check the server logs",
            ),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                render_internal_server_error(
                    "Sorry, something went wrong.",
                    "Try again later or check the server logs",
                )
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        match self {
            Error::EmptyName(_)
            | Error::NonPositiveAmount(_)
            | Error::SameTransferAccounts
            | Error::MissingCounterpartAccount
            | Error::InvalidDateRange
            | Error::NestedCategoryParent
            | Error::EmptyGroup => {
                let message = self.to_string();
                render(
                    StatusCode::BAD_REQUEST,
                    AlertTemplate::error("Invalid input", &message).into_markup(),
                )
            }
            Error::PeriodOverlap(ref name) => render(
                StatusCode::BAD_REQUEST,
                AlertTemplate::error(
                    "Dates overlap an existing period",
                    &format!("The dates conflict with the period \"{name}\". Adjust the start or end date."),
                )
                .into_markup(),
            ),
            Error::InvalidReference => render(
                StatusCode::BAD_REQUEST,
                AlertTemplate::error(
                    "Invalid selection",
                    "One of the selected records no longer exists. Refresh the page and try again.",
                )
                .into_markup(),
            ),
            Error::UpdateMissingTransaction => render(
                StatusCode::NOT_FOUND,
                AlertTemplate::error(
                    "Could not update transaction",
                    "The transaction could not be found.",
                )
                .into_markup(),
            ),
            Error::DeleteMissingTransaction => render(
                StatusCode::NOT_FOUND,
                AlertTemplate::error(
                    "Could not delete transaction",
                    "The transaction could not be found. \
                    Try refreshing the page to see if the transaction has already been deleted.",
                )
                .into_markup(),
            ),
            Error::UpdateMissingAccount => render(
                StatusCode::NOT_FOUND,
                AlertTemplate::error(
                    "Could not update account",
                    "The account could not be found.",
                )
                .into_markup(),
            ),
            Error::DeleteMissingAccount => render(
                StatusCode::NOT_FOUND,
                AlertTemplate::error(
                    "Could not delete account",
                    "The account could not be found. \
                    Try refreshing the page to see if the account has already been deleted.",
                )
                .into_markup(),
            ),
            Error::UpdateMissingMember => render(
                StatusCode::NOT_FOUND,
                AlertTemplate::error("Could not update member", "The member could not be found.")
                    .into_markup(),
            ),
            Error::DeleteMissingMember => render(
                StatusCode::NOT_FOUND,
                AlertTemplate::error("Could not delete member", "The member could not be found.")
                    .into_markup(),
            ),
            Error::UpdateMissingGroup => render(
                StatusCode::NOT_FOUND,
                AlertTemplate::error("Could not update group", "The group could not be found.")
                    .into_markup(),
            ),
            Error::DeleteMissingGroup => render(
                StatusCode::NOT_FOUND,
                AlertTemplate::error("Could not delete group", "The group could not be found.")
                    .into_markup(),
            ),
            Error::UpdateMissingCategory => render(
                StatusCode::NOT_FOUND,
                AlertTemplate::error(
                    "Could not update category",
                    "The category could not be found.",
                )
                .into_markup(),
            ),
            Error::DeleteMissingCategory => render(
                StatusCode::NOT_FOUND,
                AlertTemplate::error(
                    "Could not delete category",
                    "The category could not be found. \
                    Try refreshing the page to see if the category has already been deleted.",
                )
                .into_markup(),
            ),
            Error::UpdateMissingPeriod => render(
                StatusCode::NOT_FOUND,
                AlertTemplate::error("Could not update period", "The period could not be found.")
                    .into_markup(),
            ),
            Error::DeleteMissingPeriod => render(
                StatusCode::NOT_FOUND,
                AlertTemplate::error("Could not delete period", "The period could not be found.")
                    .into_markup(),
            ),
            Error::NotFound => render(
                StatusCode::NOT_FOUND,
                AlertTemplate::error(
                    "Not found",
                    "The requested record could not be found. It may have been deleted.",
                )
                .into_markup(),
            ),
            _ => render(
                StatusCode::INTERNAL_SERVER_ERROR,
                AlertTemplate::error(
                    "Something went wrong",
                    "An unexpected error occurred, check the server logs for more details.",
                )
                .into_markup(),
            ),
        }
    }
}
