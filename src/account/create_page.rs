//! Defines the route handler for the page for creating an account.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::form::{AccountFormConfig, account_form},
    auth::UserID,
    endpoints,
    group::get_active_groups,
    html::{PAGE_CONTAINER_STYLE, base, dollar_input_styles},
    member::get_active_members,
    navigation::NavBar,
};

/// The state needed for the create account page.
#[derive(Debug, Clone)]
pub struct CreateAccountPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateAccountPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for creating an account.
pub async fn get_create_account_page(
    State(state): State<CreateAccountPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let nav_bar = NavBar::new(endpoints::NEW_ACCOUNT_VIEW).into_html();

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let members = get_active_members(user_id.as_i64(), &connection)?;
    let groups = get_active_groups(user_id.as_i64(), &connection)?;

    let form = account_form(&AccountFormConfig {
        action: endpoints::ACCOUNTS_API,
        use_put: false,
        account: None,
        members: &members,
        groups: &groups,
    });

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-md"
            {
                h1 class="text-xl font-bold" { "New Account" }
                (form)
            }
        }
    );

    Ok(base("New Account", &[dollar_input_styles()], &content).into_response())
}
