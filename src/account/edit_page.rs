//! Defines the route handler for the page for editing an account.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::{
        core::{AccountId, get_account},
        form::{AccountFormConfig, account_form},
    },
    auth::UserID,
    endpoints::{self, format_endpoint},
    group::get_active_groups,
    html::{PAGE_CONTAINER_STYLE, base, dollar_input_styles},
    member::get_active_members,
    navigation::NavBar,
};

/// The state needed for the edit account page.
#[derive(Debug, Clone)]
pub struct EditAccountPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditAccountPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for editing an account.
pub async fn get_edit_account_page(
    State(state): State<EditAccountPageState>,
    Extension(user_id): Extension<UserID>,
    Path(account_id): Path<AccountId>,
) -> Result<Response, Error> {
    let nav_bar = NavBar::new(endpoints::EDIT_ACCOUNT_VIEW).into_html();

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let account = get_account(account_id, user_id.as_i64(), &connection)?;
    let members = get_active_members(user_id.as_i64(), &connection)?;
    let groups = get_active_groups(user_id.as_i64(), &connection)?;

    let edit_url = format_endpoint(endpoints::ACCOUNT, account_id);
    let form = account_form(&AccountFormConfig {
        action: &edit_url,
        use_put: true,
        account: Some(&account),
        members: &members,
        groups: &groups,
    });

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-md"
            {
                h1 class="text-xl font-bold" { "Edit Account" }
                (form)
            }
        }
    );

    Ok(base("Edit Account", &[dollar_input_styles()], &content).into_response())
}
