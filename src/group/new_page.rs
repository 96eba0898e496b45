//! Defines the route handler for the page for creating a group.

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
    auth::UserID,
    endpoints,
    group::form::{GroupFormConfig, group_form},
    html::{PAGE_CONTAINER_STYLE, base},
    member::get_active_members,
    navigation::NavBar,
};

/// The state needed for the create group page.
#[derive(Debug, Clone)]
pub struct NewGroupPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for NewGroupPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for creating a group.
pub async fn get_new_group_page(
    State(state): State<NewGroupPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let nav_bar = NavBar::new(endpoints::NEW_GROUP_VIEW).into_html();

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let members = get_active_members(user_id.as_i64(), &connection)?;

    let form = group_form(&GroupFormConfig {
        action: endpoints::GROUPS_API,
        use_put: false,
        group: None,
        group_member_ids: &[],
        members: &members,
    });

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-md"
            {
                h1 class="text-xl font-bold" { "New Group" }
                (form)
            }
        }
    );

    Ok(base("New Group", &[], &content).into_response())
}
