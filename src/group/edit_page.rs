//! Defines the route handler for the page for editing a group.

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
    auth::UserID,
    endpoints::{self, format_endpoint},
    group::{
        core::{GroupId, get_group, get_group_members},
        form::{GroupFormConfig, group_form},
    },
    html::{PAGE_CONTAINER_STYLE, base},
    member::get_active_members,
    navigation::NavBar,
};

/// The state needed for the edit group page.
#[derive(Debug, Clone)]
pub struct EditGroupPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditGroupPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for editing a group.
pub async fn get_edit_group_page(
    State(state): State<EditGroupPageState>,
    Extension(user_id): Extension<UserID>,
    Path(group_id): Path<GroupId>,
) -> Result<Response, Error> {
    let nav_bar = NavBar::new(endpoints::EDIT_GROUP_VIEW).into_html();

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let group = get_group(group_id, user_id.as_i64(), &connection)?;
    let group_member_ids: Vec<_> = get_group_members(group_id, &connection)?
        .into_iter()
        .map(|member| member.id)
        .collect();
    let members = get_active_members(user_id.as_i64(), &connection)?;

    let edit_url = format_endpoint(endpoints::GROUP, group_id);
    let form = group_form(&GroupFormConfig {
        action: &edit_url,
        use_put: true,
        group: Some(&group),
        group_member_ids: &group_member_ids,
        members: &members,
    });

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-md"
            {
                h1 class="text-xl font-bold" { "Edit Group" }
                (form)
            }
        }
    );

    Ok(base("Edit Group", &[], &content).into_response())
}

#[cfg(test)]
mod edit_group_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::Path, extract::State};
    use scraper::Selector;

    use crate::{
        auth::UserID,
        group::{
            core::{ApportionmentMode, create_group},
            edit_page::{EditGroupPageState, get_edit_group_page},
        },
        member::create_member,
        test_utils::{assert_valid_html, must_create_test_connection, must_get_form, parse_html},
    };

    #[tokio::test]
    async fn checks_current_members() {
        let connection = must_create_test_connection();
        let alice = create_member("Alice", 1, &connection).unwrap();
        create_member("Bob", 1, &connection).unwrap();
        let group = create_group(
            "Household",
            ApportionmentMode::Fixed,
            &[alice.id],
            1,
            &connection,
        )
        .unwrap();
        let state = EditGroupPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_edit_group_page(State(state), Extension(UserID::new(1)), Path(group.id))
            .await
            .unwrap();

        let html = parse_html(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        let checked_selector = Selector::parse("input[name='member_ids'][checked]").unwrap();
        let checked: Vec<_> = form
            .select(&checked_selector)
            .map(|input| input.value().attr("value").unwrap_or_default().to_owned())
            .collect();
        assert_eq!(checked, vec![alice.id.to_string()]);
    }

    #[tokio::test]
    async fn missing_group_returns_not_found() {
        let state = EditGroupPageState {
            db_connection: Arc::new(Mutex::new(must_create_test_connection())),
        };

        let result = get_edit_group_page(State(state), Extension(UserID::new(1)), Path(999)).await;

        assert_eq!(result.unwrap_err(), crate::Error::NotFound);
    }
}
