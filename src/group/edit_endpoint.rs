//! Defines the endpoint for updating a group.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    group::{
        core::{GroupId, update_group},
        create_endpoint::GroupForm,
    },
};

/// The state needed to edit a group.
#[derive(Debug, Clone)]
pub struct EditGroupState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditGroupState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for updating a group and its member links.
pub async fn edit_group_endpoint(
    State(state): State<EditGroupState>,
    Extension(user_id): Extension<UserID>,
    Path(group_id): Path<GroupId>,
    Form(form): Form<GroupForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_group(
        group_id,
        &form.name,
        form.apportionment_mode,
        &form.member_ids,
        user_id.as_i64(),
        &connection,
    ) {
        Ok(rows_affected) if rows_affected != 0 => (
            HxRedirect(endpoints::GROUPS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Ok(_) => Error::UpdateMissingGroup.into_alert_response(),
        Err(error @ (Error::EmptyName(_) | Error::EmptyGroup | Error::InvalidReference)) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!("could not update group {group_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::Path, extract::State, http::StatusCode};
    use axum_extra::extract::Form;

    use crate::{
        auth::UserID,
        group::{
            core::{ApportionmentMode, create_group, get_group_members},
            create_endpoint::GroupForm,
            edit_endpoint::{EditGroupState, edit_group_endpoint},
        },
        member::create_member,
        test_utils::must_create_test_connection,
    };

    #[tokio::test]
    async fn updates_group_membership() {
        let connection = must_create_test_connection();
        let alice = create_member("Alice", 1, &connection).unwrap();
        let bob = create_member("Bob", 1, &connection).unwrap();
        let group = create_group(
            "Household",
            ApportionmentMode::Fixed,
            &[alice.id],
            1,
            &connection,
        )
        .unwrap();
        let state = EditGroupState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = edit_group_endpoint(
            State(state.clone()),
            Extension(UserID::new(1)),
            Path(group.id),
            Form(GroupForm {
                name: "Household".to_owned(),
                apportionment_mode: ApportionmentMode::Fixed,
                member_ids: vec![alice.id, bob.id],
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_group_members(group.id, &connection).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn missing_group_returns_not_found_alert() {
        let connection = must_create_test_connection();
        let alice = create_member("Alice", 1, &connection).unwrap();
        let state = EditGroupState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = edit_group_endpoint(
            State(state),
            Extension(UserID::new(1)),
            Path(999),
            Form(GroupForm {
                name: "Household".to_owned(),
                apportionment_mode: ApportionmentMode::Fixed,
                member_ids: vec![alice.id],
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
