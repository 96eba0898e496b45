//! Defines the endpoint for renaming, archiving and restoring a member.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::{Connection, params};
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::UserID,
    database_id::DatabaseId,
    endpoints,
    member::core::MemberId,
};

/// The state needed to edit a member.
#[derive(Debug, Clone)]
pub struct EditMemberState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditMemberState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for editing a member.
///
/// `active` is a checkbox: browsers omit it from the form body when it is
/// unchecked.
#[derive(Debug, Deserialize)]
pub struct EditMemberForm {
    pub name: String,
    pub active: Option<String>,
}

/// A route handler for updating a member's name and active flag.
pub async fn edit_member_endpoint(
    State(state): State<EditMemberState>,
    Extension(user_id): Extension<UserID>,
    Path(member_id): Path<MemberId>,
    Form(form): Form<EditMemberForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_member(member_id, &form, user_id.as_i64(), &connection) {
        Ok(rows_affected) if rows_affected != 0 => (
            HxRedirect(endpoints::MEMBERS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Ok(_) => Error::UpdateMissingMember.into_alert_response(),
        Err(error @ Error::EmptyName(_)) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("could not update member {member_id}: {error}");
            error.into_alert_response()
        }
    }
}

type RowsAffected = usize;

fn update_member(
    id: MemberId,
    form: &EditMemberForm,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    let name = form.name.trim();

    if name.is_empty() {
        return Err(Error::EmptyName("member"));
    }

    connection
        .execute(
            "UPDATE member SET name = ?1, is_active = ?2 WHERE id = ?3 AND user_id = ?4",
            params![name, form.active.is_some(), id, user_id],
        )
        .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        member::{
            core::{Member, create_member, get_member},
            edit_endpoint::{EditMemberForm, update_member},
        },
        test_utils::must_create_test_connection,
    };

    #[test]
    fn renames_and_archives_member() {
        let connection = must_create_test_connection();
        let member = create_member("Alice", 1, &connection).unwrap();

        let rows_affected = update_member(
            member.id,
            &EditMemberForm {
                name: "Alicia".to_owned(),
                active: None,
            },
            1,
            &connection,
        )
        .unwrap();

        assert_eq!(rows_affected, 1);
        assert_eq!(
            get_member(member.id, 1, &connection),
            Ok(Member {
                id: member.id,
                user_id: 1,
                name: "Alicia".to_owned(),
                is_active: false,
            })
        );
    }

    #[test]
    fn restores_archived_member() {
        let connection = must_create_test_connection();
        let member = must_create_archived_member(&connection);

        update_member(
            member.id,
            &EditMemberForm {
                name: member.name.clone(),
                active: Some("on".to_owned()),
            },
            1,
            &connection,
        )
        .unwrap();

        assert!(get_member(member.id, 1, &connection).unwrap().is_active);
    }

    #[test]
    fn rejects_blank_name() {
        let connection = must_create_test_connection();
        let member = create_member("Alice", 1, &connection).unwrap();

        let result = update_member(
            member.id,
            &EditMemberForm {
                name: "".to_owned(),
                active: Some("on".to_owned()),
            },
            1,
            &connection,
        );

        assert_eq!(result, Err(Error::EmptyName("member")));
    }

    #[test]
    fn does_not_touch_other_users_members() {
        let connection = must_create_test_connection();
        let member = create_member("Alice", 1, &connection).unwrap();

        let rows_affected = update_member(
            member.id,
            &EditMemberForm {
                name: "Mallory".to_owned(),
                active: Some("on".to_owned()),
            },
            2,
            &connection,
        )
        .unwrap();

        assert_eq!(rows_affected, 0);
        assert_eq!(get_member(member.id, 1, &connection).unwrap().name, "Alice");
    }

    #[track_caller]
    fn must_create_archived_member(connection: &Connection) -> Member {
        let member = create_member("Bob", 1, connection).unwrap();
        connection
            .execute("UPDATE member SET is_active = 0 WHERE id = ?1", [member.id])
            .unwrap();

        Member {
            is_active: false,
            ..member
        }
    }
}
