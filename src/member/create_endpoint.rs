//! Defines the endpoint for adding a member.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{AppState, Error, auth::UserID, endpoints, member::core::create_member};

/// The state needed to create a member.
#[derive(Debug, Clone)]
pub struct CreateMemberState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateMemberState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for adding a member.
#[derive(Debug, Deserialize)]
pub struct MemberForm {
    pub name: String,
}

/// A route handler for adding a member.
pub async fn create_member_endpoint(
    State(state): State<CreateMemberState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<MemberForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_member(&form.name, user_id.as_i64(), &connection) {
        Ok(_) => (
            HxRedirect(endpoints::MEMBERS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ Error::EmptyName(_)) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("could not create member: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Form, extract::State, http::StatusCode};

    use crate::{
        auth::UserID,
        endpoints,
        member::{
            core::get_all_members,
            create_endpoint::{CreateMemberState, MemberForm, create_member_endpoint},
        },
        test_utils::{assert_hx_redirect, must_create_test_connection},
    };

    #[tokio::test]
    async fn creates_member_and_redirects() {
        let state = CreateMemberState {
            db_connection: Arc::new(Mutex::new(must_create_test_connection())),
        };

        let response = create_member_endpoint(
            State(state.clone()),
            Extension(UserID::new(1)),
            Form(MemberForm {
                name: "Alice".to_owned(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::MEMBERS_VIEW);
        let connection = state.db_connection.lock().unwrap();
        let members = get_all_members(1, &connection).unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].name, "Alice");
    }

    #[tokio::test]
    async fn rejects_blank_name() {
        let state = CreateMemberState {
            db_connection: Arc::new(Mutex::new(must_create_test_connection())),
        };

        let response = create_member_endpoint(
            State(state.clone()),
            Extension(UserID::new(1)),
            Form(MemberForm {
                name: "   ".to_owned(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let connection = state.db_connection.lock().unwrap();
        assert!(get_all_members(1, &connection).unwrap().is_empty());
    }
}
