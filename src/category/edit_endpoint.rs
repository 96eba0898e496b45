//! Defines the endpoint for renaming and re-parenting a category.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    category::{
        core::{CategoryId, update_category},
        create_endpoint::CategoryForm,
    },
    endpoints,
};

/// The state needed to edit a category.
#[derive(Debug, Clone)]
pub struct EditCategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for updating a category's name and parent.
pub async fn edit_category_endpoint(
    State(state): State<EditCategoryState>,
    Extension(user_id): Extension<UserID>,
    Path(category_id): Path<CategoryId>,
    Form(form): Form<CategoryForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_category(
        category_id,
        &form.name,
        form.parent_id,
        user_id.as_i64(),
        &connection,
    ) {
        Ok(rows_affected) if rows_affected != 0 => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Ok(_) => Error::UpdateMissingCategory.into_alert_response(),
        Err(
            error @ (Error::EmptyName(_) | Error::NestedCategoryParent | Error::InvalidReference),
        ) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("could not update category {category_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Form, extract::Path, extract::State, http::StatusCode};

    use crate::{
        auth::UserID,
        category::{
            core::{create_category, get_category},
            create_endpoint::CategoryForm,
            edit_endpoint::{EditCategoryState, edit_category_endpoint},
        },
        endpoints,
        test_utils::{assert_hx_redirect, must_create_test_connection},
    };

    #[tokio::test]
    async fn renames_category() {
        let connection = must_create_test_connection();
        let category = create_category("Grocery", None, 1, &connection).unwrap();
        let state = EditCategoryState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = edit_category_endpoint(
            State(state.clone()),
            Extension(UserID::new(1)),
            Path(category.id),
            Form(CategoryForm {
                name: "Groceries".to_owned(),
                parent_id: None,
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::CATEGORIES_VIEW);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            get_category(category.id, 1, &connection).unwrap().name,
            "Groceries"
        );
    }

    #[tokio::test]
    async fn missing_category_returns_not_found_alert() {
        let state = EditCategoryState {
            db_connection: Arc::new(Mutex::new(must_create_test_connection())),
        };

        let response = edit_category_endpoint(
            State(state),
            Extension(UserID::new(1)),
            Path(999),
            Form(CategoryForm {
                name: "Groceries".to_owned(),
                parent_id: None,
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
