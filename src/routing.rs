//! Application router configuration with protected and unprotected route
//! definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    account::{
        create_account_endpoint, delete_account_endpoint, edit_account_endpoint,
        get_accounts_page, get_create_account_page, get_edit_account_page,
    },
    auth::{
        auth_guard, auth_guard_hx, get_forgot_password_page, get_log_in_page, get_log_out,
        get_register_page, post_log_in, register_user,
    },
    category::{
        create_category_endpoint, delete_category_endpoint, edit_category_endpoint,
        get_categories_page,
    },
    dashboard::get_dashboard_page,
    endpoints,
    group::{
        create_group_endpoint, delete_group_endpoint, edit_group_endpoint, get_edit_group_page,
        get_groups_page, get_new_group_page,
    },
    member::{
        create_member_endpoint, delete_member_endpoint, edit_member_endpoint, get_members_page,
    },
    not_found::{get_404_not_found, get_internal_server_error_page},
    period::{
        activate_period_endpoint, create_period_endpoint, delete_period_endpoint,
        edit_period_endpoint, get_edit_period_page, get_new_period_page, get_periods_page,
    },
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        get_edit_transaction_page, get_new_transaction_page, get_transactions_page,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(
            endpoints::FORGOT_PASSWORD_VIEW,
            get(get_forgot_password_page),
        )
        .route(endpoints::USERS, post(register_user))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_pages = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(
            endpoints::NEW_TRANSACTION_VIEW,
            get(get_new_transaction_page),
        )
        .route(
            endpoints::EDIT_TRANSACTION_VIEW,
            get(get_edit_transaction_page),
        )
        .route(endpoints::ACCOUNTS_VIEW, get(get_accounts_page))
        .route(endpoints::NEW_ACCOUNT_VIEW, get(get_create_account_page))
        .route(endpoints::EDIT_ACCOUNT_VIEW, get(get_edit_account_page))
        .route(endpoints::PERIODS_VIEW, get(get_periods_page))
        .route(endpoints::NEW_PERIOD_VIEW, get(get_new_period_page))
        .route(endpoints::EDIT_PERIOD_VIEW, get(get_edit_period_page))
        .route(endpoints::MEMBERS_VIEW, get(get_members_page))
        .route(endpoints::GROUPS_VIEW, get(get_groups_page))
        .route(endpoints::NEW_GROUP_VIEW, get(get_new_group_page))
        .route(endpoints::EDIT_GROUP_VIEW, get(get_edit_group_page))
        .route(endpoints::CATEGORIES_VIEW, get(get_categories_page))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // The API routes need the HX-Redirect header for auth redirects to work
    // properly for htmx requests.
    let protected_api = Router::new()
        .route(
            endpoints::TRANSACTIONS_API,
            post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            put(edit_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .route(endpoints::ACCOUNTS_API, post(create_account_endpoint))
        .route(
            endpoints::ACCOUNT,
            put(edit_account_endpoint).delete(delete_account_endpoint),
        )
        .route(endpoints::PERIODS_API, post(create_period_endpoint))
        .route(
            endpoints::PERIOD,
            put(edit_period_endpoint).delete(delete_period_endpoint),
        )
        .route(endpoints::ACTIVATE_PERIOD, post(activate_period_endpoint))
        .route(endpoints::MEMBERS_API, post(create_member_endpoint))
        .route(
            endpoints::MEMBER,
            put(edit_member_endpoint).delete(delete_member_endpoint),
        )
        .route(endpoints::GROUPS_API, post(create_group_endpoint))
        .route(
            endpoints::GROUP,
            put(edit_group_endpoint).delete(delete_group_endpoint),
        )
        .route(endpoints::CATEGORIES_API, post(create_category_endpoint))
        .route(
            endpoints::CATEGORY,
            put(edit_category_endpoint).delete(delete_category_endpoint),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx));

    protected_pages
        .merge(protected_api)
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}

#[cfg(test)]
mod root_route_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{endpoints, routing::get_index_page};

    #[tokio::test]
    async fn root_redirects_to_dashboard() {
        let response = get_index_page().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers().get("location").unwrap();
        assert_eq!(location, endpoints::DASHBOARD_VIEW);
    }
}
