//! Defines the route handler for the page for editing a transaction.

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
    account::get_active_accounts,
    auth::UserID,
    category::get_all_categories,
    endpoints::{self, format_endpoint},
    group::get_active_groups,
    html::{PAGE_CONTAINER_STYLE, base, dollar_input_styles},
    member::get_active_members,
    navigation::NavBar,
    period::get_selectable_periods,
    transaction::{
        core::{TransactionId, get_transaction},
        form::{TransactionFormConfig, kind_toggle_script, transaction_form},
    },
};

/// The state needed for the edit transaction page.
#[derive(Debug, Clone)]
pub struct EditTransactionPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for editing a transaction.
pub async fn get_edit_transaction_page(
    State(state): State<EditTransactionPageState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let nav_bar = NavBar::new(endpoints::EDIT_TRANSACTION_VIEW).into_html();

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user_id = user_id.as_i64();
    let transaction = get_transaction(transaction_id, user_id, &connection)?;
    let accounts = get_active_accounts(user_id, &connection)?;
    let categories = get_all_categories(user_id, &connection)?;
    let members = get_active_members(user_id, &connection)?;
    let groups = get_active_groups(user_id, &connection)?;
    let periods = get_selectable_periods(user_id, &connection)?;

    let form = transaction_form(&TransactionFormConfig {
        action: &format_endpoint(endpoints::TRANSACTION, transaction.id),
        use_put: true,
        transaction: Some(&transaction),
        accounts: &accounts,
        categories: &categories,
        members: &members,
        groups: &groups,
        periods: &periods,
        default_date: transaction.date,
        default_period_id: transaction.period_id,
    });

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-md"
            {
                h1 class="text-xl font-bold" { "Edit Transaction" }
                (form)
            }
        }
    );

    Ok(base(
        "Edit Transaction",
        &[dollar_input_styles(), kind_toggle_script()],
        &content,
    )
    .into_response())
}

#[cfg(test)]
mod edit_transaction_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::Path, extract::State, http::StatusCode};
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        Error,
        account::{AccountKind, AccountOwner, create_account},
        auth::UserID,
        member::create_member,
        test_utils::{assert_valid_html, must_create_test_connection, must_get_form, parse_html},
        transaction::{
            core::{
                Recurrence, TransactionData, TransactionKind, TransactionStatus,
                create_transaction,
            },
            edit_page::{EditTransactionPageState, get_edit_transaction_page},
        },
    };

    #[tokio::test]
    async fn renders_form_with_existing_values() {
        let connection = must_create_test_connection();
        let member = create_member("Alice", 1, &connection).unwrap();
        let account = create_account(
            "Everyday",
            AccountKind::Checking,
            0.0,
            AccountOwner::Member(member.id),
            1,
            &connection,
        )
        .unwrap();
        let transaction = create_transaction(
            &TransactionData {
                amount: 42.5,
                date: date!(2025 - 01 - 10),
                kind: TransactionKind::Expense,
                status: TransactionStatus::Completed,
                recurrence: Recurrence::OneOff,
                description: "Weekly shop",
                category_id: None,
                account_id: account.id,
                counterpart_account_id: None,
                responsible: None,
                period_id: None,
            },
            1,
            &connection,
        )
        .unwrap();
        let state = EditTransactionPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_edit_transaction_page(
            State(state),
            Extension(UserID::new(1)),
            Path(transaction.id),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        let amount_selector = Selector::parse("input[name='amount']").unwrap();
        let amount = form
            .select(&amount_selector)
            .next()
            .expect("want an amount input");
        assert_eq!(amount.attr("value"), Some("42.50"));
        let description_selector = Selector::parse("input[name='description']").unwrap();
        let description = form
            .select(&description_selector)
            .next()
            .expect("want a description input");
        assert_eq!(description.attr("value"), Some("Weekly shop"));
    }

    #[tokio::test]
    async fn missing_transaction_returns_not_found() {
        let state = EditTransactionPageState {
            db_connection: Arc::new(Mutex::new(must_create_test_connection())),
        };

        let result =
            get_edit_transaction_page(State(state), Extension(UserID::new(1)), Path(999)).await;

        assert!(matches!(result, Err(Error::NotFound)));
    }
}
