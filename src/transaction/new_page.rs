//! Defines the route handler for the page for creating a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    account::get_active_accounts,
    auth::UserID,
    category::get_all_categories,
    endpoints,
    group::get_active_groups,
    html::{PAGE_CONTAINER_STYLE, base, dollar_input_styles},
    member::get_active_members,
    navigation::NavBar,
    period::{get_active_period, get_selectable_periods},
    timezone::get_local_offset,
    transaction::form::{TransactionFormConfig, kind_toggle_script, transaction_form},
};

/// The state needed for the create transaction page.
#[derive(Debug, Clone)]
pub struct NewTransactionPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for NewTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Renders the page for creating a transaction.
///
/// The date defaults to today and the period to the active period.
pub async fn get_new_transaction_page(
    State(state): State<NewTransactionPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let local_offset = get_local_offset(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;
    let today = OffsetDateTime::now_utc().to_offset(local_offset).date();

    let user_id = user_id.as_i64();
    let accounts = get_active_accounts(user_id, &connection)?;
    let categories = get_all_categories(user_id, &connection)?;
    let members = get_active_members(user_id, &connection)?;
    let groups = get_active_groups(user_id, &connection)?;
    let periods = get_selectable_periods(user_id, &connection)?;
    let active_period = get_active_period(user_id, &connection)?;

    let form = transaction_form(&TransactionFormConfig {
        action: endpoints::TRANSACTIONS_API,
        use_put: false,
        transaction: None,
        accounts: &accounts,
        categories: &categories,
        members: &members,
        groups: &groups,
        periods: &periods,
        default_date: today,
        default_period_id: active_period.map(|period| period.id),
    });

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-md"
            {
                h1 class="text-xl font-bold" { "New Transaction" }
                (form)
            }
        }
    );

    Ok(base(
        "New Transaction",
        &[dollar_input_styles(), kind_toggle_script()],
        &content,
    )
    .into_response())
}
