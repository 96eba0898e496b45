//! Displays accounts with their owners and current balances.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::core::AccountKind,
    auth::UserID,
    database_id::DatabaseId,
    endpoints::{self, format_endpoint},
    html::{
        INACTIVE_BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, delete_confirm_message,
        edit_delete_action_links, format_currency,
    },
    navigation::NavBar,
};

/// The state needed for the [get_accounts_page](crate::account::get_accounts_page) route handler.
#[derive(Debug, Clone)]
pub struct AccountsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AccountsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The account data to display in the view.
#[derive(Debug, PartialEq)]
struct AccountTableRow {
    name: String,
    kind: AccountKind,
    owner_name: String,
    balance: f64,
    is_active: bool,
    reference_count: i64,
    edit_url: String,
    delete_url: String,
}

fn accounts_view(accounts: &[AccountTableRow]) -> Markup {
    let create_account_page_url = endpoints::NEW_ACCOUNT_VIEW;
    let nav_bar = NavBar::new(endpoints::ACCOUNTS_VIEW).into_html();

    let table_row = |account: &AccountTableRow| {
        let balance_str = format_currency(account.balance);
        let action_links = edit_delete_action_links(
            &account.edit_url,
            &account.delete_url,
            &delete_confirm_message("account", &account.name, account.reference_count),
        );

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                th
                    scope="row"
                    class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
                {
                    (account.name)
                    @if !account.is_active {
                        " "
                        span class=(INACTIVE_BADGE_STYLE) { "Inactive" }
                    }
                }

                td class=(TABLE_CELL_STYLE) { (account.kind.label()) }

                td class=(TABLE_CELL_STYLE) { (account.owner_name) }

                td class="px-6 py-4 text-right" { (balance_str) }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4" { (action_links) }
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Accounts" }

                    a href=(create_account_page_url) class=(LINK_STYLE)
                    {
                        "Add Account"
                    }
                }

                section class="w-full overflow-x-auto dark:bg-gray-800 lg:max-w-5xl lg:mx-auto"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Kind" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Owner" }
                                th scope="col" class="px-6 py-3 text-right" { "Balance" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for account in accounts {
                                (table_row(account))
                            }

                            @if accounts.is_empty() {
                                tr
                                {
                                    td
                                        colspan="5"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No accounts found. Create an account "
                                        a href=(create_account_page_url) class=(LINK_STYLE)
                                        {
                                            "here"
                                        }
                                        "."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Accounts", &[], &content)
}

/// Renders the accounts page showing all accounts and their balances.
pub async fn get_accounts_page(
    State(state): State<AccountsPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let accounts = get_account_rows(user_id.as_i64(), &connection)
        .inspect_err(|error| tracing::error!("could not get accounts: {error}"))?;

    Ok(accounts_view(&accounts).into_response())
}

fn get_account_rows(
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<Vec<AccountTableRow>, Error> {
    connection
        .prepare(
            "SELECT a.id, a.name, a.kind, a.is_active,
                COALESCE(m.name, g.name),
                a.opening_balance + COALESCE((SELECT SUM(CASE
                        WHEN t.kind = 'income' THEN t.amount
                        WHEN t.kind = 'expense' THEN -t.amount
                        WHEN t.id < t.linked_transaction_id THEN -t.amount
                        ELSE t.amount
                    END)
                    FROM \"transaction\" t
                    WHERE t.account_id = a.id AND t.status = 'completed'), 0),
                (SELECT COUNT(*) FROM \"transaction\" t
                    WHERE (t.account_id = a.id OR t.counterpart_account_id = a.id)
                        AND t.user_id = ?1)
            FROM account a
            LEFT JOIN member m ON m.id = a.owner_member_id
            LEFT JOIN \"group\" g ON g.id = a.owner_group_id
            WHERE a.user_id = ?1
            ORDER BY a.is_active DESC, a.name ASC",
        )?
        .query_map([user_id], |row| {
            let id: DatabaseId = row.get(0)?;

            Ok(AccountTableRow {
                name: row.get(1)?,
                kind: row.get(2)?,
                is_active: row.get(3)?,
                owner_name: row.get(4)?,
                balance: row.get(5)?,
                reference_count: row.get(6)?,
                edit_url: format_endpoint(endpoints::EDIT_ACCOUNT_VIEW, id),
                delete_url: format_endpoint(endpoints::ACCOUNT, id),
            })
        })?
        .map(|account_result| account_result.map_err(Error::from))
        .collect()
}


#[cfg(test)]
mod accounts_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        account::{
            accounts_page::{AccountsPageState, get_accounts_page},
            core::{AccountKind, AccountOwner, create_account},
        },
        auth::UserID,
        html::format_currency,
        member::create_member,
        test_utils::{assert_valid_html, must_create_test_connection, parse_html},
        transaction::{
            Recurrence, TransactionData, TransactionKind, TransactionStatus, create_transaction,
        },
    };

    #[tokio::test]
    async fn lists_accounts() {
        let connection = must_create_test_connection();
        let member = create_member("Alice", 1, &connection).unwrap();
        create_account(
            "Everyday",
            AccountKind::Checking,
            1234.56,
            AccountOwner::Member(member.id),
            1,
            &connection,
        )
        .unwrap();
        let state = AccountsPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_accounts_page(State(state), Extension(UserID::new(1)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html(response).await;
        assert_valid_html(&html);
        let row_selector = Selector::parse("tbody tr").unwrap();
        let row_text: String = html
            .select(&row_selector)
            .next()
            .expect("want a table row for the account")
            .text()
            .collect();
        assert!(row_text.contains("Everyday"));
        assert!(row_text.contains("Alice"));
        assert!(row_text.contains(&format_currency(1234.56)));
    }

    #[tokio::test]
    async fn delete_confirmation_states_transaction_count() {
        let connection = must_create_test_connection();
        let member = create_member("Alice", 1, &connection).unwrap();
        let everyday = create_account(
            "Everyday",
            AccountKind::Checking,
            0.0,
            AccountOwner::Member(member.id),
            1,
            &connection,
        )
        .unwrap();
        create_account(
            "Savings",
            AccountKind::Savings,
            0.0,
            AccountOwner::Member(member.id),
            1,
            &connection,
        )
        .unwrap();
        create_transaction(
            &TransactionData {
                amount: 42.5,
                date: date!(2025 - 01 - 10),
                kind: TransactionKind::Expense,
                status: TransactionStatus::Completed,
                recurrence: Recurrence::OneOff,
                description: "",
                category_id: None,
                account_id: everyday.id,
                counterpart_account_id: None,
                responsible: None,
                period_id: None,
            },
            1,
            &connection,
        )
        .unwrap();
        let state = AccountsPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_accounts_page(State(state), Extension(UserID::new(1)))
            .await
            .unwrap();

        let html = parse_html(response).await;
        let button_selector = Selector::parse("button[hx-delete]").unwrap();
        let confirmations: Vec<_> = html
            .select(&button_selector)
            .map(|button| button.attr("hx-confirm").unwrap_or_default().to_owned())
            .collect();
        assert_eq!(confirmations.len(), 2);
        assert!(
            confirmations[0].contains("referenced by 1 record"),
            "account with a transaction: {}",
            confirmations[0]
        );
        assert!(
            confirmations[1].contains("cannot be undone"),
            "unused account: {}",
            confirmations[1]
        );
    }
}
