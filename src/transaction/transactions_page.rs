//! Displays the user's transactions, newest first.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    auth::UserID,
    database_id::DatabaseId,
    endpoints::{self, format_endpoint},
    html::{
        INACTIVE_BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, edit_delete_action_links, format_currency,
    },
    navigation::NavBar,
    transaction::core::{TransactionId, TransactionKind, TransactionStatus},
};

/// The state needed for the [get_transactions_page](crate::transaction::get_transactions_page)
/// route handler.
#[derive(Debug, Clone)]
pub struct TransactionsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

struct TransactionTableRow {
    id: TransactionId,
    date: Date,
    description: String,
    kind: TransactionKind,
    status: TransactionStatus,
    amount: f64,
    account_name: String,
    category_name: Option<String>,
    responsible_name: Option<String>,
    /// Whether money came into the account (income, or the received transfer
    /// leg). Drives the sign and color of the amount column.
    is_incoming: bool,
}

fn get_transaction_rows(
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<Vec<TransactionTableRow>, Error> {
    connection
        .prepare(
            "SELECT
                t.id,
                t.date,
                t.description,
                t.kind,
                t.status,
                t.amount,
                a.name,
                c.name,
                COALESCE(m.name, g.name),
                CASE
                    WHEN t.kind = 'income' THEN 1
                    WHEN t.kind = 'expense' THEN 0
                    WHEN t.id < t.linked_transaction_id THEN 0
                    ELSE 1
                END
            FROM \"transaction\" t
            JOIN account a ON a.id = t.account_id
            LEFT JOIN category c ON c.id = t.category_id
            LEFT JOIN member m ON m.id = t.responsible_member_id
            LEFT JOIN \"group\" g ON g.id = t.responsible_group_id
            WHERE t.user_id = ?1
            ORDER BY t.date DESC, t.id DESC",
        )?
        .query_map([user_id], |row| {
            Ok(TransactionTableRow {
                id: row.get(0)?,
                date: row.get(1)?,
                description: row.get(2)?,
                kind: row.get(3)?,
                status: row.get(4)?,
                amount: row.get(5)?,
                account_name: row.get(6)?,
                category_name: row.get(7)?,
                responsible_name: row.get(8)?,
                is_incoming: row.get(9)?,
            })
        })?
        .map(|row_result| row_result.map_err(Error::from))
        .collect()
}

fn transactions_view(rows: &[TransactionTableRow]) -> Markup {
    let create_transaction_page_url = endpoints::NEW_TRANSACTION_VIEW;
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let table_row = |row: &TransactionTableRow| {
        let amount_style = if row.is_incoming {
            "text-green-600 dark:text-green-400"
        } else {
            "text-red-600 dark:text-red-400"
        };
        let amount = if row.is_incoming {
            format_currency(row.amount)
        } else {
            format_currency(-row.amount)
        };
        let description = if row.description.is_empty() {
            row.kind.label().to_owned()
        } else {
            row.description.clone()
        };
        let action_links = edit_delete_action_links(
            &format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, row.id),
            &format_endpoint(endpoints::TRANSACTION, row.id),
            if row.kind == TransactionKind::Transfer {
                "Are you sure you want to delete this transfer? Both legs will be removed."
            } else {
                "Are you sure you want to delete this transaction?"
            },
        );

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE) { (row.date) }

                th
                    scope="row"
                    class="px-6 py-4 font-medium text-gray-900 dark:text-white"
                {
                    (description)
                    @if row.status == TransactionStatus::Planned {
                        " "
                        span class=(INACTIVE_BADGE_STYLE) { "Planned" }
                    }
                }

                td class=(TABLE_CELL_STYLE) { (row.account_name) }

                td class=(TABLE_CELL_STYLE)
                {
                    (row.category_name.as_deref().unwrap_or(""))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (row.responsible_name.as_deref().unwrap_or(""))
                }

                td class={(TABLE_CELL_STYLE) " text-right whitespace-nowrap " (amount_style)}
                {
                    (amount)
                }

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
                    h1 class="text-xl font-bold" { "Transactions" }

                    a href=(create_transaction_page_url) class=(LINK_STYLE)
                    {
                        "Add Transaction"
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
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Account" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Responsible" }
                                th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for row in rows {
                                (table_row(row))
                            }

                            @if rows.is_empty() {
                                tr
                                {
                                    td
                                        colspan="7"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No transactions found. Create a transaction "
                                        a href=(create_transaction_page_url) class=(LINK_STYLE)
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

    base("Transactions", &[], &content)
}

/// Renders the transactions page.
pub async fn get_transactions_page(
    State(state): State<TransactionsPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let rows = get_transaction_rows(user_id.as_i64(), &connection)
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;

    Ok(transactions_view(&rows).into_response())
}
