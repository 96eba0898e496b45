//! Displays spending categories and lets the user add, rename, re-parent and
//! delete them from a single page.

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
    auth::UserID,
    category::core::{Category, CategoryId, get_all_categories},
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, FORM_SELECT_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, base,
    },
    navigation::NavBar,
};

/// The state needed for the [get_categories_page](crate::category::get_categories_page) route
/// handler.
#[derive(Debug, Clone)]
pub struct CategoriesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoriesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders a parent picker listing the top-level categories, excluding
/// `exclude` (a category cannot be its own parent).
fn parent_select(
    categories: &[Category],
    selected: Option<CategoryId>,
    exclude: Option<CategoryId>,
) -> Markup {
    html!(
        select name="parent_id" class=(FORM_SELECT_STYLE) style="max-width: 12rem;"
        {
            option value="" selected[selected.is_none()] { "No parent" }

            @for category in categories {
                @if category.parent_id.is_none() && Some(category.id) != exclude {
                    option
                        value=(category.id)
                        selected[selected == Some(category.id)]
                    {
                        (category.name)
                    }
                }
            }
        }
    )
}

fn categories_view(categories: &[Category]) -> Markup {
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();

    let category_card = |category: &Category| {
        let edit_url = format_endpoint(endpoints::CATEGORY, category.id);
        let delete_url = format_endpoint(endpoints::CATEGORY, category.id);
        let confirm_message = format!(
            "Are you sure you want to delete the category '{}'? \
            Transactions will keep their amounts but lose this label. This cannot be undone.",
            category.name
        );
        let indent = if category.parent_id.is_some() {
            "ml-6"
        } else {
            ""
        };

        html!(
            li class={"rounded border border-gray-200 bg-white px-4 py-3 shadow-sm \
                dark:border-gray-700 dark:bg-gray-800 " (indent)}
            {
                form
                    hx-put=(edit_url)
                    hx-target-error="#alert-container"
                    class="flex flex-wrap items-center gap-3"
                {
                    input
                        type="text"
                        name="name"
                        value=(category.name)
                        required
                        class=(FORM_TEXT_INPUT_STYLE)
                        style="max-width: 14rem;";

                    (parent_select(categories, category.parent_id, Some(category.id)))

                    button type="submit" class=(BUTTON_PRIMARY_STYLE) style="width: auto;"
                    {
                        "Save"
                    }

                    button
                        type="button"
                        class=(BUTTON_DELETE_STYLE)
                        hx-delete=(delete_url)
                        hx-confirm=(confirm_message)
                        hx-target-error="#alert-container"
                    {
                        "Delete"
                    }
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full max-w-xl"
            {
                h1 class="text-xl font-bold" { "Categories" }

                form
                    hx-post=(endpoints::CATEGORIES_API)
                    hx-target-error="#alert-container"
                    class="flex items-center gap-3"
                {
                    input
                        type="text"
                        name="name"
                        placeholder="New category name"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);

                    (parent_select(categories, None, None))

                    button type="submit" class=(BUTTON_PRIMARY_STYLE) style="width: auto;"
                    {
                        "Add"
                    }
                }

                ul class="space-y-4"
                {
                    @for category in categories {
                        (category_card(category))
                    }

                    @if categories.is_empty() {
                        li class="rounded border border-dashed border-gray-300 bg-white px-4 py-6 \
                            text-center text-sm text-gray-500 dark:border-gray-700 \
                            dark:bg-gray-800 dark:text-gray-400"
                        {
                            "No categories yet. Add one above to start labelling transactions."
                        }
                    }
                }
            }
        }
    );

    base("Categories", &[], &content)
}

/// Renders the categories page.
pub async fn get_categories_page(
    State(state): State<CategoriesPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_all_categories(user_id.as_i64(), &connection)
        .inspect_err(|error| tracing::error!("could not get categories: {error}"))?;

    Ok(categories_view(&categories).into_response())
}
