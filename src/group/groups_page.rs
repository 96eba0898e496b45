//! Displays groups with their cost-sharing mode and members.

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
    endpoints::{self, format_endpoint},
    group::core::{Group, count_group_references, get_all_groups, get_group_members},
    html::{
        INACTIVE_BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, delete_confirm_message,
        edit_delete_action_links,
    },
    navigation::NavBar,
};

/// The state needed for the [get_groups_page](crate::group::get_groups_page) route handler.
#[derive(Debug, Clone)]
pub struct GroupsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GroupsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

struct GroupTableRow {
    group: Group,
    member_names: String,
    reference_count: i64,
}

fn groups_view(groups: &[GroupTableRow]) -> Markup {
    let create_group_page_url = endpoints::NEW_GROUP_VIEW;
    let nav_bar = NavBar::new(endpoints::GROUPS_VIEW).into_html();

    let table_row = |row: &GroupTableRow| {
        let action_links = edit_delete_action_links(
            &format_endpoint(endpoints::EDIT_GROUP_VIEW, row.group.id),
            &format_endpoint(endpoints::GROUP, row.group.id),
            &delete_confirm_message("group", &row.group.name, row.reference_count),
        );

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                th
                    scope="row"
                    class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
                {
                    (row.group.name)
                    @if !row.group.is_active {
                        " "
                        span class=(INACTIVE_BADGE_STYLE) { "Inactive" }
                    }
                }

                td class=(TABLE_CELL_STYLE) { (row.group.apportionment_mode.label()) }

                td class=(TABLE_CELL_STYLE) { (row.member_names) }

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
                    h1 class="text-xl font-bold" { "Groups" }

                    a href=(create_group_page_url) class=(LINK_STYLE)
                    {
                        "Add Group"
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
                                th scope="col" class=(TABLE_CELL_STYLE) { "Cost sharing" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Members" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for row in groups {
                                (table_row(row))
                            }

                            @if groups.is_empty() {
                                tr
                                {
                                    td
                                        colspan="4"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No groups found. Create a group "
                                        a href=(create_group_page_url) class=(LINK_STYLE)
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

    base("Groups", &[], &content)
}

/// Renders the groups page.
pub async fn get_groups_page(
    State(state): State<GroupsPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let groups = get_all_groups(user_id.as_i64(), &connection)
        .inspect_err(|error| tracing::error!("could not get groups: {error}"))?;

    let rows = groups
        .into_iter()
        .map(|group| {
            let member_names = get_group_members(group.id, &connection)?
                .into_iter()
                .map(|member| member.name)
                .collect::<Vec<_>>()
                .join(", ");
            let reference_count = count_group_references(group.id, user_id.as_i64(), &connection)?;

            Ok(GroupTableRow {
                group,
                member_names,
                reference_count,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    Ok(groups_view(&rows).into_response())
}
