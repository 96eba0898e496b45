//! Displays household members and lets the user add, rename, archive and
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
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, FORM_CHECKBOX_STYLE, FORM_TEXT_INPUT_STYLE,
        INACTIVE_BADGE_STYLE, PAGE_CONTAINER_STYLE, base, delete_confirm_message,
    },
    member::core::{Member, count_member_references, get_all_members},
    navigation::NavBar,
};

/// The state needed for the [get_members_page](crate::member::get_members_page) route handler.
#[derive(Debug, Clone)]
pub struct MembersPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for MembersPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn members_view(members: &[(Member, i64)]) -> Markup {
    let nav_bar = NavBar::new(endpoints::MEMBERS_VIEW).into_html();

    let member_card = |member: &Member, reference_count: i64| {
        let edit_url = format_endpoint(endpoints::MEMBER, member.id);
        let delete_url = format_endpoint(endpoints::MEMBER, member.id);
        let confirm_message = delete_confirm_message("member", &member.name, reference_count);

        html!(
            li class="rounded border border-gray-200 bg-white px-4 py-3 shadow-sm \
                dark:border-gray-700 dark:bg-gray-800"
            {
                form
                    hx-put=(edit_url)
                    hx-target-error="#alert-container"
                    class="flex flex-wrap items-center gap-3"
                {
                    input
                        type="text"
                        name="name"
                        value=(member.name)
                        required
                        class=(FORM_TEXT_INPUT_STYLE)
                        style="max-width: 14rem;";

                    label class="flex items-center gap-1 text-sm"
                    {
                        input
                            type="checkbox"
                            name="active"
                            checked[member.is_active]
                            class=(FORM_CHECKBOX_STYLE);
                        "Active"
                    }

                    @if !member.is_active {
                        span class=(INACTIVE_BADGE_STYLE) { "Inactive" }
                    }

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
                h1 class="text-xl font-bold" { "Members" }

                form
                    hx-post=(endpoints::MEMBERS_API)
                    hx-target-error="#alert-container"
                    class="flex items-center gap-3"
                {
                    input
                        type="text"
                        name="name"
                        placeholder="New member name"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);

                    button type="submit" class=(BUTTON_PRIMARY_STYLE) style="width: auto;"
                    {
                        "Add"
                    }
                }

                ul class="space-y-4"
                {
                    @for (member, reference_count) in members {
                        (member_card(member, *reference_count))
                    }

                    @if members.is_empty() {
                        li class="rounded border border-dashed border-gray-300 bg-white px-4 py-6 \
                            text-center text-sm text-gray-500 dark:border-gray-700 \
                            dark:bg-gray-800 dark:text-gray-400"
                        {
                            "No members yet. Add the people in your household above."
                        }
                    }
                }
            }
        }
    );

    base("Members", &[], &content)
}

/// Renders the members page.
pub async fn get_members_page(
    State(state): State<MembersPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let members = get_all_members(user_id.as_i64(), &connection)
        .inspect_err(|error| tracing::error!("could not get members: {error}"))?
        .into_iter()
        .map(|member| {
            let references = count_member_references(member.id, user_id.as_i64(), &connection)?;
            Ok((member, references))
        })
        .collect::<Result<Vec<_>, Error>>()
        .inspect_err(|error| tracing::error!("could not count member references: {error}"))?;

    Ok(members_view(&members).into_response())
}

#[cfg(test)]
mod members_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use scraper::Selector;

    use crate::{
        auth::UserID,
        group::{ApportionmentMode, create_group},
        member::{
            core::create_member,
            members_page::{MembersPageState, get_members_page},
        },
        test_utils::{assert_valid_html, must_create_test_connection, parse_html},
    };

    #[tokio::test]
    async fn lists_members_with_inactive_badge() {
        let connection = must_create_test_connection();
        create_member("Alice", 1, &connection).unwrap();
        let bob = create_member("Bob", 1, &connection).unwrap();
        connection
            .execute("UPDATE member SET is_active = 0 WHERE id = ?1", [bob.id])
            .unwrap();
        let state = MembersPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_members_page(State(state), Extension(UserID::new(1)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html(response).await;
        assert_valid_html(&html);
        let input_selector = Selector::parse("li form input[name='name']").unwrap();
        let names: Vec<_> = html
            .select(&input_selector)
            .map(|input| input.value().attr("value").unwrap_or_default().to_owned())
            .collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
        let badge_text: String = html
            .select(&Selector::parse("span").unwrap())
            .flat_map(|span| span.text())
            .collect();
        assert!(
            badge_text.contains("Inactive"),
            "want an Inactive badge for the archived member"
        );
    }

    #[tokio::test]
    async fn delete_confirmation_states_reference_count() {
        let connection = must_create_test_connection();
        create_member("Alice", 1, &connection).unwrap();
        let bob = create_member("Bob", 1, &connection).unwrap();
        create_group(
            "Household",
            ApportionmentMode::Fixed,
            &[bob.id],
            1,
            &connection,
        )
        .unwrap();
        let state = MembersPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_members_page(State(state), Extension(UserID::new(1)))
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
            confirmations[0].contains("cannot be undone"),
            "unreferenced member: {}",
            confirmations[0]
        );
        assert!(
            confirmations[1].contains("referenced by 1 record"),
            "referenced member: {}",
            confirmations[1]
        );
    }

    #[tokio::test]
    async fn does_not_show_other_users_members() {
        let connection = must_create_test_connection();
        connection
            .execute(
                "INSERT INTO user (email, password) VALUES ('other@example.com', 'hunter2')",
                (),
            )
            .unwrap();
        create_member("Alice", 2, &connection).unwrap();
        let state = MembersPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_members_page(State(state), Extension(UserID::new(1)))
            .await
            .unwrap();

        let html = parse_html(response).await;
        let input_selector = Selector::parse("li form input[name='name']").unwrap();
        assert_eq!(html.select(&input_selector).count(), 0);
    }
}
