//! The shared form for creating and editing an account.

use maud::{Markup, html};

use crate::{
    account::core::{Account, AccountKind, AccountOwner},
    group::Group,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_SELECT_STYLE,
        FORM_TEXT_INPUT_STYLE, loading_spinner,
    },
    member::Member,
};

pub(super) struct AccountFormConfig<'a> {
    /// The URL the form submits to.
    pub action: &'a str,
    /// Submit with PUT (editing) instead of POST (creating).
    pub use_put: bool,
    /// Existing values when editing.
    pub account: Option<&'a Account>,
    pub members: &'a [Member],
    pub groups: &'a [Group],
}

pub(super) fn account_form(config: &AccountFormConfig) -> Markup {
    let name = config.account.map(|a| a.name.as_str()).unwrap_or_default();
    let kind = config.account.map(|a| a.kind);
    let opening_balance = config.account.map(|a| a.opening_balance).unwrap_or(0.0);
    let owner = config.account.map(|a| a.owner);
    let submit_label = if config.use_put {
        "Save Account"
    } else {
        "Create Account"
    };

    html!(
        form
            hx-post=[(!config.use_put).then_some(config.action)]
            hx-put=[config.use_put.then_some(config.action)]
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            class={(FORM_CONTAINER_STYLE) " space-y-4 w-full"}
        {
            div class="w-full"
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Name" }
                input
                    type="text"
                    name="name"
                    id="name"
                    value=(name)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="w-full"
            {
                label for="kind" class=(FORM_LABEL_STYLE) { "Kind" }
                select name="kind" id="kind" class=(FORM_SELECT_STYLE)
                {
                    @for option in AccountKind::ALL {
                        option
                            value=(option.as_str())
                            selected[kind == Some(option)]
                        {
                            (option.label())
                        }
                    }
                }
            }

            div class="w-full"
            {
                label for="opening_balance" class=(FORM_LABEL_STYLE) { "Opening balance" }
                div class="input-wrapper w-full"
                {
                    input
                        type="number"
                        name="opening_balance"
                        id="opening_balance"
                        step="0.01"
                        value=(opening_balance)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div class="w-full"
            {
                label for="owner" class=(FORM_LABEL_STYLE) { "Owner" }
                select name="owner" id="owner" required class=(FORM_SELECT_STYLE)
                {
                    @if owner.is_none() {
                        option value="" selected disabled { "Select an owner" }
                    }

                    optgroup label="Members"
                    {
                        @for member in config.members {
                            @let value = AccountOwner::Member(member.id).form_value();
                            option
                                value=(value)
                                selected[owner == Some(AccountOwner::Member(member.id))]
                            {
                                (member.name)
                            }
                        }
                    }

                    optgroup label="Groups"
                    {
                        @for group in config.groups {
                            @let value = AccountOwner::Group(group.id).form_value();
                            option
                                value=(value)
                                selected[owner == Some(AccountOwner::Group(group.id))]
                            {
                                (group.name)
                            }
                        }
                    }
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE)
            {
                span id="indicator" class="htmx-indicator" { (loading_spinner()) }
                (submit_label)
            }
        }
    )
}
