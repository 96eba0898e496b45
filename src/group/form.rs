//! The shared form for creating and editing a group.

use maud::{Markup, html};

use crate::{
    group::core::{ApportionmentMode, Group},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CHECKBOX_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE,
        FORM_SELECT_STYLE, FORM_TEXT_INPUT_STYLE, loading_spinner,
    },
    member::{Member, MemberId},
};

pub(super) struct GroupFormConfig<'a> {
    /// The URL the form submits to.
    pub action: &'a str,
    /// Submit with PUT (editing) instead of POST (creating).
    pub use_put: bool,
    /// Existing values when editing.
    pub group: Option<&'a Group>,
    /// The IDs of the members currently in the group.
    pub group_member_ids: &'a [MemberId],
    /// The active members offered as checkboxes.
    pub members: &'a [Member],
}

pub(super) fn group_form(config: &GroupFormConfig) -> Markup {
    let name = config.group.map(|g| g.name.as_str()).unwrap_or_default();
    let mode = config.group.map(|g| g.apportionment_mode);
    let submit_label = if config.use_put {
        "Save Group"
    } else {
        "Create Group"
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
                label for="apportionment_mode" class=(FORM_LABEL_STYLE) { "Cost sharing" }
                select
                    name="apportionment_mode"
                    id="apportionment_mode"
                    class=(FORM_SELECT_STYLE)
                {
                    @for option in ApportionmentMode::ALL {
                        option
                            value=(option.as_str())
                            selected[mode == Some(option)]
                        {
                            (option.label())
                        }
                    }
                }
            }

            fieldset class="w-full"
            {
                legend class=(FORM_LABEL_STYLE) { "Members" }

                @for member in config.members {
                    label class="flex items-center gap-2 py-1"
                    {
                        input
                            type="checkbox"
                            name="member_ids"
                            value=(member.id)
                            checked[config.group_member_ids.contains(&member.id)]
                            class=(FORM_CHECKBOX_STYLE);
                        (member.name)
                    }
                }

                @if config.members.is_empty() {
                    p class="text-sm text-gray-500 dark:text-gray-400"
                    {
                        "No members available. Add members first."
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
