//! The shared form for creating and editing a period.

use axum::{http::StatusCode, response::Response};
use maud::{Markup, PreEscaped, html};
use time::Date;

use crate::{
    alert::AlertTemplate,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        HeadElement, loading_spinner,
    },
    shared_templates::render,
};

pub(super) struct PeriodFormConfig<'a> {
    /// The URL the form submits to.
    pub action: &'a str,
    /// Submit with PUT (editing) instead of POST (creating).
    pub use_put: bool,
    pub name: &'a str,
    pub start: Date,
    pub end: Date,
    /// Set after a gap warning so an identical resubmission commits.
    pub confirmed: bool,
}

pub(super) fn period_form(config: &PeriodFormConfig) -> Markup {
    let submit_label = if config.use_put {
        "Save Period"
    } else {
        "Create Period"
    };

    html!(
        form
            id="period-form"
            hx-post=[(!config.use_put).then_some(config.action)]
            hx-put=[config.use_put.then_some(config.action)]
            hx-target="#period-form"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            class={(FORM_CONTAINER_STYLE) " space-y-4 w-full"}
        {
            input type="hidden" name="confirmed" value=(config.confirmed);

            div class="w-full"
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Name" }
                input
                    type="text"
                    name="name"
                    id="name"
                    value=(config.name)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="w-full"
            {
                label for="start" class=(FORM_LABEL_STYLE) { "Start date" }
                input
                    type="date"
                    name="start"
                    id="start"
                    value=(config.start)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="w-full"
            {
                label for="end" class=(FORM_LABEL_STYLE) { "End date" }
                input
                    type="date"
                    name="end"
                    id="end"
                    value=(config.end)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE)
            {
                span id="indicator" class="htmx-indicator" { (loading_spinner()) }
                (submit_label)
            }
        }
    )
}

/// Responds with a gap warning and the form re-rendered with its confirmed
/// flag set, so an identical resubmission goes through.
pub(super) fn gap_warning_response(config: &PeriodFormConfig, gaps: &[(Date, Date)]) -> Response {
    let gap_list = gaps
        .iter()
        .map(|(start, end)| {
            if start == end {
                start.to_string()
            } else {
                format!("{start} to {end}")
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    let details = format!(
        "No period covers {gap_list}. Submit again to save these dates anyway."
    );
    let alert = AlertTemplate::warning("These dates leave days uncovered", &details);

    render(
        StatusCode::OK,
        html!(
            (period_form(config))
            (alert.into_markup())
        ),
    )
}

/// When the user picks a new start date, move the end date to keep a 31-day
/// span, matching the suggested default. Once the user edits the end date
/// themselves it stops following; programmatic updates do not fire 'input',
/// so only a manual edit sets the flag.
pub(super) fn date_follow_script() -> HeadElement {
    HeadElement::ScriptSource(PreEscaped(
        r#"
        let endEdited = false;
        document.addEventListener('input', (event) => {
            if (event.target.id === 'end') endEdited = true;
        });
        document.addEventListener('change', (event) => {
            if (event.target.id !== 'start' || endEdited) return;
            const end = document.getElementById('end');
            if (!end || !event.target.value) return;
            const start = new Date(event.target.value);
            start.setDate(start.getDate() + 30);
            end.value = start.toISOString().slice(0, 10);
        });
        "#
        .to_owned(),
    ))
}
