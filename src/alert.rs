//! Alert fragments for displaying warning and error messages.
//!
//! Forms post with `hx-target-error="#alert-container"` so that error
//! responses land in the fixed alert container at the bottom of the page.

use maud::{Markup, html};

/// Alert message types for styling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlertLevel {
    Warning,
    Error,
}

/// Renders alert messages with appropriate styling.
pub struct AlertTemplate<'a> {
    pub level: AlertLevel,
    pub message: &'a str,
    pub details: &'a str,
}

impl<'a> AlertTemplate<'a> {
    /// Create a new warning alert.
    pub fn warning(message: &'a str, details: &'a str) -> Self {
        Self {
            level: AlertLevel::Warning,
            message,
            details,
        }
    }

    /// Create a new error alert.
    pub fn error(message: &'a str, details: &'a str) -> Self {
        Self {
            level: AlertLevel::Error,
            message,
            details,
        }
    }

    pub fn into_markup(self) -> Markup {
        let (container_style, icon) = match self.level {
            AlertLevel::Warning => (
                "flex items-start p-4 mb-4 text-yellow-800 rounded-lg bg-yellow-50 \
                dark:bg-gray-800 dark:text-yellow-300 border border-yellow-300 \
                dark:border-yellow-800 shadow-lg",
                "!",
            ),
            AlertLevel::Error => (
                "flex items-start p-4 mb-4 text-red-800 rounded-lg bg-red-50 \
                dark:bg-gray-800 dark:text-red-400 border border-red-300 \
                dark:border-red-800 shadow-lg",
                "✕",
            ),
        };

        html! {
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div class=(container_style) role="alert"
                {
                    span class="shrink-0 w-5 h-5 me-3 text-center font-bold" aria-hidden="true"
                    {
                        (icon)
                    }

                    div class="grow text-sm"
                    {
                        p class="font-medium" { (self.message) }

                        @if !self.details.is_empty()
                        {
                            p { (self.details) }
                        }
                    }

                    button
                        type="button"
                        class="shrink-0 ms-3 -mx-1.5 -my-1.5 rounded-lg p-1.5 \
                            inline-flex items-center justify-center h-8 w-8 \
                            hover:bg-gray-200 dark:hover:bg-gray-700"
                        aria-label="Close"
                        onclick="this.closest('[role=alert]').remove()"
                    {
                        "✕"
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod alert_template_tests {
    use super::AlertTemplate;

    #[test]
    fn error_alert_contains_message_and_details() {
        let markup =
            AlertTemplate::error("Something went wrong", "Check the server logs").into_markup();
        let html = markup.into_string();

        assert!(html.contains("Something went wrong"));
        assert!(html.contains("Check the server logs"));
        assert!(html.contains("alert-container"));
    }

    #[test]
    fn warning_alert_omits_empty_details() {
        let markup = AlertTemplate::warning("Dates leave a gap", "").into_markup();
        let html = markup.into_string();

        assert!(html.contains("Dates leave a gap"));
        assert_eq!(html.matches("<p").count(), 1);
    }
}
