use axum::{response::IntoResponse, response::Response};
use maud::{Markup, html};

use crate::html::base;

fn forgot_password_template() -> Markup {
    let content = html! {
        // Template adapted from https://flowbite.com/blocks/marketing/register/
        div
            class="flex flex-col items-center justify-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            a
                href="#"
                class="flex items-center mb-6 text-2xl font-semibold"
            {
                img
                    src="/static/favicon-128x128.png"
                    alt="logo"
                    class="w-8 h-8 mr-2";
                "CasaBooks"
            }
            div
                class="w-full bg-white rounded shadow dark:border md:mt-0 sm:max-w-md xl:p-0 dark:bg-gray-800 dark:border-gray-700"
            {
                div class="p-6 space-y-4 md:space-y-6 sm:p-8"
                {
                    h1
                        class="text-xl font-bold md:text-2xl"
                    {
                        "Forgot your password?"
                    }
                    p class="text-justify"
                    {
                        "To reset your password, go to the directory where this server is
                    running from and run the program 'reset_password', pointing it at
                    your database file and the email address of your account. The
                    program will prompt for a new password and update it in place."
                    }
                }
            }
        }
    };

    base("Forgot Password", &[], &content)
}

/// Renders a page describing how the user's password can be reset.
pub async fn get_forgot_password_page() -> Response {
    forgot_password_template().into_response()
}

#[cfg(test)]
mod forgot_password_tests {
    use axum::http::StatusCode;

    use crate::test_utils::{assert_valid_html, parse_html};

    use super::get_forgot_password_page;

    #[tokio::test]
    async fn page_renders_instructions() {
        let response = get_forgot_password_page().await;

        assert_eq!(response.status(), StatusCode::OK);

        let document = parse_html(response).await;
        assert_valid_html(&document);

        let h1 = scraper::Selector::parse("h1").unwrap();
        let heading: String = document
            .select(&h1)
            .next()
            .expect("No h1 found")
            .text()
            .collect();
        assert!(heading.contains("Forgot your password?"));
    }
}
