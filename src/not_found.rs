//! Defines the route handlers for the 404 not found and internal server error pages.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::html::error_view;

pub async fn get_404_not_found() -> Response {
    get_404_not_found_response()
}

pub fn get_404_not_found_response() -> Response {
    (
        StatusCode::NOT_FOUND,
        error_view(
            "Not Found",
            "404",
            "Sorry, that page does not exist.",
            "Check the address for typos or head back to the homepage.",
        ),
    )
        .into_response()
}

pub fn render_internal_server_error(description: &str, fix: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        error_view("Internal Server Error", "500", description, fix),
    )
        .into_response()
}

pub async fn get_internal_server_error_page() -> Response {
    render_internal_server_error(
        "Sorry, something went wrong.",
        "Try again later or check the server logs",
    )
}

#[cfg(test)]
mod error_page_tests {
    use axum::http::StatusCode;

    use crate::test_utils::parse_html;

    use super::{get_404_not_found, get_internal_server_error_page};

    #[tokio::test]
    async fn not_found_page_has_404_status_and_heading() {
        let response = get_404_not_found().await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let html = parse_html(response).await;
        let h1 = scraper::Selector::parse("h1").unwrap();
        let heading: String = html
            .select(&h1)
            .next()
            .expect("No h1 found")
            .text()
            .collect();
        assert_eq!(heading.trim(), "404");
    }

    #[tokio::test]
    async fn internal_server_error_page_has_500_status() {
        let response = get_internal_server_error_page().await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
