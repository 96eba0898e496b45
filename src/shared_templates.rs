/*! Rendering helpers shared between views. */

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::Markup;

#[inline]
pub fn render(status_code: StatusCode, markup: Markup) -> Response {
    (status_code, markup).into_response()
}
