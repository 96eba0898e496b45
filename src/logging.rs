//! Middleware for logging requests and responses.

use axum::{extract::Request, http::header::CONTENT_TYPE, middleware::Next, response::Response};

/// The maximum number of body bytes logged at the `info` level.
const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is truncated
/// and the full body is logged at the `debug` level. Password fields in
/// form submissions are redacted.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_text = body_to_text(body).await;

    let is_form_post = parts.method == axum::http::Method::POST
        && parts
            .headers
            .get(CONTENT_TYPE)
            .is_some_and(|value| value.as_bytes().starts_with(b"application/x-www-form-urlencoded"));

    if is_form_post {
        let display_text = redact_field(&body_text, "password");
        let display_text = redact_field(&display_text, "confirm_password");
        log_body(&format!("Received request: {parts:#?}"), &display_text);
    } else {
        log_body(&format!("Received request: {parts:#?}"), &body_text);
    }

    let request = Request::from_parts(parts, body_text.into());
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_text = body_to_text(body).await;
    log_body(&format!("Sending response: {parts:#?}"), &body_text);

    Response::from_parts(parts, body_text.into())
}

async fn body_to_text(body: axum::body::Body) -> String {
    let body_bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();

    String::from_utf8_lossy(&body_bytes).to_string()
}

/// Replaces the value of `field_name` in urlencoded form text with asterisks.
fn redact_field(form_text: &str, field_name: &str) -> String {
    let prefix = format!("{field_name}=");

    form_text
        .split('&')
        .map(|pair| {
            if pair.starts_with(&prefix) {
                format!("{field_name}=********")
            } else {
                pair.to_owned()
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn log_body(header_text: &str, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "{header_text}\nbody: {}...",
            &body[..LOG_BODY_LENGTH_LIMIT]
        );
        tracing::debug!("Full body: {body:?}");
    } else {
        tracing::info!("{header_text}\nbody: {body:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::redact_field;

    #[test]
    fn redacts_password_in_the_middle_of_a_form() {
        let form_text = "email=foo%40bar.baz&password=hunter2&remember_me=true";

        let redacted = redact_field(form_text, "password");

        assert_eq!(
            redacted,
            "email=foo%40bar.baz&password=********&remember_me=true"
        );
    }

    #[test]
    fn redacts_trailing_password() {
        let form_text = "email=foo%40bar.baz&password=hunter2";

        let redacted = redact_field(form_text, "password");

        assert_eq!(redacted, "email=foo%40bar.baz&password=********");
    }

    #[test]
    fn does_not_match_inside_other_field_names() {
        let form_text = "confirm_password=hunter2&password=hunter2";

        let redacted = redact_field(form_text, "password");

        assert_eq!(redacted, "confirm_password=hunter2&password=********");
    }

    #[test]
    fn leaves_forms_without_the_field_unchanged() {
        let form_text = "name=Alice&kind=checking";

        assert_eq!(redact_field(form_text, "password"), form_text);
    }
}
