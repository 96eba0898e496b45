//! The route handler for logging out the current user.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::PrivateCookieJar;

use crate::{auth::cookie::invalidate_auth_cookie, endpoints};

/// Invalidate the auth cookies and redirect to the log-in page.
pub async fn get_log_out(jar: PrivateCookieJar) -> Response {
    (
        invalidate_auth_cookie(jar),
        Redirect::to(endpoints::LOG_IN_VIEW),
    )
        .into_response()
}

#[cfg(test)]
mod log_out_tests {
    use axum::http::StatusCode;
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use sha2::{Digest, Sha512};
    use time::OffsetDateTime;

    use crate::{
        auth::{
            UserID,
            cookie::{COOKIE_USER_ID, DEFAULT_COOKIE_DURATION, set_auth_cookie},
        },
        endpoints,
    };

    use super::get_log_out;

    #[tokio::test]
    async fn log_out_invalidates_cookie_and_redirects() {
        let hash = Sha512::digest(b"foobar");
        let key = Key::from(&hash);
        let jar = set_auth_cookie(
            PrivateCookieJar::new(key),
            UserID::new(1),
            DEFAULT_COOKIE_DURATION,
        )
        .unwrap();

        let response = get_log_out(jar.clone()).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            endpoints::LOG_IN_VIEW
        );

        let invalidated = super::invalidate_auth_cookie(jar);
        let cookie = invalidated.get(COOKIE_USER_ID).unwrap();
        assert_eq!(cookie.value(), "deleted");
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
    }
}
