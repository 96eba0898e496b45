//! User accounts, password hashing and cookie-based session authentication.

use maud::{Markup, html};

use crate::html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE};

pub(crate) mod cookie;
mod forgot_password;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod register;
pub(crate) mod user;

pub use forgot_password::get_forgot_password_page;
pub use log_in::{LoginState, get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{AuthState, auth_guard, auth_guard_hx};
pub use password::{PasswordHash, ValidatedPassword};
pub use register::{RegistrationState, get_register_page, register_user};
pub use user::{User, UserID, create_user, create_user_table, set_user_password};

/// The email field shared by the log-in and registration forms.
pub(crate) fn email_input(email: &str) -> Markup {
    html! {
        div
        {
            label
                for="email"
                class=(FORM_LABEL_STYLE)
            {
                "Email"
            }

            input
                type="email"
                name="email"
                id="email"
                placeholder="you@example.com"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                value=(email);
        }
    }
}
