use axum::response::Redirect;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;

use crate::error::AppError;

const FLASH_COOKIE: &str = "flash";

/// One-shot message shown on the page a form post redirects to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub level: String,
    pub message: String,
}

impl Flash {
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .append_pair("level", &self.level)
            .append_pair("message", &self.message)
            .finish()
    }

    pub fn decode(raw: &str) -> Option<Self> {
        let mut level = None;
        let mut message = None;
        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            match key.as_ref() {
                "level" => level = Some(value.into_owned()),
                "message" => message = Some(value.into_owned()),
                _ => {}
            }
        }
        Some(Flash {
            level: level?,
            message: message?,
        })
    }
}

/// Redirect to `to`, leaving a flash message for the next page.
pub fn redirect(jar: CookieJar, to: &str, level: &str, message: &str) -> (CookieJar, Redirect) {
    let flash = Flash {
        level: level.to_string(),
        message: message.to_string(),
    };
    let cookie = Cookie::build((FLASH_COOKIE, flash.encode()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    (jar.add(cookie), Redirect::to(to))
}

/// Redirect back with the error as a flash message. Server-side errors stay masked.
pub fn redirect_error(jar: CookieJar, to: &str, err: AppError) -> (CookieJar, Redirect) {
    redirect(jar, to, "error", &err.public_message())
}

/// Read and clear the pending flash message.
pub fn take(jar: CookieJar) -> (CookieJar, Option<Flash>) {
    let flash = jar
        .get(FLASH_COOKIE)
        .and_then(|cookie| Flash::decode(cookie.value()));
    if flash.is_none() {
        return (jar, None);
    }
    let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/"));
    (jar, flash)
}
