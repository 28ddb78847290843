//! Session and OAuth-state cookies.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use cookie::time::Duration;

/// Attributes for an `HttpOnly` cookie.
#[derive(Debug, Clone, Copy)]
pub struct CookieOptions {
    pub path: &'static str,
    pub max_age_secs: i64,
    /// `Secure; SameSite=None` when set, `SameSite=Lax` otherwise.
    pub secure: bool,
}

pub fn build(name: &'static str, value: String, options: CookieOptions) -> Cookie<'static> {
    let same_site = if options.secure {
        SameSite::None
    } else {
        SameSite::Lax
    };
    Cookie::build((name, value))
        .path(options.path)
        .max_age(Duration::seconds(options.max_age_secs))
        .http_only(true)
        .same_site(same_site)
        .secure(options.secure)
        .build()
}

/// A cookie that expires `name` on `path` immediately.
pub fn removal(name: &'static str, path: &'static str, secure: bool) -> Cookie<'static> {
    let mut cookie = build(
        name,
        String::new(),
        CookieOptions {
            path,
            max_age_secs: 0,
            secure,
        },
    );
    cookie.make_removal();
    cookie
}

/// Non-empty value of cookie `name` in `jar`.
pub fn value<'a>(jar: &'a CookieJar, name: &str) -> Option<&'a str> {
    jar.get(name)
        .map(|cookie| cookie.value())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderMap, HeaderValue};

    fn lax(max_age_secs: i64) -> CookieOptions {
        CookieOptions {
            path: "/",
            max_age_secs,
            secure: false,
        }
    }

    #[test]
    fn test_value_among_several_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("a=1; token=abc; b=2"));
        let jar = CookieJar::from_headers(&headers);
        assert_eq!(value(&jar, "token"), Some("abc"));
        assert_eq!(value(&jar, "b"), Some("2"));
        assert_eq!(value(&jar, "missing"), None);
    }

    #[test]
    fn test_value_across_multiple_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::COOKIE, HeaderValue::from_static("oauth_state=xyz"));
        let jar = CookieJar::from_headers(&headers);
        assert_eq!(value(&jar, "oauth_state"), Some("xyz"));
    }

    #[test]
    fn test_empty_value_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("token="));
        let jar = CookieJar::from_headers(&headers);
        assert_eq!(value(&jar, "token"), None);
    }

    #[test]
    fn test_build_lax() {
        let cookie = build("token", "v".to_string(), lax(60));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(60)));

        let rendered = cookie.to_string();
        assert!(rendered.starts_with("token=v;"));
        assert!(!rendered.contains("Secure"));
    }

    #[test]
    fn test_build_secure_uses_same_site_none() {
        let cookie = build(
            "token",
            "v".to_string(),
            CookieOptions {
                path: "/",
                max_age_secs: 60,
                secure: true,
            },
        );
        assert_eq!(cookie.same_site(), Some(SameSite::None));
        assert_eq!(cookie.secure(), Some(true));
    }

    #[test]
    fn test_removal_expires_immediately() {
        let cookie = removal("oauth_state", "/api/auth", false);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.path(), Some("/api/auth"));
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert!(cookie.to_string().contains("Max-Age=0"));
    }
}
