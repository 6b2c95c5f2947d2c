//! Auth cookie management.
//!
//! The access and refresh tokens live in a pair of HttpOnly cookies.
//! They are always set together and cleared together so the browser
//! never holds a half-updated credential pair.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use authgate_core::config::cookie::CookieConfig;

/// Cookie holding the short-lived access token.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
/// Cookie holding the long-lived refresh token.
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

fn build_cookie(
    name: &'static str,
    value: String,
    max_age_seconds: i64,
    config: &CookieConfig,
) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, value);
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_secure(config.secure);
    cookie.set_max_age(Duration::seconds(max_age_seconds));
    if let Some(domain) = &config.domain {
        cookie.set_domain(domain.clone());
    }
    cookie
}

/// Set both auth cookies from a freshly issued token pair.
pub fn set_auth_cookies(
    jar: CookieJar,
    access_token: &str,
    refresh_token: &str,
    config: &CookieConfig,
) -> CookieJar {
    jar.add(build_cookie(
        ACCESS_TOKEN_COOKIE,
        access_token.to_string(),
        config.access_max_age_seconds,
        config,
    ))
    .add(build_cookie(
        REFRESH_TOKEN_COOKIE,
        refresh_token.to_string(),
        config.refresh_max_age_seconds,
        config,
    ))
}

/// Clear both auth cookies.
///
/// Emits an expired empty cookie for each name unconditionally, not
/// just for cookies the request presented, so a browser holding either
/// half of a torn-down session always sees both removed.
pub fn clear_auth_cookies(jar: CookieJar, config: &CookieConfig) -> CookieJar {
    jar.add(build_cookie(ACCESS_TOKEN_COOKIE, String::new(), 0, config))
        .add(build_cookie(REFRESH_TOKEN_COOKIE, String::new(), 0, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CookieConfig {
        CookieConfig::default()
    }

    #[test]
    fn sets_both_cookies_with_attributes() {
        let jar = set_auth_cookies(CookieJar::new(), "acc", "ref", &config());

        let access = jar.get(ACCESS_TOKEN_COOKIE).unwrap();
        assert_eq!(access.value(), "acc");
        assert_eq!(access.http_only(), Some(true));
        assert_eq!(access.same_site(), Some(SameSite::Lax));
        assert_eq!(access.path(), Some("/"));
        assert_eq!(access.max_age(), Some(Duration::seconds(600)));

        let refresh = jar.get(REFRESH_TOKEN_COOKIE).unwrap();
        assert_eq!(refresh.value(), "ref");
        assert_eq!(refresh.max_age(), Some(Duration::seconds(604_800)));
    }

    #[test]
    fn respects_secure_flag() {
        let insecure = CookieConfig {
            secure: false,
            ..CookieConfig::default()
        };
        let jar = set_auth_cookies(CookieJar::new(), "acc", "ref", &insecure);
        assert_eq!(jar.get(ACCESS_TOKEN_COOKIE).unwrap().secure(), Some(false));
    }

    #[test]
    fn clear_expires_both_cookies() {
        let jar = set_auth_cookies(CookieJar::new(), "acc", "ref", &config());
        let jar = clear_auth_cookies(jar, &config());

        let access = jar.get(ACCESS_TOKEN_COOKIE).unwrap();
        assert_eq!(access.value(), "");
        assert_eq!(access.max_age(), Some(Duration::ZERO));

        let refresh = jar.get(REFRESH_TOKEN_COOKIE).unwrap();
        assert_eq!(refresh.value(), "");
        assert_eq!(refresh.max_age(), Some(Duration::ZERO));
    }

    #[test]
    fn clear_emits_removals_for_cookies_the_jar_never_held() {
        // A request may present only half the pair; teardown must still
        // remove both.
        let jar = clear_auth_cookies(CookieJar::new(), &config());

        let access = jar.get(ACCESS_TOKEN_COOKIE).unwrap();
        assert_eq!(access.value(), "");
        assert_eq!(access.max_age(), Some(Duration::ZERO));
        assert_eq!(access.path(), Some("/"));

        let refresh = jar.get(REFRESH_TOKEN_COOKIE).unwrap();
        assert_eq!(refresh.value(), "");
        assert_eq!(refresh.max_age(), Some(Duration::ZERO));
    }
}
