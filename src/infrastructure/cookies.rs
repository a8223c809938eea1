use crate::infrastructure::config::CookieConfig;
use cookie::time::{Duration, OffsetDateTime};
use cookie::{Cookie, SameSite};

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Builds the `Set-Cookie` values that carry and clear a session
#[derive(Debug, Clone)]
pub struct SessionCookies {
    config: CookieConfig,
}

impl SessionCookies {
    pub fn new(config: CookieConfig) -> Self {
        Self { config }
    }

    pub fn refresh_path(&self) -> &str {
        &self.config.refresh_path
    }

    /// Access cookie on `/`, refresh cookie only on the refresh endpoint
    pub fn build_session_cookies(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Vec<Cookie<'static>> {
        vec![
            self.cookie(
                ACCESS_TOKEN_COOKIE,
                access_token,
                "/",
                Duration::seconds(self.config.access_max_age),
            ),
            self.cookie(
                REFRESH_TOKEN_COOKIE,
                refresh_token,
                &self.config.refresh_path,
                Duration::seconds(self.config.refresh_max_age),
            ),
        ]
    }

    /// One immediately-expiring cookie per distinct name
    pub fn build_expired_cookies<I, S>(&self, names: I) -> Vec<Cookie<'static>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen: Vec<String> = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if !name.is_empty() && !seen.iter().any(|n| n == name) {
                seen.push(name.to_string());
            }
        }

        seen.into_iter()
            .map(|name| {
                let path = if name == REFRESH_TOKEN_COOKIE {
                    self.config.refresh_path.clone()
                } else {
                    "/".to_string()
                };
                let mut cookie = self.cookie(&name, "", &path, Duration::ZERO);
                cookie.set_expires(OffsetDateTime::UNIX_EPOCH);
                cookie
            })
            .collect()
    }

    /// Expire every cookie named in a raw `Cookie` request header, plus both session cookies
    pub fn build_expired_cookies_from_header(&self, header: Option<&str>) -> Vec<Cookie<'static>> {
        let mut names: Vec<String> = header
            .map(|raw| {
                Cookie::split_parse(raw)
                    .filter_map(Result::ok)
                    .map(|cookie| cookie.name().to_string())
                    .collect()
            })
            .unwrap_or_default();

        names.push(ACCESS_TOKEN_COOKIE.to_string());
        names.push(REFRESH_TOKEN_COOKIE.to_string());

        self.build_expired_cookies(names)
    }

    fn cookie(&self, name: &str, value: &str, path: &str, max_age: Duration) -> Cookie<'static> {
        let secure = self.config.domain.is_some();
        let mut builder = Cookie::build((name.to_string(), value.to_string()))
            .path(path.to_string())
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(secure)
            .max_age(max_age);

        if let Some(domain) = &self.config.domain {
            builder = builder.domain(domain.clone());
        }

        builder.build()
    }
}

/// Value of a named cookie in a raw `Cookie` request header
pub fn find_cookie(header: &str, name: &str) -> Option<String> {
    Cookie::split_parse(header)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}
