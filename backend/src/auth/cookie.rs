//! Cookie transport for session tokens
//!
//! Both tokens travel as `HttpOnly` cookies scoped to `/`. `SameSite`
//! defaults to `Lax`; `Secure` follows the deployment environment.

use anyhow::Result;
use axum::http::{
    header::{COOKIE, SET_COOKIE},
    HeaderMap, HeaderValue,
};
use serde::Deserialize;
use std::fmt;
use storefront_shared::TokenPair;

/// Cookie carrying the access token
pub const ACCESS_COOKIE_NAME: &str = "accessToken";
/// Cookie carrying the refresh token
pub const REFRESH_COOKIE_NAME: &str = "refreshToken";

/// `SameSite` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    /// Spelling used in configuration files
    pub fn as_config_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "strict",
            SameSite::Lax => "lax",
            SameSite::None => "none",
        }
    }
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        })
    }
}

/// A single `Set-Cookie` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieDescriptor {
    pub name: &'static str,
    pub value: String,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
    pub max_age: i64,
    pub path: &'static str,
}

impl CookieDescriptor {
    /// Render as a `Set-Cookie` header value
    pub fn to_header_value(&self) -> Result<HeaderValue> {
        let mut cookie = format!(
            "{}={}; Max-Age={}; Path={}",
            self.name, self.value, self.max_age, self.path
        );
        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        cookie.push_str(&format!("; SameSite={}", self.same_site));
        if self.secure {
            cookie.push_str("; Secure");
        }
        Ok(HeaderValue::from_str(&cookie)?)
    }
}

/// Binds session tokens to HTTP cookies
#[derive(Debug, Clone)]
pub struct TransportBinder {
    secure: bool,
    same_site: SameSite,
    access_max_age: i64,
    refresh_max_age: i64,
}

impl TransportBinder {
    pub fn new(
        secure: bool,
        same_site: SameSite,
        access_max_age: i64,
        refresh_max_age: i64,
    ) -> Self {
        Self {
            secure,
            same_site,
            access_max_age,
            refresh_max_age,
        }
    }

    fn descriptor(&self, name: &'static str, value: String, max_age: i64) -> CookieDescriptor {
        CookieDescriptor {
            name,
            value,
            http_only: true,
            secure: self.secure,
            same_site: self.same_site,
            max_age,
            path: "/",
        }
    }

    /// Cookies carrying a freshly issued token pair
    pub fn session_cookies(&self, pair: &TokenPair) -> [CookieDescriptor; 2] {
        [
            self.descriptor(ACCESS_COOKIE_NAME, pair.access_token.clone(), self.access_max_age),
            self.descriptor(REFRESH_COOKIE_NAME, pair.refresh_token.clone(), self.refresh_max_age),
        ]
    }

    /// Cookies that make the browser drop both tokens immediately
    pub fn cleared_cookies(&self) -> [CookieDescriptor; 2] {
        [
            self.descriptor(ACCESS_COOKIE_NAME, String::new(), 0),
            self.descriptor(REFRESH_COOKIE_NAME, String::new(), 0),
        ]
    }

    /// Append both session cookies to the response headers
    pub fn attach(&self, headers: &mut HeaderMap, pair: &TokenPair) -> Result<()> {
        for cookie in self.session_cookies(pair) {
            headers.append(SET_COOKIE, cookie.to_header_value()?);
        }
        Ok(())
    }

    /// Append a replacement access cookie
    pub fn attach_access(&self, headers: &mut HeaderMap, access_token: &str) -> Result<()> {
        let cookie = self.descriptor(
            ACCESS_COOKIE_NAME,
            access_token.to_string(),
            self.access_max_age,
        );
        headers.append(SET_COOKIE, cookie.to_header_value()?);
        Ok(())
    }

    /// Expire both session cookies. This is the whole of logout.
    pub fn clear(&self, headers: &mut HeaderMap) -> Result<()> {
        for cookie in self.cleared_cookies() {
            headers.append(SET_COOKIE, cookie.to_header_value()?);
        }
        Ok(())
    }

    /// Read a named cookie from the request headers
    #[inline]
    pub fn extract(&self, headers: &HeaderMap, name: &str) -> Option<String> {
        get_cookie(headers, name)
    }
}

/// Find a cookie value by name across all `Cookie` headers
///
/// Pairs are split on `;` and then on the first `=`, so values may contain
/// `=`. An empty value counts as absent.
pub fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}
