use std::env;

use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://lingoboost-backend.onrender.com";

const BASE_URL_VAR: &str = "LINGO_API_BASE_URL";
const AUTH_BASE_URL_VAR: &str = "LINGO_AUTH_BASE_URL";

/// Where the content and auth endpoints live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: Url,
    auth_base_url: Url,
}

impl ApiConfig {
    /// Use one base URL for both content and auth.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidBaseUrl` unless `base_url` is an http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let base_url = parse_base(BASE_URL_VAR, base_url)?;
        Ok(Self {
            auth_base_url: base_url.clone(),
            base_url,
        })
    }

    /// # Errors
    ///
    /// Returns `ConfigError::InvalidBaseUrl` unless `url` is an http(s) URL.
    pub fn with_auth_base_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.auth_base_url = parse_base(AUTH_BASE_URL_VAR, url)?;
        Ok(self)
    }

    /// Read `LINGO_API_BASE_URL` and `LINGO_AUTH_BASE_URL`, defaulting to the
    /// hosted backend.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base = env::var(BASE_URL_VAR).unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let config = Self::new(&base)?;
        match env::var(AUTH_BASE_URL_VAR) {
            Ok(auth) if !auth.trim().is_empty() => config.with_auth_base_url(&auth),
            _ => Ok(config),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn auth_base_url(&self) -> &Url {
        &self.auth_base_url
    }

    /// Absolute URL for a content endpoint path such as `api/quizzes/fr`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        join(&self.base_url, path)
    }

    #[must_use]
    pub fn auth_endpoint(&self, path: &str) -> String {
        join(&self.auth_base_url, path)
    }
}

fn parse_base(var: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let invalid = || ConfigError::InvalidBaseUrl {
        var,
        value: raw.to_string(),
    };
    let url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid());
    }
    Ok(url)
}

fn join(base: &Url, path: &str) -> String {
    format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let config = ApiConfig::new("http://localhost:5000/").unwrap();
        assert_eq!(
            config.endpoint("/api/quizzes/fr"),
            "http://localhost:5000/api/quizzes/fr"
        );
    }

    #[test]
    fn auth_base_can_differ() {
        let config = ApiConfig::new("https://content.example")
            .unwrap()
            .with_auth_base_url("http://localhost:5000")
            .unwrap();
        assert_eq!(
            config.auth_endpoint("api/auth/login"),
            "http://localhost:5000/api/auth/login"
        );
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(ApiConfig::new("ftp://example.com").is_err());
        assert!(ApiConfig::new("not a url").is_err());
    }

    #[test]
    fn default_points_at_hosted_backend() {
        assert_eq!(
            ApiConfig::new(DEFAULT_BASE_URL)
                .unwrap()
                .endpoint("api/keyboards/de"),
            format!("{DEFAULT_BASE_URL}/api/keyboards/de")
        );
    }
}
