//! Raw API failures and how their status codes are routed

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const DEFAULT_RETRY_AFTER: &str = "60";

/// A failed call to the cluster API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiFailure {
    pub status_code: u16,
    pub message: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl ApiFailure {
    #[must_use]
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The `retry-after` header, `"60"` when absent.
    #[must_use]
    pub fn retry_after(&self) -> &str {
        self.header("retry-after")
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_RETRY_AFTER)
    }

    #[must_use]
    pub fn route(&self) -> ApiRoute {
        ApiRoute::from_status(self.status_code)
    }
}

/// Branch of the API handler a status code lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiRoute {
    Unauthorized,
    Conflict,
    RateLimit,
    ServerError,
    Generic,
}

impl ApiRoute {
    /// 403 and 404 fall through to `Generic`; callers that know the verb or
    /// resource use the permission and not-found handlers directly.
    #[must_use]
    pub fn from_status(status_code: u16) -> Self {
        match status_code {
            401 => Self::Unauthorized,
            409 => Self::Conflict,
            429 => Self::RateLimit,
            500.. => Self::ServerError,
            _ => Self::Generic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes() {
        assert_eq!(ApiRoute::from_status(401), ApiRoute::Unauthorized);
        assert_eq!(ApiRoute::from_status(409), ApiRoute::Conflict);
        assert_eq!(ApiRoute::from_status(429), ApiRoute::RateLimit);
        assert_eq!(ApiRoute::from_status(500), ApiRoute::ServerError);
        assert_eq!(ApiRoute::from_status(503), ApiRoute::ServerError);
        assert_eq!(ApiRoute::from_status(403), ApiRoute::Generic);
        assert_eq!(ApiRoute::from_status(404), ApiRoute::Generic);
        assert_eq!(ApiRoute::from_status(422), ApiRoute::Generic);
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let failure = ApiFailure::new(429, "Too Many Requests").with_header("Retry-After", "12");
        assert_eq!(failure.header("retry-after"), Some("12"));
        assert_eq!(failure.retry_after(), "12");
        assert_eq!(ApiFailure::new(429, "slow down").retry_after(), "60");
    }

    #[test]
    fn test_deserializes_without_optional_fields() {
        let failure: ApiFailure =
            serde_json::from_str(r#"{"status_code":500,"message":"etcd unavailable"}"#).unwrap();
        assert_eq!(failure, ApiFailure::new(500, "etcd unavailable"));
    }
}
