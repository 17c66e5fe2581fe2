//! Error kind and severity enums

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Closed classification of a failure occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Connection,
    Permission,
    NotFound,
    Api,
    Timeout,
    Validation,
    Unexpected,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 7] = [
        ErrorKind::Connection,
        ErrorKind::Permission,
        ErrorKind::NotFound,
        ErrorKind::Api,
        ErrorKind::Timeout,
        ErrorKind::Validation,
        ErrorKind::Unexpected,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connection => "Connection",
            Self::Permission => "Permission",
            Self::NotFound => "NotFound",
            Self::Api => "Api",
            Self::Timeout => "Timeout",
            Self::Validation => "Validation",
            Self::Unexpected => "Unexpected",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorKind {
    type Err = ParseTaxonomyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .or(match s {
                "not_found" => Some(Self::NotFound),
                _ => None,
            })
            .ok_or_else(|| ParseTaxonomyError::Kind(s.to_string()))
    }
}

/// Urgency tier that selects how a prompt is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }

    /// Upper-case tag used in diagnostic log lines.
    #[must_use]
    pub fn level_tag(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ParseTaxonomyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warning" | "warn" => Ok(Self::Warning),
            "info" => Ok(Self::Info),
            _ => Err(ParseTaxonomyError::Severity(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseTaxonomyError {
    #[error("unknown error kind: {0}")]
    Kind(String),

    #[error("unknown severity: {0}")]
    Severity(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display_roundtrip() {
        for kind in ErrorKind::ALL {
            assert_eq!(kind.to_string().parse::<ErrorKind>().unwrap(), kind);
        }
        assert_eq!("not_found".parse::<ErrorKind>().unwrap(), ErrorKind::NotFound);
        assert!("Network".parse::<ErrorKind>().is_err());
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!("WARNING".parse::<Severity>().unwrap(), Severity::Warning);
        assert_eq!("warn".parse::<Severity>().unwrap(), Severity::Warning);
        assert_eq!(Severity::Info.level_tag(), "INFO");
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&ErrorKind::NotFound).unwrap();
        assert_eq!(json, r#""not_found""#);
    }
}
