//! Website origins.
//!
//! An [`Origin`] is the full hostname of a site (`www.example.com`), which is
//! also the storage key for that site's record.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Origin(String);

impl Origin {
    /// Parse a bare hostname or a full URL.
    ///
    /// Hostnames are lowercased. URLs contribute only their host; port,
    /// path and scheme are dropped.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(invalid(input, "empty"));
        }

        if trimmed.contains("://") {
            let url = Url::parse(trimmed).map_err(|e| invalid(input, &e.to_string()))?;
            let host = url
                .host_str()
                .ok_or_else(|| invalid(input, "URL has no host"))?;
            return Ok(Self(host.to_ascii_lowercase()));
        }

        // A bare host is validated by letting the URL parser see it as one.
        let url = Url::parse(&format!("http://{trimmed}/"))
            .map_err(|e| invalid(input, &e.to_string()))?;
        match url.host_str() {
            Some(host) if url.path() == "/" && url.port().is_none() => {
                Ok(Self(host.to_ascii_lowercase()))
            }
            _ => Err(invalid(input, "not a hostname")),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn invalid(input: &str, message: &str) -> ValidationError {
    ValidationError::InvalidOrigin {
        input: input.to_string(),
        message: message.to_string(),
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Origin {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
