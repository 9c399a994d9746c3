// ABOUTME: Service names as used for build directories, containers, and image repositories.
// ABOUTME: Restricted to lowercase DNS-style labels so one name is valid in all three places.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Longest name accepted; matches a DNS label.
pub const MAX_LEN: usize = 63;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceNameError {
    #[error("service name cannot be empty")]
    Empty,

    #[error("service name is {0} characters, the limit is {MAX_LEN}")]
    TooLong(usize),

    #[error("service name must start with a letter or digit, not '{0}'")]
    InvalidStart(char),

    #[error("service name cannot end with '{0}'")]
    InvalidEnd(char),

    #[error("service name must be lowercase, found '{0}'")]
    Uppercase(char),

    #[error("invalid character in service name: '{0}'")]
    InvalidChar(char),
}

/// A validated catalog service name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceName(String);

impl ServiceName {
    pub fn new(value: &str) -> Result<Self, ServiceNameError> {
        let len = value.chars().count();
        if len == 0 {
            return Err(ServiceNameError::Empty);
        }
        if len > MAX_LEN {
            return Err(ServiceNameError::TooLong(len));
        }

        for (i, c) in value.chars().enumerate() {
            match c {
                'a'..='z' | '0'..='9' => {}
                'A'..='Z' => return Err(ServiceNameError::Uppercase(c)),
                '-' | '_' if i == 0 => return Err(ServiceNameError::InvalidStart(c)),
                '-' | '_' if i == len - 1 => return Err(ServiceNameError::InvalidEnd(c)),
                '-' | '_' => {}
                _ => return Err(ServiceNameError::InvalidChar(c)),
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ServiceName {
    type Err = ServiceNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for ServiceName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(&s).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ServiceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
