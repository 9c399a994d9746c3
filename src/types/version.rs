// ABOUTME: Semantic version handling for service releases.
// ABOUTME: Validates catalog versions and increments the patch component.

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Version assumed when nothing usable is recorded for a service.
pub const DEFAULT_VERSION: &str = "1.0.0";

#[derive(Debug, Error)]
#[error("invalid version '{0}': expected MAJOR.MINOR.PATCH or 'latest'")]
pub struct ParseVersionError(String);

/// A catalog version: either the rolling `latest` alias or a `MAJOR.MINOR.PATCH` triple.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Version {
    #[default]
    Latest,
    Release(String),
}

impl Version {
    pub fn parse(input: &str) -> Result<Self, ParseVersionError> {
        let input = input.trim();
        if input == "latest" {
            return Ok(Version::Latest);
        }
        if split_triple(input).is_some() {
            Ok(Version::Release(input.to_string()))
        } else {
            Err(ParseVersionError(input.to_string()))
        }
    }

    pub fn is_latest(&self) -> bool {
        matches!(self, Version::Latest)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Version::Latest => "latest",
            Version::Release(v) => v,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Version::parse(&s).map_err(serde::de::Error::custom)
    }
}

fn split_triple(input: &str) -> Option<(&str, &str, u64)> {
    let mut parts = input.split('.');
    let (major, minor, patch) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    component(major)?;
    component(minor)?;
    let patch = component(patch)?;
    Some((major, minor, patch))
}

/// `u64::from_str` also accepts a leading `+`; components must be bare digits.
fn component(part: &str) -> Option<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// Bump the patch component of `version`.
///
/// Anything that is not exactly three dot-separated integers recovers to
/// [`DEFAULT_VERSION`] instead of failing.
pub fn increment_patch(version: &str) -> String {
    match split_triple(version.trim()) {
        Some((major, minor, patch)) => match patch.checked_add(1) {
            Some(next) => format!("{major}.{minor}.{next}"),
            None => DEFAULT_VERSION.to_string(),
        },
        None => DEFAULT_VERSION.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increments_patch_only() {
        assert_eq!(increment_patch("2.1.4"), "2.1.5");
        assert_eq!(increment_patch("0.0.9"), "0.0.10");
    }

    #[test]
    fn malformed_versions_recover_to_default() {
        assert_eq!(increment_patch("1.0"), "1.0.0");
        assert_eq!(increment_patch("1.2.3.4"), "1.0.0");
        assert_eq!(increment_patch("latest"), "1.0.0");
        assert_eq!(increment_patch("1.2.x"), "1.0.0");
        assert_eq!(increment_patch("1.2.+3"), "1.0.0");
        assert_eq!(increment_patch("1. 2.3"), "1.0.0");
        assert_eq!(increment_patch(""), "1.0.0");
    }

    #[test]
    fn parse_accepts_latest_and_triples() {
        assert_eq!(Version::parse("latest").unwrap(), Version::Latest);
        assert_eq!(
            Version::parse("1.4.2").unwrap(),
            Version::Release("1.4.2".to_string())
        );
        assert!(Version::parse("v1.4.2").is_err());
        assert!(Version::parse("1.4").is_err());
    }
}
