// ABOUTME: Image references and the environment tagging rule.
// ABOUTME: The same rule feeds the build pipeline and the manifest generator.

use super::{Environment, ServiceName, Version};
use std::fmt;

/// Primary tag and rolling alias for one release in one environment.
///
/// Non-production: `{version}-{env}` / `{env}-latest`.
/// Production: `{version}` / `latest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPair {
    pub primary: String,
    pub alias: String,
}

impl TagPair {
    pub fn new(version: &str, environment: &Environment) -> Self {
        if environment.is_production() {
            Self {
                primary: version.to_string(),
                alias: "latest".to_string(),
            }
        } else {
            Self {
                primary: format!("{version}-{environment}"),
                alias: format!("{environment}-latest"),
            }
        }
    }

    /// Tags for a catalog version. A `latest` version points at the alias itself.
    pub fn for_version(version: &Version, environment: &Environment) -> Self {
        match version {
            Version::Release(v) => Self::new(v, environment),
            Version::Latest => {
                let alias = Self::new("latest", environment).alias;
                Self {
                    primary: alias.clone(),
                    alias,
                }
            }
        }
    }
}

/// `{namespace}/{service}:{tag}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    namespace: String,
    name: String,
    tag: String,
}

impl ImageRef {
    pub fn new(namespace: &str, service: &ServiceName, tag: &str) -> Self {
        Self {
            namespace: namespace.trim_end_matches('/').to_string(),
            name: service.to_string(),
            tag: tag.to_string(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.namespace.is_empty() {
            write!(f, "{}/", self.namespace)?;
        }
        write!(f, "{}:{}", self.name, self.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_version_uses_alias_as_primary() {
        let tags = TagPair::for_version(&Version::Latest, &Environment::Staging);
        assert_eq!(tags.primary, "staging-latest");
        assert_eq!(tags.alias, "staging-latest");

        let tags = TagPair::for_version(&Version::Latest, &Environment::Production);
        assert_eq!(tags.primary, "latest");
    }

    #[test]
    fn image_ref_display() {
        let service = ServiceName::new("auth").unwrap();
        let image = ImageRef::new("acme/", &service, "1.0.1-staging");
        assert_eq!(image.to_string(), "acme/auth:1.0.1-staging");
    }
}
