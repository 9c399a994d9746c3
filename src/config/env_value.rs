// ABOUTME: Catalog values that may come from the process environment.
// ABOUTME: Resolved once while building run settings; literal secrets are redacted in Debug.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fmt;

/// Either a literal string or `{ env: VAR, default: ... }`.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    Literal(String),
    FromEnv {
        env: String,
        #[serde(default)]
        default: Option<String>,
    },
}

impl EnvValue {
    /// Look the value up. An unset or empty variable falls back to `default`.
    pub fn resolve(&self) -> Result<String> {
        match self {
            EnvValue::Literal(s) => Ok(s.clone()),
            EnvValue::FromEnv { env, default } => std::env::var(env)
                .ok()
                .filter(|v| !v.is_empty())
                .or_else(|| default.clone())
                .ok_or_else(|| Error::MissingEnvVar(env.clone())),
        }
    }
}

// Catalog values are mostly credentials; keep literals out of logs.
impl fmt::Debug for EnvValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvValue::Literal(_) => f.write_str("Literal(***)"),
            EnvValue::FromEnv { env, default } => f
                .debug_struct("FromEnv")
                .field("env", env)
                .field("default", &default.as_ref().map(|_| "***"))
                .finish(),
        }
    }
}

/// Resolve an optional value. An empty result, or a variable that is unset
/// with no default, counts as absent.
pub fn resolve_optional(value: Option<&EnvValue>) -> Result<Option<String>> {
    match value.map(EnvValue::resolve) {
        None => Ok(None),
        Some(Ok(s)) => Ok(Some(s).filter(|s| !s.is_empty())),
        Some(Err(Error::MissingEnvVar(var))) => {
            tracing::debug!(variable = %var, "optional value not set");
            Ok(None)
        }
        Some(Err(e)) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_env(var: &str, default: Option<&str>) -> EnvValue {
        EnvValue::FromEnv {
            env: var.to_string(),
            default: default.map(str::to_string),
        }
    }

    #[test]
    fn empty_variable_uses_default() {
        temp_env::with_var("SHIPWRIGHT_ENV_VALUE_EMPTY", Some(""), || {
            let value = from_env("SHIPWRIGHT_ENV_VALUE_EMPTY", Some("fallback"));
            assert_eq!(value.resolve().unwrap(), "fallback");
        });
    }

    #[test]
    fn debug_hides_literals() {
        let value = EnvValue::Literal("pmak-secret".to_string());
        assert_eq!(format!("{value:?}"), "Literal(***)");

        let value = from_env("API_KEY", Some("pmak-secret"));
        assert!(!format!("{value:?}").contains("pmak-secret"));
    }

    #[test]
    fn unset_variable_without_default_is_an_error_when_required() {
        temp_env::with_var_unset("SHIPWRIGHT_ENV_VALUE_UNSET", || {
            let value = from_env("SHIPWRIGHT_ENV_VALUE_UNSET", None);
            assert!(matches!(
                value.resolve(),
                Err(Error::MissingEnvVar(var)) if var == "SHIPWRIGHT_ENV_VALUE_UNSET"
            ));
            assert_eq!(resolve_optional(Some(&value)).unwrap(), None);
        });
    }

    #[test]
    fn empty_literal_is_absent() {
        let value = EnvValue::Literal(String::new());
        assert_eq!(resolve_optional(Some(&value)).unwrap(), None);
        assert_eq!(resolve_optional(None).unwrap(), None);
    }
}
