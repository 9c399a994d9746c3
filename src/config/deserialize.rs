// ABOUTME: Custom serde deserializers for catalog types.
// ABOUTME: Handles non-empty lists, env lists or maps, and scalar-to-string coercion.

use nonempty::NonEmpty;
use serde::Deserialize;
use serde_yaml::Value;

use super::ServiceSpec;

pub fn deserialize_services<'de, D>(deserializer: D) -> Result<NonEmpty<ServiceSpec>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let services: Vec<ServiceSpec> = Vec::deserialize(deserializer)?;
    NonEmpty::from_vec(services)
        .ok_or_else(|| serde::de::Error::custom("at least one service is required"))
}

pub fn deserialize_command<'de, D>(deserializer: D) -> Result<NonEmpty<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let values: Vec<Value> = Vec::deserialize(deserializer)?;
    let args = values
        .iter()
        .map(scalar_to_string)
        .collect::<Result<Vec<_>, _>>()
        .map_err(serde::de::Error::custom)?;
    NonEmpty::from_vec(args).ok_or_else(|| serde::de::Error::custom("command cannot be empty"))
}

/// A sequence of scalars, each coerced to its string form.
pub fn deserialize_scalars<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let values: Vec<Value> = Vec::deserialize(deserializer)?;
    values
        .iter()
        .map(scalar_to_string)
        .collect::<Result<Vec<_>, _>>()
        .map_err(serde::de::Error::custom)
}

/// Either a `KEY=value` list or a `KEY: value` mapping, normalised to the list form.
pub fn deserialize_env_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(values) => values
            .iter()
            .map(scalar_to_string)
            .collect::<Result<Vec<_>, _>>()
            .map_err(serde::de::Error::custom),
        Value::Mapping(map) => map
            .iter()
            .map(|(k, v)| {
                let key = scalar_to_string(k)?;
                let value = match v {
                    Value::Null => String::new(),
                    other => scalar_to_string(other)?,
                };
                Ok(format!("{key}={value}"))
            })
            .collect::<Result<Vec<_>, String>>()
            .map_err(serde::de::Error::custom),
        _ => Err(serde::de::Error::custom(
            "environment must be a list or a mapping",
        )),
    }
}

pub fn scalar_to_string(value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(format!("expected a scalar value, got {other:?}")),
    }
}
