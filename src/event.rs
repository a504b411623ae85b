//! Inbound Jenkins build-event payloads
//!
//! Jenkins can be configured to post two different bodies. The nested shape
//! carries a `build` object; the flat legacy shape is a handful of top level
//! strings. Every field is optional and a JSON `null` reads as the default.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::{RelayError, Result};

/// Treats `null` the same as a missing field.
fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Which payload shape the relay expects on `/webhook/jenkins`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputShape {
    /// Pick per request: nested when the body has a `build` key
    #[default]
    Auto,
    Nested,
    Flat,
}

impl InputShape {
    /// Resolves `Auto` against a decoded body. Forced shapes are returned as is.
    pub fn resolve(self, body: &Value) -> InputShape {
        match self {
            InputShape::Auto if body.get("build").is_some() => InputShape::Nested,
            InputShape::Auto => InputShape::Flat,
            forced => forced,
        }
    }
}

impl FromStr for InputShape {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(InputShape::Auto),
            "nested" => Ok(InputShape::Nested),
            "flat" => Ok(InputShape::Flat),
            other => Err(RelayError::Config(format!(
                "Unknown input shape '{}' (expected auto, nested or flat)",
                other
            ))),
        }
    }
}

impl fmt::Display for InputShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputShape::Auto => "auto",
            InputShape::Nested => "nested",
            InputShape::Flat => "flat",
        };
        f.write_str(name)
    }
}

/// Job-level payload wrapping a [`BuildInfo`]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NestedEvent {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub display_name: String,
    #[serde(deserialize_with = "nullable")]
    pub url: String,
    #[serde(deserialize_with = "nullable")]
    pub build: BuildInfo,
}

impl NestedEvent {
    /// Display name, falling back to the job name when Jenkins sent none.
    pub fn job_label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.name
        } else {
            &self.display_name
        }
    }
}

/// A single build. `result` is only set once the build has finished;
/// `status` is the lifecycle phase.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuildInfo {
    #[serde(deserialize_with = "nullable")]
    pub number: u64,
    pub queue_id: Option<u64>,
    /// Start time, epoch milliseconds
    #[serde(deserialize_with = "nullable")]
    pub timestamp: i64,
    /// Milliseconds, 0 while running or unknown
    #[serde(deserialize_with = "nullable")]
    pub duration: i64,
    #[serde(deserialize_with = "nullable")]
    pub result: String,
    #[serde(deserialize_with = "nullable")]
    pub status: String,
    #[serde(deserialize_with = "nullable")]
    pub url: String,
    #[serde(deserialize_with = "nullable")]
    pub full_url: String,
    #[serde(deserialize_with = "nullable")]
    pub full_display_name: String,
    #[serde(deserialize_with = "nullable")]
    pub cause: String,

    // Accepted, never read.
    pub parameters: Value,
    pub change_sets: Value,
    pub culprits: Value,
    pub previous_build: Value,
    pub next_build: Value,
}

impl BuildInfo {
    /// Direct link to the build page
    pub fn link(&self) -> &str {
        if self.url.is_empty() {
            &self.full_url
        } else {
            &self.url
        }
    }
}

/// Legacy flat payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlatEvent {
    #[serde(deserialize_with = "nullable")]
    pub project_name: String,
    #[serde(deserialize_with = "nullable")]
    pub build_name: String,
    #[serde(deserialize_with = "nullable")]
    pub build_url: String,
    /// Raw `{key=value, key2=value2}` text
    #[serde(deserialize_with = "nullable")]
    pub build_vars: String,
    #[serde(deserialize_with = "nullable")]
    pub event: String,
}

/// A decoded inbound event in either shape
#[derive(Debug, Clone)]
pub enum JenkinsEvent {
    Nested(NestedEvent),
    Flat(FlatEvent),
}

impl JenkinsEvent {
    /// Decodes a request body. Only bodies that are not a JSON object, or
    /// whose fields have the wrong JSON type, are rejected. An empty body
    /// reads as `{}`.
    pub fn from_slice(body: &[u8], shape: InputShape) -> Result<Self> {
        let value: Value = if body.trim_ascii().is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_slice(body)?
        };
        if !value.is_object() {
            return Err(RelayError::NotAnObject);
        }

        match shape.resolve(&value) {
            InputShape::Flat => Ok(JenkinsEvent::Flat(serde_json::from_value(value)?)),
            _ => Ok(JenkinsEvent::Nested(serde_json::from_value(value)?)),
        }
    }

    pub fn shape(&self) -> InputShape {
        match self {
            JenkinsEvent::Nested(_) => InputShape::Nested,
            JenkinsEvent::Flat(_) => InputShape::Flat,
        }
    }

    /// One-line summary for logs: job, build and phase/event
    pub fn summary(&self) -> String {
        match self {
            JenkinsEvent::Nested(e) => {
                let state = if e.build.result.is_empty() {
                    &e.build.status
                } else {
                    &e.build.result
                };
                format!("{} - #{} - {}", e.job_label(), e.build.number, state)
            }
            JenkinsEvent::Flat(e) => {
                format!("{} - {} - {}", e.project_name, e.build_name, e.event)
            }
        }
    }
}
