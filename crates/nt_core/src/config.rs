use serde::{Deserialize, Serialize};

use crate::article::DEFAULT_LANGUAGE;

pub const UNTITLED: &str = "untitled";

/// What the builder does when a field cannot be extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Log the error, leave the field at its default, keep building.
    #[default]
    Degrade,
    /// Stop and return the first extraction error.
    Abort,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    pub placeholder_title: String,
    pub default_language: String,
    pub on_error: ErrorPolicy,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            placeholder_title: UNTITLED.to_string(),
            default_language: DEFAULT_LANGUAGE.to_string(),
            on_error: ErrorPolicy::default(),
        }
    }
}

impl BuilderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_placeholder_title(mut self, title: impl Into<String>) -> Self {
        self.placeholder_title = title.into();
        self
    }

    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = language.into();
        self
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.on_error = policy;
        self
    }
}
