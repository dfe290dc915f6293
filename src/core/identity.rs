//! Project identity and derived names

use crate::core::{
    error::PlanError,
    naming::{self, NameStyle},
};
use serde::{Deserialize, Serialize};

/// A project name plus its case-formatted variants.
///
/// The variants are computed once at construction; everything that derives a
/// resource name from the project goes through [`ProjectIdentity::resource_name`]
/// or [`ProjectIdentity::artifact_name`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectIdentity {
    /// Name as written by the user, e.g. "Hello World"
    pub name: String,

    /// `HelloWorld`
    pub pascal: String,

    /// `hello-world`
    pub kebab: String,

    /// `Hello World`
    pub title: String,
}

impl ProjectIdentity {
    /// Create an identity from a human readable project name
    pub fn new(name: impl Into<String>) -> Result<Self, PlanError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(PlanError::InvalidInput("project name must not be empty".to_string()));
        }

        let pascal = naming::format(trimmed, NameStyle::Pascal);
        if pascal.is_empty() {
            return Err(PlanError::InvalidInput(format!(
                "project name '{}' contains no alphanumeric characters",
                name
            )));
        }

        Ok(Self {
            kebab: naming::format(trimmed, NameStyle::Kebab),
            title: naming::format(trimmed, NameStyle::Title),
            pascal,
            name: trimmed.to_string(),
        })
    }

    /// Pascal-case resource name for `"{project} {suffix}"`
    pub fn resource_name(&self, suffix: &str) -> String {
        naming::pascal(&format!("{} {}", self.name, suffix))
    }

    /// Kebab-case artifact name for `"{project} {suffix}"`
    pub fn artifact_name(&self, suffix: &str) -> String {
        naming::kebab(&format!("{} {}", self.name, suffix))
    }
}
