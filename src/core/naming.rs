//! Name formatting for resource identifiers
//!
//! Every identifier the planner emits (stage names, action names, artifact
//! names, project and rule names) is derived from a human readable phrase
//! through one of the styles below.

use crate::core::error::PlanError;
use heck::{ToKebabCase, ToPascalCase, ToTitleCase};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Case style applied to a raw phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameStyle {
    /// `HelloWorldPipeline`
    Pascal,
    /// `hello-world-source-artifacts`
    Kebab,
    /// `Deploy Prod Website`
    Title,
    /// `Deploy_Prod_Website` - title case joined by underscores, used for
    /// stage and action names
    Label,
}

/// Format a raw phrase in the given style.
///
/// Formatting is idempotent: formatting an already formatted string with the
/// same style returns it unchanged. Empty input yields an empty string.
pub fn format(raw: &str, style: NameStyle) -> String {
    // Single letter words collapse into one word on a second pass ("XYZ" -> "Xyz"),
    // so the transform is repeated until it settles.
    let mut current = transform(raw, style);
    loop {
        let next = transform(&current, style);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn transform(raw: &str, style: NameStyle) -> String {
    match style {
        NameStyle::Pascal => raw.to_pascal_case(),
        NameStyle::Kebab => raw.to_kebab_case(),
        NameStyle::Title => raw.to_title_case(),
        NameStyle::Label => raw.to_title_case().replace(' ', "_"),
    }
}

/// Shorthand for [`format`] with [`NameStyle::Pascal`]
pub fn pascal(raw: &str) -> String {
    format(raw, NameStyle::Pascal)
}

/// Shorthand for [`format`] with [`NameStyle::Kebab`]
pub fn kebab(raw: &str) -> String {
    format(raw, NameStyle::Kebab)
}

/// Shorthand for [`format`] with [`NameStyle::Label`]
pub fn label(raw: &str) -> String {
    format(raw, NameStyle::Label)
}

/// What an identifier names, which decides the characters it may contain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Stage,
    Action,
    Artifact,
    Resource,
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IdentifierKind::Stage => "stage",
            IdentifierKind::Action => "action",
            IdentifierKind::Artifact => "artifact",
            IdentifierKind::Resource => "resource",
        };
        f.write_str(s)
    }
}

static STAGE_OR_ACTION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9.@_-]{1,100}$").expect("valid pattern"));

static ARTIFACT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,100}$").expect("valid pattern"));

static RESOURCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,150}$").expect("valid pattern"));

/// Check a generated name against the provider's character rules
pub fn validate_identifier(kind: IdentifierKind, name: &str) -> Result<(), PlanError> {
    let pattern = match kind {
        IdentifierKind::Stage | IdentifierKind::Action => &*STAGE_OR_ACTION_PATTERN,
        IdentifierKind::Artifact => &*ARTIFACT_PATTERN,
        IdentifierKind::Resource => &*RESOURCE_PATTERN,
    };

    if pattern.is_match(name) {
        Ok(())
    } else {
        Err(PlanError::InvalidIdentifier {
            kind,
            name: name.to_string(),
        })
    }
}
