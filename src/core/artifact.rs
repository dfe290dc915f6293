//! Artifact handles and the registry that allocates them

use crate::core::{
    error::PlanError,
    naming::{self, IdentifierKind},
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// Opaque handle for the output of one stage and the input of a later one.
/// Only the name is modelled; content lives with the external engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Artifact {
    name: String,
}

impl Artifact {
    /// Artifact name (kebab case)
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Allocates artifacts for one topology and rejects name collisions
#[derive(Debug, Clone, Default)]
pub struct ArtifactRegistry {
    allocated: Vec<Artifact>,
    names: HashSet<String>,
}

impl ArtifactRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new artifact named after the kebab case of `description`
    pub fn create(&mut self, description: &str) -> Result<Artifact, PlanError> {
        let name = naming::kebab(description);
        naming::validate_identifier(IdentifierKind::Artifact, &name)?;

        if !self.names.insert(name.clone()) {
            return Err(PlanError::DuplicateArtifact(name));
        }

        debug!("Allocated artifact {}", name);
        let artifact = Artifact { name };
        self.allocated.push(artifact.clone());
        Ok(artifact)
    }

    /// Whether this registry allocated `artifact`
    pub fn contains(&self, artifact: &Artifact) -> bool {
        self.names.contains(&artifact.name)
    }

    /// Number of allocated artifacts
    pub fn len(&self) -> usize {
        self.allocated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allocated.is_empty()
    }

    /// Artifact names in allocation order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.allocated.iter().map(|a| a.name())
    }
}
