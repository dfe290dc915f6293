//! Build and deploy requests

use crate::core::{action::RunKind, artifact::Artifact, error::PlanError, identity::ProjectIdentity};

/// One build or deploy run to assemble into actions
#[derive(Debug, Clone)]
pub struct ActionRequest {
    pub project: ProjectIdentity,

    /// Output of a causally earlier stage
    pub input: Artifact,

    /// Target environment; may be empty for builds
    pub environment: String,

    /// Action label, e.g. "build hello world" or "deploy to dev"
    pub label: String,

    /// Location of the buildspec file for this run
    pub buildspec: String,

    pub manual_approval: bool,

    pub kind: RunKind,
}

impl ActionRequest {
    /// Environment-less build labelled `"build {project}"`
    pub fn build(project: &ProjectIdentity, input: Artifact, buildspec: impl Into<String>) -> Self {
        Self {
            label: format!("build {}", project.name),
            project: project.clone(),
            input,
            environment: String::new(),
            buildspec: buildspec.into(),
            manual_approval: false,
            kind: RunKind::Build,
        }
    }

    /// Deployment to `environment` labelled `"deploy to {environment}"`
    pub fn deploy(
        project: &ProjectIdentity,
        input: Artifact,
        environment: impl Into<String>,
        buildspec: impl Into<String>,
    ) -> Self {
        let environment = environment.into();
        Self {
            label: format!("deploy to {}", environment),
            project: project.clone(),
            input,
            environment,
            buildspec: buildspec.into(),
            manual_approval: false,
            kind: RunKind::Deploy,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    pub fn with_manual_approval(mut self, manual_approval: bool) -> Self {
        self.manual_approval = manual_approval;
        self
    }

    /// Reject requests that cannot produce a usable action
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.buildspec.trim().is_empty() {
            return Err(PlanError::InvalidInput(format!(
                "{} '{}' has an empty buildspec location",
                self.kind, self.label
            )));
        }
        if self.kind == RunKind::Deploy && self.environment.trim().is_empty() {
            return Err(PlanError::InvalidInput(format!(
                "deploy '{}' has an empty environment",
                self.label
            )));
        }
        if self.label.trim().is_empty() {
            return Err(PlanError::InvalidInput(format!(
                "{} request for '{}' has an empty action label",
                self.kind, self.project.name
            )));
        }
        Ok(())
    }
}
