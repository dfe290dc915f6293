//! Pipeline configuration from YAML

use crate::core::{error::PlanError, identity::ProjectIdentity, naming, topology::PipelineTopology};
use crate::planning::{ActionRequest, StageComposer};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Top-level pipeline configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Human readable project name, e.g. "Hello World"
    pub project: String,

    /// Name of the existing repository to check out
    pub repository: String,

    /// Branch that triggers the pipeline
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Region/account the stack is deployed to (optional)
    #[serde(default)]
    pub stack: Option<StackEnvironment>,

    /// The single build stage
    pub build: BuildConfig,

    /// Deploy stages between build and production, in order
    #[serde(default)]
    pub deploys: Vec<DeployGroupConfig>,

    /// The final deploy stage
    pub production: ProductionConfig,
}

/// Target region and account of the stack
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackEnvironment {
    #[serde(default)]
    pub region: Option<String>,

    #[serde(default)]
    pub account: Option<String>,
}

/// Build stage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Stage label
    #[serde(default = "default_build_stage")]
    pub stage: String,

    /// Action label (defaults to "build {project}")
    #[serde(default)]
    pub action: Option<String>,

    /// Generic buildspec location
    pub buildspec: String,

    #[serde(default)]
    pub manual_approval: bool,
}

/// A deploy stage: one target runs alone, several fan out in parallel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployGroupConfig {
    /// Stage label
    pub stage: String,

    pub targets: Vec<DeployTargetConfig>,
}

/// One environment deployment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployTargetConfig {
    pub environment: String,

    /// Action label (defaults to "deploy to {environment}")
    #[serde(default)]
    pub action: Option<String>,

    /// Environment-specific buildspec location
    pub buildspec: String,

    #[serde(default)]
    pub manual_approval: bool,
}

/// Final deploy stage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionConfig {
    /// Stage label
    pub stage: String,

    #[serde(flatten)]
    pub target: DeployTargetConfig,
}

fn default_branch() -> String {
    "dev".to_string()
}

fn default_build_stage() -> String {
    "build".to_string()
}

impl DeployTargetConfig {
    fn to_request(&self, project: &ProjectIdentity, input: crate::core::Artifact) -> ActionRequest {
        let request = ActionRequest::deploy(project, input, self.environment.trim(), &self.buildspec)
            .with_manual_approval(self.manual_approval);
        match &self.action {
            Some(action) => request.with_label(action),
            None => request,
        }
    }
}

impl PipelineConfig {
    /// Load pipeline configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse pipeline configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the pipeline configuration
    pub fn validate(&self) -> Result<()> {
        ProjectIdentity::new(&self.project)?;

        if self.repository.trim().is_empty() {
            anyhow::bail!("Repository name must not be empty");
        }
        if self.branch.trim().is_empty() {
            anyhow::bail!("Branch must not be empty");
        }
        if self.build.buildspec.trim().is_empty() {
            anyhow::bail!("Build stage '{}' has an empty buildspec", self.build.stage);
        }

        // Stage labels must stay unique once formatted
        let mut stage_names = HashSet::new();
        stage_names.insert(naming::label(&format!("{} source code", self.project)));
        for label in self.stage_labels() {
            let name = naming::label(label);
            if name.is_empty() {
                anyhow::bail!("Stage label '{}' is empty", label);
            }
            if !stage_names.insert(name.clone()) {
                anyhow::bail!("Duplicate stage name: {}", name);
            }
        }

        // Each environment gets its own artifacts and deployment project
        let mut environments = HashSet::new();
        for group in &self.deploys {
            if group.targets.is_empty() {
                anyhow::bail!("Deploy stage '{}' has no targets", group.stage);
            }
            for target in &group.targets {
                Self::validate_target(&group.stage, target, &mut environments)?;
            }
        }
        Self::validate_target(&self.production.stage, &self.production.target, &mut environments)?;

        Ok(())
    }

    fn validate_target(stage: &str, target: &DeployTargetConfig, seen: &mut HashSet<String>) -> Result<()> {
        if target.environment.trim().is_empty() {
            anyhow::bail!("Deploy stage '{}' has a target with an empty environment", stage);
        }
        if target.buildspec.trim().is_empty() {
            anyhow::bail!(
                "Deploy target '{}' in stage '{}' has an empty buildspec",
                target.environment,
                stage
            );
        }
        // Resource names use the Pascal form, so "uat 1" and "uat1" are the same environment
        if !seen.insert(naming::pascal(&target.environment)) {
            anyhow::bail!("Environment '{}' is deployed more than once", target.environment);
        }
        Ok(())
    }

    fn stage_labels(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.build.stage.as_str())
            .chain(self.deploys.iter().map(|g| g.stage.as_str()))
            .chain(std::iter::once(self.production.stage.as_str()))
    }

    /// Names of all deployed environments, in pipeline order
    pub fn environments(&self) -> Vec<&str> {
        self.deploys
            .iter()
            .flat_map(|g| g.targets.iter())
            .chain(std::iter::once(&self.production.target))
            .map(|t| t.environment.as_str())
            .collect()
    }

    /// Plan the pipeline topology described by this configuration
    pub fn to_topology(&self) -> Result<PipelineTopology, PlanError> {
        let project = ProjectIdentity::new(&self.project)?;
        let mut composer = StageComposer::new(project);

        let source = composer.source_stage(&self.repository, &self.branch)?;

        let mut build_request =
            ActionRequest::build(composer.project(), source.artifact.clone(), &self.build.buildspec)
                .with_manual_approval(self.build.manual_approval);
        if let Some(action) = &self.build.action {
            build_request = build_request.with_label(action);
        }
        let build = composer.single_run(&self.build.stage, &build_request)?;

        let mut deploys = Vec::with_capacity(self.deploys.len());
        for group in &self.deploys {
            let requests: Vec<ActionRequest> = group
                .targets
                .iter()
                .map(|t| t.to_request(composer.project(), build.artifact.clone()))
                .collect();

            let stage = if requests.len() == 1 {
                composer.single_run(&group.stage, &requests[0])?.stage
            } else {
                composer.parallel_run(&group.stage, &requests)?.stage
            };
            deploys.push(stage);
        }

        let production_request = self
            .production
            .target
            .to_request(composer.project(), build.artifact.clone());
        let production = composer.single_run(&self.production.stage, &production_request)?;

        composer.build_pipeline(source, build, deploys, production.stage)
    }
}
