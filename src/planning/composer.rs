//! Stage and pipeline composer
//!
//! Wraps assembled runs into named stages and concatenates the stages into a
//! [`PipelineTopology`] in the fixed order source, build, deploys, final deploy.

use crate::core::{
    action::{Action, SourceSettings},
    artifact::{Artifact, ArtifactRegistry},
    error::PlanError,
    identity::ProjectIdentity,
    naming::{self, IdentifierKind},
    stage::{Stage, StageMode},
    topology::PipelineTopology,
};
use crate::planning::{
    assembler::{ActionAssembler, ApprovalNaming},
    request::ActionRequest,
};
use std::collections::HashSet;
use tracing::{info, warn};

/// A stage and the artifact it produces
#[derive(Debug, Clone)]
pub struct StageOutput {
    pub stage: Stage,
    pub artifact: Artifact,
}

/// A fan-out stage and the artifacts of each lane, in request order
#[derive(Debug, Clone)]
pub struct ParallelOutput {
    pub stage: Stage,
    pub artifacts: Vec<Artifact>,
}

/// Composes the stages of one pipeline.
///
/// The composer owns the artifact registry for the topology, so every stage of
/// one pipeline must come from the same composer.
#[derive(Debug, Clone)]
pub struct StageComposer {
    project: ProjectIdentity,
    topic: String,
    registry: ArtifactRegistry,
}

impl StageComposer {
    /// Composer notifying the project's default pipeline topic
    pub fn new(project: ProjectIdentity) -> Self {
        let topic = project.resource_name("pipeline topic");
        Self::with_topic(project, topic)
    }

    pub fn with_topic(project: ProjectIdentity, topic: impl Into<String>) -> Self {
        Self {
            project,
            topic: topic.into(),
            registry: ArtifactRegistry::new(),
        }
    }

    pub fn project(&self) -> &ProjectIdentity {
        &self.project
    }

    /// Notification topic used by approvals and failure rules
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Artifacts allocated so far
    pub fn artifacts(&self) -> &ArtifactRegistry {
        &self.registry
    }

    /// Source stage checking out `branch` of `repository`
    pub fn source_stage(&mut self, repository: &str, branch: &str) -> Result<StageOutput, PlanError> {
        if repository.trim().is_empty() {
            return Err(PlanError::InvalidInput("repository name must not be empty".to_string()));
        }
        if branch.trim().is_empty() {
            return Err(PlanError::InvalidInput("branch name must not be empty".to_string()));
        }

        let stage_name = stage_name(&format!("{} source code", self.project.name))?;
        let action_name = naming::label(&format!("{} updated", branch.trim()));
        naming::validate_identifier(IdentifierKind::Action, &action_name)?;

        let artifact = self.registry.create(&self.project.artifact_name("source artifacts"))?;

        let action = Action::source(
            action_name,
            SourceSettings {
                repository: repository.trim().to_string(),
                branch: branch.trim().to_string(),
            },
            artifact.clone(),
        );

        info!("Composed source stage {} ({})", stage_name, artifact);
        Ok(StageOutput {
            stage: Stage::new(stage_name, StageMode::Sequential, vec![action]),
            artifact,
        })
    }

    /// One request as one sequential stage
    pub fn single_run(&mut self, label: &str, request: &ActionRequest) -> Result<StageOutput, PlanError> {
        let name = stage_name(label)?;
        let run = ActionAssembler::new(&mut self.registry, &self.topic).assemble(&name, request)?;

        info!("Composed stage {} with {} action(s)", name, run.actions.len());
        Ok(StageOutput {
            stage: Stage::new(name, StageMode::Sequential, run.actions),
            artifact: run.output,
        })
    }

    /// Several independent requests fanned out inside one stage.
    ///
    /// Each request keeps its own output artifact and its own run order
    /// sequence starting at 1; actions are listed in request order. Action
    /// names must be unique across lanes. On error no artifact is allocated.
    pub fn parallel_run(&mut self, label: &str, requests: &[ActionRequest]) -> Result<ParallelOutput, PlanError> {
        let name = stage_name(label)?;
        if requests.is_empty() {
            return Err(PlanError::InvalidInput(format!(
                "parallel stage '{}' has no requests",
                name
            )));
        }
        if requests.len() == 1 {
            warn!("Parallel stage {} has a single request", name);
        }

        // Lanes allocate into a copy, committed once every lane has assembled
        let mut registry = self.registry.clone();
        let mut actions = Vec::new();
        let mut artifacts = Vec::with_capacity(requests.len());
        let mut seen = HashSet::new();
        let mut assembler = ActionAssembler::new(&mut registry, &self.topic);

        for (lane, request) in requests.iter().enumerate() {
            let run = assembler.assemble_lane(&name, request, lane, ApprovalNaming::PerEnvironment)?;
            for action in &run.actions {
                if !seen.insert(action.name.clone()) {
                    return Err(PlanError::DuplicateAction {
                        stage: name.clone(),
                        action: action.name.clone(),
                    });
                }
            }
            actions.extend(run.actions);
            artifacts.push(run.output);
        }
        self.registry = registry;

        info!(
            "Composed parallel stage {} with {} lane(s), {} action(s)",
            name,
            artifacts.len(),
            actions.len()
        );
        Ok(ParallelOutput {
            stage: Stage::new(name, StageMode::Parallel, actions),
            artifacts,
        })
    }

    /// Concatenate stages into the full topology.
    ///
    /// The build stage must consume the source output and every deploy stage,
    /// including the final one, must consume the build output.
    pub fn build_pipeline(
        &self,
        source: StageOutput,
        build: StageOutput,
        deploys: Vec<Stage>,
        final_deploy: Stage,
    ) -> Result<PipelineTopology, PlanError> {
        expect_inputs(&build.stage, &source.artifact)?;
        for stage in deploys.iter().chain(std::iter::once(&final_deploy)) {
            expect_inputs(stage, &build.artifact)?;
        }

        let mut stages = Vec::with_capacity(deploys.len() + 3);
        stages.push(source.stage);
        stages.push(build.stage);
        stages.extend(deploys);
        stages.push(final_deploy);

        let topology = PipelineTopology::new(self.project.resource_name("pipeline"), stages)?;
        info!(
            "Planned pipeline {}: {} stages, {} actions, {} approval gate(s)",
            topology.name,
            topology.stages.len(),
            topology.action_count(),
            topology.approval_count()
        );
        Ok(topology)
    }
}

fn stage_name(label: &str) -> Result<String, PlanError> {
    let name = naming::label(label);
    if name.is_empty() {
        return Err(PlanError::InvalidInput(format!("stage label '{}' is empty", label)));
    }
    naming::validate_identifier(IdentifierKind::Stage, &name)?;
    Ok(name)
}

fn expect_inputs(stage: &Stage, expected: &Artifact) -> Result<(), PlanError> {
    for action in &stage.actions {
        if let Some(input) = &action.input {
            if input != expected {
                return Err(PlanError::BrokenChain {
                    stage: stage.name.clone(),
                    action: action.name.clone(),
                    expected: expected.name().to_string(),
                    found: input.name().to_string(),
                });
            }
        }
    }
    Ok(())
}
