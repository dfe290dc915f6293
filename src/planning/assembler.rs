//! Action assembler - turns one request into an ordered action list

use crate::core::{
    action::{Action, BuildProject, FailureNotification, RunKind},
    artifact::{Artifact, ArtifactRegistry},
    error::PlanError,
    naming::{self, IdentifierKind},
};
use crate::planning::request::ActionRequest;
use tracing::debug;

/// Actions assembled for one request plus the artifact they produce
#[derive(Debug, Clone)]
pub struct AssembledRun {
    pub actions: Vec<Action>,
    pub output: Artifact,
}

/// How manual approval actions are named
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalNaming {
    /// `Approve_Deployment`
    Plain,
    /// `Approve_Uat1_Deployment`, so several gates can share a stage
    PerEnvironment,
}

/// Assembles build/deploy requests against a shared artifact registry
pub struct ActionAssembler<'a> {
    registry: &'a mut ArtifactRegistry,
    topic: &'a str,
}

impl<'a> ActionAssembler<'a> {
    /// `topic` is the notification topic every approval and failure rule targets
    pub fn new(registry: &'a mut ArtifactRegistry, topic: &'a str) -> Self {
        Self { registry, topic }
    }

    /// Assemble a request destined for `stage` as a single lane
    pub fn assemble(&mut self, stage: &str, request: &ActionRequest) -> Result<AssembledRun, PlanError> {
        self.assemble_lane(stage, request, 0, ApprovalNaming::Plain)
    }

    /// Assemble a request as lane `lane` of `stage`
    pub fn assemble_lane(
        &mut self,
        stage: &str,
        request: &ActionRequest,
        lane: usize,
        approval_naming: ApprovalNaming,
    ) -> Result<AssembledRun, PlanError> {
        request.validate()?;

        let action_name = naming::label(&request.label);
        naming::validate_identifier(IdentifierKind::Action, &action_name)?;

        if !self.registry.contains(&request.input) {
            return Err(PlanError::UnresolvedArtifact {
                stage: stage.to_string(),
                action: action_name,
                artifact: request.input.name().to_string(),
            });
        }

        let approval = if request.manual_approval {
            let name = approval_name(request, approval_naming);
            naming::validate_identifier(IdentifierKind::Action, &name)?;
            Some(name)
        } else {
            None
        };
        let project = self.build_project(request)?;

        // Nothing is allocated until every name above has been checked
        let output = self.registry.create(&phrase(&[
            request.project.name.as_str(),
            request.environment.as_str(),
            request.kind.as_str(),
            "artifacts",
        ]))?;

        let mut actions = Vec::new();
        let mut run_order = 1;

        if let Some(name) = approval {
            debug!("Stage {}: approval {} at run order {}", stage, name, run_order);
            actions.push(Action::approval(name, run_order, self.topic.to_string()).with_lane(lane));
            run_order += 1;
        }

        debug!(
            "Stage {}: {} {} at run order {} ({} -> {})",
            stage, request.kind, action_name, run_order, request.input, output
        );
        actions.push(
            Action::code_build(
                request.kind,
                action_name,
                run_order,
                request.input.clone(),
                output.clone(),
                project,
            )
            .with_lane(lane),
        );

        Ok(AssembledRun { actions, output })
    }

    /// Build project and failure rule for a request.
    /// Builds share the generic buildspec; deploys get an environment-specific one.
    fn build_project(&self, request: &ActionRequest) -> Result<BuildProject, PlanError> {
        let env = request.environment.trim();
        let (project_suffix, rule_suffix, description) = match request.kind {
            RunKind::Build => (
                phrase(&[env, "build project"]),
                phrase(&[env, "build failed event"]),
                "Notify Developers of Failed Builds",
            ),
            RunKind::Deploy => (
                phrase(&[env, "deployment project"]),
                phrase(&[env, "deployment failed event"]),
                "Notify Developers of Failed Deployments",
            ),
        };

        let name = request.project.resource_name(&project_suffix);
        let rule_name = request.project.resource_name(&rule_suffix);
        naming::validate_identifier(IdentifierKind::Resource, &name)?;
        naming::validate_identifier(IdentifierKind::Resource, &rule_name)?;

        Ok(BuildProject {
            name,
            buildspec: request.buildspec.trim().to_string(),
            environment: env.to_string(),
            failure_notification: FailureNotification {
                rule_name,
                description: description.to_string(),
                topic: self.topic.to_string(),
            },
        })
    }
}

fn approval_name(request: &ActionRequest, style: ApprovalNaming) -> String {
    let subject = match request.kind {
        RunKind::Build => "build",
        RunKind::Deploy => "deployment",
    };
    let env = match style {
        ApprovalNaming::Plain => "",
        ApprovalNaming::PerEnvironment => request.environment.trim(),
    };
    naming::label(&phrase(&["approve", env, subject]))
}

/// Join the non-empty parts with single spaces
fn phrase(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
