//! Cloud resource declarations for a planned pipeline
//!
//! The planning core knows nothing about the provider. This module maps a
//! [`PipelineTopology`] and its configuration onto the resources a pipeline
//! stack declares: the notification topic, the imported repository and its
//! pull request rule, the two service roles, the pipeline, one build project
//! per build/deploy action, and the stack outputs naming all of them.
//!
//! Two standalone stacks sit beside it: [`warmer`] schedules invocations of an
//! existing function and [`graphql`] declares a GraphQL API with its schema.

pub mod graphql;
pub mod warmer;

pub use graphql::{AuthenticationType, GraphqlApiManifest};
pub use warmer::WarmerManifest;

use crate::core::{
    config::{PipelineConfig, StackEnvironment},
    error::PlanError,
    identity::ProjectIdentity,
    naming,
    topology::PipelineTopology,
    BuildProject,
};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const CODEBUILD_PRINCIPAL: &str = "codebuild.amazonaws.com";
const CODEPIPELINE_PRINCIPAL: &str = "codepipeline.amazonaws.com";

/// Managed policies attached to the build role
pub const CODEBUILD_POLICIES: &[&str] = &["AmazonS3FullAccess"];

/// Managed policies attached to the pipeline role
pub const PIPELINE_POLICIES: &[&str] = &[
    "AWSCodeBuildAdminAccess",
    "AWSCodeDeployFullAccess",
    "AWSCodePipelineFullAccess",
    "AmazonS3FullAccess",
];

/// Service role declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDeclaration {
    pub name: String,
    /// Service principal allowed to assume the role
    pub assumed_by: String,
    pub managed_policies: Vec<String>,
}

/// Imported repository and its pull request notifications
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDeclaration {
    /// Logical id of the import
    pub logical_id: String,
    /// Name of the existing repository
    pub repository_name: String,
    pub pull_request_rule: EventRuleDeclaration,
}

/// Event rule publishing to the notification topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRuleDeclaration {
    pub rule_name: String,
    pub description: String,
    pub topic: String,
}

/// Build project declaration, including its failure rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildProjectDeclaration {
    pub name: String,
    pub role: String,
    pub buildspec: String,
    pub on_failure: EventRuleDeclaration,
}

/// A named value exported by the stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackOutput {
    pub key: String,
    pub value: String,
}

/// Every resource the pipeline stack declares
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackManifest {
    pub stack_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<StackEnvironment>,

    pub topic: String,
    pub repository: RepositoryDeclaration,
    pub codebuild_role: RoleDeclaration,
    pub pipeline_role: RoleDeclaration,
    pub build_projects: Vec<BuildProjectDeclaration>,

    /// The planned topology, deployed as the pipeline resource
    pub pipeline: PipelineTopology,

    pub outputs: Vec<StackOutput>,
}

impl StackManifest {
    /// Declare the stack for a configuration and the topology planned from it
    pub fn from_topology(config: &PipelineConfig, topology: &PipelineTopology) -> Result<Self, PlanError> {
        let project = ProjectIdentity::new(&config.project)?;
        let topic = project.resource_name("pipeline topic");

        let repository = RepositoryDeclaration {
            logical_id: project.resource_name("code repository"),
            repository_name: config.repository.trim().to_string(),
            pull_request_rule: EventRuleDeclaration {
                rule_name: project.resource_name("PR state change event rule"),
                description: "Notifies Developers of PR state changes".to_string(),
                topic: topic.clone(),
            },
        };

        let codebuild_role = role(project.resource_name("code build role"), CODEBUILD_PRINCIPAL, CODEBUILD_POLICIES);
        let pipeline_role = role(project.resource_name("pipeline role"), CODEPIPELINE_PRINCIPAL, PIPELINE_POLICIES);

        let build_projects = topology
            .build_projects()
            .into_iter()
            .map(|p| build_project(p, &codebuild_role.name))
            .collect();

        let mut manifest = Self {
            stack_id: project.resource_name("pipeline stack"),
            environment: config.stack.clone(),
            topic,
            repository,
            codebuild_role,
            pipeline_role,
            build_projects,
            pipeline: topology.clone(),
            outputs: Vec::new(),
        };
        manifest.outputs = manifest.collect_outputs()?;
        Ok(manifest)
    }

    /// Outputs keyed `"{resource} name"` in Pascal case, one per named resource
    fn collect_outputs(&self) -> Result<Vec<StackOutput>, PlanError> {
        let named = |name: &str| (name.to_string(), name.to_string());

        let mut entries: Vec<(String, String)> = vec![
            (
                self.repository.logical_id.clone(),
                self.repository.repository_name.clone(),
            ),
            named(&self.repository.pull_request_rule.rule_name),
            named(&self.codebuild_role.name),
            named(&self.pipeline_role.name),
            named(&self.pipeline.name),
        ];
        for stage in &self.pipeline.stages {
            entries.extend(stage.outputs().into_iter().map(|a| named(a.name())));
        }
        for project in &self.build_projects {
            entries.push(named(&project.name));
            entries.push(named(&project.on_failure.rule_name));
        }

        let mut keys = HashSet::new();
        let mut outputs = Vec::with_capacity(entries.len());
        for (resource, value) in entries {
            let key = naming::pascal(&format!("{} name", resource));
            if !keys.insert(key.clone()) {
                return Err(PlanError::MalformedTopology(format!("duplicate stack output {}", key)));
            }
            outputs.push(StackOutput { key, value });
        }
        Ok(outputs)
    }

    /// Look up an output by key
    pub fn output(&self, key: &str) -> Option<&str> {
        self.outputs.iter().find(|o| o.key == key).map(|o| o.value.as_str())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

fn role(name: String, principal: &str, policies: &[&str]) -> RoleDeclaration {
    RoleDeclaration {
        name,
        assumed_by: principal.to_string(),
        managed_policies: policies.iter().map(|p| p.to_string()).collect(),
    }
}

fn build_project(project: &BuildProject, role: &str) -> BuildProjectDeclaration {
    BuildProjectDeclaration {
        name: project.name.clone(),
        role: role.to_string(),
        buildspec: project.buildspec.clone(),
        on_failure: EventRuleDeclaration {
            rule_name: project.failure_notification.rule_name.clone(),
            description: project.failure_notification.description.clone(),
            topic: project.failure_notification.topic.clone(),
        },
    }
}
