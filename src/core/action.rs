//! Action domain model

use crate::core::artifact::Artifact;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a build/deploy request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunKind {
    Build,
    Deploy,
}

impl RunKind {
    /// Word used in artifact descriptions
    pub fn as_str(&self) -> &'static str {
        match self {
            RunKind::Build => "build",
            RunKind::Deploy => "deploy",
        }
    }

    /// Action kind produced for this run
    pub fn action_kind(&self) -> ActionKind {
        match self {
            RunKind::Build => ActionKind::Build,
            RunKind::Deploy => ActionKind::Deploy,
        }
    }
}

impl fmt::Display for RunKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a planned action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Repository checkout
    Source,
    /// Pauses execution until approved or rejected externally
    ManualApproval,
    Build,
    Deploy,
}

impl ActionKind {
    /// Build and deploy actions run a build project
    pub fn runs_build_project(&self) -> bool {
        matches!(self, ActionKind::Build | ActionKind::Deploy)
    }
}

/// Event rule that publishes a build project's failures to the topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureNotification {
    /// Unique rule name
    pub rule_name: String,

    pub description: String,

    /// Topic the rule targets
    pub topic: String,
}

/// Build project descriptor behind a build or deploy action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildProject {
    /// Project name
    pub name: String,

    /// Path of the buildspec file inside the source checkout
    pub buildspec: String,

    /// Target environment (empty for environment-less builds)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub environment: String,

    /// The project's failure notification binding
    pub failure_notification: FailureNotification,
}

/// Repository settings of a source action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSettings {
    pub repository: String,
    pub branch: String,
}

/// A single unit of work with an execution rank inside its stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Action name, unique within its stage
    pub name: String,

    /// Execution rank within the action's lane, starting at 1
    pub run_order: u32,

    /// Index of the request this action was assembled from, within a parallel stage
    #[serde(default)]
    pub lane: usize,

    pub kind: ActionKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Artifact>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Artifact>,

    /// Set for build and deploy actions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<BuildProject>,

    /// Topic notified when an approval is pending
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_topic: Option<String>,

    /// Set for source actions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceSettings>,
}

impl Action {
    /// Source checkout action
    pub fn source(name: String, settings: SourceSettings, output: Artifact) -> Self {
        Self {
            name,
            run_order: 1,
            lane: 0,
            kind: ActionKind::Source,
            input: None,
            output: Some(output),
            project: None,
            notify_topic: None,
            source: Some(settings),
        }
    }

    /// Manual approval gate
    pub fn approval(name: String, run_order: u32, topic: String) -> Self {
        Self {
            name,
            run_order,
            lane: 0,
            kind: ActionKind::ManualApproval,
            input: None,
            output: None,
            project: None,
            notify_topic: Some(topic),
            source: None,
        }
    }

    /// Build or deploy action running `project`
    pub fn code_build(
        kind: RunKind,
        name: String,
        run_order: u32,
        input: Artifact,
        output: Artifact,
        project: BuildProject,
    ) -> Self {
        Self {
            name,
            run_order,
            lane: 0,
            kind: kind.action_kind(),
            input: Some(input),
            output: Some(output),
            project: Some(project),
            notify_topic: None,
            source: None,
        }
    }

    pub fn with_lane(mut self, lane: usize) -> Self {
        self.lane = lane;
        self
    }

    pub fn is_approval(&self) -> bool {
        self.kind == ActionKind::ManualApproval
    }
}
