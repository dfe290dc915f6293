//! Pipeline topology - the static plan handed to the execution engine

use crate::core::{
    action::{ActionKind, BuildProject, FailureNotification},
    error::PlanError,
    naming::{self, IdentifierKind},
    stage::Stage,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Ordered list of stages: source first, final deploy last
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineTopology {
    /// Pipeline name
    pub name: String,

    pub stages: Vec<Stage>,
}

impl PipelineTopology {
    /// Create a topology and check its invariants
    pub fn new(name: String, stages: Vec<Stage>) -> Result<Self, PlanError> {
        let topology = Self { name, stages };
        topology.validate()?;
        Ok(topology)
    }

    /// Check every structural invariant of the plan.
    ///
    /// - stage 0 holds the source actions and no other stage does
    /// - stage names are unique, action names are unique per stage
    /// - per lane, run orders count up from 1; an approval only ever runs first
    /// - every input was produced by a strictly earlier stage
    /// - every artifact is produced once
    /// - every build/deploy action has one uniquely named failure notification
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.stages.len() < 2 {
            return Err(PlanError::MalformedTopology(format!(
                "pipeline '{}' needs a source stage and at least one more stage",
                self.name
            )));
        }

        let mut stage_names = HashSet::new();
        let mut produced: HashSet<&str> = HashSet::new();
        let mut rule_names = HashSet::new();

        for (index, stage) in self.stages.iter().enumerate() {
            naming::validate_identifier(IdentifierKind::Stage, &stage.name)?;
            if !stage_names.insert(stage.name.as_str()) {
                return Err(PlanError::DuplicateStage(stage.name.clone()));
            }
            if stage.actions.is_empty() {
                return Err(PlanError::MalformedTopology(format!(
                    "stage '{}' has no actions",
                    stage.name
                )));
            }

            let all_source = stage.actions.iter().all(|a| a.kind == ActionKind::Source);
            let any_source = stage.actions.iter().any(|a| a.kind == ActionKind::Source);
            if index == 0 && !all_source {
                return Err(PlanError::MalformedTopology(format!(
                    "first stage '{}' must only contain source actions",
                    stage.name
                )));
            }
            if index > 0 && any_source {
                return Err(PlanError::MalformedTopology(format!(
                    "source action outside the first stage in '{}'",
                    stage.name
                )));
            }

            let mut action_names = HashSet::new();
            let mut next_run_order: BTreeMap<usize, u32> = BTreeMap::new();

            for action in &stage.actions {
                naming::validate_identifier(IdentifierKind::Action, &action.name)?;
                if !action_names.insert(action.name.as_str()) {
                    return Err(PlanError::DuplicateAction {
                        stage: stage.name.clone(),
                        action: action.name.clone(),
                    });
                }

                let expected = next_run_order.entry(action.lane).or_insert(1);
                if action.run_order != *expected || (action.is_approval() && action.run_order != 1) {
                    return Err(PlanError::RunOrder {
                        stage: stage.name.clone(),
                        action: action.name.clone(),
                        expected: if action.is_approval() { 1 } else { *expected },
                        found: action.run_order,
                    });
                }
                *expected += 1;

                if let Some(input) = &action.input {
                    if !produced.contains(input.name()) {
                        return Err(PlanError::UnresolvedArtifact {
                            stage: stage.name.clone(),
                            action: action.name.clone(),
                            artifact: input.name().to_string(),
                        });
                    }
                }

                if action.kind.runs_build_project() {
                    let project = action.project.as_ref().ok_or_else(|| PlanError::MissingNotification {
                        stage: stage.name.clone(),
                        action: action.name.clone(),
                    })?;
                    let rule = &project.failure_notification.rule_name;
                    if rule.is_empty() {
                        return Err(PlanError::MissingNotification {
                            stage: stage.name.clone(),
                            action: action.name.clone(),
                        });
                    }
                    if !rule_names.insert(rule.as_str()) {
                        return Err(PlanError::DuplicateNotification(rule.clone()));
                    }
                }
            }

            // Outputs become visible only to later stages
            for output in stage.outputs() {
                if !produced.insert(output.name()) {
                    return Err(PlanError::DuplicateArtifact(output.name().to_string()));
                }
            }
        }

        Ok(())
    }

    /// The source checkout stage
    pub fn source_stage(&self) -> Option<&Stage> {
        self.stages.first()
    }

    /// The last deploy stage
    pub fn final_stage(&self) -> Option<&Stage> {
        self.stages.last()
    }

    /// Get a stage by name
    pub fn stage(&self, name: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.name == name)
    }

    /// Stage names in execution order
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn action_count(&self) -> usize {
        self.stages.iter().map(|s| s.actions.len()).sum()
    }

    pub fn approval_count(&self) -> usize {
        self.stages.iter().map(|s| s.approval_count()).sum()
    }

    /// Build projects of every build/deploy action, in pipeline order
    pub fn build_projects(&self) -> Vec<&BuildProject> {
        self.stages
            .iter()
            .flat_map(|s| s.actions.iter())
            .filter_map(|a| a.project.as_ref())
            .collect()
    }

    /// Failure notification bindings, in pipeline order
    pub fn failure_notifications(&self) -> Vec<&FailureNotification> {
        self.build_projects()
            .into_iter()
            .map(|p| &p.failure_notification)
            .collect()
    }
}
