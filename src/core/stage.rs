//! Stage domain model

use crate::core::{action::Action, artifact::Artifact};
use serde::{Deserialize, Serialize};

/// How the actions of a stage relate to each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageMode {
    /// One lane of actions executed in run order
    Sequential,
    /// Several independent lanes, each with its own run order sequence.
    /// Lanes are assumed to execute concurrently; the planner only records
    /// the grouping, it does not guarantee it.
    Parallel,
}

/// A named, ordered group of actions executed as a unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub name: String,
    pub mode: StageMode,
    pub actions: Vec<Action>,
}

impl Stage {
    pub fn new(name: String, mode: StageMode, actions: Vec<Action>) -> Self {
        Self { name, mode, actions }
    }

    /// Get an action by name
    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.name == name)
    }

    /// Number of lanes in this stage
    pub fn lanes(&self) -> usize {
        self.actions.iter().map(|a| a.lane + 1).max().unwrap_or(0)
    }

    /// Actions of one lane, in listed order
    pub fn lane(&self, lane: usize) -> impl Iterator<Item = &Action> {
        self.actions.iter().filter(move |a| a.lane == lane)
    }

    /// Artifacts consumed by this stage's actions
    pub fn inputs(&self) -> Vec<&Artifact> {
        self.actions.iter().filter_map(|a| a.input.as_ref()).collect()
    }

    /// Artifacts produced by this stage's actions
    pub fn outputs(&self) -> Vec<&Artifact> {
        self.actions.iter().filter_map(|a| a.output.as_ref()).collect()
    }

    /// Number of manual approval gates
    pub fn approval_count(&self) -> usize {
        self.actions.iter().filter(|a| a.is_approval()).count()
    }
}
