//! Persistence layer for plan history

#[cfg(feature = "sqlite")]
pub mod store;

#[cfg(feature = "sqlite")]
pub use store::SqlitePlanStore;

use crate::core::PipelineTopology;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Summary of one generated plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    /// Unique plan ID
    pub plan_id: Uuid,

    /// Pipeline name
    pub pipeline_name: String,

    /// Project the pipeline belongs to
    pub project: String,

    /// When the plan was generated
    pub generated_at: DateTime<Utc>,

    pub stage_count: usize,

    pub action_count: usize,

    /// Number of manual approval gates
    pub approval_count: usize,
}

/// Trait for persistence backends
#[async_trait::async_trait]
pub trait PersistenceBackend: Send + Sync {
    /// Save a plan summary
    async fn save_plan(&self, plan: &PlanSummary) -> Result<()>;

    /// Load a plan by ID
    async fn load_plan(&self, plan_id: Uuid) -> Result<Option<PlanSummary>>;

    /// List all plans for a pipeline, newest first
    async fn list_plans(&self, pipeline_name: &str) -> Result<Vec<PlanSummary>>;

    /// List all pipeline names
    async fn list_pipelines(&self) -> Result<Vec<String>>;
}

/// In-memory persistence (for testing or ephemeral use)
pub struct InMemoryPersistence {
    plans: tokio::sync::RwLock<std::collections::HashMap<Uuid, PlanSummary>>,
    by_pipeline: tokio::sync::RwLock<std::collections::BTreeMap<String, Vec<Uuid>>>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self {
            plans: tokio::sync::RwLock::new(std::collections::HashMap::new()),
            by_pipeline: tokio::sync::RwLock::new(std::collections::BTreeMap::new()),
        }
    }
}

impl Default for InMemoryPersistence {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PersistenceBackend for InMemoryPersistence {
    async fn save_plan(&self, plan: &PlanSummary) -> Result<()> {
        let mut plans = self.plans.write().await;
        let replaced = plans.insert(plan.plan_id, plan.clone()).is_some();

        if !replaced {
            let mut by_pipeline = self.by_pipeline.write().await;
            by_pipeline
                .entry(plan.pipeline_name.clone())
                .or_insert_with(Vec::new)
                .push(plan.plan_id);
        }

        Ok(())
    }

    async fn load_plan(&self, plan_id: Uuid) -> Result<Option<PlanSummary>> {
        let plans = self.plans.read().await;
        Ok(plans.get(&plan_id).cloned())
    }

    async fn list_plans(&self, pipeline_name: &str) -> Result<Vec<PlanSummary>> {
        let plans = self.plans.read().await;
        let by_pipeline = self.by_pipeline.read().await;

        let mut result: Vec<PlanSummary> = by_pipeline
            .get(pipeline_name)
            .map(|ids| ids.iter().filter_map(|id| plans.get(id).cloned()).collect())
            .unwrap_or_default();
        result.sort_by(|a, b| b.generated_at.cmp(&a.generated_at));
        Ok(result)
    }

    async fn list_pipelines(&self) -> Result<Vec<String>> {
        let by_pipeline = self.by_pipeline.read().await;
        Ok(by_pipeline.keys().cloned().collect())
    }
}

/// Create a summary from a planned topology
pub fn create_summary(topology: &PipelineTopology, project: &str) -> PlanSummary {
    PlanSummary {
        plan_id: Uuid::new_v4(),
        pipeline_name: topology.name.clone(),
        project: project.to_string(),
        generated_at: Utc::now(),
        stage_count: topology.stages.len(),
        action_count: topology.action_count(),
        approval_count: topology.approval_count(),
    }
}
