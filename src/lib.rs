//! pipeline-plan - Plans multi-stage build and deploy pipelines

pub mod cli;
pub mod core;
pub mod persistence;
pub mod planning;
pub mod resources;

// Re-export commonly used types
pub use core::config::PipelineConfig;
pub use core::{Action, ActionKind, Artifact, ArtifactRegistry, PipelineTopology, PlanError, ProjectIdentity, Stage, StageMode};
pub use persistence::{InMemoryPersistence, PersistenceBackend, PlanSummary};
pub use planning::{ActionRequest, StageComposer};
pub use resources::{GraphqlApiManifest, StackManifest, WarmerManifest};
