//! Topology planning: request assembly and stage composition

pub mod assembler;
pub mod composer;
pub mod request;

pub use assembler::{ActionAssembler, ApprovalNaming, AssembledRun};
pub use composer::{ParallelOutput, StageComposer, StageOutput};
pub use request::ActionRequest;
