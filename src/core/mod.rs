//! Core domain models for pipeline plans
//!
//! This module defines the data structures that describe a planned
//! pipeline: names, artifacts, actions, stages and the topology itself,
//! plus the YAML configuration they are built from.

pub mod action;
pub mod artifact;
pub mod config;
pub mod error;
pub mod identity;
pub mod naming;
pub mod stage;
pub mod topology;

pub use action::*;
pub use artifact::*;
pub use error::PlanError;
pub use identity::ProjectIdentity;
pub use naming::NameStyle;
pub use stage::*;
pub use topology::*;
