//! # ingest-orchestrator
//!
//! The ingestion entry point: detects a file's modality, routes it across
//! the relational and document/vector ingestion paths, and assembles the
//! uniform result envelope regardless of which path handled it.

pub mod error;
pub mod modality;
pub mod orchestrator;
pub mod path_planner;
pub mod signals;

pub use error::OrchestratorError;
pub use modality::resolve as resolve_modality;
pub use orchestrator::{IngestRequest, IngestionOrchestrator};
pub use path_planner::{IdentityPathPlanner, PathPlan, PathPlanner, Persona};
