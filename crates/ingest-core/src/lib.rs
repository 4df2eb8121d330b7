//! # ingest-core
//!
//! Shared data model, scalar types, ID generation, and cross-cutting error
//! types for the heterogeneous file ingestion pipeline.
//!
//! This crate provides the foundational types shared across every ingestion
//! crate:
//! - The catalog data model (`File`, `Row`, `Attribute`, `Chunk`, `GraphNode`,
//! table descriptors)
//! - The tagged `Scalar` variant that carries heterogeneous row values
//! through the pipeline
//! - Routing and decision enums (`Modality`, `Decision`)
//! - Opaque ID generation (`ids::generate_id`)
//! - Attribute normalization (`attribute::normalize`, `attribute::is_id_attribute`)
//! - Arrow serialization adapters for chrono types
//! - The uniform ingestion result envelope

pub mod arrow_serde;
pub mod attribute;
pub mod envelope;
pub mod errors;
pub mod ids;
pub mod model;
