//! Update detection layer for running containers
//!
//! This module turns the list of running containers into a classified
//! report: updates available, failed checks, and up-to-date containers.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Checker   │────▶│ Dispatcher  │────▶│  Strategy   │
//! │  (engine)   │     │(first match)│     │ (registry)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                                  │         │
//!        ▼                                  ▼         ▼
//! ┌─────────────┐                   ┌───────────┐ ┌───────────┐
//! │ CheckReport │                   │  Runtime  │ │ TagSource │
//! │  (buckets)  │                   │ (digests) │ │  (labels) │
//! └─────────────┘                   └───────────┘ └───────────┘
//! ```
//!
//! # Modules
//!
//! - [`engine`]: Lists containers and aggregates verdicts into a report
//! - [`dispatcher`]: Ordered, first-match strategy dispatch
//! - [`strategy`]: Strategy trait; [`strategies`] holds the implementations
//! - [`runtime`]: Container runtime trait; [`runtimes`] holds the Docker client
//! - [`tag_source`]: Tag listing trait; [`tag_sources`] holds the Docker Hub client
//! - [`reference`]: Image reference parsing and local-image heuristics
//! - [`tag`]: Latest tag selection
//! - [`types`]: `ContainerRef`, `UpdateVerdict`, `CheckReport`
//! - [`error`]: Error types for runtime and tag lookups

pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod reference;
pub mod runtime;
pub mod runtimes;
pub mod strategies;
pub mod strategy;
pub mod tag;
pub mod tag_source;
pub mod tag_sources;
pub mod types;
