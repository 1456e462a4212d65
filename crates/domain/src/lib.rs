//! # homegraph-domain
//!
//! Pure domain model for homegraph target resolution.
//!
//! ## Responsibilities
//! - Registry records: **Floors**, **Areas**, **Devices**, **Entities**, **Labels**
//!   and the live state of entities
//! - An immutable, indexed **Registry Snapshot** (containment and label lookups)
//! - The **Filter Predicate Composer** deciding what passes at every level
//! - The **Target Extraction Resolver** turning a compound selection into
//!   concrete areas, devices and entities
//! - The **Hierarchical Tree Builder** projecting a resolution into a pruned
//!   display forest
//! - The **Search Index** and picker candidate lists
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;

pub mod area;
pub mod device;
pub mod entity;
pub mod floor;
pub mod label;
pub mod registry;

pub mod extraction;
pub mod filter;
pub mod picker;
pub mod search;
pub mod target;
pub mod tree;
