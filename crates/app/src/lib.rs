//! # homegraph-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `RegistryLoader` — fetch a complete registry dump as a snapshot
//!   - `SnapshotSource` — hand out the snapshot currently in effect
//! - Define **driving/inbound ports** as use-case structs:
//!   - `TargetService` — extraction, display trees and candidate search
//!   - `RegistrySync` — load a fresh snapshot and publish it
//! - Provide **in-process infrastructure** (snapshot feed) that doesn't need IO
//! - Orchestrate domain functions without knowing *where* registries come from
//!
//! ## Dependency rule
//! Depends on `homegraph-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod services;
pub mod snapshot_feed;
