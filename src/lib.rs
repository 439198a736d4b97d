//! # Lbtopo - Load-Balanced Topology Sample
//!
//! Lbtopo provisions a complete load-balanced virtual-machine topology
//! against an ARM-style resource-management API, exercises it, and tears
//! it all down again. It is an async-first, type-safe walk through the
//! provider's REST surface: OAuth2 client-credentials auth, idempotent
//! PUT creates, provisioning-state polling, read-modify-write updates
//! and cascading deletes.
//!
//! ## What a Run Builds
//!
//! - **Resource group**: the container everything else lives in
//! - **Virtual network**: `10.0.0.0/16` with frontend and backend subnets
//! - **Public load balancer**: frontend IP, backend pool, HTTP/HTTPS
//!   probes and rules, two inbound-NAT rules for SSH
//! - **Network interfaces**: two NICs joined to the pool, one NAT rule each
//! - **Virtual machines**: two small Ubuntu VMs in an availability set
//! - **Internal load balancer**: a second balancer on the frontend subnet,
//!   listed and deleted again as part of the exercise
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                     CLI Interface                       │
//! │               (clap-based command parsing)              │
//! └─────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                       Workflow                          │
//! │     (ordered provisioning + guaranteed teardown)        │
//! └─────────────────────────────────────────────────────────┘
//!              │                           │
//!              ▼                           ▼
//! ┌─────────────────────────┐   ┌─────────────────────────┐
//! │    Payload Builders     │   │     ResourceClient      │
//! │  (typed ARM payloads)   │   │  (trait: real / fake)   │
//! └─────────────────────────┘   └─────────────────────────┘
//!                                           │
//!                        ┌──────────────────┴─────────────────┐
//!                        ▼                                    ▼
//!             ┌─────────────────────┐            ┌─────────────────────┐
//!             │      ArmClient      │            │   InMemoryClient    │
//!             │ (reqwest + OAuth2)  │            │ (dry-run and tests) │
//!             └─────────────────────┘            └─────────────────────┘
//! ```
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use lbtopo::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let credentials = Credentials::from_env()?;
//!     let settings = Settings::default();
//!     let client = Arc::new(ArmClient::new(credentials.clone())?);
//!
//!     let workflow = Workflow::new(
//!         client,
//!         settings,
//!         Reporter::stdout(),
//!         &credentials.subscription_id,
//!     );
//!     let report = workflow.run().await;
//!     println!("resource group was {}", report.group);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export commonly used items in prelude
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::client::arm::ArmClient;
    pub use crate::client::memory::InMemoryClient;
    pub use crate::client::{Resource, ResourceClient, ResourceKind};
    pub use crate::config::{Credentials, Settings};
    pub use crate::error::{Error, Result};
    pub use crate::output::Reporter;
    pub use crate::workflow::{TopologyNames, Workflow, WorkflowReport};
}

// ============================================================================
// Core Modules
// ============================================================================

/// Error types and result alias for all operations.
///
/// The [`Error`](error::Error) enum distinguishes configuration problems,
/// auth failures, missing resources and service-side errors, and maps each
/// family to a process exit code.
pub mod error;

/// Credentials from the environment and run settings.
pub mod config;

/// Resource-id construction and randomised resource names.
pub mod naming;

/// Progress reporting to the terminal (or a capture buffer in tests).
pub mod output;

/// Typed payloads for every resource the run creates, plus the pure
/// builder functions that assemble them.
pub mod resources;

/// The [`ResourceClient`](client::ResourceClient) trait and its two
/// implementations: the real HTTP client and the in-memory fake.
pub mod client;

/// The provisioning/teardown run itself.
pub mod workflow;

// ============================================================================
// Version Information
// ============================================================================

/// Returns the current crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
