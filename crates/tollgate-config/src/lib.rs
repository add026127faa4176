#![allow(clippy::must_use_candidate)]

//! Configuration for the Tollgate gateway
//!
//! A single TOML file describes the server, the upstream providers, the
//! model catalog, and billing parameters. Raw text goes through
//! `{{ env.VAR }}` expansion before deserialization so secrets never live
//! in the file itself.

pub mod billing;
mod env;
pub mod limits;
mod loader;
pub mod models;
pub mod providers;
pub mod server;
pub mod telemetry;

use indexmap::IndexMap;
use serde::Deserialize;

pub use billing::BillingConfig;
pub use limits::LimitsConfig;
pub use models::ModelEntryConfig;
pub use providers::{ProviderConfig, ProviderKind};
pub use server::ServerConfig;
pub use telemetry::TelemetryConfig;

/// Top-level Tollgate configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    /// Prompt budget and stream guard limits
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Billing parameters
    #[serde(default)]
    pub billing: BillingConfig,
    /// Upstream providers keyed by name
    #[serde(default)]
    pub providers: IndexMap<String, ProviderConfig>,
    /// Model catalog entries
    #[serde(default, rename = "model")]
    pub models: Vec<ModelEntryConfig>,
    /// Legacy model name aliases, substituted once at resolution time
    #[serde(default = "models::default_aliases")]
    pub aliases: IndexMap<String, String>,
}
