#![allow(clippy::must_use_candidate)]

//! Model catalog and provider resolution
//!
//! Maps a logical model identifier to everything the relay needs for an
//! upstream call: vendor, base URL, credential, context window, output
//! ceiling, and billed per-token costs. Legacy aliases are substituted
//! here, exactly once, before a request leaves the gateway.

mod error;

use indexmap::IndexMap;
use secrecy::SecretString;
use tollgate_config::{Config, ProviderKind};
use url::Url;

pub use error::CatalogError;

/// A catalog entry joined with its provider configuration
#[derive(Debug, Clone)]
pub struct ResolvedModel {
    /// Logical name after alias substitution
    pub name: String,
    /// Provider-native model identifier sent upstream
    pub upstream_id: String,
    /// Vendor this model is served by
    pub provider: ProviderKind,
    /// Provider key from configuration, for logs and ledger rows
    pub provider_name: String,
    /// Chat-completions base URL
    pub base_url: Url,
    /// Bearer credential for the provider
    pub api_key: SecretString,
    /// Billed per-token input cost (markup applied)
    pub input_cost: f64,
    /// Billed per-token output cost (markup applied)
    pub output_cost: f64,
    /// Combined prompt+completion token budget
    pub context_window: u32,
    /// Hard ceiling on completion tokens
    pub max_output: u32,
}

impl ResolvedModel {
    /// Clamp a caller-requested completion budget to this model's ceiling
    pub const fn clamp_output(&self, requested: u32) -> u32 {
        if requested > self.max_output {
            self.max_output
        } else {
            requested
        }
    }
}

#[derive(Debug, Clone)]
struct CatalogEntry {
    upstream_id: String,
    provider_name: String,
    input_cost: f64,
    output_cost: f64,
    context_window: u32,
    max_output: u32,
}

#[derive(Debug, Clone)]
struct ProviderEntry {
    kind: ProviderKind,
    base_url: Url,
    api_key: Option<SecretString>,
}

/// Read-only model catalog built from configuration at startup
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    models: IndexMap<String, CatalogEntry>,
    providers: IndexMap<String, ProviderEntry>,
    aliases: IndexMap<String, String>,
}

impl ModelCatalog {
    /// Build the catalog, applying the configured cost markup once
    ///
    /// # Panics
    ///
    /// Panics if a hardcoded vendor base URL is invalid (cannot happen).
    pub fn from_config(config: &Config) -> Self {
        let providers = config
            .providers
            .iter()
            .map(|(name, p)| {
                let base_url = p.base_url.clone().unwrap_or_else(|| {
                    Url::parse(p.kind.default_base_url()).expect("valid default URL")
                });
                (
                    name.clone(),
                    ProviderEntry {
                        kind: p.kind,
                        base_url,
                        api_key: p.api_key.clone(),
                    },
                )
            })
            .collect();

        let markup = config.billing.markup_percent;
        let models = config
            .models
            .iter()
            .map(|m| {
                (
                    m.name.clone(),
                    CatalogEntry {
                        upstream_id: m.upstream_id.clone().unwrap_or_else(|| m.name.clone()),
                        provider_name: m.provider.clone(),
                        input_cost: apply_markup(m.input_cost, markup),
                        output_cost: apply_markup(m.output_cost, markup),
                        context_window: m.context_window,
                        max_output: m.max_output,
                    },
                )
            })
            .collect();

        Self {
            models,
            providers,
            aliases: config.aliases.clone(),
        }
    }

    /// Resolve a logical model identifier
    ///
    /// Alias substitution happens here and nowhere else downstream.
    ///
    /// # Errors
    ///
    /// Returns `UnknownModel` for an identifier with no catalog entry and
    /// `MissingCredential` when the entry's provider has no API key.
    pub fn resolve(&self, model: &str) -> Result<ResolvedModel, CatalogError> {
        let name = self.aliases.get(model).map_or(model, String::as_str);

        let entry = self.models.get(name).ok_or_else(|| CatalogError::UnknownModel {
            model: model.to_owned(),
        })?;

        // validated at config load, so absence here is a programming error
        // on the config side rather than a user one
        let provider =
            self.providers
                .get(&entry.provider_name)
                .ok_or_else(|| CatalogError::UnknownModel {
                    model: model.to_owned(),
                })?;

        let api_key = provider
            .api_key
            .clone()
            .ok_or_else(|| CatalogError::MissingCredential {
                provider: entry.provider_name.clone(),
            })?;

        Ok(ResolvedModel {
            name: name.to_owned(),
            upstream_id: entry.upstream_id.clone(),
            provider: provider.kind,
            provider_name: entry.provider_name.clone(),
            base_url: provider.base_url.clone(),
            api_key,
            input_cost: entry.input_cost,
            output_cost: entry.output_cost,
            context_window: entry.context_window,
            max_output: entry.max_output,
        })
    }

    /// Logical names of every catalog entry
    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }
}

/// Add the configured markup percentage to a raw provider cost
fn apply_markup(raw_cost: f64, markup_percent: f64) -> f64 {
    raw_cost + raw_cost * (markup_percent / 100.0)
}
