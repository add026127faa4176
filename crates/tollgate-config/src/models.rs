use indexmap::IndexMap;
use serde::Deserialize;

/// One catalog entry tying a logical model name to an upstream model
///
/// Costs are the provider's raw per-token USD prices; the catalog applies
/// the configured markup when it is built.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelEntryConfig {
    /// Logical name clients request
    pub name: String,
    /// Key into the `[providers]` table
    pub provider: String,
    /// Provider-native model identifier (defaults to `name`)
    #[serde(default)]
    pub upstream_id: Option<String>,
    /// Raw per-token input cost in USD
    pub input_cost: f64,
    /// Raw per-token output cost in USD
    pub output_cost: f64,
    /// Combined prompt+completion token budget the model supports
    pub context_window: u32,
    /// Hard ceiling on completion tokens for this model
    #[serde(default = "default_max_output")]
    pub max_output: u32,
}

const fn default_max_output() -> u32 {
    4096
}

/// Built-in legacy aliases carried over from earlier deployments
pub fn default_aliases() -> IndexMap<String, String> {
    IndexMap::from_iter([
        (
            "burrito-8x7b".to_owned(),
            "cognitivecomputations/dolphin-mixtral-8x7b".to_owned(),
        ),
        ("ag1".to_owned(), "gpt-3.5-turbo-16k".to_owned()),
    ])
}
