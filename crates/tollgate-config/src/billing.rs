use serde::Deserialize;

/// Billing parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BillingConfig {
    /// Percentage added to raw provider per-token costs to derive the
    /// billed unit cost
    #[serde(default = "default_markup_percent")]
    pub markup_percent: f64,
    /// Credit granted when a user's balance row is created lazily
    #[serde(default = "default_starter_credit")]
    pub starter_credit: f64,
    /// Assistant message synthesized when a request is rejected for lack
    /// of funds
    #[serde(default = "default_insufficient_funds_message")]
    pub insufficient_funds_message: String,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            markup_percent: default_markup_percent(),
            starter_credit: default_starter_credit(),
            insufficient_funds_message: default_insufficient_funds_message(),
        }
    }
}

const fn default_markup_percent() -> f64 {
    30.0
}

const fn default_starter_credit() -> f64 {
    0.5
}

fn default_insufficient_funds_message() -> String {
    "You have run out of credits. Please add funds to your balance to keep chatting.".to_owned()
}
