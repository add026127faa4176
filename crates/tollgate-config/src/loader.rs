use std::path::Path;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;
        Self::from_toml(&raw)
    }

    /// Parse configuration from raw TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded = crate::env::expand_env(raw)
            .map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self =
            toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if no provider is configured, a model references a
    /// missing provider, an alias points at an unknown model, or a cost or
    /// window is out of range
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.providers.is_empty() {
            anyhow::bail!("at least one provider must be configured");
        }

        for model in &self.models {
            if !self.providers.contains_key(&model.provider) {
                anyhow::bail!(
                    "model {} references unknown provider {}",
                    model.name,
                    model.provider
                );
            }
            if model.input_cost < 0.0 || model.output_cost < 0.0 {
                anyhow::bail!("model {} has a negative per-token cost", model.name);
            }
            if model.context_window == 0 {
                anyhow::bail!("model {} has a zero context window", model.name);
            }
        }

        for (alias, target) in &self.aliases {
            if !self.models.iter().any(|m| &m.name == target) {
                anyhow::bail!("alias {alias} points at unknown model {target}");
            }
        }

        if self.billing.markup_percent < 0.0 {
            anyhow::bail!("billing.markup_percent must not be negative");
        }

        Ok(())
    }
}
