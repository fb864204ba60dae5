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

        let expanded =
            crate::env::expand_env(&raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if the backend or rate-limit sections are invalid
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_backend()?;
        self.validate_rate_limits()?;
        Ok(())
    }

    /// The backend must advertise at least one model
    fn validate_backend(&self) -> anyhow::Result<()> {
        if self.backend.models.is_empty() {
            anyhow::bail!("backend.models must list at least one model");
        }
        Ok(())
    }

    /// Rate-limit windows must parse as durations
    fn validate_rate_limits(&self) -> anyhow::Result<()> {
        let Some(ref rate_limit) = self.server.rate_limit else {
            return Ok(());
        };

        for (scope, limit) in [
            ("global", rate_limit.global.as_ref()),
            ("per_ip", rate_limit.per_ip.as_ref()),
            ("backend", rate_limit.backend.as_ref()),
        ] {
            if let Some(limit) = limit {
                duration_str::parse(&limit.window)
                    .map_err(|e| anyhow::anyhow!("invalid {scope} rate-limit window '{}': {e}", limit.window))?;
                if limit.requests == 0 {
                    anyhow::bail!("{scope} rate limit must allow at least one request");
                }
            }
        }

        Ok(())
    }
}
