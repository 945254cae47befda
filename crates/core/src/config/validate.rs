use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - At least one device is configured
/// - The preserved-field set is not empty
/// - The transfer option string does not smuggle in orchestrator-owned flags
/// - Alias and media-folder mappings have no empty names
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.devices.is_empty() {
        return Err(ConfigError::ValidationError(
            "at least one [devices.<id>] section is required".to_string(),
        ));
    }

    if config.sync.preserved_fields.is_empty() {
        return Err(ConfigError::ValidationError(
            "sync.preserved_fields cannot be empty".to_string(),
        ));
    }

    // Purge and simulation are per-run decisions; hardcoding them in the
    // option string would make every run destructive or inert.
    for owned in ["--delete", "--dry-run", "-n"] {
        if config.transfer.options.split_whitespace().any(|o| o == owned) {
            return Err(ConfigError::ValidationError(format!(
                "transfer.options must not contain {owned}"
            )));
        }
    }

    for (id, device) in &config.devices {
        for (canonical, alias) in &device.aliases {
            if canonical.is_empty() || alias.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "devices.{id}.aliases contains an empty name"
                )));
            }
        }
        for (canonical, shared) in &device.media_folders {
            if canonical.is_empty() || shared.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "devices.{id}.media_folders contains an empty name"
                )));
            }
        }
    }

    Ok(())
}
