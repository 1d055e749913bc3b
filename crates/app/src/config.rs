use std::path::Path;

use anyhow::Context;
use services::TrainingConfig;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "vocab.json";

/// Loads the training configuration.
///
/// An explicit path must exist. Without one, `vocab.json` is used if present,
/// otherwise the built-in defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<TrainingConfig> {
    match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!(
                    "Config file not found: '{}'\n\nSuggestion: Check the path or remove the --config flag to use defaults",
                    path.display()
                );
            }
            read(path)
        }
        None => {
            let fallback = Path::new(DEFAULT_CONFIG_FILE);
            if fallback.exists() {
                read(fallback)
            } else {
                Ok(TrainingConfig::default())
            }
        }
    }
}

fn read(path: &Path) -> anyhow::Result<TrainingConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file '{}'", path.display()))?;
    parse_config(&raw).with_context(|| format!("invalid config file '{}'", path.display()))
}

pub fn parse_config(raw: &str) -> anyhow::Result<TrainingConfig> {
    let config: TrainingConfig = serde_json::from_str(raw)?;
    if config.max_words == 0 {
        anyhow::bail!("max_words must be positive");
    }
    if config.stop_command.trim().is_empty() || config.cancel_command.trim().is_empty() {
        anyhow::bail!("stop_command and cancel_command cannot be empty");
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        assert_eq!(parse_config("{}").unwrap(), TrainingConfig::default());
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = parse_config(r#"{"max_words": 25, "stop_command": "/halt"}"#).unwrap();
        assert_eq!(cfg.max_words, 25);
        assert_eq!(cfg.stop_command, "/halt");
        assert_eq!(cfg.cancel_command, "/cancel");
    }

    #[test]
    fn nonsensical_values_are_rejected() {
        assert!(parse_config(r#"{"max_words": 0}"#).is_err());
        assert!(parse_config(r#"{"stop_command": " "}"#).is_err());
        assert!(parse_config("[]").is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load_config(Some(Path::new("/definitely/not/here.json"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }
}
