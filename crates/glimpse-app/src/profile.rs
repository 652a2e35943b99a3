use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};

use glimpse_config::Config;

/// Loads the profile file, then layers environment overrides on top.
pub fn load(path: &Path) -> anyhow::Result<Config> {
    let file = File::open(path)
        .with_context(|| format!("failed to open profile {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut config: Config = serde_json::from_reader(reader)
        .with_context(|| format!("failed to parse profile {}", path.display()))?;
    config.apply_env();

    info!(path = %path.display(), "profile loaded");
    Ok(config)
}

/// Falls back to built-in defaults when the profile file does not exist.
/// A file that exists but does not parse is still an error.
pub fn load_or_default(path: &Path) -> anyhow::Result<Config> {
    if path.exists() {
        load(path)
    } else {
        warn!(path = %path.display(), "profile not found, using defaults");
        Ok(Config::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    #[test]
    fn test_load_profile_applies_file_values() {
        let path = std::env::temp_dir().join("glimpse-profile-test.json");
        fs::write(
            &path,
            r#"{ "prompts": { "default_template": "solve" } }"#,
        )
        .unwrap();

        let config = load(&path).unwrap();
        assert_eq!(config.prompts.default_template, "solve");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_profile_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("glimpse-profile-missing.json");
        let config = load_or_default(&path).unwrap();
        assert_eq!(config.prompts.default_template, "explain");
    }

    #[test]
    fn test_broken_profile_is_an_error() {
        let path = std::env::temp_dir().join("glimpse-profile-broken.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(load_or_default(&path).is_err());

        fs::remove_file(&path).unwrap();
    }
}
