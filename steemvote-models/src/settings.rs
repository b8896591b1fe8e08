// Copyright (c) 2022 THE STEEMVOTE AUTHORS

//! Build the settings of a steemvote binary
//!
//! ---
//! Settings are merged from the following sources, later ones overriding
//! earlier ones on duplicated keys:
//!
//! 1. the base configuration, read from the path in the `STEEMVOTE_CONFIG_PATH`
//!    environment variable, or `base_config/config.toml` by default. This file
//!    is shipped with the repository and must exist.
//! 2. an override file: the path given by the caller (e.g. the `--config` flag),
//!    which must exist, or else `STEEMVOTE_CONFIG_OVERRIDE_PATH`
//!    (`config/config.toml` by default), skipped if it does not exist.
//! 3. the user configuration directory of the application, if it exists.
//! 4. environment variables prefixed with the given prefix, with `__`
//!    separating nested keys (`STEEMVOTE__ENGINE__VOTE_INTERVAL=3000`).
use crate::error::{ModelsError, ModelsResult};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Merge the settings, see module documentation for the order.
pub fn build_steemvote_settings<T: DeserializeOwned>(
    app_name: &str,
    env_prefix: &str,
    override_path: Option<&Path>,
) -> ModelsResult<T> {
    let mut builder = config::Config::builder();
    let config_path = std::env::var("STEEMVOTE_CONFIG_PATH")
        .unwrap_or_else(|_| "base_config/config.toml".to_string());
    builder = builder.add_source(config::File::with_name(&config_path));

    match override_path {
        Some(path) if !path.is_file() => {
            return Err(ModelsError::ConfigError(format!(
                "configuration file {} not found",
                path.display()
            )));
        }
        Some(path) => {
            builder = builder.add_source(config::File::from(path.to_path_buf()));
        }
        None => {
            let default_override = PathBuf::from(
                std::env::var("STEEMVOTE_CONFIG_OVERRIDE_PATH")
                    .unwrap_or_else(|_| "config/config.toml".to_string()),
            );
            if default_override.is_file() {
                builder = builder.add_source(config::File::from(default_override));
            }
        }
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "steemvote", app_name) {
        let user_config_path = proj_dirs.config_dir().join("config.toml");
        if user_config_path.is_file() {
            builder = builder.add_source(config::File::from(user_config_path));
        }
    }

    builder
        .add_source(config::Environment::with_prefix(env_prefix).separator("__"))
        .build()
        .and_then(|settings| settings.try_deserialize())
        .map_err(|err| ModelsError::ConfigError(format!("{} ({})", err, config_path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;

    #[derive(Debug, Deserialize)]
    struct Sample {
        name: String,
        interval: u64,
    }

    #[test]
    fn test_override_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("base.toml");
        let over = dir.path().join("over.toml");
        writeln!(std::fs::File::create(&base).unwrap(), "name = \"base\"\ninterval = 3").unwrap();
        writeln!(std::fs::File::create(&over).unwrap(), "interval = 5").unwrap();
        std::env::set_var("STEEMVOTE_CONFIG_PATH", base.to_str().unwrap());
        let sample: Sample =
            build_steemvote_settings("steemvote-test", "STEEMVOTE_MODELS_TEST", Some(&over))
                .unwrap();
        std::env::remove_var("STEEMVOTE_CONFIG_PATH");
        assert_eq!(sample.name, "base");
        assert_eq!(sample.interval, 5);
    }

    #[test]
    fn test_missing_explicit_override_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("typo.toml");
        let result: ModelsResult<Sample> =
            build_steemvote_settings("steemvote-test", "STEEMVOTE_MODELS_TEST", Some(&missing));
        assert!(matches!(result, Err(ModelsError::ConfigError(message)) if message.contains("typo.toml")));
    }
}
