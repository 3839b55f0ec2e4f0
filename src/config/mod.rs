//! Configuration management for `preload.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── error    # ConfigError
//! ├── section  # [generate] and [serve] sections
//! └── mod.rs   # PreloadConfig, loading and CLI overrides (this file)
//! ```
//!
//! The file is optional. Values are resolved in order: built-in defaults,
//! then the file, then command-line flags.

mod error;
mod section;

pub use error::ConfigError;
pub use section::{GenerateConfig, ServeConfig};

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::cli::{Cli, Commands, GenerateArgs, ServeArgs};
use crate::log;

/// Config file looked up in the current directory when `-C` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "preload.toml";

/// Root configuration structure representing `preload.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreloadConfig {
    /// Path of the file the values came from (empty when none was read).
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub generate: GenerateConfig,

    #[serde(default)]
    pub serve: ServeConfig,
}

impl PreloadConfig {
    /// Load configuration for `cli`.
    ///
    /// A missing default file means built-in defaults; a missing file named
    /// with `-C` is an error.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let (path, explicit) = match &cli.config {
            Some(path) => (path.clone(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        let mut config = if explicit || path.is_file() {
            let mut config = Self::from_path(&path)?;
            config.config_path = path;
            config
        } else {
            Self::default()
        };

        config.apply_command_options(&cli.command);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        log!("warning"; "unknown fields in {}, ignoring:", path.display());
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    // ========================================================================
    // command-line overrides
    // ========================================================================

    /// Apply flags of the selected subcommand on top of file values.
    pub fn apply_command_options(&mut self, command: &Commands) {
        match command {
            Commands::Generate { args } => self.apply_generate_options(args),
            Commands::Serve { args } => self.apply_serve_options(args),
            Commands::Extract { .. } => {}
        }
    }

    fn apply_generate_options(&mut self, args: &GenerateArgs) {
        let generate = &mut self.generate;
        Self::update_option(&mut generate.index, args.index.as_ref());
        Self::update_option(&mut generate.noext, args.noext.as_ref());
        Self::update_option(&mut generate.strip, args.strip.as_ref());
        Self::update_option(&mut generate.output, args.output.as_ref());
        Self::update_option(&mut generate.jobs, args.jobs.as_ref());
        Self::update_option(&mut generate.keep_absolute, args.keep_absolute.as_ref());
        Self::update_option(&mut generate.dedup, args.dedup.as_ref());
    }

    fn apply_serve_options(&mut self, args: &ServeArgs) {
        let serve = &mut self.serve;
        Self::update_option(&mut serve.interface, args.interface.as_ref());
        Self::update_option(&mut serve.port, args.port.as_ref());
        Self::update_option(&mut serve.root, args.root.as_ref());
        Self::update_option(&mut serve.manifest, args.manifest.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Check values that would make a command misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        if self.generate.index.trim_start_matches('/').is_empty() {
            problems.push("[generate.index] must name a file".to_string());
        }
        if self.serve.port == 0 {
            problems.push("[serve.port] must not be 0".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(problems))
        }
    }
}

/// Parse configuration from a TOML string, ignoring unknown fields.
impl FromStr for PreloadConfig {
    type Err = ConfigError;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse_with_ignored(content)?.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::net::IpAddr;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("preload").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_config() {
        let config: PreloadConfig = r#"
            [generate]
            index = "default.htm"
            noext = false
            strip = "public"
            jobs = 8

            [serve]
            interface = "0.0.0.0"
            port = 9000
            root = "public"
            "#
        .parse()
        .unwrap();

        assert_eq!(config.generate.index, "default.htm");
        assert!(!config.generate.noext);
        assert_eq!(config.generate.strip, "public");
        assert_eq!(config.generate.jobs, 8);
        assert!(!config.generate.dedup);
        assert_eq!(config.serve.interface, "0.0.0.0".parse::<IpAddr>().unwrap());
        assert_eq!(config.serve.port, 9000);
        assert_eq!(config.serve.root, PathBuf::from("public"));
        assert_eq!(config.serve.manifest, PathBuf::from("preload.json"));
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!("".parse::<PreloadConfig>().unwrap(), PreloadConfig::default());
    }

    #[test]
    fn test_unknown_fields_are_collected() {
        let (config, ignored) = PreloadConfig::parse_with_ignored(
            r#"
            [generate]
            dedup = true
            minify = true

            [deploy]
            branch = "main"
            "#,
        )
        .unwrap();

        assert!(config.generate.dedup);
        assert_eq!(ignored, ["generate.minify", "deploy"]);
    }

    #[test]
    fn test_invalid_toml() {
        let err = PreloadConfig::from_str("[serve]\nport = \"eighty\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_cli_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preload.toml");
        fs::write(&path, "[generate]\njobs = 2\ndedup = true\nindex = \"home.html\"\n").unwrap();

        let cli = cli(&[
            "-C",
            path.to_str().unwrap(),
            "generate",
            "--jobs",
            "6",
            "--dedup",
            "false",
            "--noext",
        ]);
        let config = PreloadConfig::load(&cli).unwrap();

        assert_eq!(config.config_path, path);
        assert_eq!(config.generate.jobs, 6);
        assert!(!config.generate.dedup);
        assert!(config.generate.noext);
        assert_eq!(config.generate.index, "home.html");
    }

    #[test]
    fn test_serve_overrides() {
        let mut config = PreloadConfig::default();
        config.apply_command_options(&cli(&["serve", "-p", "8080", "-m", "site.json"]).command);

        assert_eq!(config.serve.port, 8080);
        assert_eq!(config.serve.manifest, PathBuf::from("site.json"));
        assert_eq!(config.serve.root, PathBuf::from("."));
    }

    #[test]
    fn test_explicit_missing_config_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = PreloadConfig::load(&cli(&["-C", missing.to_str().unwrap(), "extract"])).unwrap_err();
        assert!(matches!(err, ConfigError::Io(..)));
    }

    #[test]
    fn test_validation_collects_problems() {
        let mut config = PreloadConfig::default();
        assert!(config.validate().is_ok());

        config.generate.index = "/".to_string();
        config.serve.port = 0;
        let err = config.validate().unwrap_err();
        assert_eq!(err.problems().len(), 2);
    }
}
