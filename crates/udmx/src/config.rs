//! Settings file and per-invocation options

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UdmxConfig {
    #[serde(default)]
    pub general: GeneralSettings,
    #[serde(default)]
    pub aliases: AliasSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneralSettings {
    /// Log level used when neither `RUST_LOG` nor `-d` is given
    #[serde(default = "GeneralSettings::default_log_level")]
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
        }
    }
}

impl GeneralSettings {
    fn default_log_level() -> String {
        "warn".to_string()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AliasSettings {
    /// Alias file location, `~` is expanded. Defaults to `~/.uDMXrc`.
    #[serde(default)]
    pub path: Option<String>,
}

impl UdmxConfig {
    /// Load configuration from `path`, or from the default location
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => {
                let p = Self::default_path();
                if !p.exists() {
                    return Err(anyhow!("No configuration file found at {}", p.display()));
                }
                p
            }
        };

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        tracing::debug!("Loaded configuration from: {}", config_path.display());
        Ok(config)
    }

    /// Load from the default location, falling back to built-in defaults
    /// when no file is present there
    ///
    /// A file that exists but cannot be read or parsed is still an error.
    pub fn load_or_default() -> Result<Self> {
        if Self::default_path().exists() {
            Self::load(None)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate TOML content
    pub fn parse(content: &str) -> Result<Self> {
        let config: UdmxConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("udmx").join("config.toml")
        } else {
            PathBuf::from(".config/udmx/config.toml")
        }
    }

    /// Alias file named by the settings, with `~` expanded
    pub fn alias_path(&self) -> Option<PathBuf> {
        self.aliases.path.as_deref().map(expand_path)
    }

    fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(anyhow!(
                "Invalid log level '{}', must be one of: {}",
                self.general.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Expand a leading `~` in a user-supplied path
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Per-invocation options threaded through argument processing and dispatch
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Echo resolved actions before issuing them (`-v`)
    pub verbose: bool,
    /// Show discovery and alias-file diagnostics (`-d`)
    pub debug: bool,
    /// Alias file to consult, `None` disables alias lookup
    pub alias_path: Option<PathBuf>,
}

impl Options {
    /// Effective default log level
    pub fn log_level<'a>(&self, config: &'a UdmxConfig) -> &'a str {
        if self.debug {
            "debug"
        } else {
            &config.general.log_level
        }
    }
}
