use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "codexplain.toml";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub extract: ExtractConfig,
    pub output: OutputConfig,
    pub server: ServerConfig,
}

/// Extraction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Deepest syntax-tree level the walker will descend to
    pub max_depth: usize,
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub title: String,
    pub line_numbers: bool,
}

/// Settings for `codexplain serve`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub max_upload_bytes: usize,
    /// Sessions kept in memory; the least recently used is dropped first
    pub max_sessions: usize,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
    Html,
}

impl OutputFormat {
    /// File extension used when writing this format to disk
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
            OutputFormat::Html => "html",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            "html" => Ok(OutputFormat::Html),
            other => Err(Error::other(format!("Unknown format: {}", other))),
        }
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self { max_depth: 1000 }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            title: "Code Documentation".to_string(),
            line_numbers: true,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            max_upload_bytes: 1024 * 1024,
            max_sessions: 256,
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file or return defaults
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(Error::Io(_)) => Self::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring invalid config file");
                Self::default()
            }
        }
    }

    /// Merge CLI arguments into config (CLI takes precedence)
    pub fn merge_cli(
        &mut self,
        format: Option<OutputFormat>,
        depth: Option<usize>,
        title: Option<String>,
        no_line_numbers: bool,
    ) {
        if let Some(fmt) = format {
            self.output.format = fmt;
        }

        if let Some(d) = depth {
            self.extract.max_depth = d;
        }

        if let Some(t) = title {
            self.output.title = t;
        }

        if no_line_numbers {
            self.output.line_numbers = false;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.extract.max_depth == 0 {
            return Err(Error::config_validation("max_depth must be at least 1"));
        }

        if self.extract.max_depth > 10_000 {
            return Err(Error::config_validation("max_depth cannot exceed 10000"));
        }

        if self.output.title.trim().is_empty() {
            return Err(Error::config_validation("title must not be empty"));
        }

        if self.server.max_upload_bytes == 0 {
            return Err(Error::config_validation("max_upload_bytes must be at least 1"));
        }

        if self.server.max_sessions == 0 {
            return Err(Error::config_validation("max_sessions must be at least 1"));
        }

        Ok(())
    }
}
