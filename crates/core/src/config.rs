//! Configuration for cherryscout.
//!
//! Every field has a default, so an empty (or absent) file is a valid
//! configuration. Command-line flags override individual values afterwards.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::conflict::MergeStrategy;
use crate::errors::ConfigError;
use crate::filter::DEFAULT_AUTOMATION_AUTHORS;
use crate::models::Project;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Complete cherryscout configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// What to analyse and how far back.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Tracking remote settings.
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Automation-account filtering.
    #[serde(default)]
    pub filter: FilterConfig,

    /// Merge simulation settings.
    #[serde(default)]
    pub merge: MergeConfig,

    /// Presentation settings, passed to the output sink.
    #[serde(default)]
    pub display: DisplayConfig,
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// The project we maintain; the other one is analysed.
    #[serde(default = "default_ours")]
    pub ours: Project,

    /// Days of history to consider.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,

    /// Branch of the other project to read history from.
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Reference the commits would be picked onto.
    #[serde(default = "default_tip")]
    pub tip: String,

    /// Simulate merges for every candidate.
    #[serde(default = "default_true")]
    pub check_compatibility: bool,

    /// Attach the full patch of every candidate.
    #[serde(default)]
    pub show_diffs: bool,
}

fn default_ours() -> Project {
    Project::Aurora
}

fn default_lookback_days() -> u32 {
    7
}

fn default_branch() -> String {
    "main".into()
}

fn default_tip() -> String {
    "HEAD".into()
}

fn default_true() -> bool {
    true
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            ours: default_ours(),
            lookback_days: default_lookback_days(),
            branch: default_branch(),
            tip: default_tip(),
            check_compatibility: true,
            show_diffs: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Remote
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Overrides the canonical GitHub URL of the analysed project
    /// (mirrors, forks, local paths).
    #[serde(default)]
    pub url: Option<String>,
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Author substrings that mark a commit as automation.
    #[serde(default = "default_automation_authors")]
    pub automation_authors: Vec<String>,
}

fn default_automation_authors() -> Vec<String> {
    DEFAULT_AUTOMATION_AUTHORS.iter().map(|s| s.to_string()).collect()
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            automation_authors: default_automation_authors(),
        }
    }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergeConfig {
    #[serde(default)]
    pub strategy: MergeStrategy,
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Colored terminal output.
    #[serde(default = "default_true")]
    pub color: bool,

    /// Files listed per commit before collapsing into "... and N more".
    #[serde(default = "default_max_files")]
    pub max_files: usize,

    /// Minimum tracing level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_max_files() -> usize {
    5
}

fn default_log_level() -> String {
    "warn".into()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: true,
            max_files: default_max_files(),
            log_level: default_log_level(),
        }
    }
}

/// Longest accepted lookback window, roughly a century.
pub const MAX_LOOKBACK_DAYS: u32 = 36_500;

// ---------------------------------------------------------------------------
// Loading & validation
// ---------------------------------------------------------------------------

impl AdvisorConfig {
    /// Load an [`AdvisorConfig`] from a TOML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: AdvisorConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        debug!("configuration parsed successfully");
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load_from_file(path) {
            Err(ConfigError::FileNotFound(path)) => {
                debug!(%path, "no configuration file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Validate that all values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.analysis.lookback_days == 0 {
            return Err(ConfigError::InvalidValue {
                field: "analysis.lookback_days".into(),
                detail: "lookback window must be at least one day".into(),
            });
        }
        if self.analysis.lookback_days > MAX_LOOKBACK_DAYS {
            return Err(ConfigError::InvalidValue {
                field: "analysis.lookback_days".into(),
                detail: format!("lookback window must not exceed {MAX_LOOKBACK_DAYS} days"),
            });
        }
        if self.analysis.branch.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "analysis.branch".into(),
                detail: "branch must not be empty".into(),
            });
        }
        if self.analysis.tip.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "analysis.tip".into(),
                detail: "tip reference must not be empty".into(),
            });
        }
        if let Some(url) = &self.remote.url {
            if url.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "remote.url".into(),
                    detail: "remote URL override must not be empty".into(),
                });
            }
        }
        if self.display.max_files == 0 {
            return Err(ConfigError::InvalidValue {
                field: "display.max_files".into(),
                detail: "must list at least one file".into(),
            });
        }
        Ok(())
    }

    /// The project whose history is analysed.
    pub fn target(&self) -> Project {
        self.analysis.ours.other()
    }

    /// URL of the tracking remote for the target project.
    pub fn remote_url(&self) -> String {
        self.remote
            .url
            .clone()
            .unwrap_or_else(|| self.target().remote_url())
    }

    /// Generate a default TOML config template string.
    pub fn default_template() -> &'static str {
        r#"# cherryscout configuration

[analysis]
ours = "aurora"            # the other project is analysed
lookback_days = 7
branch = "main"
tip = "HEAD"
check_compatibility = true
show_diffs = false

[remote]
# url = "https://github.com/ublue-os/bluefin.git"  # canonical URL by default

[filter]
automation_authors = [
    "ubot-7274[bot]",
    "renovate[bot]",
    "github-actions[bot]",
    "dependabot[bot]",
    "blacksmith-sh[bot]",
]

[merge]
strategy = "marker-scan"   # or "write-tree" (git 2.40+)

[display]
color = true
max_files = 5
log_level = "warn"
"#
    }
}
