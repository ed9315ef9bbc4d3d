//! Configuration types for a deletion run
//!
//! Values come from the command line (with environment fallbacks handled
//! by clap) and an optional TOML file. The command line wins; the file
//! fills gaps; the region falls back to [`DEFAULT_REGION`].

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tagsweep_common::defaults::DEFAULT_REGION;
use tagsweep_common::{ResourceType, UnknownResourceType};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    UnknownResourceType(#[from] UnknownResourceType),
}

/// On-disk configuration
///
/// ```toml
/// region = "us-west-2"
/// resourceTypes = ["AWS::EC2::VPC", "AWS::EC2::Subnet"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FileConfig {
    pub region: Option<String>,
    #[serde(rename = "resourceTypes", default)]
    pub resource_types: Vec<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub region: Option<String>,
    pub resource_types: Option<Vec<String>>,
    pub call_timeout: Option<Duration>,
}

/// AWS access configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsConfig {
    pub region: String,
    /// Allow-list for discovery; empty means every type
    pub resource_types: Vec<ResourceType>,
    /// Upper bound for each provider call
    pub call_timeout: Option<Duration>,
}

impl AwsConfig {
    /// Merge CLI values over the file, validating type names.
    pub fn resolve(cli: CliOverrides, file: Option<FileConfig>) -> Result<Self, ConfigError> {
        let file = file.unwrap_or_default();

        let region = cli
            .region
            .filter(|r| !r.is_empty())
            .or(file.region.filter(|r| !r.is_empty()))
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        let names = cli.resource_types.unwrap_or(file.resource_types);
        let resource_types = parse_resource_types(&names)?;

        Ok(Self {
            region,
            resource_types,
            call_timeout: cli.call_timeout,
        })
    }
}

/// Parse type names such as `AWS::EC2::VPC`, ignoring blanks and repeats
pub fn parse_resource_types(names: &[String]) -> Result<Vec<ResourceType>, UnknownResourceType> {
    let mut types = Vec::new();
    for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        let resource_type: ResourceType = name.parse()?;
        if !types.contains(&resource_type) {
            types.push(resource_type);
        }
    }
    Ok(types)
}

/// Runtime behavior flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunFlags {
    /// Skip malformed input and keep deleting after failures
    pub ignore_errors: bool,
    /// Report what would be deleted without deleting
    pub dry_run: bool,
    /// Suppress the deleted-ARN summary
    pub silent: bool,
    /// Expand discovered resources with their dependents
    pub all_deps: bool,
    /// Print the failure report at the end of the run
    pub report: bool,
}

/// Configuration for one `delete` run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub aws: AwsConfig,
    pub flags: RunFlags,
    /// Tag filter input; stdin when absent
    pub delete_file: Option<PathBuf>,
}

impl RunConfig {
    pub fn region(&self) -> &str {
        &self.aws.region
    }

    pub fn dry_run(&self) -> bool {
        self.flags.dry_run
    }
}
