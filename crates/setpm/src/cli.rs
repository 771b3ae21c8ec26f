//! Command-line definitions for `setpm` and `find-root-package-json`.

use crate::tracing::{LogLevel, TracingConfig, TracingFormat};
use clap::{Args, Parser};
use setpm_registry::ResolverConfig;
use setpm_registry::config::{DEFAULT_REGISTRY, DEFAULT_YARN_TAGS_URL};
use std::path::PathBuf;
use std::time::Duration;

/// Logging options shared by both binaries.
#[derive(Args, Debug, Clone)]
pub struct LogArgs {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn", value_enum)]
    pub level: LogLevel,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    pub json: bool,
}

impl LogArgs {
    /// Tracing settings for these flags.
    #[must_use]
    pub fn tracing_config(&self) -> TracingConfig {
        TracingConfig {
            format: if self.json {
                TracingFormat::Json
            } else {
                TracingFormat::Compact
            },
            level: self.level.into(),
        }
    }
}

/// Where versions are looked up.
#[derive(Args, Debug, Clone)]
pub struct RegistryArgs {
    /// npm registry to resolve versions from
    #[arg(long, env = "NPM_CONFIG_REGISTRY", default_value = DEFAULT_REGISTRY)]
    pub registry: String,

    /// Endpoint listing Yarn 2+ releases
    #[arg(long, env = "SETPM_YARN_TAGS_URL", default_value = DEFAULT_YARN_TAGS_URL)]
    pub yarn_tags_url: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "SETPM_TIMEOUT", default_value_t = 30)]
    pub timeout: u64,
}

impl RegistryArgs {
    /// Resolver settings for these flags.
    #[must_use]
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            registry: self.registry.clone(),
            yarn_tags_url: self.yarn_tags_url.clone(),
            timeout: Duration::from_secs(self.timeout),
            ..ResolverConfig::default()
        }
    }
}

/// Pin the `packageManager` field of the nearest root package.json.
#[derive(Parser, Debug)]
#[command(name = "setpm")]
#[command(version)]
#[command(
    about = "Pin the packageManager field of your project's root package.json",
    long_about = None
)]
pub struct SetpmCli {
    /// npm, pnpm, yarn, yarnv1, a version or range, or name@range.
    /// Defaults to the manager already recorded or detected from lockfiles.
    pub specifier: Option<String>,

    /// Directory to start the root search from
    #[arg(short = 'C', long = "cd", value_name = "DIR")]
    pub cd: Option<PathBuf>,

    /// Print the resolved value without writing package.json
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub registry: RegistryArgs,

    #[command(flatten)]
    pub log: LogArgs,
}

/// Print the path of the workspace root package.json.
#[derive(Parser, Debug)]
#[command(name = "find-root-package-json")]
#[command(version)]
#[command(
    about = "Print the path of the root package.json for the current workspace",
    long_about = None
)]
pub struct FindRootCli {
    /// Directory to start searching from
    #[arg(short = 'p', long, value_name = "DIR")]
    pub path: Option<PathBuf>,

    #[command(flatten)]
    pub log: LogArgs,
}
