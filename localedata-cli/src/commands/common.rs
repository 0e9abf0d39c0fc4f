//! Argument types and engine setup shared across CLI commands.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, ValueEnum};
use localedata::{DataContext, FsLoader, LocaleData, LocaleDataConfig, MergePolicy};
use tracing::debug;

use crate::config::FileConfig;
use crate::error::CliError;

/// Merge policy selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum PolicyArg {
    /// Deep-merge every fragment, most specific last
    MergeAll,
    /// Only the least specific fragment with data
    ReturnOne,
    /// Only the most specific fragment with data
    MostSpecific,
}

impl From<PolicyArg> for MergePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::MergeAll => MergePolicy::MergeAll,
            PolicyArg::ReturnOne => MergePolicy::ReturnOne,
            PolicyArg::MostSpecific => MergePolicy::MostSpecific,
        }
    }
}

/// Options that select the package and where its data lives.
#[derive(Debug, Clone, Default, Args)]
pub struct EngineArgs {
    /// Settings file with a [localedata] section
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Package whose data is loaded
    #[arg(long)]
    pub package: Option<String>,

    /// The package's own data directory
    #[arg(long, value_name = "DIR")]
    pub base_path: Option<String>,

    /// Override root searched before the package directory (repeatable, last wins)
    #[arg(long = "root", value_name = "DIR")]
    pub roots: Vec<String>,

    /// Do not read or write the locale data cache
    #[arg(long)]
    pub no_cache: bool,
}

/// Settings after merging the file with command-line flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub config: LocaleDataConfig,
    /// Global roots in registration order.
    pub roots: Vec<String>,
}

impl EngineArgs {
    /// Merge the optional settings file with flags. Flags win.
    pub fn resolve(&self) -> Result<Settings, CliError> {
        let file = match &self.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        self.merge(file)
    }

    fn merge(&self, file: FileConfig) -> Result<Settings, CliError> {
        let package = self.package.clone().or(file.package).ok_or_else(|| {
            CliError::Config(
                "a package is required. Use --package or set package in the config file"
                    .to_string(),
            )
        })?;
        let base_path = self.base_path.clone().or(file.base_path).ok_or_else(|| {
            CliError::Config(
                "a base path is required. Use --base-path or set base_path in the config file"
                    .to_string(),
            )
        })?;

        let mut config = LocaleDataConfig::new(package, base_path)
            .with_sync(file.sync.unwrap_or(false))
            .with_cache(!self.no_cache && file.cache.unwrap_or(true));
        if let Some(locale) = file.locale {
            config = config.with_locale(locale);
        }

        let mut roots = file.roots;
        roots.extend(self.roots.iter().cloned());

        Ok(Settings { config, roots })
    }
}

impl Settings {
    /// Register the global roots and build an engine over the filesystem.
    pub fn build(self, context: &DataContext, loader: FsLoader) -> Result<LocaleData, CliError> {
        for root in &self.roots {
            context.add_global_root(root);
        }
        debug!(package = %self.config.package, roots = self.roots.len(), "Building engine");
        Ok(LocaleData::builder(self.config)
            .context(context.clone())
            .loader(Arc::new(loader))
            .build()?)
    }
}

/// Create a single-threaded Tokio runtime for async commands.
pub fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(e.to_string()))
}
