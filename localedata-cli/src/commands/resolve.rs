//! The `resolve` command: print merged locale data as JSON.

use clap::Args;
use localedata::{DataContext, FsLoader, LoadOptions};
use serde_json::Value;

use super::common::{runtime, EngineArgs, PolicyArg};
use crate::error::CliError;

/// Arguments of the `resolve` command.
#[derive(Debug, Clone, Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub engine: EngineArgs,

    /// Data category to load, e.g. "sysres"
    pub basename: String,

    /// Locale to load (defaults to the configured or ambient locale)
    #[arg(long)]
    pub locale: Option<String>,

    /// How fragments are combined
    #[arg(long, value_enum, default_value_t = PolicyArg::MergeAll)]
    pub policy: PolicyArg,

    /// Replace arrays instead of concatenating them
    #[arg(long)]
    pub replace_arrays: bool,

    /// Load through the async path
    #[arg(long = "async")]
    pub use_async: bool,
}

impl ResolveArgs {
    fn options(&self) -> LoadOptions {
        let mut options = LoadOptions::new(&self.basename).with_policy(self.policy.into());
        if let Some(locale) = &self.locale {
            options = options.with_locale(locale);
        }
        if self.replace_arrays {
            options = options.replace_arrays();
        }
        options
    }
}

/// Run the `resolve` command.
pub fn run(args: ResolveArgs) -> Result<(), CliError> {
    let value = resolve(&args, DataContext::global())?;
    let text = serde_json::to_string_pretty(&value).map_err(|e| CliError::Output(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

fn resolve(args: &ResolveArgs, context: &DataContext) -> Result<Value, CliError> {
    let options = args.options();

    if args.use_async {
        let engine = args
            .engine
            .resolve()?
            .build(context, FsLoader::async_only())?;
        let rt = runtime()?;
        Ok(rt.block_on(engine.load_data_async(&options))?)
    } else {
        let engine = args.engine.resolve()?.build(context, FsLoader::new())?;
        Ok(engine.load_data(&options)?)
    }
}
