//! The `preload` command: load whole-locale files into the cache.

use clap::Args;
use localedata::{DataContext, FsLoader};

use super::common::{runtime, EngineArgs};
use crate::error::CliError;

/// Arguments of the `preload` command.
#[derive(Debug, Clone, Args)]
pub struct PreloadArgs {
    #[command(flatten)]
    pub engine: EngineArgs,

    /// Locale whose `<locale>.json` files are loaded
    pub locale: String,
}

/// Outcome of a preload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PreloadReport {
    found: bool,
    entries: usize,
}

/// Run the `preload` command.
pub fn run(args: PreloadArgs) -> Result<(), CliError> {
    let report = preload(&args, DataContext::global())?;
    if report.found {
        println!(
            "Preloaded {}: {} cache entries",
            args.locale, report.entries
        );
    } else {
        println!("No whole-locale files found for {}", args.locale);
    }
    Ok(())
}

fn preload(args: &PreloadArgs, context: &DataContext) -> Result<PreloadReport, CliError> {
    let engine = args
        .engine
        .resolve()?
        .build(context, FsLoader::async_only())?;
    let rt = runtime()?;
    let found = rt.block_on(engine.ensure_locale(&args.locale))?;
    Ok(PreloadReport {
        found,
        entries: engine.cache().len(),
    })
}
