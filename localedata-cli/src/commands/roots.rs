//! The `roots` command: print the effective search order.

use localedata::{DataContext, FsLoader};

use super::common::EngineArgs;
use crate::error::CliError;

/// Run the `roots` command.
pub fn run(args: EngineArgs) -> Result<(), CliError> {
    for root in effective_roots(&args, DataContext::global())? {
        println!("{}", root);
    }
    Ok(())
}

fn effective_roots(args: &EngineArgs, context: &DataContext) -> Result<Vec<String>, CliError> {
    let engine = args.resolve()?.build(context, FsLoader::new())?;
    Ok(engine.effective_roots())
}
