use super::args::*;

pub mod build;
pub mod verify;

use std::path::Path;

use anyhow::Context;
use tierdict_core::TierConfig;

use crate::exit_codes::EXIT_SUCCESS;

pub fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Build(args) => build::run(args),
        Command::Verify(args) => verify::run(args),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(EXIT_SUCCESS)
        }
    }
}

/// Tier plan from `path`, or the built-in plan.
fn load_plan(path: Option<&Path>) -> anyhow::Result<TierConfig> {
    match path {
        Some(path) => TierConfig::load(path)
            .with_context(|| format!("failed to load tier plan: {}", path.display())),
        None => Ok(TierConfig::default()),
    }
}
