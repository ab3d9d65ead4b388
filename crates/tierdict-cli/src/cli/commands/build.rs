use super::super::args::BuildArgs;
use crate::exit_codes;
use anyhow::Context;
use tierdict_core::{DictionaryTieringJob, JobPaths};

pub fn run(args: BuildArgs) -> anyhow::Result<i32> {
    let mut config = super::load_plan(args.config.as_deref())?;
    if let Some(date) = args.published_at {
        config.published_at = date;
    }
    tracing::debug!(?config, "resolved tier plan");

    let paths = JobPaths {
        input: args.input,
        manifest: args.manifest,
        out_dir: args.out_dir,
    };
    let job = DictionaryTieringJob::new(config, paths)?;

    println!("Processing CSV records...");
    let summary = job.run().with_context(|| {
        format!(
            "tiering failed (input: {}, manifest: {})",
            job.paths().input.display(),
            job.paths().manifest.display()
        )
    })?;

    println!("Update summary:");
    for tier in &summary.tiers {
        println!("- {}: {} entries", tier.file_name, tier.entries);
    }
    let manifest_name = summary
        .manifest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| summary.manifest.display().to_string());
    println!("{} updated with new hashes and counts.", manifest_name);

    Ok(exit_codes::EXIT_SUCCESS)
}
