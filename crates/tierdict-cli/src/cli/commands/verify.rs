use super::super::args::{OutputFormat, VerifyArgs};
use crate::exit_codes;
use anyhow::Context;
use tierdict_core::{verify_manifest, PackageCheck, PackageStatus};

pub fn run(args: VerifyArgs) -> anyhow::Result<i32> {
    let config = super::load_plan(args.config.as_deref())?;
    let report = verify_manifest(&args.manifest, &args.out_dir, &config)
        .with_context(|| format!("failed to verify manifest: {}", args.manifest.display()))?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            for check in &report.packages {
                println!("{}", describe(check));
            }
        }
    }

    if report.is_clean() {
        eprintln!("manifest verify: OK ({})", args.manifest.display());
        Ok(exit_codes::EXIT_SUCCESS)
    } else {
        eprintln!(
            "manifest verify: {} package(s) failed ({})",
            report.failures().count(),
            args.manifest.display()
        );
        Ok(exit_codes::EXIT_VERIFY_FAILED)
    }
}

fn describe(check: &PackageCheck) -> String {
    let id = check.id.as_deref().unwrap_or("<no id>");
    match &check.status {
        PackageStatus::Ok => format!("ok        {}", id),
        PackageStatus::HashMismatch { expected, actual } => {
            format!("MISMATCH  {} hash expected {} got {}", id, expected, actual)
        }
        PackageStatus::EntriesMismatch { expected, actual } => format!(
            "MISMATCH  {} entries expected {} got {}",
            id,
            expected.map_or_else(|| "none".to_string(), |n| n.to_string()),
            actual
        ),
        PackageStatus::Missing => format!("MISSING   {}", id),
        PackageStatus::Malformed { message } => format!("MALFORMED {} {}", id, message),
        PackageStatus::Skipped => format!("skipped   {}", id),
    }
}
