use super::progress_handler;
use crate::cli::BuildArgs;
use crate::config;
use crate::error::{CliError, Result};
use descs::core::contact::ContactExpression;
use descs::core::io::pdb::PdbFile;
use descs::engine::progress::ProgressReporter;
use descs::workflows;
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub fn run(args: BuildArgs, threads: Option<usize>, quiet: bool) -> Result<()> {
    let config = config::build_config(&args, threads)?;
    // Reject a bad expression once instead of once per input.
    ContactExpression::parse(&config.contact_expression, config.molecule_type)?;
    info!(
        molecule_type = %config.molecule_type,
        element_size = config.element_size,
        mode = ?config.mode,
        workers = config.workers,
        "Build configuration resolved."
    );

    let handler = progress_handler(quiet);
    let reporter = ProgressReporter::with_callback(handler.get_callback());

    let mut failures = 0;
    for input in &args.input {
        let output_dir = output_dir_for(&args.output, input);
        match workflows::build::run::<PdbFile>(input, &output_dir, &config, &reporter) {
            Ok(summary) => {
                println!(
                    "{}: {} descriptor(s) from {} model(s) written to {}",
                    input.display(),
                    summary.save.saved,
                    summary.models,
                    output_dir.display()
                );
            }
            Err(e) => {
                error!(input = %input.display(), error = %e, "Build failed.");
                eprintln!("{}: {}", input.display(), e);
                failures += 1;
            }
        }
    }

    if failures == args.input.len() {
        return Err(CliError::Argument(format!(
            "no descriptors could be built from {} input file(s)",
            failures
        )));
    }
    Ok(())
}

fn output_dir_for(output: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "structure".to_string());
    output.join(stem)
}
