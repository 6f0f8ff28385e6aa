use super::progress_handler;
use crate::cli::CompareArgs;
use crate::config;
use crate::error::Result;
use descs::core::io::pdb::PdbFile;
use descs::engine::progress::ProgressReporter;
use descs::workflows;
use tracing::info;

pub fn run(args: CompareArgs, quiet: bool) -> Result<()> {
    let config = config::compare_config(&args)?;
    info!(
        molecule_type = %config.molecule_type,
        element_size = config.element_size,
        atoms = ?config.alignment_atoms,
        threshold = config.duplex_rmsd_threshold,
        verifier = ?config.verifier,
        "Comparison configuration resolved."
    );

    let handler = progress_handler(quiet);
    let reporter = ProgressReporter::with_callback(handler.get_callback());

    let summary = workflows::compare::run::<PdbFile>(
        &args.query,
        &args.targets,
        &args.output,
        &config,
        &reporter,
    )?;

    println!(
        "{} of {} compared target(s) similar to {} ({} unreadable). Report: {}",
        summary.similar,
        summary.compared,
        args.query.display(),
        summary.failed,
        summary.report.display()
    );
    Ok(())
}
