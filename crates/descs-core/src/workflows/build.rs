use crate::core::io::traits::StructureFile;
use crate::engine::builder::{DescriptorBuilder, SaveSummary};
use crate::engine::config::BuildConfig;
use crate::engine::error::EngineError;
use crate::engine::filter::DescriptorFilter;
use crate::engine::progress::{Progress, ProgressReporter};
use std::path::Path;
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub models: usize,
    pub descriptors: usize,
    pub save: SaveSummary,
}

/// Reads `input`, builds descriptors for every model and writes them, with
/// their manifest, to `output_dir`.
///
/// Models without usable residues are skipped; the descriptor filter of
/// `config` is applied while building.
#[instrument(skip_all, name = "build_workflow", fields(input = %input.display()))]
pub fn run<F: StructureFile>(
    input: &Path,
    output_dir: &Path,
    config: &BuildConfig,
    reporter: &ProgressReporter,
) -> Result<BuildSummary, EngineError> {
    let mut builder = DescriptorBuilder::new(config.clone())?;

    let structure = reporter.phase("Reading structure", || {
        F::read_from_path(input).map_err(|e| EngineError::io(input, e))
    })?;
    info!(
        models = structure.models().len(),
        atoms = structure.atom_count(),
        "Structure loaded."
    );

    let descriptors = builder.build_all(&structure, reporter)?;

    reporter.report(Progress::PhaseStart {
        name: "Writing descriptors",
    });
    let save = builder.save_descriptors::<F>(output_dir, &DescriptorFilter::default());
    reporter.report(Progress::PhaseFinish);
    let save = save?;

    info!(
        descriptors,
        saved = save.saved,
        "Build of '{}' done.",
        input.display()
    );
    Ok(BuildSummary {
        models: structure.models().len(),
        descriptors,
        save,
    })
}
