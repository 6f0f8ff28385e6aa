use crate::core::contact::ContactExpression;
use crate::core::io::traits::StructureFile;
use crate::engine::comparator::{ComparisonResult, DescriptorComparator, aligned_structure};
use crate::engine::config::CompareConfig;
use crate::engine::descriptor::Descriptor;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

pub const REPORT_FILE_NAME: &str = "comparisons.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareSummary {
    pub compared: usize,
    pub similar: usize,
    pub failed: usize,
    pub report: PathBuf,
}

#[derive(Debug, Serialize)]
struct ComparisonRow {
    target: String,
    similar: Option<bool>,
    rmsd: Option<f64>,
    accepted_duplexes: Option<usize>,
    query_duplexes: Option<usize>,
    target_duplexes: Option<usize>,
    total_cost: Option<f64>,
    error: Option<String>,
}

impl ComparisonRow {
    fn compared(target: String, result: &ComparisonResult) -> Self {
        Self {
            target,
            similar: Some(result.similar),
            rmsd: result.rmsd(),
            accepted_duplexes: Some(result.duplex_matches.iter().filter(|m| m.accepted).count()),
            query_duplexes: Some(result.duplexes.0),
            target_duplexes: Some(result.duplexes.1),
            total_cost: Some(result.total_cost),
            error: None,
        }
    }

    fn failed(target: String, error: &EngineError) -> Self {
        Self {
            target,
            similar: None,
            rmsd: None,
            accepted_duplexes: None,
            query_duplexes: None,
            target_duplexes: None,
            total_cost: None,
            error: Some(error.to_string()),
        }
    }
}

/// Reads a descriptor file written by the build workflow and recomputes its
/// contact map with `expression`.
pub fn load_descriptor<F: StructureFile>(
    path: &Path,
    expression: &ContactExpression,
) -> Result<Descriptor, EngineError> {
    let structure = F::read_from_path(path).map_err(|e| EngineError::io(path, e))?;
    Descriptor::from_structure(&structure, expression)
}

/// Compares the `query` descriptor against every target descriptor.
///
/// Writes the query as `query.<ext>`, each similar target moved onto the
/// query as `<target>-aligned.<ext>` and one [`REPORT_FILE_NAME`] row per
/// target. Targets that cannot be read are reported and skipped.
///
/// # Errors
///
/// Fails on an unreadable query, on output errors, and with
/// [`EngineError::Uncomparable`] as soon as a pair of descriptors cannot be
/// compared.
#[instrument(skip_all, name = "compare_workflow", fields(query = %query.display(), targets = targets.len()))]
pub fn run<F: StructureFile>(
    query: &Path,
    targets: &[PathBuf],
    output_dir: &Path,
    config: &CompareConfig,
    reporter: &ProgressReporter,
) -> Result<CompareSummary, EngineError> {
    let expression = ContactExpression::parse(&config.contact_expression, config.molecule_type)?;
    let comparator = DescriptorComparator::new(config);

    fs::create_dir_all(output_dir).map_err(|e| EngineError::io(output_dir, e))?;
    let query_descriptor = reporter.phase("Reading query", || {
        load_descriptor::<F>(query, &expression)
    })?;
    let query_out = output_dir.join(format!("query.{}", F::extension()));
    F::write_to_path(&query_descriptor.to_structure(), &query_out)
        .map_err(|e| EngineError::io(&query_out, e))?;

    let report = output_dir.join(REPORT_FILE_NAME);
    let mut writer = csv::Writer::from_path(&report)?;
    let mut summary = CompareSummary {
        compared: 0,
        similar: 0,
        failed: 0,
        report,
    };

    reporter.report(Progress::PhaseStart { name: "Comparing" });
    reporter.report(Progress::TaskStart {
        total: targets.len() as u64,
    });
    for target in targets {
        let name = target_name(target);
        let row = match load_descriptor::<F>(target, &expression) {
            Err(e) => {
                warn!(target = %target.display(), error = %e, "Skipping target descriptor.");
                summary.failed += 1;
                ComparisonRow::failed(name.clone(), &e)
            }
            Ok(descriptor) => {
                let result = comparator.compare(&query_descriptor, &descriptor)?;
                summary.compared += 1;
                if result.similar {
                    summary.similar += 1;
                    if let Some(superposition) = &result.superposition {
                        let path = output_dir.join(format!("{}-aligned.{}", name, F::extension()));
                        F::write_to_path(&aligned_structure(&descriptor, superposition), &path)
                            .map_err(|e| EngineError::io(&path, e))?;
                    }
                }
                ComparisonRow::compared(name.clone(), &result)
            }
        };
        writer.serialize(&row)?;
        let verdict = match row.similar {
            Some(true) => "similar",
            Some(false) => "not similar",
            None => "unreadable",
        };
        reporter.report(Progress::Message(format!("{}: {}", name, verdict)));
        info!(
            similar = row.similar,
            rmsd = row.rmsd,
            "Comparison with '{}' done.",
            name
        );
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);
    writer
        .flush()
        .map_err(|e| EngineError::io(&summary.report, e))?;

    info!(
        compared = summary.compared,
        similar = summary.similar,
        failed = summary.failed,
        "Comparison run done."
    );
    Ok(summary)
}

fn target_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::pdb::PdbFile;
    use crate::core::models::atom::Atom;
    use crate::core::models::chain::Chain;
    use crate::core::models::residue::{MoleculeType, Residue};
    use crate::engine::builder::DescriptorBuilder;
    use crate::engine::config::{BuildConfigBuilder, CompareConfigBuilder};
    use crate::engine::filter::DescriptorFilter;
    use crate::engine::test_support::{helix_chain, structure_of};
    use nalgebra::Point3;
    use std::sync::Mutex;

    const EXPRESSION: &str = "DIST:CA;CA < 6.5";

    fn write_descriptors(dir: &Path) {
        let config = BuildConfigBuilder::new()
            .molecule_type(MoleculeType::Protein)
            .element_size(5)
            .contact_expression(EXPRESSION)
            .workers(1)
            .build()
            .unwrap();
        let mut builder = DescriptorBuilder::new(config).unwrap();
        let structure = structure_of(vec![helix_chain('A', 1, 12, &[])]);
        builder.build(&structure, 0, &ProgressReporter::new()).unwrap();
        builder
            .save_descriptors::<PdbFile>(dir, &DescriptorFilter::default())
            .unwrap();
    }

    fn compare_config(element_size: usize) -> CompareConfig {
        CompareConfigBuilder::new()
            .molecule_type(MoleculeType::Protein)
            .element_size(element_size)
            .contact_expression(EXPRESSION)
            .alignment_atoms("N CA C O")
            .duplex_rmsd_threshold(0.5)
            .build()
            .unwrap()
    }

    #[test]
    fn helix_windows_are_all_similar_to_each_other() {
        let dir = tempfile::tempdir().unwrap();
        let descriptors = dir.path().join("descriptors");
        write_descriptors(&descriptors);
        let output = dir.path().join("compare");

        let targets = vec![
            descriptors.join("m1_A4.pdb"),
            descriptors.join("m1_A9.pdb"),
            descriptors.join("missing.pdb"),
        ];
        let summary = run::<PdbFile>(
            &descriptors.join("m1_A3.pdb"),
            &targets,
            &output,
            &compare_config(5),
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(summary.compared, 2);
        assert_eq!(summary.similar, 2);
        assert_eq!(summary.failed, 1);
        assert!(output.join("query.pdb").is_file());
        assert!(output.join("m1_A4-aligned.pdb").is_file());
        assert!(output.join("m1_A9-aligned.pdb").is_file());

        let mut reader = csv::Reader::from_path(&summary.report).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][0], "m1_A4");
        assert_eq!(&rows[0][1], "true");
        assert_eq!(&rows[2][1], "");
    }

    #[test]
    fn descriptors_of_another_element_size_are_uncomparable() {
        let dir = tempfile::tempdir().unwrap();
        write_descriptors(dir.path());
        let result = run::<PdbFile>(
            &dir.path().join("m1_A3.pdb"),
            &[dir.path().join("m1_A4.pdb")],
            &dir.path().join("out"),
            &compare_config(3),
            &ProgressReporter::new(),
        );
        assert!(matches!(result, Err(EngineError::Uncomparable(_))));
    }

    #[test]
    fn nucleic_target_ends_a_protein_comparison() {
        let dir = tempfile::tempdir().unwrap();
        let descriptors = dir.path().join("descriptors");
        write_descriptors(&descriptors);

        let mut chain = Chain::new('A');
        for number in 1..=5 {
            let mut residue = Residue::new(number, "A");
            residue.add_atom(Atom::new("P", Point3::new(6.0 * number as f64, 0.0, 0.0)));
            residue.add_atom(Atom::new("C4'", Point3::new(6.0 * number as f64, 1.5, 0.0)));
            chain.push_residue(residue);
        }
        let rna = descriptors.join("rna.pdb");
        PdbFile::write_to_path(&structure_of(vec![chain]), &rna).unwrap();

        let result = run::<PdbFile>(
            &descriptors.join("m1_A3.pdb"),
            &[descriptors.join("m1_A4.pdb"), rna],
            &dir.path().join("out"),
            &compare_config(5),
            &ProgressReporter::new(),
        );
        assert!(matches!(result, Err(EngineError::Uncomparable(_))));
    }

    #[test]
    fn every_target_gets_a_progress_message() {
        let dir = tempfile::tempdir().unwrap();
        let descriptors = dir.path().join("descriptors");
        write_descriptors(&descriptors);
        let messages = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::Message(text) = event {
                messages.lock().unwrap().push(text);
            }
        }));

        run::<PdbFile>(
            &descriptors.join("m1_A3.pdb"),
            &[descriptors.join("m1_A4.pdb"), descriptors.join("absent.pdb")],
            &dir.path().join("out"),
            &compare_config(5),
            &reporter,
        )
        .unwrap();
        drop(reporter);

        assert_eq!(
            messages.into_inner().unwrap(),
            vec!["m1_A4: similar".to_string(), "absent: unreadable".to_string()]
        );
    }
}
