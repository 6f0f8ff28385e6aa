use super::defaults::DefaultsConfig;
use super::file::{FileBuildConfig, FileCompareConfig, FileConfig};
use crate::cli::{BuildArgs, CommonArgs, CompareArgs};
use crate::error::{CliError, Result};
use descs::core::models::residue::MoleculeType;
use descs::engine::config::{
    BuildConfig, BuildConfigBuilder, CompareConfig, CompareConfigBuilder, DescriptorMode,
};
use descs::engine::filter::DescriptorFilter;
use descs::engine::verifier::VerifierKind;

/// Values shared by both subcommands after the file, `--set` and the command
/// line have been merged.
struct CommonValues {
    molecule_type: MoleculeType,
    element_size: usize,
    contact_expression: String,
}

fn load_file_config(common: &CommonArgs) -> Result<FileConfig> {
    let file_config = match &common.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    file_config.apply_set_values(&common.set_values)
}

fn merge_common(
    common: &CommonArgs,
    file_config: &mut FileConfig,
    defaults: &DefaultsConfig,
) -> Result<CommonValues> {
    let file_molecule_type = file_config
        .molecule_type
        .take()
        .map(|text| {
            text.parse::<MoleculeType>()
                .map_err(|e| CliError::Config(e.to_string()))
        })
        .transpose()?;

    Ok(CommonValues {
        molecule_type: common
            .molecule_type
            .or(file_molecule_type)
            .unwrap_or(defaults.molecule_type),
        element_size: common
            .element_size
            .or(file_config.element_size)
            .unwrap_or(defaults.element_size),
        contact_expression: common
            .contact_expression
            .clone()
            .or(file_config.contact.take())
            .unwrap_or_else(|| defaults.contact_expression.clone()),
    })
}

fn parse_mode(text: &str) -> Result<DescriptorMode> {
    match text.trim().to_ascii_lowercase().as_str() {
        "window" => Ok(DescriptorMode::Window),
        "extended" => Ok(DescriptorMode::Extended),
        _ => Err(CliError::Config(format!(
            "Unknown descriptor mode '{}'. Expected 'window' or 'extended'.",
            text
        ))),
    }
}

fn parse_verifier(name: &str, fraction: f64) -> Result<VerifierKind> {
    match name.trim().to_ascii_lowercase().as_str() {
        "all-duplexes" => Ok(VerifierKind::AllDuplexes),
        "majority-of-duplexes" => Ok(VerifierKind::MajorityOfDuplexes { fraction }),
        _ => Err(CliError::Config(format!(
            "Unknown verifier '{}'. Expected 'all-duplexes' or 'majority-of-duplexes'.",
            name
        ))),
    }
}

/// Resolves the final [`BuildConfig`]: command line over `--set` over the
/// config file over built-in defaults.
pub fn build_config(args: &BuildArgs, threads: Option<usize>) -> Result<BuildConfig> {
    let defaults = DefaultsConfig::default();
    let mut file_config = load_file_config(&args.common)?;
    let common = merge_common(&args.common, &mut file_config, &defaults)?;
    let build_file: FileBuildConfig = file_config.build.take().unwrap_or_default();

    let mode = if args.extended {
        DescriptorMode::Extended
    } else {
        build_file
            .mode
            .as_deref()
            .map(parse_mode)
            .transpose()?
            .unwrap_or_default()
    };

    let filter = DescriptorFilter {
        min_contacts: args
            .min_contacts
            .or(build_file.min_contacts)
            .unwrap_or(defaults.min_contacts),
        required_contacts: build_file.required_contacts.unwrap_or_default(),
        min_elements: build_file.min_elements.unwrap_or(defaults.min_elements),
    };

    let mut builder = BuildConfigBuilder::new()
        .molecule_type(common.molecule_type)
        .element_size(common.element_size)
        .contact_expression(common.contact_expression)
        .mode(mode)
        .filter(filter);
    if let Some(workers) = threads.or(build_file.workers) {
        builder = builder.workers(workers);
    }

    builder.build().map_err(|e| CliError::Config(e.to_string()))
}

/// Resolves the final [`CompareConfig`] with the same precedence as
/// [`build_config`].
pub fn compare_config(args: &CompareArgs) -> Result<CompareConfig> {
    let defaults = DefaultsConfig::default();
    let mut file_config = load_file_config(&args.common)?;
    let common = merge_common(&args.common, &mut file_config, &defaults)?;
    let compare_file: FileCompareConfig = file_config.compare.take().unwrap_or_default();

    let alignment_atoms = args
        .atoms
        .clone()
        .or(compare_file.alignment_atoms)
        .unwrap_or_else(|| DefaultsConfig::alignment_atoms(common.molecule_type).to_string());

    let fraction = args
        .majority
        .or(compare_file.majority_fraction)
        .unwrap_or(defaults.majority_fraction);
    let verifier = match (args.majority, compare_file.verifier.as_deref()) {
        (Some(fraction), _) => VerifierKind::MajorityOfDuplexes { fraction },
        (None, Some(name)) => parse_verifier(name, fraction)?,
        (None, None) => VerifierKind::default(),
    };

    CompareConfigBuilder::new()
        .molecule_type(common.molecule_type)
        .element_size(common.element_size)
        .contact_expression(common.contact_expression)
        .alignment_atoms(alignment_atoms)
        .duplex_rmsd_threshold(
            args.rmsd_threshold
                .or(compare_file.rmsd_threshold)
                .unwrap_or(defaults.duplex_rmsd_threshold),
        )
        .max_contact_mismatches(
            args.max_mismatches
                .or(compare_file.max_contact_mismatches)
                .unwrap_or(defaults.max_contact_mismatches),
        )
        .verifier(verifier)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))
}
