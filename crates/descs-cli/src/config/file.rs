use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileBuildConfig {
    pub mode: Option<String>,
    pub workers: Option<usize>,
    pub min_contacts: Option<usize>,
    pub min_elements: Option<usize>,
    pub required_contacts: Option<Vec<(usize, usize)>>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileCompareConfig {
    pub alignment_atoms: Option<String>,
    pub rmsd_threshold: Option<f64>,
    pub max_contact_mismatches: Option<usize>,
    pub verifier: Option<String>,
    pub majority_fraction: Option<f64>,
}

/// Every key of a descs configuration file, all optional.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub molecule_type: Option<String>,
    pub element_size: Option<usize>,
    pub contact: Option<String>,
    pub build: Option<FileBuildConfig>,
    pub compare: Option<FileCompareConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Applies `-S key=value` overrides on top of the values read from file.
    pub fn apply_set_values(mut self, set_values: &[String]) -> Result<Self> {
        for kv_pair in set_values {
            let Some((key, value)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let (key, value) = (key.trim(), value.trim());

            match key {
                "molecule-type" => self.molecule_type = Some(value.to_string()),
                "element-size" => self.element_size = Some(parse_value(key, value)?),
                "contact" => self.contact = Some(value.to_string()),
                "build.mode" => self.build_mut().mode = Some(value.to_string()),
                "build.workers" => self.build_mut().workers = Some(parse_value(key, value)?),
                "build.min-contacts" => {
                    self.build_mut().min_contacts = Some(parse_value(key, value)?)
                }
                "build.min-elements" => {
                    self.build_mut().min_elements = Some(parse_value(key, value)?)
                }
                "compare.alignment-atoms" => {
                    self.compare_mut().alignment_atoms = Some(value.to_string())
                }
                "compare.rmsd-threshold" => {
                    self.compare_mut().rmsd_threshold = Some(parse_value(key, value)?)
                }
                "compare.max-contact-mismatches" => {
                    self.compare_mut().max_contact_mismatches = Some(parse_value(key, value)?)
                }
                "compare.verifier" => self.compare_mut().verifier = Some(value.to_string()),
                "compare.majority-fraction" => {
                    self.compare_mut().majority_fraction = Some(parse_value(key, value)?)
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(self)
    }

    fn build_mut(&mut self) -> &mut FileBuildConfig {
        self.build.get_or_insert_with(Default::default)
    }

    fn compare_mut(&mut self) -> &mut FileCompareConfig {
        self.compare.get_or_insert_with(Default::default)
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        CliError::Config(format!("Invalid value for {}: '{}'", key, value))
    })
}
