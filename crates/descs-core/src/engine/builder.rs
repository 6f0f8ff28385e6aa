use super::config::{BuildConfig, DescriptorMode};
use super::descriptor::{ContactMatrix, Descriptor, DescriptorOrigin};
use super::error::EngineError;
use super::filter::DescriptorFilter;
use super::gaps::GapsDistribution;
use super::index::ResidueIndex;
use super::pool::EvaluatorPool;
use super::progress::{Progress, ProgressReporter};
use crate::core::contact::{ContactEvaluator, ContactExpression};
use crate::core::io::traits::StructureFile;
use crate::core::models::residue::{MoleculeType, Residue};
use crate::core::models::structure::{Model, Structure};
use itertools::Itertools;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

pub const MANIFEST_FILE_NAME: &str = "descriptors.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSummary {
    pub saved: usize,
    pub filtered_out: usize,
    pub manifest: PathBuf,
}

#[derive(Debug, Serialize)]
struct ManifestRow<'a> {
    file: String,
    model: usize,
    chain: char,
    residue_number: isize,
    insertion_code: Option<char>,
    residue_name: &'a str,
    elements: usize,
    residues: usize,
    contacts: usize,
}

/// Extracts descriptors from structures, one model at a time.
///
/// Descriptors accumulate across calls to [`DescriptorBuilder::build`] in the
/// order their models were built, and in center order within a model.
#[derive(Debug)]
pub struct DescriptorBuilder {
    config: BuildConfig,
    expression: ContactExpression,
    descriptors: Vec<Descriptor>,
}

impl DescriptorBuilder {
    /// # Errors
    ///
    /// Returns [`EngineError::Expression`] if the configured contact
    /// expression does not parse for the configured molecule type.
    pub fn new(config: BuildConfig) -> Result<Self, EngineError> {
        let expression = ContactExpression::parse(&config.contact_expression, config.molecule_type)?;
        Ok(Self {
            config,
            expression,
            descriptors: Vec::new(),
        })
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn expression(&self) -> &ContactExpression {
        &self.expression
    }

    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    pub fn into_descriptors(self) -> Vec<Descriptor> {
        self.descriptors
    }

    /// Builds the descriptors of one model and returns how many passed the
    /// configured filter.
    ///
    /// # Errors
    ///
    /// * [`EngineError::InvalidModel`] when `model_index` is out of range or
    ///   the model holds no complete residue of the configured molecule type.
    /// * [`EngineError::Internal`] / [`EngineError::Index`] on inconsistent
    ///   gap or index data.
    #[instrument(skip_all, name = "build_model", fields(model_index = model_index))]
    pub fn build(
        &mut self,
        structure: &Structure,
        model_index: usize,
        reporter: &ProgressReporter,
    ) -> Result<usize, EngineError> {
        let molecule_type = self.config.molecule_type;
        let source = structure.model(model_index).ok_or_else(|| EngineError::InvalidModel {
            model: model_index + 1,
            reason: format!("the structure holds {} model(s)", structure.models().len()),
        })?;

        let model = source.retain_complete(molecule_type);
        if model.residue_count() == 0 {
            return Err(EngineError::InvalidModel {
                model: source.number,
                reason: format!("no complete {} residues", molecule_type),
            });
        }
        debug!(
            model = model.number,
            kept = model.residue_count(),
            dropped = source.residue_count() - model.residue_count(),
            "Filtered model to complete residues."
        );

        let gaps = GapsDistribution::build(&model, molecule_type, self.config.element_size);
        if !gaps.is_valid() {
            return Err(EngineError::Internal(format!(
                "gap distribution covers {} of {} residues in model {}",
                gaps.len(),
                model.residue_count(),
                model.number
            )));
        }
        let index = ResidueIndex::new(&model);
        let centers: Vec<usize> = gaps.centers().collect();

        let pass = ModelPass {
            model: &model,
            index: &index,
            gaps: &gaps,
            centers: &centers,
            molecule_type,
            element_size: self.config.element_size,
            mode: self.config.mode,
        };

        reporter.report(Progress::TaskStart {
            total: centers.len() as u64,
        });
        let built = {
            let pool = EvaluatorPool::new(&self.expression, self.config.workers)?;
            pool.map(&centers, |evaluator, &center| {
                let result = pass.descriptor_at(evaluator, center);
                reporter.report(Progress::TaskIncrement);
                result
            })
        };
        reporter.report(Progress::TaskFinish);

        let permissive = self.config.filter.is_permissive();
        let mut added = 0;
        let mut rejected = 0;
        for descriptor in built {
            let descriptor = descriptor?;
            if permissive || self.config.filter.accepts(&descriptor) {
                self.descriptors.push(descriptor);
                added += 1;
            } else {
                rejected += 1;
            }
        }

        info!(
            model = model.number,
            centers = centers.len(),
            descriptors = added,
            rejected,
            "Model descriptor build done."
        );
        Ok(added)
    }

    /// Builds every model of `structure`. Models that cannot be used are
    /// skipped with a warning; any other error aborts the run.
    #[instrument(skip_all, name = "build_all_models")]
    pub fn build_all(
        &mut self,
        structure: &Structure,
        reporter: &ProgressReporter,
    ) -> Result<usize, EngineError> {
        let mut total = 0;
        for model_index in 0..structure.models().len() {
            let result = reporter.phase("Building descriptors", || {
                self.build(structure, model_index, reporter)
            });
            match result {
                Ok(count) => total += count,
                Err(EngineError::InvalidModel { model, reason }) => {
                    warn!(model, %reason, "Skipping model.");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(total)
    }

    /// Writes every descriptor accepted by `filter` to `output_dir`, one file
    /// per descriptor, plus a [`MANIFEST_FILE_NAME`] manifest.
    #[instrument(skip_all, name = "save_descriptors", fields(dir = %output_dir.display()))]
    pub fn save_descriptors<F: StructureFile>(
        &self,
        output_dir: &Path,
        filter: &DescriptorFilter,
    ) -> Result<SaveSummary, EngineError> {
        fs::create_dir_all(output_dir).map_err(|e| EngineError::io(output_dir, e))?;
        let manifest = output_dir.join(MANIFEST_FILE_NAME);
        let mut writer = csv::Writer::from_path(&manifest)?;

        let permissive = filter.is_permissive();
        if !permissive {
            debug!(?filter, "Saving descriptors through a filter.");
        }
        let mut saved = 0;
        let mut filtered_out = 0;
        for descriptor in &self.descriptors {
            if !permissive && !filter.accepts(descriptor) {
                filtered_out += 1;
                continue;
            }
            let file = format!("{}.{}", descriptor.file_stem(), F::extension());
            let path = output_dir.join(&file);
            F::write_to_path(&descriptor.to_structure(), &path).map_err(|e| EngineError::io(&path, e))?;

            let origin = descriptor.origin();
            writer.serialize(ManifestRow {
                file,
                model: origin.model,
                chain: origin.chain,
                residue_number: origin.residue_number,
                insertion_code: origin.insertion_code,
                residue_name: &origin.residue_name,
                elements: descriptor.elements().len(),
                residues: descriptor.residue_count(),
                contacts: descriptor.contact_count(),
            })?;
            saved += 1;
        }
        writer.flush().map_err(|e| EngineError::io(&manifest, e))?;

        info!(saved, filtered_out, "Descriptor save done.");
        Ok(SaveSummary {
            saved,
            filtered_out,
            manifest,
        })
    }
}

/// Read-only state shared by every worker during one model pass.
struct ModelPass<'m> {
    model: &'m Model,
    index: &'m ResidueIndex<'m>,
    gaps: &'m GapsDistribution,
    centers: &'m [usize],
    molecule_type: MoleculeType,
    element_size: usize,
    mode: DescriptorMode,
}

impl ModelPass<'_> {
    fn descriptor_at(
        &self,
        evaluator: &mut ContactEvaluator<'_>,
        center: usize,
    ) -> Result<Descriptor, EngineError> {
        let origin_residue = self.index.residue(center)?;

        let mut element_centers = vec![center];
        if self.mode == DescriptorMode::Extended {
            let mut contacting = vec![center];
            for &other in self.centers {
                if other != center && evaluator.evaluate(origin_residue, self.index.residue(other)?) {
                    contacting.push(other);
                }
            }
            let kept = eliminate_redundant_centers(&contacting, center, self.element_size);
            element_centers.extend(kept.into_iter().filter(|&c| c != center));
        }

        let elements = element_centers
            .iter()
            .map(|&c| self.window(c))
            .collect::<Result<Vec<_>, _>>()?;
        let residues: Vec<&Residue> = elements.iter().flatten().collect();
        let contacts = ContactMatrix::compute(&residues, evaluator);

        let address = self.index.decode(center)?;
        let chain = self.model.chain(address.chain).ok_or_else(|| {
            EngineError::Internal(format!("chain {} missing from model {}", address.chain, self.model.number))
        })?;
        let origin = DescriptorOrigin::of(self.model.number, chain.id, origin_residue);
        debug!(%origin, elements = elements.len(), contacts = contacts.count(), "Descriptor assembled.");

        Descriptor::new(origin, self.molecule_type, self.element_size, elements, contacts)
    }

    /// Residues of the element centred on `center`, all from its connected run.
    fn window(&self, center: usize) -> Result<Vec<Residue>, EngineError> {
        let neighborhood = self.gaps.neighborhood();
        let h = neighborhood as isize;
        if let Some(offset) = (-h..=h).find(|&k| !self.gaps.is_usable_member(center, k)) {
            return Err(EngineError::Internal(format!(
                "window around position {} leaves its connected run at offset {}",
                center, offset
            )));
        }
        let window = self.index.residues_in_window(center, neighborhood)?;
        Ok(window.into_iter().cloned().collect())
    }
}

/// Drops centers whose windows would be redundant with an already kept one.
///
/// `origin` is always kept. The remaining centers are scanned in ascending
/// order; a center within `(element_size - 1) / 2` positions of the origin or
/// of a center kept before it is dropped. The result is sorted.
pub fn eliminate_redundant_centers(centers: &[usize], origin: usize, element_size: usize) -> Vec<usize> {
    let neighborhood = element_size.saturating_sub(1) / 2;
    let mut kept = vec![origin];
    for center in centers.iter().copied().sorted_unstable().dedup() {
        if center != origin && kept.iter().all(|&k| k.abs_diff(center) > neighborhood) {
            kept.push(center);
        }
    }
    kept.sort_unstable();
    kept
}
