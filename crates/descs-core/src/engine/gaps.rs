use crate::core::models::residue::MoleculeType;
use crate::core::models::structure::Model;
use crate::core::topology::capabilities;
use tracing::{debug, instrument};

/// Marks residues of a connected run shorter than one window.
pub const IN_GAP_PROXIMITY: i32 = i32::MAX;

/// Per-residue distance to the nearest chain discontinuity, flattened over
/// all chains of a model in chain-then-position order.
///
/// For a residue at position `i` of a connected run of length `L`, with
/// `h = (element_size - 1) / 2`:
///
/// * `IN_GAP_PROXIMITY` when `L < element_size`;
/// * `-(i + 1)` when fewer than `h` residues precede it in the run;
/// * `L - i` when fewer than `h` residues follow it;
/// * `0` otherwise, meaning a full window can be centred on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GapsDistribution {
    values: Vec<i32>,
    element_size: usize,
    residue_count: usize,
}

impl GapsDistribution {
    #[instrument(skip_all, name = "gaps_distribution", fields(model = model.number))]
    pub fn build(model: &Model, molecule_type: MoleculeType, element_size: usize) -> Self {
        let caps = capabilities(molecule_type);
        let neighborhood = element_size.saturating_sub(1) / 2;
        let mut values = Vec::with_capacity(model.residue_count());
        let mut runs = 0usize;

        for chain in model.chains() {
            let residues = chain.residues();
            let mut run_start = 0;
            for end in 1..=residues.len() {
                let run_ends = end == residues.len() || !caps.is_connected(&residues[end - 1], &residues[end]);
                if run_ends {
                    push_run(&mut values, end - run_start, element_size, neighborhood);
                    runs += 1;
                    run_start = end;
                }
            }
        }

        debug!(
            residues = values.len(),
            runs,
            centers = values.iter().filter(|&&v| v == 0).count(),
            "Gap distribution built."
        );
        Self {
            values,
            element_size,
            residue_count: model.residue_count(),
        }
    }

    pub fn value(&self, position: usize) -> Option<i32> {
        self.values.get(position).copied()
    }

    pub fn is_valid_center(&self, position: usize) -> bool {
        self.value(position) == Some(0)
    }

    /// Whether the residue at `offset` from `center` (with `|offset| <= h`)
    /// belongs to the same connected run as `center`.
    pub fn is_usable_member(&self, center: usize, offset: isize) -> bool {
        if offset.unsigned_abs() > self.neighborhood() {
            return false;
        }
        match self.value(center) {
            None | Some(IN_GAP_PROXIMITY) => false,
            Some(0) => true,
            Some(v) if v < 0 => offset > v as isize,
            Some(v) => offset < v as isize,
        }
    }

    pub fn centers(&self) -> impl Iterator<Item = usize> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| **v == 0)
            .map(|(i, _)| i)
    }

    pub fn values(&self) -> &[i32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn element_size(&self) -> usize {
        self.element_size
    }

    pub fn neighborhood(&self) -> usize {
        self.element_size.saturating_sub(1) / 2
    }

    /// `true` when every residue of the model received exactly one value.
    pub fn is_valid(&self) -> bool {
        self.values.len() == self.residue_count
    }
}

fn push_run(values: &mut Vec<i32>, len: usize, element_size: usize, neighborhood: usize) {
    if len == 0 {
        return;
    }
    if len < element_size {
        values.extend(std::iter::repeat_n(IN_GAP_PROXIMITY, len));
        return;
    }
    for i in 0..len {
        let (left, right) = (i, len - 1 - i);
        let value = if left < neighborhood {
            -((left + 1) as i32)
        } else if right < neighborhood {
            (right + 1) as i32
        } else {
            0
        };
        values.push(value);
    }
}
