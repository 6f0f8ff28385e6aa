use crate::core::models::residue::Residue;
use crate::core::models::structure::Model;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum IndexError {
    #[error("{what} {value} is out of range (limit {limit})")]
    OutOfRange {
        what: &'static str,
        value: usize,
        limit: usize,
    },
}

/// A residue addressed by chain index and position within the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResidueAddress {
    pub chain: usize,
    pub residue: usize,
}

/// Flat addressing of every residue of a model.
///
/// Flat positions run over `[0, total)` in chain-then-position order, the same
/// order as [`super::gaps::GapsDistribution`]. Each position stores the radix
/// code `chain * radix + residue`, with `radix` strictly greater than the
/// longest chain, so decoding is a single division.
#[derive(Debug)]
pub struct ResidueIndex<'a> {
    model: &'a Model,
    radix: usize,
    codes: Vec<usize>,
    chain_offsets: Vec<usize>,
}

impl<'a> ResidueIndex<'a> {
    pub fn new(model: &'a Model) -> Self {
        let radix = model.max_chain_len() + 1;
        let mut codes = Vec::with_capacity(model.residue_count());
        let mut chain_offsets = Vec::with_capacity(model.chains().len());
        for (chain_idx, chain) in model.chains().iter().enumerate() {
            chain_offsets.push(codes.len());
            codes.extend((0..chain.len()).map(|residue_idx| chain_idx * radix + residue_idx));
        }
        Self {
            model,
            radix,
            codes,
            chain_offsets,
        }
    }

    pub fn radix(&self) -> usize {
        self.radix
    }

    pub fn total(&self) -> usize {
        self.codes.len()
    }

    pub fn code(&self, flat: usize) -> Result<usize, IndexError> {
        self.codes.get(flat).copied().ok_or(IndexError::OutOfRange {
            what: "flat position",
            value: flat,
            limit: self.codes.len(),
        })
    }

    pub fn decode(&self, flat: usize) -> Result<ResidueAddress, IndexError> {
        let code = self.code(flat)?;
        Ok(ResidueAddress {
            chain: code / self.radix,
            residue: code % self.radix,
        })
    }

    pub fn encode(&self, chain: usize, residue: usize) -> Result<usize, IndexError> {
        let chain_ref = self.model.chain(chain).ok_or(IndexError::OutOfRange {
            what: "chain",
            value: chain,
            limit: self.model.chains().len(),
        })?;
        if residue >= chain_ref.len() {
            return Err(IndexError::OutOfRange {
                what: "residue",
                value: residue,
                limit: chain_ref.len(),
            });
        }
        Ok(self.chain_offsets[chain] + residue)
    }

    pub fn residue(&self, flat: usize) -> Result<&'a Residue, IndexError> {
        let address = self.decode(flat)?;
        self.model
            .chain(address.chain)
            .and_then(|chain| chain.residue(address.residue))
            .ok_or(IndexError::OutOfRange {
                what: "flat position",
                value: flat,
                limit: self.codes.len(),
            })
    }

    /// Addresses of the `2 * neighborhood + 1` positions centred on `center`.
    pub fn residue_window(
        &self,
        center: usize,
        neighborhood: usize,
    ) -> Result<Vec<ResidueAddress>, IndexError> {
        let (first, last) = self.window_bounds(center, neighborhood)?;
        (first..=last).map(|flat| self.decode(flat)).collect()
    }

    pub fn residues_in_window(
        &self,
        center: usize,
        neighborhood: usize,
    ) -> Result<Vec<&'a Residue>, IndexError> {
        let (first, last) = self.window_bounds(center, neighborhood)?;
        (first..=last).map(|flat| self.residue(flat)).collect()
    }

    fn window_bounds(&self, center: usize, neighborhood: usize) -> Result<(usize, usize), IndexError> {
        let total = self.codes.len();
        let first = center.checked_sub(neighborhood).ok_or(IndexError::OutOfRange {
            what: "window start",
            value: center,
            limit: neighborhood,
        })?;
        let last = center + neighborhood;
        if last >= total {
            return Err(IndexError::OutOfRange {
                what: "window end",
                value: last,
                limit: total,
            });
        }
        Ok((first, last))
    }
}
