use super::error::EngineError;
use crate::core::contact::{ContactEvaluator, ContactExpression};
use crate::core::models::chain::Chain;
use crate::core::models::residue::{MoleculeType, Residue};
use crate::core::models::structure::{Model, Structure};
use nalgebra::DMatrix;
use std::fmt;
use tracing::debug;

/// Symmetric residue-residue contact map of a descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactMatrix {
    cells: DMatrix<bool>,
}

impl ContactMatrix {
    pub fn empty(size: usize) -> Self {
        Self {
            cells: DMatrix::from_element(size, size, false),
        }
    }

    /// Evaluates the contact predicate over every unordered pair `i < j`.
    pub fn compute(residues: &[&Residue], evaluator: &mut ContactEvaluator<'_>) -> Self {
        let mut matrix = Self::empty(residues.len());
        for i in 0..residues.len() {
            for j in i + 1..residues.len() {
                if evaluator.evaluate(residues[i], residues[j]) {
                    matrix.set(i, j);
                }
            }
        }
        matrix
    }

    pub fn size(&self) -> usize {
        self.cells.nrows()
    }

    pub fn set(&mut self, i: usize, j: usize) {
        self.cells[(i, j)] = true;
        self.cells[(j, i)] = true;
    }

    /// Out-of-range indices read as "no contact".
    pub fn get(&self, i: usize, j: usize) -> bool {
        i < self.size() && j < self.size() && self.cells[(i, j)]
    }

    /// Unordered contacting pairs `(i, j)` with `i < j`, row by row.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.size();
        (0..n).flat_map(move |i| (i + 1..n).filter(move |&j| self.cells[(i, j)]).map(move |j| (i, j)))
    }

    pub fn count(&self) -> usize {
        self.pairs().count()
    }
}

/// Where a descriptor's central residue came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorOrigin {
    pub model: usize,
    pub chain: char,
    pub residue_number: isize,
    pub insertion_code: Option<char>,
    pub residue_name: String,
}

impl DescriptorOrigin {
    pub fn of(model: usize, chain: char, residue: &Residue) -> Self {
        Self {
            model,
            chain,
            residue_number: residue.number,
            insertion_code: residue.insertion_code,
            residue_name: residue.name.clone(),
        }
    }
}

impl fmt::Display for DescriptorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "model {} {}:{}{}", self.model, self.chain, self.residue_name, self.residue_number)?;
        if let Some(code) = self.insertion_code {
            write!(f, "{}", code)?;
        }
        Ok(())
    }
}

/// A contact-annotated set of residue windows ("elements").
///
/// Element 0 is the window centred on the origin residue. The contact matrix
/// spans the concatenation of all elements in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
    origin: DescriptorOrigin,
    molecule_type: MoleculeType,
    element_size: usize,
    elements: Vec<Vec<Residue>>,
    contacts: ContactMatrix,
}

impl Descriptor {
    pub(crate) fn new(
        origin: DescriptorOrigin,
        molecule_type: MoleculeType,
        element_size: usize,
        elements: Vec<Vec<Residue>>,
        contacts: ContactMatrix,
    ) -> Result<Self, EngineError> {
        if elements.is_empty() || elements.iter().any(|e| e.len() != element_size) {
            return Err(EngineError::InvalidDescriptor(format!(
                "every element of {} must hold exactly {} residues",
                origin, element_size
            )));
        }
        if elements.len() > ELEMENT_CHAIN_IDS.len() {
            return Err(EngineError::InvalidDescriptor(format!(
                "{} holds {} elements, at most {} can be written",
                origin,
                elements.len(),
                ELEMENT_CHAIN_IDS.len()
            )));
        }
        if contacts.size() != elements.len() * element_size {
            return Err(EngineError::Internal(format!(
                "contact matrix of size {} does not match {} residues",
                contacts.size(),
                elements.len() * element_size
            )));
        }
        Ok(Self {
            origin,
            molecule_type,
            element_size,
            elements,
            contacts,
        })
    }

    /// Rebuilds a descriptor from a structure written by
    /// [`super::builder::DescriptorBuilder::save_descriptors`]: one model whose
    /// chains are the elements, in order.
    ///
    /// The molecule type is read from the residues and the element size from
    /// the chain lengths, so a file built with other settings loads fine and is
    /// only refused once it is compared. Contacts are recomputed with
    /// `expression` when it targets the same molecule type and left empty
    /// otherwise.
    pub fn from_structure(
        structure: &Structure,
        expression: &ContactExpression,
    ) -> Result<Self, EngineError> {
        let model = match structure.models() {
            [model] => model,
            models => {
                return Err(EngineError::InvalidDescriptor(format!(
                    "a descriptor file must hold exactly one model, found {}",
                    models.len()
                )));
            }
        };
        let first_chain = model
            .chain(0)
            .filter(|chain| !chain.is_empty())
            .ok_or_else(|| EngineError::InvalidDescriptor("the descriptor holds no residues".into()))?;
        let element_size = first_chain.len();
        if element_size % 2 == 0 {
            return Err(EngineError::InvalidDescriptor(format!(
                "elements must hold an odd number of residues, found {}",
                element_size
            )));
        }

        let molecule_type = first_chain.residues()[0].molecule_type.ok_or_else(|| {
            EngineError::InvalidDescriptor(format!(
                "residue {} is not a protein or nucleic acid residue",
                first_chain.residues()[0].label()
            ))
        })?;
        if let Some(residue) = model
            .residues()
            .find(|r| r.molecule_type != Some(molecule_type))
        {
            return Err(EngineError::InvalidDescriptor(format!(
                "residue {} is not a {} residue",
                residue.label(),
                molecule_type
            )));
        }

        let elements: Vec<Vec<Residue>> = model
            .chains()
            .iter()
            .map(|chain| chain.residues().to_vec())
            .collect();
        let central = &first_chain.residues()[(element_size - 1) / 2];
        let origin = DescriptorOrigin::of(model.number, first_chain.id, central);

        let residues: Vec<&Residue> = elements.iter().flatten().collect();
        let contacts = if expression.molecule_type() == molecule_type {
            ContactMatrix::compute(&residues, &mut expression.evaluator())
        } else {
            debug!(%origin, %molecule_type, "Contacts not computed for a descriptor of another molecule type.");
            ContactMatrix::empty(residues.len())
        };
        Self::new(origin, molecule_type, element_size, elements, contacts)
    }

    pub fn origin(&self) -> &DescriptorOrigin {
        &self.origin
    }

    pub fn molecule_type(&self) -> MoleculeType {
        self.molecule_type
    }

    pub fn element_size(&self) -> usize {
        self.element_size
    }

    pub fn elements(&self) -> &[Vec<Residue>] {
        &self.elements
    }

    pub fn element(&self, index: usize) -> Option<&[Residue]> {
        self.elements.get(index).map(Vec::as_slice)
    }

    pub fn residues(&self) -> impl Iterator<Item = &Residue> {
        self.elements.iter().flatten()
    }

    pub fn residue_count(&self) -> usize {
        self.elements.len() * self.element_size
    }

    pub fn contacts(&self) -> &ContactMatrix {
        &self.contacts
    }

    pub fn contact_count(&self) -> usize {
        self.contacts.count()
    }

    /// File name stem `m{model}_{chain}{number}{icode}`.
    pub fn file_stem(&self) -> String {
        let origin = &self.origin;
        format!(
            "m{}_{}{}{}",
            origin.model,
            origin.chain,
            origin.residue_number,
            origin.insertion_code.map(String::from).unwrap_or_default()
        )
    }

    /// A single-model structure with element `i` written as chain `'A' + i`.
    pub fn to_structure(&self) -> Structure {
        let mut model = Model::new(1);
        for (i, element) in self.elements.iter().enumerate() {
            let mut chain = Chain::new(element_chain_id(i));
            for residue in element {
                chain.push_residue(residue.clone());
            }
            model.push_chain(chain);
        }
        Structure::from_models(vec![model])
    }
}

/// Chain ids given to elements when a descriptor is written; bounds the
/// number of elements a descriptor may hold.
pub const ELEMENT_CHAIN_IDS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

fn element_chain_id(index: usize) -> char {
    ELEMENT_CHAIN_IDS[index] as char
}
