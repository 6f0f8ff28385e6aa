use nalgebra::Point3;

/// Represents a single atom of a residue in a macromolecular structure.
///
/// Atoms carry only what descriptor extraction and comparison need: the
/// atom name used by contact predicates and alignment, the coordinates in
/// Angstroms, and the serial/element fields preserved for round-tripping
/// through structure files.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The serial number from the source file (0 when created in memory).
    pub serial: usize,
    /// The canonical name of the atom (e.g., "CA", "C4'").
    pub name: String,
    /// The element symbol, if the source provided one.
    pub element: Option<String>,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
}

impl Atom {
    /// Creates a new `Atom` with no serial number and no element symbol.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the atom.
    /// * `position` - The 3D coordinates of the atom.
    pub fn new(name: &str, position: Point3<f64>) -> Self {
        Self {
            serial: 0,
            name: name.to_string(),
            element: None,
            position,
        }
    }

    pub fn with_serial(mut self, serial: usize) -> Self {
        self.serial = serial;
        self
    }

    pub fn with_element(mut self, element: &str) -> Self {
        self.element = Some(element.to_string());
        self
    }

    pub fn distance_to(&self, other: &Atom) -> f64 {
        (self.position - other.position).norm()
    }
}

/// Returns `true` unless the atom name denotes a hydrogen or deuterium.
pub fn is_heavy_atom(atom_name: &str) -> bool {
    let first_char = atom_name
        .trim()
        .chars()
        .find(|c| !c.is_ascii_digit())
        .map(|c| c.to_ascii_uppercase());
    !matches!(first_char, Some('H') | Some('D'))
}
