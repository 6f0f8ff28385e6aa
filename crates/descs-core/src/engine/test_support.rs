use crate::core::models::atom::Atom;
use crate::core::models::chain::Chain;
use crate::core::models::residue::Residue;
use crate::core::models::structure::{Model, Structure};
use nalgebra::{Point3, Vector3};

const RADIUS: f64 = 2.3;
const RISE: f64 = 1.5;
const TURN_DEGREES: f64 = 100.0;

fn ca_on_helix(t: f64) -> Point3<f64> {
    let angle = (TURN_DEGREES * t).to_radians();
    Point3::new(RADIUS * angle.cos(), RADIUS * angle.sin(), RISE * t)
}

/// An alanine whose CA sits at helix parameter `t`, translated by `shift`.
/// N and C are pulled toward the neighbouring CAs so consecutive residues on
/// the same shift are peptide-bonded.
pub(crate) fn helix_residue(number: isize, t: f64, shift: Vector3<f64>) -> Residue {
    let ca = ca_on_helix(t);
    let prev = ca_on_helix(t - 1.0);
    let next = ca_on_helix(t + 1.0);
    let n = ca + (prev - ca) * 0.4;
    let c = ca + (next - ca) * 0.4;
    let radial = Vector3::new(ca.x, ca.y, 0.0).normalize();

    let mut residue = Residue::new(number, "ALA");
    for (name, position) in [
        ("N", n),
        ("CA", ca),
        ("C", c),
        ("O", c + Vector3::new(0.0, 0.0, 1.23)),
        ("CB", ca + radial * 1.5),
    ] {
        residue.add_atom(Atom::new(name, position + shift));
    }
    residue
}

/// A helical alanine chain numbered from `first`. After every residue number
/// listed in `breaks_after` the rest of the chain is shifted by 10 Å, which
/// breaks the peptide bond there.
pub(crate) fn helix_chain(id: char, first: isize, count: usize, breaks_after: &[isize]) -> Chain {
    let mut chain = Chain::new(id);
    let mut shift = Vector3::zeros();
    for i in 0..count {
        let number = first + i as isize;
        chain.push_residue(helix_residue(number, i as f64, shift));
        if breaks_after.contains(&number) {
            shift += Vector3::new(10.0, 0.0, 0.0);
        }
    }
    chain
}

pub(crate) fn structure_of(chains: Vec<Chain>) -> Structure {
    let mut model = Model::new(1);
    for chain in chains {
        model.push_chain(chain);
    }
    Structure::from_models(vec![model])
}
