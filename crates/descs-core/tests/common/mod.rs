#![allow(dead_code)]

use descs::core::models::atom::Atom;
use descs::core::models::chain::Chain;
use descs::core::models::residue::Residue;
use descs::core::models::structure::{Model, Structure};
use nalgebra::{Point3, Vector3};

// Same helix and break geometry as the crate's unit-test structures.
const RADIUS: f64 = 2.3;
const RISE: f64 = 1.5;
const TURN_DEGREES: f64 = 100.0;
const BREAK_SHIFT: f64 = 10.0;

fn trace_point(t: f64) -> Point3<f64> {
    let angle = (TURN_DEGREES * t).to_radians();
    Point3::new(RADIUS * angle.cos(), RADIUS * angle.sin(), RISE * t)
}

pub fn alanine(number: isize, t: f64, offset: Vector3<f64>) -> Residue {
    let ca = trace_point(t);
    let n = ca + (trace_point(t - 1.0) - ca) * 0.4;
    let c = ca + (trace_point(t + 1.0) - ca) * 0.4;
    let outward = Vector3::new(ca.x, ca.y, 0.0).normalize();

    let mut residue = Residue::new(number, "ALA");
    residue.add_atom(Atom::new("N", n + offset));
    residue.add_atom(Atom::new("CA", ca + offset));
    residue.add_atom(Atom::new("C", c + offset));
    residue.add_atom(Atom::new("O", c + Vector3::new(0.0, 0.0, 1.23) + offset));
    residue.add_atom(Atom::new("CB", ca + outward * 1.5 + offset));
    residue
}

/// `count` helical alanines numbered from 1; the chain is displaced by
/// `BREAK_SHIFT` Å along x after residue `break_after`, if any.
pub fn helix(id: char, count: usize, break_after: Option<isize>) -> Chain {
    let mut chain = Chain::new(id);
    let mut offset = Vector3::zeros();
    for i in 0..count {
        let number = i as isize + 1;
        chain.push_residue(alanine(number, i as f64, offset));
        if Some(number) == break_after {
            offset.x += BREAK_SHIFT;
        }
    }
    chain
}

pub fn single_model(chains: Vec<Chain>) -> Structure {
    let mut model = Model::new(1);
    for chain in chains {
        model.push_chain(chain);
    }
    Structure::from_models(vec![model])
}
