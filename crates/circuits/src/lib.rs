//! Boolean circuits for two-party garbled circuit execution.
//!
//! Circuits are described in JSON (see [`spec`]) and turned into a
//! [`Circuit`] only after validation. The [`equality`] module generates the
//! bitwise equality circuits used for set intersection.

#![deny(missing_docs, unreachable_pub, unused_must_use)]
#![deny(clippy::all)]

mod circuit;
pub mod equality;
mod error;
pub mod spec;

use std::sync::Arc;

use once_cell::sync::Lazy;

pub use circuit::{Circuit, Gate, GateType};
pub use equality::equality_circuit;
pub use error::CircuitError;
pub use spec::{CircuitFile, CircuitSpec, GateSpec};

/// Wire identifier, unique within a circuit.
pub type WireId = u32;

/// JSON of the bundled gate circuits, one small circuit per gate type.
pub static DEFAULT_CIRCUITS_JSON: &str = include_str!("../circuits/default.json");
/// JSON of the bundled 4-bit equality circuit.
pub static EQ_4_JSON: &str = include_str!("../circuits/eq_4.json");

/// Bundled gate circuits.
pub static DEFAULT_CIRCUITS: Lazy<Arc<[Circuit]>> = Lazy::new(|| {
    CircuitFile::from_json(DEFAULT_CIRCUITS_JSON)
        .and_then(|file| file.validate())
        .expect("bundled circuits are valid")
        .into()
});

/// 32-bit equality circuit, the predicate used for `f32` set intersection.
pub static EQ_32: Lazy<Arc<Circuit>> =
    Lazy::new(|| Arc::new(equality_circuit(32).expect("32-bit equality circuit is valid")));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_circuits_load() {
        let ids: Vec<_> = DEFAULT_CIRCUITS.iter().map(|circ| circ.id()).collect();

        assert_eq!(ids, vec!["AND", "OR", "XOR", "XNOR", "NOT"]);
    }

    #[test]
    fn test_bundled_eq_4_matches_generator() {
        let file = CircuitFile::from_json(EQ_4_JSON).unwrap();
        let circ = file.validate().unwrap().remove(0);

        assert_eq!(file.name, "eq_4");
        assert_eq!(circ, equality_circuit(4).unwrap());
    }

    #[test]
    fn test_eq_32_shape() {
        assert_eq!(EQ_32.alice().len(), 32);
        assert_eq!(EQ_32.bob().len(), 32);
        assert_eq!(EQ_32.outputs().len(), 1);
    }
}
