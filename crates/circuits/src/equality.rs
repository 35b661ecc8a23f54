//! Bitwise equality circuits.
//!
//! An `N`-bit equality circuit compares the garbler's wires `1..=N` with the
//! evaluator's wires `N+1..=2N`. Each bit pair feeds an `XNOR` gate, and the
//! results are folded with `AND` gates level by level. Every level pairs the
//! first half of the previous level with its second half; an odd element out
//! is carried to the next level unchanged.

use crate::{spec::GateSpec, Circuit, CircuitError, CircuitFile, CircuitSpec, GateType, WireId};

/// Returns the description of the `bits`-wide equality circuit.
pub fn equality_spec(bits: usize) -> Result<CircuitSpec, CircuitError> {
    if bits == 0 {
        return Err(CircuitError::malformed(
            "equality circuit needs at least one bit",
        ));
    }

    let n = WireId::try_from(bits)
        .ok()
        .filter(|n| n.checked_mul(4).is_some())
        .ok_or_else(|| CircuitError::malformed(format!("{bits} bits is too wide")))?;

    let alice: Vec<WireId> = (1..=n).collect();
    let bob: Vec<WireId> = (n + 1..=2 * n).collect();

    let mut gates = Vec::with_capacity(2 * bits);
    let mut next_id = 2 * n + 1;
    let mut push = |kind: GateType, inputs: Vec<WireId>, gates: &mut Vec<GateSpec>| {
        let id = next_id;
        next_id += 1;
        gates.push(GateSpec {
            id,
            kind: kind.as_str().to_string(),
            inputs,
        });
        id
    };

    let mut level: Vec<WireId> = alice
        .iter()
        .zip(&bob)
        .map(|(&a, &b)| push(GateType::Xnor, vec![a, b], &mut gates))
        .collect();

    while level.len() > 1 {
        let half = level.len() / 2;
        let mut next: Vec<WireId> = (0..half)
            .map(|i| push(GateType::And, vec![level[i], level[half + i]], &mut gates))
            .collect();

        if level.len() % 2 == 1 {
            next.push(level[2 * half]);
        }

        level = next;
    }

    Ok(CircuitSpec {
        id: format!("{bits}-bit EQ"),
        alice,
        bob,
        out: level,
        gates,
    })
}

/// Generates the validated `bits`-wide equality circuit.
///
/// The single output wire is 1 iff both parties hold the same bit string.
pub fn equality_circuit(bits: usize) -> Result<Circuit, CircuitError> {
    equality_spec(bits)?.validate()
}

/// Generates the circuit file `eq_{bits}` holding the equality circuit.
pub fn equality_file(bits: usize) -> Result<CircuitFile, CircuitError> {
    Ok(CircuitFile {
        name: format!("eq_{bits}"),
        circuits: vec![equality_spec(bits)?],
    })
}
