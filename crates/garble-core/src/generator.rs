use std::{collections::BTreeMap, sync::Arc};

use rand::{CryptoRng, Rng};
use yao_circuits::{Circuit, Gate, GateType, WireId};

use crate::{
    cipher::{seal, Layer},
    CryptoError, GarbledCircuit, GarbledTable, Label, WireKeys,
};

/// Garbles a circuit.
///
/// Every wire gets two independent keys and a uniform permute bit drawn from
/// `rng`. For each gate, every combination of logical input values maps to
/// the output label of the gate's result, sealed under both input keys and
/// placed at the row selected by the inputs' external values.
///
/// # Arguments
///
/// * `circ` - The circuit to garble.
/// * `rng` - The randomness source. Must not be reused across parties.
pub fn garble<R: Rng + CryptoRng + ?Sized>(
    circ: Arc<Circuit>,
    rng: &mut R,
) -> Result<GarbledCircuit, CryptoError> {
    let keys: BTreeMap<WireId, WireKeys> =
        circ.wires().map(|wire| (wire, WireKeys::random(rng))).collect();

    let tables = circ
        .gates()
        .iter()
        .map(|gate| garble_gate(gate, &keys))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        circuit = circ.id(),
        wires = keys.len(),
        gates = tables.len(),
        "garbled circuit"
    );

    Ok(GarbledCircuit::new(circ, keys, tables))
}

fn garble_gate(
    gate: &Gate,
    keys: &BTreeMap<WireId, WireKeys>,
) -> Result<GarbledTable, CryptoError> {
    let id = gate.id();
    let wire = |wire: &WireId| keys.get(wire).ok_or(CryptoError::UnknownWire(*wire));

    let out = wire(&id)?;
    let inputs = gate
        .inputs()
        .iter()
        .map(wire)
        .collect::<Result<Vec<_>, _>>()?;

    let rows = match (gate.kind(), inputs.as_slice()) {
        (GateType::Not, [x]) => garble_unary(id, GateType::Not, x, out)?,
        (kind, [x, y]) if kind.arity() == 2 => garble_binary(id, kind, x, y, out)?,
        _ => return Err(CryptoError::MalformedTable { gate: id }),
    };

    tracing::trace!(gate = id, kind = %gate.kind(), "garbled gate");

    Ok(GarbledTable::new(id, rows))
}

fn garble_unary(
    id: WireId,
    kind: GateType,
    x: &WireKeys,
    out: &WireKeys,
) -> Result<Vec<Vec<u8>>, CryptoError> {
    let mut rows = vec![Vec::new(); 2];
    for a in [false, true] {
        let row = (a ^ x.pbit()) as u8;
        let label: Label = out.label(kind.eval(&[a]));

        rows[row as usize] = seal(&x.key(a), id, row, Layer::Outer, &label.to_bytes())?;
    }

    Ok(rows)
}

fn garble_binary(
    id: WireId,
    kind: GateType,
    x: &WireKeys,
    y: &WireKeys,
    out: &WireKeys,
) -> Result<Vec<Vec<u8>>, CryptoError> {
    let mut rows = vec![Vec::new(); 4];
    for a in [false, true] {
        for b in [false, true] {
            let row = (((a ^ x.pbit()) as u8) << 1) | (b ^ y.pbit()) as u8;
            let label = out.label(kind.eval(&[a, b]));

            let inner = seal(&y.key(b), id, row, Layer::Inner, &label.to_bytes())?;
            rows[row as usize] = seal(&x.key(a), id, row, Layer::Outer, &inner)?;
        }
    }

    Ok(rows)
}
