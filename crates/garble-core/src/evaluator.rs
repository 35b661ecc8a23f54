use std::collections::{BTreeMap, HashMap};

use yao_circuits::{Circuit, GateType, WireId};

use crate::{
    cipher::{open, Layer},
    CryptoError, GarbledTable, Label,
};

/// Evaluates a garbled circuit and decodes its outputs.
///
/// # Arguments
///
/// * `circ` - The circuit the tables were garbled for.
/// * `tables` - One garbled table per gate, in gate order.
/// * `pbits_out` - Permute bits of the output wires.
/// * `inputs` - Active labels of every input wire of both parties.
///
/// # Returns
///
/// The logical value of every output wire.
pub fn evaluate(
    circ: &Circuit,
    tables: &[GarbledTable],
    pbits_out: &BTreeMap<WireId, bool>,
    inputs: &BTreeMap<WireId, Label>,
) -> Result<BTreeMap<WireId, bool>, CryptoError> {
    let labels = evaluate_labels(circ, tables, inputs)?;

    decode(&labels, pbits_out)
}

/// Evaluates a garbled circuit, returning the active labels of the output
/// wires without decoding them.
pub fn evaluate_labels(
    circ: &Circuit,
    tables: &[GarbledTable],
    inputs: &BTreeMap<WireId, Label>,
) -> Result<BTreeMap<WireId, Label>, CryptoError> {
    if tables.len() != circ.gates().len() {
        let gate = circ
            .gates()
            .get(tables.len())
            .map(|gate| gate.id())
            .or_else(|| tables.last().map(GarbledTable::gate))
            .unwrap_or_default();

        return Err(CryptoError::MalformedTable { gate });
    }

    let mut active: HashMap<WireId, Label> = HashMap::with_capacity(circ.wires().count());
    for &wire in circ.alice().iter().chain(circ.bob()) {
        let label = inputs.get(&wire).ok_or(CryptoError::MissingInput(wire))?;
        active.insert(wire, *label);
    }

    for (gate, table) in circ.gates().iter().zip(tables) {
        let id = gate.id();
        if table.gate() != id || table.rows().len() != 1 << gate.kind().arity() {
            return Err(CryptoError::MalformedTable { gate: id });
        }

        if !table.verify() {
            return Err(CryptoError::DecryptionFailed { gate: id });
        }

        let inputs = gate
            .inputs()
            .iter()
            .map(|wire| {
                active
                    .get(wire)
                    .copied()
                    .ok_or(CryptoError::MissingInput(*wire))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let label = match (gate.kind(), inputs.as_slice()) {
            (GateType::Not, [x]) => {
                let row = x.external() as u8;
                let plaintext = open(&x.key(), id, row, Layer::Outer, &table.rows()[row as usize])?;
                decode_row(id, &plaintext)?
            }
            (_, [x, y]) => {
                let row = ((x.external() as u8) << 1) | y.external() as u8;
                let inner = open(&x.key(), id, row, Layer::Outer, &table.rows()[row as usize])?;
                let plaintext = open(&y.key(), id, row, Layer::Inner, &inner)?;
                decode_row(id, &plaintext)?
            }
            _ => return Err(CryptoError::MalformedTable { gate: id }),
        };

        active.insert(id, label);
    }

    circ.outputs()
        .iter()
        .map(|wire| {
            active
                .get(wire)
                .map(|label| (*wire, *label))
                .ok_or(CryptoError::MissingInput(*wire))
        })
        .collect()
}

/// Decodes active output labels using the output permute bits.
pub fn decode(
    labels: &BTreeMap<WireId, Label>,
    pbits_out: &BTreeMap<WireId, bool>,
) -> Result<BTreeMap<WireId, bool>, CryptoError> {
    labels
        .iter()
        .map(|(wire, label)| {
            let pbit = pbits_out
                .get(wire)
                .ok_or(CryptoError::MissingOutputPbit(*wire))?;
            Ok((*wire, label.external() ^ pbit))
        })
        .collect()
}

fn decode_row(gate: WireId, plaintext: &[u8]) -> Result<Label, CryptoError> {
    Label::from_bytes(plaintext).ok_or(CryptoError::MalformedTable { gate })
}
