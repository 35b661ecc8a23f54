use std::{collections::BTreeMap, sync::Arc};

use serde::{Deserialize, Serialize};
use yao_circuits::{Circuit, WireId};

use crate::{CryptoError, Label, WireKeys};

/// Garbled truth table of a single gate.
///
/// Rows are indexed by the external values of the gate inputs,
/// `(ext_l << 1) | ext_r` for binary gates and `ext` for `NOT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarbledTable {
    gate: WireId,
    rows: Vec<Vec<u8>>,
    digest: [u8; 32],
}

impl GarbledTable {
    /// Creates a table, computing its digest.
    pub fn new(gate: WireId, rows: Vec<Vec<u8>>) -> Self {
        let digest = Self::compute_digest(gate, &rows);
        Self { gate, rows, digest }
    }

    /// Returns the id of the gate this table belongs to.
    pub fn gate(&self) -> WireId {
        self.gate
    }

    /// Returns the encrypted rows.
    pub fn rows(&self) -> &[Vec<u8>] {
        &self.rows
    }

    /// Returns a mutable reference to the encrypted rows.
    ///
    /// Modifying a row invalidates the table digest.
    pub fn rows_mut(&mut self) -> &mut [Vec<u8>] {
        &mut self.rows
    }

    /// Returns the digest committed to at garbling time.
    pub fn digest(&self) -> &[u8; 32] {
        &self.digest
    }

    /// Returns whether the rows still match the digest.
    pub fn verify(&self) -> bool {
        Self::compute_digest(self.gate, &self.rows) == self.digest
    }

    fn compute_digest(gate: WireId, rows: &[Vec<u8>]) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&gate.to_be_bytes());
        for row in rows {
            hasher.update(&(row.len() as u32).to_be_bytes());
            hasher.update(row);
        }
        hasher.finalize().into()
    }
}

/// A garbled circuit, as held by the garbler.
///
/// Holds the keys of every wire, so it must never be sent as a whole. The
/// evaluator receives the [tables](Self::tables) and the
/// [output permute bits](Self::pbits_out) only.
#[derive(Debug, Clone)]
pub struct GarbledCircuit {
    circ: Arc<Circuit>,
    keys: BTreeMap<WireId, WireKeys>,
    tables: Vec<GarbledTable>,
}

impl GarbledCircuit {
    pub(crate) fn new(
        circ: Arc<Circuit>,
        keys: BTreeMap<WireId, WireKeys>,
        tables: Vec<GarbledTable>,
    ) -> Self {
        Self { circ, keys, tables }
    }

    /// Returns the circuit.
    pub fn circuit(&self) -> &Arc<Circuit> {
        &self.circ
    }

    /// Returns the keys of every wire.
    pub fn keys(&self) -> &BTreeMap<WireId, WireKeys> {
        &self.keys
    }

    /// Returns the keys of a wire.
    pub fn wire_keys(&self, wire: WireId) -> Result<&WireKeys, CryptoError> {
        self.keys.get(&wire).ok_or(CryptoError::UnknownWire(wire))
    }

    /// Returns the permute bit of a wire.
    pub fn pbit(&self, wire: WireId) -> Result<bool, CryptoError> {
        self.wire_keys(wire).map(WireKeys::pbit)
    }

    /// Returns the garbled tables, in gate order.
    pub fn tables(&self) -> &[GarbledTable] {
        &self.tables
    }

    /// Returns the permute bits of the output wires.
    pub fn pbits_out(&self) -> BTreeMap<WireId, bool> {
        self.circ
            .outputs()
            .iter()
            .filter_map(|wire| self.keys.get(wire).map(|keys| (*wire, keys.pbit())))
            .collect()
    }

    /// Returns the label encoding `value` on `wire`.
    pub fn label(&self, wire: WireId, value: bool) -> Result<Label, CryptoError> {
        self.wire_keys(wire).map(|keys| keys.label(value))
    }

    /// Encodes a bit for each of the given wires.
    ///
    /// `wires` and `values` are zipped, the caller checks their lengths.
    pub fn encode(
        &self,
        wires: &[WireId],
        values: &[bool],
    ) -> Result<BTreeMap<WireId, Label>, CryptoError> {
        wires
            .iter()
            .zip(values)
            .map(|(wire, value)| Ok((*wire, self.label(*wire, *value)?)))
            .collect()
    }

    /// Consumes the garbled circuit, returning the tables.
    pub fn into_tables(self) -> Vec<GarbledTable> {
        self.tables
    }
}
