//! JSON circuit descriptions.
//!
//! A circuit file holds a named list of circuits:
//!
//! ```json
//! {
//!   "name": "eq_4",
//!   "circuits": [
//!     { "id": "4-bit EQ", "alice": [1, 2, 3, 4], "bob": [5, 6, 7, 8], "out": [15],
//!       "gates": [ { "id": 9, "type": "XNOR", "in": [1, 5] }, ... ] }
//!   ]
//! }
//! ```
//!
//! These types are unchecked. A [`Circuit`] is obtained from a [`CircuitSpec`]
//! only through validation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Circuit, CircuitError, WireId};

/// A named collection of circuit descriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitFile {
    /// Name of the collection.
    pub name: String,
    /// Circuit descriptions, in execution order.
    pub circuits: Vec<CircuitSpec>,
}

/// Unchecked description of a single circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitSpec {
    /// Circuit identifier.
    pub id: String,
    /// Input wires owned by the garbler.
    #[serde(default)]
    pub alice: Vec<WireId>,
    /// Input wires owned by the evaluator.
    #[serde(default)]
    pub bob: Vec<WireId>,
    /// Output wires.
    pub out: Vec<WireId>,
    /// Gates, identified by their output wire.
    pub gates: Vec<GateSpec>,
}

/// Unchecked description of a gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateSpec {
    /// Gate id, which is also the id of its output wire.
    pub id: WireId,
    /// Gate type, e.g. `AND`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Input wires.
    #[serde(rename = "in")]
    pub inputs: Vec<WireId>,
}

impl CircuitFile {
    /// Parses a circuit file from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, CircuitError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a circuit file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CircuitError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let file = Self::from_json(&json)?;

        tracing::debug!(
            name = %file.name,
            circuits = file.circuits.len(),
            "loaded circuit file {}",
            path.as_ref().display()
        );

        Ok(file)
    }

    /// Serializes the circuit file to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, CircuitError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validates every circuit in the file.
    ///
    /// Fails on the first malformed circuit, before any circuit is used.
    pub fn validate(&self) -> Result<Vec<Circuit>, CircuitError> {
        self.circuits.iter().cloned().map(Circuit::validate).collect()
    }
}

impl CircuitSpec {
    /// Validates this description, see [`Circuit::validate`].
    pub fn validate(self) -> Result<Circuit, CircuitError> {
        Circuit::validate(self)
    }
}
