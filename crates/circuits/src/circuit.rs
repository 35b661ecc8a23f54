use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fmt,
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{
    spec::{CircuitSpec, GateSpec},
    CircuitError, WireId,
};

/// Boolean gate types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateType {
    /// Conjunction.
    And,
    /// Disjunction.
    Or,
    /// Exclusive or.
    Xor,
    /// Negated exclusive or (bit equality).
    Xnor,
    /// Negation.
    Not,
}

impl GateType {
    /// Returns the number of inputs the gate takes.
    pub fn arity(&self) -> usize {
        match self {
            GateType::Not => 1,
            _ => 2,
        }
    }

    /// Returns the name used in circuit descriptions.
    pub fn as_str(&self) -> &'static str {
        match self {
            GateType::And => "AND",
            GateType::Or => "OR",
            GateType::Xor => "XOR",
            GateType::Xnor => "XNOR",
            GateType::Not => "NOT",
        }
    }

    /// Evaluates the gate's truth table.
    ///
    /// `inputs` must hold exactly [`arity`](Self::arity) values.
    pub fn eval(&self, inputs: &[bool]) -> bool {
        debug_assert_eq!(inputs.len(), self.arity());

        let x = inputs.first().copied().unwrap_or_default();
        let y = inputs.get(1).copied().unwrap_or_default();

        match self {
            GateType::And => x & y,
            GateType::Or => x | y,
            GateType::Xor => x ^ y,
            GateType::Xnor => !(x ^ y),
            GateType::Not => !x,
        }
    }
}

impl FromStr for GateType {
    type Err = CircuitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AND" => Ok(GateType::And),
            "OR" => Ok(GateType::Or),
            "XOR" => Ok(GateType::Xor),
            "XNOR" => Ok(GateType::Xnor),
            "NOT" => Ok(GateType::Not),
            other => Err(CircuitError::UnsupportedGateType(other.to_string())),
        }
    }
}

impl fmt::Display for GateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A gate. Its id doubles as the id of its output wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gate {
    id: WireId,
    kind: GateType,
    inputs: Vec<WireId>,
}

impl Gate {
    /// Creates a new gate.
    pub fn new(id: WireId, kind: GateType, inputs: Vec<WireId>) -> Self {
        Self { id, kind, inputs }
    }

    /// Returns the gate id (its output wire).
    pub fn id(&self) -> WireId {
        self.id
    }

    /// Returns the gate type.
    pub fn kind(&self) -> GateType {
        self.kind
    }

    /// Returns the input wires.
    pub fn inputs(&self) -> &[WireId] {
        &self.inputs
    }
}

/// A validated boolean circuit between two parties.
///
/// Gates are stored in ascending id order, which is the order in which they
/// are garbled and evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CircuitSpec", into = "CircuitSpec")]
pub struct Circuit {
    id: String,
    alice: Vec<WireId>,
    bob: Vec<WireId>,
    outputs: Vec<WireId>,
    gates: Vec<Gate>,
}

impl Circuit {
    /// Builds a circuit from its parts, validating it.
    pub fn new(
        id: impl Into<String>,
        alice: Vec<WireId>,
        bob: Vec<WireId>,
        outputs: Vec<WireId>,
        gates: Vec<Gate>,
    ) -> Result<Self, CircuitError> {
        Self::validate(CircuitSpec {
            id: id.into(),
            alice,
            bob,
            out: outputs,
            gates: gates.into_iter().map(GateSpec::from).collect(),
        })
    }

    /// Validates a circuit description.
    ///
    /// Checks that the two parties' input wires are disjoint, that every wire
    /// id is defined once, that gate arities match their types, that every
    /// gate input is an input wire or the output of a gate with a smaller id,
    /// and that every output wire is defined.
    pub fn validate(spec: CircuitSpec) -> Result<Self, CircuitError> {
        let CircuitSpec {
            id,
            alice,
            bob,
            out,
            gates,
        } = spec;

        if let Some(wire) = alice.iter().find(|wire| bob.contains(wire)) {
            return Err(CircuitError::malformed(format!(
                "wire {wire} is assigned to both parties"
            )));
        }

        let mut defined: HashSet<WireId> = HashSet::with_capacity(alice.len() + bob.len());
        for &wire in alice.iter().chain(bob.iter()) {
            if !defined.insert(wire) {
                return Err(CircuitError::malformed(format!(
                    "input wire {wire} is declared more than once"
                )));
            }
        }

        let mut gates = gates
            .into_iter()
            .map(|gate| {
                let kind = gate.kind.parse::<GateType>()?;
                Ok(Gate::new(gate.id, kind, gate.inputs))
            })
            .collect::<Result<Vec<_>, CircuitError>>()?;
        gates.sort_by_key(|gate| gate.id);

        for gate in &gates {
            if gate.inputs.len() != gate.kind.arity() {
                return Err(CircuitError::malformed(format!(
                    "gate {} of type {} expects {} inputs, got {}",
                    gate.id,
                    gate.kind,
                    gate.kind.arity(),
                    gate.inputs.len()
                )));
            }

            if let Some(wire) = gate.inputs.iter().find(|wire| !defined.contains(wire)) {
                return Err(CircuitError::malformed(format!(
                    "gate {} reads wire {wire} which is neither an input nor an earlier gate",
                    gate.id
                )));
            }

            if !defined.insert(gate.id) {
                return Err(CircuitError::malformed(format!(
                    "wire {} is defined more than once",
                    gate.id
                )));
            }
        }

        if out.is_empty() {
            return Err(CircuitError::malformed(format!(
                "circuit {id} has no output wires"
            )));
        }

        if let Some(wire) = out.iter().find(|wire| !defined.contains(wire)) {
            return Err(CircuitError::malformed(format!(
                "output wire {wire} is not defined"
            )));
        }

        Ok(Self {
            id,
            alice,
            bob,
            outputs: out,
            gates,
        })
    }

    /// Returns the circuit id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the garbler's input wires.
    pub fn alice(&self) -> &[WireId] {
        &self.alice
    }

    /// Returns the evaluator's input wires.
    pub fn bob(&self) -> &[WireId] {
        &self.bob
    }

    /// Returns the output wires.
    pub fn outputs(&self) -> &[WireId] {
        &self.outputs
    }

    /// Returns the gates in evaluation order.
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Returns the number of input wires of both parties.
    pub fn input_len(&self) -> usize {
        self.alice.len() + self.bob.len()
    }

    /// Returns every wire of the circuit: inputs first, then gate outputs.
    pub fn wires(&self) -> impl Iterator<Item = WireId> + '_ {
        self.alice
            .iter()
            .chain(self.bob.iter())
            .copied()
            .chain(self.gates.iter().map(Gate::id))
    }

    /// Evaluates the circuit in the clear.
    ///
    /// # Arguments
    ///
    /// * `alice` - Bits for the garbler's wires, in declaration order.
    /// * `bob` - Bits for the evaluator's wires, in declaration order.
    ///
    /// # Returns
    ///
    /// The value of every output wire.
    pub fn evaluate(
        &self,
        alice: &[bool],
        bob: &[bool],
    ) -> Result<BTreeMap<WireId, bool>, CircuitError> {
        check_len("alice", self.alice.len(), alice.len())?;
        check_len("bob", self.bob.len(), bob.len())?;

        let mut values: HashMap<WireId, bool> = self
            .alice
            .iter()
            .copied()
            .zip(alice.iter().copied())
            .chain(self.bob.iter().copied().zip(bob.iter().copied()))
            .collect();

        for gate in &self.gates {
            let inputs = gate
                .inputs
                .iter()
                .map(|wire| {
                    values
                        .get(wire)
                        .copied()
                        .ok_or(CircuitError::UninitializedWire(*wire))
                })
                .collect::<Result<Vec<bool>, _>>()?;

            values.insert(gate.id, gate.kind.eval(&inputs));
        }

        self.outputs
            .iter()
            .map(|wire| {
                values
                    .get(wire)
                    .map(|value| (*wire, *value))
                    .ok_or(CircuitError::UninitializedWire(*wire))
            })
            .collect()
    }
}

fn check_len(party: &'static str, expected: usize, actual: usize) -> Result<(), CircuitError> {
    if expected != actual {
        return Err(CircuitError::InputLength {
            party,
            expected,
            actual,
        });
    }

    Ok(())
}

impl TryFrom<CircuitSpec> for Circuit {
    type Error = CircuitError;

    fn try_from(spec: CircuitSpec) -> Result<Self, Self::Error> {
        Self::validate(spec)
    }
}

impl From<Gate> for GateSpec {
    fn from(gate: Gate) -> Self {
        Self {
            id: gate.id,
            kind: gate.kind.as_str().to_string(),
            inputs: gate.inputs,
        }
    }
}

impl From<Circuit> for CircuitSpec {
    fn from(circuit: Circuit) -> Self {
        Self {
            id: circuit.id,
            alice: circuit.alice,
            bob: circuit.bob,
            out: circuit.outputs,
            gates: circuit.gates.into_iter().map(GateSpec::from).collect(),
        }
    }
}
