use std::{collections::BTreeMap, sync::Arc};

use rand::{CryptoRng, Rng};
use serde::{Deserialize, Serialize};
use yao_circuits::{Circuit, WireId};

use crate::{msg::Message, Channel, Evaluator, Garbler, LocalSimulator, ProtocolError};

/// The result of one execution, as seen by one party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    circuit: String,
    inputs: Vec<bool>,
    outputs: BTreeMap<WireId, bool>,
}

impl Outcome {
    pub(crate) fn new(circuit: &str, inputs: Vec<bool>, outputs: BTreeMap<WireId, bool>) -> Self {
        Self {
            circuit: circuit.to_string(),
            inputs,
            outputs,
        }
    }

    /// Returns the id of the executed circuit.
    pub fn circuit(&self) -> &str {
        &self.circuit
    }

    /// Returns the party's own input bits.
    pub fn inputs(&self) -> &[bool] {
        &self.inputs
    }

    /// Returns the value of every output wire.
    pub fn outputs(&self) -> &BTreeMap<WireId, bool> {
        &self.outputs
    }

    /// Returns the output values in ascending wire order.
    pub fn output_bits(&self) -> Vec<bool> {
        self.outputs.values().copied().collect()
    }
}

/// A party of the two-party protocol.
#[allow(clippy::large_enum_variant)]
pub enum Party<C, R> {
    /// Garbles and sends circuits.
    Garbler(Garbler<C, R>),
    /// Receives and evaluates circuits.
    Evaluator(Evaluator<C, R>),
    /// Plays both roles in process.
    Local(LocalSimulator<R>),
}

impl<C, R> Party<C, R>
where
    C: Channel<Message>,
    R: Rng + CryptoRng + Send,
{
    /// Runs one execution of `circ`.
    ///
    /// `input` holds the bits of the party's own wires. A local party holds
    /// both: the garbler's bits followed by the evaluator's.
    pub async fn run(
        &mut self,
        circ: Arc<Circuit>,
        input: &[bool],
    ) -> Result<Outcome, ProtocolError> {
        match self {
            Party::Garbler(garbler) => garbler.run(circ, input).await,
            Party::Evaluator(evaluator) => evaluator.run(&circ, input).await,
            Party::Local(simulator) => simulator.run(circ, input),
        }
    }

    /// Ends the session.
    ///
    /// The garbler notifies the evaluator, which waits for it.
    pub async fn finish(&mut self) -> Result<(), ProtocolError> {
        match self {
            Party::Garbler(garbler) => garbler.finish().await,
            Party::Evaluator(evaluator) => evaluator.await_finish().await,
            Party::Local(_) => Ok(()),
        }
    }
}
