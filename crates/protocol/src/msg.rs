//! Messages exchanged by the parties.

use std::collections::BTreeMap;

use garble_core::{GarbledTable, Label};
use ot_core::msgs::{ReceiverSetup, SenderPayload, SenderSetup};
use serde::{Deserialize, Serialize};
use yao_circuits::{Circuit, WireId};

/// Top-level protocol message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum Message {
    GarbledCircuit(GarbledCircuit),
    Ack,
    GarblerInputs(BTreeMap<WireId, Label>),
    Ot(OtMessage),
    InsecureLabels(Vec<[Label; 2]>),
    Output(BTreeMap<WireId, bool>),
    Abort(Abort),
    Finish,
    SetSize(u64),
}

impl Message {
    /// Returns the name of the message variant, for error reporting.
    pub fn name(&self) -> &'static str {
        match self {
            Message::GarbledCircuit(_) => "GarbledCircuit",
            Message::Ack => "Ack",
            Message::GarblerInputs(_) => "GarblerInputs",
            Message::Ot(OtMessage::SenderSetup(_)) => "Ot(SenderSetup)",
            Message::Ot(OtMessage::ReceiverSetup(_)) => "Ot(ReceiverSetup)",
            Message::Ot(OtMessage::SenderPayload(_)) => "Ot(SenderPayload)",
            Message::InsecureLabels(_) => "InsecureLabels",
            Message::Output(_) => "Output",
            Message::Abort(_) => "Abort",
            Message::Finish => "Finish",
            Message::SetSize(_) => "SetSize",
        }
    }
}

/// What the evaluator learns about a garbled circuit.
///
/// The circuit is validated again when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarbledCircuit {
    /// The circuit.
    pub circuit: Circuit,
    /// One table per gate, in gate order.
    pub tables: Vec<GarbledTable>,
    /// Permute bits of the output wires.
    pub pbits_out: BTreeMap<WireId, bool>,
}

/// Sent instead of the next expected message when a party gives up on an
/// execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Abort {
    /// Why the execution was given up.
    pub reason: String,
    /// Whether the sender will take part in a fresh execution.
    pub retryable: bool,
}

/// Oblivious transfer messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum OtMessage {
    SenderSetup(SenderSetup),
    ReceiverSetup(ReceiverSetup),
    SenderPayload(SenderPayload),
}

impl From<OtMessage> for Message {
    fn from(msg: OtMessage) -> Self {
        Message::Ot(msg)
    }
}
