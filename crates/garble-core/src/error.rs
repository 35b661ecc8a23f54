use yao_circuits::WireId;

/// Errors that can occur while garbling or evaluating a circuit.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum CryptoError {
    #[error("decryption of gate {gate} failed")]
    DecryptionFailed { gate: WireId },
    #[error("encryption of gate {gate} failed")]
    EncryptionFailed { gate: WireId },
    #[error("missing input label for wire {0}")]
    MissingInput(WireId),
    #[error("malformed garbled table for gate {gate}")]
    MalformedTable { gate: WireId },
    #[error("missing permute bit for output wire {0}")]
    MissingOutputPbit(WireId),
    #[error("wire {0} is not part of the circuit")]
    UnknownWire(WireId),
}
