use crate::WireId;

/// An error that can occur when loading, validating or evaluating a circuit.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum CircuitError {
    #[error("malformed circuit graph: {0}")]
    MalformedGraph(String),
    #[error("unsupported gate type: {0}")]
    UnsupportedGateType(String),
    #[error("invalid number of input bits for {party}: expected {expected}, got {actual}")]
    InputLength {
        party: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("wire {0} was not assigned before use")]
    UninitializedWire(WireId),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CircuitError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedGraph(msg.into())
    }
}
