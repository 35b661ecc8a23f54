/// Errors that may occur when using the OT sender.
#[derive(Debug, thiserror::Error, PartialEq)]
#[allow(missing_docs)]
pub enum SenderCoreError {
    #[error("bad state: expected {0}, got {1}")]
    BadState(String, String),
    #[error("number of inputs does not match number of choices: expected {expected}, got {actual}")]
    CountMismatch { expected: usize, actual: usize },
    #[error("receiver sent an invalid point")]
    InvalidPoint,
}

/// Errors that may occur when using the OT receiver.
#[derive(Debug, thiserror::Error, PartialEq)]
#[allow(missing_docs)]
pub enum ReceiverCoreError {
    #[error("bad state: expected {0}, got {1}")]
    BadState(String, String),
    #[error("number of ciphertexts does not match number of choices: expected {expected}, got {actual}")]
    CountMismatch { expected: usize, actual: usize },
    #[error("sender sent an invalid point")]
    InvalidPoint,
    #[error("ciphertext has wrong length: expected {expected}, got {actual}")]
    CiphertextLength { expected: usize, actual: usize },
}
