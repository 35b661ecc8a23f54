use std::error::Error;

use garble_core::CryptoError;
use ot_core::{ReceiverCoreError, SenderCoreError};
use yao_circuits::CircuitError;

use crate::{encoding::EncodingError, msg::Abort};

/// Errors that can occur during a protocol execution.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum ProtocolError {
    #[error(transparent)]
    Circuit(#[from] CircuitError),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error(transparent)]
    Ot(OtError),
    #[error("channel error: {0}")]
    Channel(#[from] std::io::Error),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error("received unexpected message: {0}")]
    UnexpectedMessage(&'static str),
    #[error("invalid input length: expected {expected} bits, got {actual}")]
    InputLength { expected: usize, actual: usize },
    #[error("received circuit {actual:?}, expected {expected:?}")]
    CircuitMismatch { expected: String, actual: String },
    #[error("received outputs for wires {actual:?}, expected {expected:?}")]
    InvalidOutput {
        expected: Vec<yao_circuits::WireId>,
        actual: Vec<yao_circuits::WireId>,
    },
    #[error("peer aborted: {reason}")]
    PeerAborted { reason: String, retryable: bool },
    #[error("session closed by peer")]
    SessionClosed,
    #[error("circuit has {actual} input bits, at most {max} can be enumerated")]
    TooManyInputs { max: usize, actual: usize },
}

impl ProtocolError {
    /// Returns whether a fresh execution may succeed where this one failed.
    ///
    /// This holds for failed oblivious transfers, on either side. A table that
    /// fails to decrypt is never retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProtocolError::Ot(_) => true,
            ProtocolError::PeerAborted { retryable, .. } => *retryable,
            _ => false,
        }
    }

    /// Returns whether the peer should be sent an abort for this error.
    ///
    /// Transport failures and aborts by the peer itself are not reported.
    pub(crate) fn notifies_peer(&self) -> bool {
        !matches!(
            self,
            ProtocolError::Channel(_)
                | ProtocolError::SessionClosed
                | ProtocolError::PeerAborted { .. }
        )
    }

    pub(crate) fn to_abort(&self) -> Abort {
        Abort {
            reason: self.to_string(),
            retryable: self.is_retryable(),
        }
    }
}

/// Errors that can occur during an oblivious transfer.
#[derive(Debug, thiserror::Error)]
pub enum OtError {
    /// The transfer did not complete.
    #[error("oblivious transfer failed: {0}")]
    TransferFailed(Box<dyn Error + Send + Sync + 'static>),
}

impl OtError {
    pub(crate) fn transfer<E>(err: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync + 'static>>,
    {
        Self::TransferFailed(err.into())
    }
}

impl From<SenderCoreError> for OtError {
    fn from(err: SenderCoreError) -> Self {
        Self::transfer(err)
    }
}

impl From<ReceiverCoreError> for OtError {
    fn from(err: ReceiverCoreError) -> Self {
        Self::transfer(err)
    }
}

impl From<std::io::Error> for OtError {
    fn from(err: std::io::Error) -> Self {
        Self::transfer(err)
    }
}

impl From<OtError> for ProtocolError {
    /// Transport failures and peer aborts that interrupted a transfer are
    /// reported as such.
    fn from(err: OtError) -> Self {
        let OtError::TransferFailed(source) = err;
        match source.downcast::<ProtocolError>() {
            Ok(err) => match *err {
                err @ (ProtocolError::Channel(_)
                | ProtocolError::SessionClosed
                | ProtocolError::PeerAborted { .. }) => err,
                err => ProtocolError::Ot(OtError::transfer(err)),
            },
            Err(source) => match source.downcast::<std::io::Error>() {
                Ok(err) => ProtocolError::Channel(*err),
                Err(source) => ProtocolError::Ot(OtError::TransferFailed(source)),
            },
        }
    }
}

impl From<ProtocolError> for OtError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Ot(err) => err,
            err => Self::transfer(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Error, ErrorKind};

    use garble_core::CryptoError;

    use super::*;

    #[test]
    fn test_decryption_failure_is_not_retryable() {
        let err = ProtocolError::Crypto(CryptoError::DecryptionFailed { gate: 3 });

        assert!(!err.is_retryable());
        assert!(err.notifies_peer());
        assert!(!err.to_abort().retryable);
    }

    #[test]
    fn test_transfer_failure_is_retryable() {
        let err = ProtocolError::from(OtError::transfer("invalid point"));

        assert!(matches!(err, ProtocolError::Ot(_)));
        assert!(err.is_retryable());
        assert!(err.to_abort().retryable);
    }

    #[test]
    fn test_peer_abort_during_transfer_is_not_echoed() {
        let aborted = ProtocolError::PeerAborted {
            reason: "oblivious transfer failed".to_string(),
            retryable: true,
        };

        let err = ProtocolError::from(OtError::from(aborted));

        assert!(matches!(err, ProtocolError::PeerAborted { retryable: true, .. }));
        assert!(err.is_retryable());
        assert!(!err.notifies_peer());
    }

    #[test]
    fn test_transport_failure_during_transfer_is_not_echoed() {
        let closed = OtError::from(Error::new(ErrorKind::ConnectionAborted, "channel closed"));
        let err = ProtocolError::from(closed);
        assert!(matches!(err, ProtocolError::Channel(_)));
        assert!(!err.notifies_peer());

        let err = ProtocolError::from(OtError::from(ProtocolError::SessionClosed));
        assert!(matches!(err, ProtocolError::SessionClosed));
        assert!(!err.notifies_peer());
    }

    #[test]
    fn test_unexpected_message_during_transfer_stays_a_transfer_failure() {
        let err = ProtocolError::from(OtError::from(ProtocolError::UnexpectedMessage("Ack")));

        assert!(matches!(err, ProtocolError::Ot(_)));
        assert!(err.notifies_peer());
    }
}
