//! Message channels between the two parties.

use std::{
    io::{Error, ErrorKind},
    pin::Pin,
    task::{Context, Poll},
};

use futures::{channel::mpsc, Sink, Stream};

/// A bidirectional, ordered message channel.
pub trait Channel<T>:
    Stream<Item = Result<T, std::io::Error>> + Sink<T, Error = std::io::Error> + Send + Unpin
{
}

impl<T, U> Channel<T> for U where
    U: Stream<Item = Result<T, std::io::Error>> + Sink<T, Error = std::io::Error> + Send + Unpin
{
}

/// In-memory channel connecting two parties in the same process.
#[derive(Debug)]
pub struct DuplexChannel<T> {
    sink: mpsc::Sender<T>,
    stream: mpsc::Receiver<T>,
}

impl<T> DuplexChannel<T>
where
    T: Send + 'static,
{
    /// Creates a connected pair of channels.
    pub fn new() -> (Self, Self) {
        Self::with_capacity(16)
    }

    /// Creates a connected pair of channels, each buffering up to
    /// `capacity` messages per direction.
    pub fn with_capacity(capacity: usize) -> (Self, Self) {
        let (tx_a, rx_a) = mpsc::channel(capacity);
        let (tx_b, rx_b) = mpsc::channel(capacity);

        (
            Self {
                sink: tx_a,
                stream: rx_b,
            },
            Self {
                sink: tx_b,
                stream: rx_a,
            },
        )
    }
}

fn closed(_: mpsc::SendError) -> Error {
    Error::new(ErrorKind::ConnectionAborted, "channel closed")
}

impl<T> Sink<T> for DuplexChannel<T>
where
    T: Send + 'static,
{
    type Error = Error;

    fn poll_ready(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Pin::new(&mut self.sink).poll_ready(cx).map_err(closed)
    }

    fn start_send(mut self: Pin<&mut Self>, item: T) -> Result<(), Self::Error> {
        Pin::new(&mut self.sink).start_send(item).map_err(closed)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Pin::new(&mut self.sink).poll_flush(cx).map_err(closed)
    }

    fn poll_close(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Pin::new(&mut self.sink).poll_close(cx).map_err(closed)
    }
}

impl<T> Stream for DuplexChannel<T> {
    type Item = Result<T, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.stream).poll_next(cx).map(|msg| msg.map(Ok))
    }
}

/// Receives the next message, which must be of the expected variant.
///
/// Evaluates to `Result<_, ProtocolError>`. An `Abort` from the peer maps to
/// `ProtocolError::PeerAborted`, a closed channel to
/// `ProtocolError::SessionClosed`. Use the `@unit` form for variants without
/// a payload.
#[macro_export]
macro_rules! expect_msg_or_err {
    (@other $msg:ident) => {
        match $msg {
            $crate::msg::Message::Abort(abort) => $crate::ProtocolError::PeerAborted {
                reason: abort.reason,
                retryable: abort.retryable,
            },
            other => $crate::ProtocolError::UnexpectedMessage(other.name()),
        }
    };
    ($channel:expr, @unit $expected:path) => {
        match futures::StreamExt::next(&mut $channel).await {
            Some(Ok($expected)) => Ok(()),
            Some(Ok(other)) => Err($crate::expect_msg_or_err!(@other other)),
            Some(Err(e)) => Err($crate::ProtocolError::from(e)),
            None => Err($crate::ProtocolError::SessionClosed),
        }
    };
    ($channel:expr, $expected:path) => {
        match futures::StreamExt::next(&mut $channel).await {
            Some(Ok($expected(msg))) => Ok(msg),
            Some(Ok(other)) => Err($crate::expect_msg_or_err!(@other other)),
            Some(Err(e)) => Err($crate::ProtocolError::from(e)),
            None => Err($crate::ProtocolError::SessionClosed),
        }
    };
}

#[cfg(test)]
mod tests {
    use futures::{SinkExt, StreamExt};

    use super::*;
    use crate::{
        msg::{Abort, Message},
        ProtocolError,
    };

    #[tokio::test]
    async fn test_duplex_channel() {
        let (mut a, mut b) = DuplexChannel::<u8>::new();

        a.send(1).await.unwrap();
        b.send(2).await.unwrap();

        assert_eq!(b.next().await.unwrap().unwrap(), 1);
        assert_eq!(a.next().await.unwrap().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_send_after_peer_dropped() {
        let (mut a, b) = DuplexChannel::<u8>::new();
        drop(b);

        let err = a.send(1).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ConnectionAborted);
    }

    #[tokio::test]
    async fn test_expect_msg_macro() {
        let (mut a, mut b) = DuplexChannel::<Message>::new();

        a.send(Message::SetSize(3)).await.unwrap();
        let size = expect_msg_or_err!(b, Message::SetSize).unwrap();
        assert_eq!(size, 3);

        a.send(Message::Ack).await.unwrap();
        expect_msg_or_err!(b, @unit Message::Ack).unwrap();

        a.send(Message::Ack).await.unwrap();
        let err = expect_msg_or_err!(b, Message::SetSize).unwrap_err();
        assert!(matches!(err, ProtocolError::UnexpectedMessage("Ack")));

        a.send(Message::Abort(Abort {
            reason: "bad".to_string(),
            retryable: true,
        }))
        .await
        .unwrap();
        let err = expect_msg_or_err!(b, @unit Message::Ack).unwrap_err();
        assert!(matches!(err, ProtocolError::PeerAborted { ref reason, .. } if reason == "bad"));
        assert!(err.is_retryable());

        drop(a);
        let err = expect_msg_or_err!(b, @unit Message::Finish).unwrap_err();
        assert!(matches!(err, ProtocolError::SessionClosed));
    }
}
