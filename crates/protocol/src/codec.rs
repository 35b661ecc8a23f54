//! Bincode message framing over a byte stream.

use std::{
    io::{Error, ErrorKind},
    marker::PhantomData,
    pin::Pin,
    task::{Context, Poll},
};

use bytes::Bytes;
use futures::{ready, Sink, Stream};
use serde::{de::DeserializeOwned, Serialize};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{Framed, LengthDelimitedCodec};

/// Maximum accepted frame length. A garbled 32-bit equality circuit is well
/// below this.
pub const MAX_FRAME_LEN: usize = 64 * 1024 * 1024;

/// A [`Channel`](crate::Channel) sending bincode encoded messages in
/// length-delimited frames.
#[derive(Debug)]
pub struct BincodeChannel<S, T> {
    framed: Framed<S, LengthDelimitedCodec>,
    _msg: PhantomData<fn(T) -> T>,
}

impl<S, T> BincodeChannel<S, T>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Attaches the codec to a byte stream, e.g. a TCP connection.
    pub fn new(stream: S) -> Self {
        let framed = LengthDelimitedCodec::builder()
            .max_frame_length(MAX_FRAME_LEN)
            .new_framed(stream);

        Self {
            framed,
            _msg: PhantomData,
        }
    }

    /// Returns the underlying byte stream.
    pub fn into_inner(self) -> S {
        self.framed.into_inner()
    }
}

fn invalid_data(err: bincode::Error) -> Error {
    Error::new(ErrorKind::InvalidData, err)
}

impl<S, T> Stream for BincodeChannel<S, T>
where
    S: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    type Item = Result<T, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let frame = ready!(Pin::new(&mut self.framed).poll_next(cx));

        Poll::Ready(frame.map(|frame| frame.and_then(|bytes| {
            bincode::deserialize(&bytes).map_err(invalid_data)
        })))
    }
}

impl<S, T> Sink<T> for BincodeChannel<S, T>
where
    S: AsyncWrite + Unpin,
    T: Serialize,
{
    type Error = Error;

    fn poll_ready(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Sink::<Bytes>::poll_ready(Pin::new(&mut self.framed), cx)
    }

    fn start_send(mut self: Pin<&mut Self>, item: T) -> Result<(), Self::Error> {
        let bytes = bincode::serialize(&item).map_err(invalid_data)?;

        Pin::new(&mut self.framed).start_send(Bytes::from(bytes))
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Sink::<Bytes>::poll_flush(Pin::new(&mut self.framed), cx)
    }

    fn poll_close(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Sink::<Bytes>::poll_close(Pin::new(&mut self.framed), cx)
    }
}
