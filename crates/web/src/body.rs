use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body::{Body as HttpBody, Frame, SizeHint};
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty};
use tokio::sync::Mutex;

use crate::error::BoxError;

/// One step of the inbound body as seen by body consuming middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyEvent {
    /// A chunk of bytes, in arrival order.
    Data(Bytes),
    /// The body ended. Every following call yields `End` again.
    End,
}

/// The raw request body, readable once.
///
/// The body sits behind a lock only so that [`Request`](crate::Request) stays
/// `Sync`; reading goes through `&mut self` and never waits on it.
pub struct RawBody {
    inner: Mutex<UnsyncBoxBody<Bytes, BoxError>>,
    finished: bool,
}

impl RawBody {
    pub fn new<B>(body: B) -> Self
    where
        B: HttpBody<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        Self { inner: Mutex::new(body.map_err(Into::into).boxed_unsync()), finished: false }
    }

    pub fn empty() -> Self {
        Self::new(Empty::<Bytes>::new())
    }

    /// Waits for the next data chunk or the end of the body.
    ///
    /// Trailers are skipped. A transport error is returned as is and leaves the
    /// body finished.
    pub async fn next_event(&mut self) -> Result<BodyEvent, BoxError> {
        if self.finished {
            return Ok(BodyEvent::End);
        }

        let body = self.inner.get_mut();
        loop {
            match body.frame().await {
                Some(Ok(frame)) => {
                    if let Ok(data) = frame.into_data() {
                        if data.is_empty() {
                            continue;
                        }
                        return Ok(BodyEvent::Data(data));
                    }
                }
                Some(Err(e)) => {
                    self.finished = true;
                    return Err(e);
                }
                None => {
                    self.finished = true;
                    return Ok(BodyEvent::End);
                }
            }
        }
    }
}

impl std::fmt::Debug for RawBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawBody").field("finished", &self.finished).finish()
    }
}

/// Outbound body handed back to the transport: the buffered payload of a
/// finalized [`Response`](crate::Response), or nothing.
#[derive(Debug)]
pub struct ResponseBody {
    inner: Option<Bytes>,
}

impl ResponseBody {
    pub fn empty() -> Self {
        Self { inner: None }
    }

    pub fn once(bytes: Bytes) -> Self {
        if bytes.is_empty() { Self::empty() } else { Self { inner: Some(bytes) } }
    }
}

impl From<Option<Bytes>> for ResponseBody {
    fn from(option: Option<Bytes>) -> Self {
        match option {
            Some(bytes) => Self::once(bytes),
            None => Self::empty(),
        }
    }
}

impl From<&'static str> for ResponseBody {
    fn from(value: &'static str) -> Self {
        Self::once(Bytes::from_static(value.as_bytes()))
    }
}

impl HttpBody for ResponseBody {
    type Data = Bytes;
    type Error = BoxError;

    fn poll_frame(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        Poll::Ready(self.get_mut().inner.take().map(|bytes| Ok(Frame::data(bytes))))
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_none()
    }

    fn size_hint(&self) -> SizeHint {
        match &self.inner {
            None => SizeHint::with_exact(0),
            Some(bytes) => SizeHint::with_exact(bytes.len() as u64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use http_body_util::{Full, StreamBody};
    use std::convert::Infallible;

    fn check_send_sync<T: Send + Sync>() {}

    #[test]
    fn bodies_are_send_and_sync() {
        check_send_sync::<RawBody>();
        check_send_sync::<ResponseBody>();
    }

    #[tokio::test]
    async fn raw_body_yields_chunks_then_end() {
        let chunks: Vec<Result<_, Infallible>> = vec![
            Ok(Frame::data(Bytes::from_static(b"hello "))),
            Ok(Frame::data(Bytes::new())),
            Ok(Frame::data(Bytes::from_static(b"world"))),
        ];
        let mut body = RawBody::new(StreamBody::new(stream::iter(chunks)));

        assert_eq!(body.next_event().await.unwrap(), BodyEvent::Data(Bytes::from_static(b"hello ")));
        assert_eq!(body.next_event().await.unwrap(), BodyEvent::Data(Bytes::from_static(b"world")));
        assert_eq!(body.next_event().await.unwrap(), BodyEvent::End);
        assert_eq!(body.next_event().await.unwrap(), BodyEvent::End);
    }

    #[tokio::test]
    async fn raw_body_reports_transport_errors() {
        let chunks: Vec<Result<Frame<Bytes>, std::io::Error>> = vec![
            Ok(Frame::data(Bytes::from_static(b"partial"))),
            Err(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "connection reset")),
        ];
        let mut body = RawBody::new(StreamBody::new(stream::iter(chunks)));

        assert_eq!(body.next_event().await.unwrap(), BodyEvent::Data(Bytes::from_static(b"partial")));
        assert_eq!(body.next_event().await.unwrap_err().to_string(), "connection reset");
        assert_eq!(body.next_event().await.unwrap(), BodyEvent::End);
    }

    #[tokio::test]
    async fn empty_raw_body_ends_immediately() {
        let mut body = RawBody::empty();
        assert_eq!(body.next_event().await.unwrap(), BodyEvent::End);

        let mut body = RawBody::new(Full::new(Bytes::new()));
        assert_eq!(body.next_event().await.unwrap(), BodyEvent::End);
    }

    #[tokio::test]
    async fn response_body_once() {
        let mut body = ResponseBody::once(Bytes::from_static(b"Hello world"));

        assert_eq!(body.size_hint().exact(), Some(11));
        assert!(!body.is_end_stream());

        let bytes = body.frame().await.unwrap().unwrap().into_data().unwrap();
        assert_eq!(bytes, Bytes::from_static(b"Hello world"));

        assert!(body.is_end_stream());
        assert!(body.frame().await.is_none());
    }

    #[tokio::test]
    async fn response_body_empty() {
        let mut body = ResponseBody::from("");

        assert!(body.is_end_stream());
        assert_eq!(body.size_hint().exact(), Some(0));
        assert!(body.frame().await.is_none());
    }
}
