use std::pin::Pin;
use std::task::{Context, Poll, ready};

use bytes::Bytes;
use futures::channel::mpsc;
use futures::{SinkExt, Stream, StreamExt};
use http_body::{Body, Frame};
use tracing::{error, info};

use crate::protocol::{Message, ParseError, PayloadItem, PayloadSize, RequestHeader};

const BODY_CHANNEL_CAPACITY: usize = 16;

type PayloadResult = Result<PayloadItem, ParseError>;

/// Consumer side of a request body.
///
/// Yields each decoded chunk as a data frame and ends when the payload ends.
#[derive(Debug)]
pub struct ReqBody {
    receiver: mpsc::Receiver<PayloadResult>,
    finished: bool,
}

impl ReqBody {
    /// Pairs a body with the sender that pulls payload items off `payload_stream`.
    pub fn body_channel<S>(payload_stream: &mut S) -> (ReqBody, ReqBodySender<'_, S>)
    where
        S: Stream + Unpin,
    {
        let (sender, receiver) = mpsc::channel(BODY_CHANNEL_CAPACITY);
        (ReqBody { receiver, finished: false }, ReqBodySender { payload_stream, sender, eof: false })
    }
}

/// Producer side of a request body, borrowing the connection's payload stream.
#[derive(Debug)]
pub struct ReqBodySender<'conn, S>
where
    S: Stream + Unpin,
{
    payload_stream: &'conn mut S,
    sender: mpsc::Sender<PayloadResult>,
    eof: bool,
}

impl<S> ReqBodySender<'_, S>
where
    S: Stream<Item = Result<Message<(RequestHeader, PayloadSize)>, ParseError>> + Unpin,
{
    /// Forwards payload items to the [`ReqBody`] until the end of the payload
    /// or until the body is dropped.
    pub async fn send_body(&mut self) -> Result<(), ParseError> {
        while !self.eof {
            let payload_item = self.next_payload_item().await?;
            self.eof = payload_item.is_eof();

            if self.sender.send(Ok(payload_item)).await.is_err() {
                // the handler dropped the body, the rest is drained by skip_body
                return Ok(());
            }
        }
        Ok(())
    }

    /// Drains whatever the handler left unread so the next request starts
    /// at a clean position.
    pub async fn skip_body(&mut self) -> Result<(), ParseError> {
        let mut size: usize = 0;
        while !self.eof {
            let payload_item = self.next_payload_item().await?;
            self.eof = payload_item.is_eof();
            if let Some(bytes) = payload_item.as_bytes() {
                size += bytes.len();
            }
        }

        if size > 0 {
            info!(size, "skip request body");
        }
        Ok(())
    }

    /// The stream the payload is read from, for callers that need to look at
    /// the connection once the body is done.
    pub(crate) fn payload_stream(&mut self) -> &mut S {
        &mut *self.payload_stream
    }

    async fn next_payload_item(&mut self) -> Result<PayloadItem, ParseError> {
        let result = match self.payload_stream.next().await {
            Some(Ok(Message::Payload(payload_item))) => return Ok(payload_item),
            Some(Ok(Message::Header(_))) => {
                error!("received header while reading body");
                ParseError::invalid_body("received header while reading body")
            }
            Some(Err(e)) => e,
            None => ParseError::invalid_body("connection closed before the body ended"),
        };

        // let the reading side observe the failure as well
        self.eof = true;
        let _ = self.sender.send(Err(ParseError::invalid_body(&result))).await;
        Err(result)
    }
}

impl Body for ReqBody {
    type Data = Bytes;
    type Error = ParseError;

    fn poll_frame(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        loop {
            if self.finished {
                return Poll::Ready(None);
            }

            return match ready!(self.receiver.poll_next_unpin(cx)) {
                Some(Ok(PayloadItem::Chunk(bytes))) if bytes.is_empty() => continue,
                Some(Ok(PayloadItem::Chunk(bytes))) => Poll::Ready(Some(Ok(Frame::data(bytes)))),
                Some(Ok(PayloadItem::Eof)) => {
                    self.finished = true;
                    Poll::Ready(None)
                }
                Some(Err(e)) => {
                    self.finished = true;
                    Poll::Ready(Some(Err(e)))
                }
                None => {
                    self.finished = true;
                    Poll::Ready(Some(Err(ParseError::invalid_body("body sender closed before eof"))))
                }
            };
        }
    }

    fn is_end_stream(&self) -> bool {
        self.finished
    }
}
