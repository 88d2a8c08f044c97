use std::error::Error;
use std::fmt::Display;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use futures::{SinkExt, StreamExt};
use http::header::{CONNECTION, EXPECT};
use http::{HeaderValue, Response, StatusCode, Version};
use http_body::Body;
use http_body_util::{BodyExt, Empty};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::select;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, error, info, warn};

use crate::codec::{RequestDecoder, ResponseEncoder};
use crate::handler::Handler;
use crate::protocol::body::{ReqBody, ReqBodySender};
use crate::protocol::{HttpError, Message, ParseError, PayloadItem, PayloadSize, RequestHeader, ResponseHead, SendError};

const PEER_READ_SIZE: usize = 1024;

/// One client connection.
///
/// Requests are processed strictly one after another; the handler for a
/// request runs concurrently with the streaming of that request's body.
#[derive(Debug)]
pub struct HttpConnection<R, W> {
    framed_read: FramedRead<R, RequestDecoder>,
    framed_write: FramedWrite<W, ResponseEncoder>,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            framed_read: FramedRead::with_capacity(reader, RequestDecoder::new(), 8 * 1024),
            framed_write: FramedWrite::new(writer, ResponseEncoder::new()),
        }
    }

    pub async fn process<H>(mut self, handler: Arc<H>) -> Result<(), HttpError>
    where
        H: Handler,
        H::RespBody: Body<Data = Bytes> + Unpin,
        <H::RespBody as Body>::Error: Display,
    {
        loop {
            match self.framed_read.next().await {
                Some(Ok(Message::Header((header, _payload_size)))) => {
                    let keep_alive = keep_alive(&header);
                    if !self.do_process(header, handler.as_ref()).await? {
                        return Ok(());
                    }
                    if !keep_alive {
                        info!("client asked to close, connection shutdown");
                        return Ok(());
                    }
                }

                Some(Ok(Message::Payload(_))) => {
                    error!("received payload while expecting a request head");
                    self.do_send_response(build_error_response(StatusCode::BAD_REQUEST)).await?;
                    return Err(ParseError::invalid_body("need header while receive body").into());
                }

                Some(Err(e)) => {
                    error!("can't receive next request, cause {}", e);
                    self.do_send_response(build_error_response(StatusCode::BAD_REQUEST)).await?;
                    return Err(e.into());
                }

                None => {
                    debug!("peer closed the connection");
                    return Ok(());
                }
            }
        }
    }

    /// Serves one request. Returns `false` when the peer went away before a
    /// response was produced; the pending handler is dropped in that case.
    async fn do_process<H>(&mut self, header: RequestHeader, handler: &H) -> Result<bool, HttpError>
    where
        H: Handler,
        H::RespBody: Body<Data = Bytes> + Unpin,
        <H::RespBody as Body>::Error: Display,
    {
        if let Some(value) = header.headers().get(EXPECT) {
            if value.as_bytes().eq_ignore_ascii_case(b"100-continue") {
                let writer = self.framed_write.get_mut();
                writer.write_all(b"HTTP/1.1 100 Continue\r\n\r\n").await.map_err(SendError::io)?;
                writer.flush().await.map_err(SendError::io)?;
                debug!("received expect header, sent continue response");
            }
        }

        let (req_body, mut body_sender) = ReqBody::body_channel(&mut self.framed_read);
        let request = header.body(req_body);

        // the handler may wait for body chunks, so both futures are polled
        // together until the whole body went through; after that the socket is
        // watched so a peer that goes away also ends a handler that never answers
        let request_handle_future = handler.call(request);
        tokio::pin!(request_handle_future);

        let response_result = 'serve: {
            {
                let body_sender_future = body_sender.send_body();
                tokio::pin!(body_sender_future);

                select! {
                    biased;
                    response = &mut request_handle_future => break 'serve response,
                    result = &mut body_sender_future => {
                        if let Err(e) = result {
                            warn!(cause = %e, "failed to stream request body");
                        }
                    }
                }
            }

            select! {
                biased;
                response = &mut request_handle_future => response,
                closed = wait_peer_closed(&mut body_sender) => {
                    match closed {
                        Ok(()) => info!("peer closed the connection while the request was pending"),
                        Err(e) => warn!(cause = %e, "connection failed while the request was pending"),
                    }
                    return Ok(false);
                }
            }
        };

        let skip_result = body_sender.skip_body().await;

        self.send_response(response_result).await?;

        // a broken body leaves the byte stream at an unknown position
        skip_result?;
        Ok(true)
    }

    async fn send_response<T, E>(&mut self, response_result: Result<Response<T>, E>) -> Result<(), HttpError>
    where
        T: Body<Data = Bytes> + Unpin,
        T::Error: Display,
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        match response_result {
            Ok(response) => self.do_send_response(response).await,
            Err(e) => {
                error!("handle response error, cause: {}", e.into());
                self.do_send_response(build_error_response(StatusCode::INTERNAL_SERVER_ERROR)).await
            }
        }
    }

    async fn do_send_response<T>(&mut self, response: Response<T>) -> Result<(), HttpError>
    where
        T: Body<Data = Bytes> + Unpin,
        T::Error: Display,
    {
        let (header_parts, mut body) = response.into_parts();

        let payload_size = match body.size_hint().exact() {
            Some(0) => PayloadSize::Empty,
            Some(length) => PayloadSize::Length(length),
            None => PayloadSize::Chunked,
        };

        self.framed_write.feed(Message::Header((ResponseHead::from_parts(header_parts, ()), payload_size))).await?;

        loop {
            match body.frame().await {
                Some(Ok(frame)) => {
                    // trailers are not written
                    if let Ok(bytes) = frame.into_data() {
                        self.framed_write.feed(Message::Payload(PayloadItem::Chunk(bytes))).await?;
                    }
                }
                Some(Err(e)) => return Err(SendError::invalid_body(format!("resolve response body error: {e}")).into()),
                None => {
                    self.framed_write.send(Message::Payload(PayloadItem::Eof)).await?;
                    return Ok(());
                }
            }
        }
    }
}

/// Completes once the peer closed its side of the connection.
///
/// The rest of the current body is drained first. Bytes that arrive after it,
/// such as a pipelined request, are handed back to the decoder untouched.
async fn wait_peer_closed<R>(body_sender: &mut ReqBodySender<'_, FramedRead<R, RequestDecoder>>) -> Result<(), HttpError>
where
    R: AsyncRead + Unpin,
{
    body_sender.skip_body().await?;

    let framed_read = body_sender.payload_stream();
    let mut buf = BytesMut::with_capacity(PEER_READ_SIZE);
    loop {
        buf.clear();
        let read = framed_read.get_mut().read_buf(&mut buf).await.map_err(ParseError::from)?;
        if read == 0 {
            return Ok(());
        }
        framed_read.read_buffer_mut().extend_from_slice(&buf);
    }
}

fn keep_alive(header: &RequestHeader) -> bool {
    let connection = header.headers().get(CONNECTION).map(HeaderValue::as_bytes);
    match header.version() {
        Version::HTTP_10 => connection.is_some_and(|value| value.eq_ignore_ascii_case(b"keep-alive")),
        _ => !connection.is_some_and(|value| value.eq_ignore_ascii_case(b"close")),
    }
}

fn build_error_response(status_code: StatusCode) -> Response<Empty<Bytes>> {
    let mut response = Response::new(Empty::<Bytes>::new());
    *response.status_mut() = status_code;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::make_handler;
    use http::Request;
    use http_body_util::Full;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tokio::io::duplex;

    async fn echo(request: Request<ReqBody>) -> Result<Response<Full<Bytes>>, Box<dyn Error + Send + Sync>> {
        let path = request.uri().path().to_string();
        let body = request.into_body().collect().await?.to_bytes();
        let mut echoed = path.into_bytes();
        echoed.extend_from_slice(&body);
        Ok(Response::new(Full::new(Bytes::from(echoed))))
    }

    async fn exchange(raw: &'static [u8]) -> String {
        let (client, server) = duplex(64 * 1024);
        let (reader, writer) = tokio::io::split(server);
        let task = tokio::spawn(async move {
            let _ = HttpConnection::new(reader, writer).process(Arc::new(make_handler(echo))).await;
        });

        let (mut client_reader, mut client_writer) = tokio::io::split(client);
        client_writer.write_all(raw).await.unwrap();
        client_writer.shutdown().await.unwrap();

        let mut output = String::new();
        client_reader.read_to_string(&mut output).await.unwrap();
        task.await.unwrap();
        output
    }

    #[tokio::test]
    async fn echoes_body_with_content_length() {
        let output = exchange(b"POST /echo HTTP/1.1\r\nContent-Length: 7\r\nConnection: close\r\n\r\n{\"a\":1}").await;

        assert!(output.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(output.ends_with("/echo{\"a\":1}"));
    }

    #[tokio::test]
    async fn chunked_request_and_keep_alive() {
        let output = exchange(
            b"POST /a HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n2\r\nhi\r\n0\r\n\r\nGET /b HTTP/1.1\r\n\r\n",
        )
        .await;

        assert_eq!(output.matches("HTTP/1.1 200 OK").count(), 2);
        assert!(output.contains("/ahi"));
        assert!(output.ends_with("/b"));
    }

    #[tokio::test]
    async fn malformed_request_gets_bad_request() {
        let output = exchange(b"NOT A REQUEST\r\n\r\n").await;
        assert!(output.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    }

    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn peer_disconnect_ends_a_pending_request() {
        let dropped = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&dropped);
        let never_answers = make_handler(move |_request: Request<ReqBody>| {
            let guard = DropFlag(Arc::clone(&flag));
            async move {
                let _guard = guard;
                std::future::pending::<Result<Response<Empty<Bytes>>, Box<dyn Error + Send + Sync>>>().await
            }
        });

        let (client, server) = duplex(64 * 1024);
        let (reader, writer) = tokio::io::split(server);
        let task = tokio::spawn(HttpConnection::new(reader, writer).process(Arc::new(never_answers)));

        let (client_reader, mut client_writer) = tokio::io::split(client);
        client_writer.write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n").await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!task.is_finished());

        drop(client_writer);
        drop(client_reader);

        let result = tokio::time::timeout(Duration::from_millis(500), task).await;
        assert!(result.expect("connection should end once the peer is gone").unwrap().is_ok());
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn pipelined_request_survives_the_peer_watch() {
        let output = exchange(b"GET /first HTTP/1.1\r\n\r\nGET /second HTTP/1.1\r\nConnection: close\r\n\r\n").await;

        assert_eq!(output.matches("HTTP/1.1 200 OK").count(), 2);
        assert!(output.contains("/first"));
        assert!(output.ends_with("/second"));
    }
}
