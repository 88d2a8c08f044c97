//! Response head encoding.

use bytes::{BufMut, BytesMut};
use http::{HeaderValue, Version, header};
use tokio_util::codec::Encoder;
use tracing::error;

use crate::protocol::{PayloadSize, ResponseHead, SendError};

const INIT_HEADER_SIZE: usize = 4 * 1024;

/// Writes the status line and header fields, replacing any framing headers
/// the handler set with ones matching the actual payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderEncoder;

impl Encoder<(ResponseHead, PayloadSize)> for HeaderEncoder {
    type Error = SendError;

    fn encode(&mut self, item: (ResponseHead, PayloadSize), dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (mut head, payload_size) = item;

        let version = match head.version() {
            Version::HTTP_11 => "HTTP/1.1",
            Version::HTTP_10 => "HTTP/1.0",
            v => {
                error!(http_version = ?v, "unsupported http version");
                return Err(SendError::UnsupportedVersion(v));
            }
        };

        let headers = head.headers_mut();
        match payload_size {
            PayloadSize::Length(n) => {
                headers.remove(header::TRANSFER_ENCODING);
                headers.insert(header::CONTENT_LENGTH, HeaderValue::from(n));
            }
            PayloadSize::Chunked => {
                headers.remove(header::CONTENT_LENGTH);
                headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
            }
            PayloadSize::Empty => {
                headers.remove(header::TRANSFER_ENCODING);
                headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("0"));
            }
        }

        let status = head.status();
        dst.reserve(INIT_HEADER_SIZE);
        dst.put_slice(version.as_bytes());
        dst.put_u8(b' ');
        dst.put_slice(status.as_str().as_bytes());
        dst.put_u8(b' ');
        dst.put_slice(status.canonical_reason().unwrap_or("Unknown").as_bytes());
        dst.put_slice(b"\r\n");

        for (name, value) in head.headers() {
            dst.put_slice(name.as_ref());
            dst.put_slice(b": ");
            dst.put_slice(value.as_bytes());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
        Ok(())
    }
}
