use bytes::{BufMut, BytesMut};
use tokio_util::codec::Encoder;

use crate::protocol::{PayloadItem, PayloadSize, SendError};

/// Frames response payload items according to the announced [`PayloadSize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadEncoder {
    kind: Kind,
    finished: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    Length(u64),
    Chunked,
    NoBody,
}

impl PayloadEncoder {
    pub fn is_finish(&self) -> bool {
        self.finished
    }
}

impl From<PayloadSize> for PayloadEncoder {
    fn from(payload_size: PayloadSize) -> Self {
        let kind = match payload_size {
            PayloadSize::Length(length) => Kind::Length(length),
            PayloadSize::Chunked => Kind::Chunked,
            PayloadSize::Empty => Kind::NoBody,
        };
        Self { kind, finished: false }
    }
}

impl Encoder<PayloadItem> for PayloadEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if self.finished {
            return Err(SendError::invalid_body("payload already finished"));
        }

        match (&mut self.kind, item) {
            (Kind::Length(remaining), PayloadItem::Chunk(bytes)) => {
                let len = bytes.len() as u64;
                if len > *remaining {
                    return Err(SendError::invalid_body("payload exceeds declared content-length"));
                }
                *remaining -= len;
                dst.extend_from_slice(&bytes);
            }
            (Kind::Length(remaining), PayloadItem::Eof) => {
                if *remaining != 0 {
                    return Err(SendError::invalid_body("payload shorter than declared content-length"));
                }
                self.finished = true;
            }
            (Kind::Chunked, PayloadItem::Chunk(bytes)) if bytes.is_empty() => {}
            (Kind::Chunked, PayloadItem::Chunk(bytes)) => {
                dst.reserve(bytes.len() + 12);
                dst.put_slice(format!("{:X}\r\n", bytes.len()).as_bytes());
                dst.put_slice(&bytes);
                dst.put_slice(b"\r\n");
            }
            (Kind::Chunked, PayloadItem::Eof) => {
                dst.put_slice(b"0\r\n\r\n");
                self.finished = true;
            }
            (Kind::NoBody, PayloadItem::Chunk(bytes)) if bytes.is_empty() => {}
            (Kind::NoBody, PayloadItem::Chunk(_)) => {
                return Err(SendError::invalid_body("payload written to a bodiless response"));
            }
            (Kind::NoBody, PayloadItem::Eof) => self.finished = true,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn chunked_framing() {
        let mut encoder = PayloadEncoder::from(PayloadSize::Chunked);
        let mut dst = BytesMut::new();

        encoder.encode(PayloadItem::Chunk(Bytes::from_static(b"Not Found")), &mut dst).unwrap();
        encoder.encode(PayloadItem::Eof, &mut dst).unwrap();

        assert_eq!(&dst[..], b"9\r\nNot Found\r\n0\r\n\r\n");
        assert!(encoder.is_finish());
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let mut encoder = PayloadEncoder::from(PayloadSize::Length(2));
        let mut dst = BytesMut::new();

        assert!(encoder.encode(PayloadItem::Chunk(Bytes::from_static(b"abc")), &mut dst).is_err());
    }
}
