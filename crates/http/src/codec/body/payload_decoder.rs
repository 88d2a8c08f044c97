use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::codec::body::chunked_decoder::ChunkedDecoder;
use crate::protocol::{ParseError, PayloadItem, PayloadSize};

/// Selects the payload framing announced by the request head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadDecoder {
    kind: Kind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    /// Bytes left before the content-length is satisfied
    Length(u64),
    Chunked(ChunkedDecoder),
    NoBody,
}

impl From<PayloadSize> for PayloadDecoder {
    fn from(payload_size: PayloadSize) -> Self {
        let kind = match payload_size {
            PayloadSize::Length(length) => Kind::Length(length),
            PayloadSize::Chunked => Kind::Chunked(ChunkedDecoder::new()),
            PayloadSize::Empty => Kind::NoBody,
        };
        Self { kind }
    }
}

impl Decoder for PayloadDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match &mut self.kind {
            Kind::Length(0) | Kind::NoBody => Ok(Some(PayloadItem::Eof)),
            Kind::Length(remaining) => {
                if src.is_empty() {
                    return Ok(None);
                }
                let len = (*remaining).min(src.len() as u64);
                *remaining -= len;
                Ok(Some(PayloadItem::Chunk(src.split_to(len as usize).freeze())))
            }
            Kind::Chunked(chunked_decoder) => chunked_decoder.decode(src),
        }
    }
}
