//! Streaming request decoding: one head, then its payload, then the next head.

use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::codec::body::PayloadDecoder;
use crate::codec::header::HeaderDecoder;
use crate::protocol::{Message, ParseError, PayloadItem, PayloadSize, RequestHeader};

/// Decoder for a sequence of pipelined requests.
///
/// While `payload_decoder` is `None` the decoder is waiting for a head;
/// otherwise it yields payload items until [`PayloadItem::Eof`].
#[derive(Debug, Default)]
pub struct RequestDecoder {
    header_decoder: HeaderDecoder,
    payload_decoder: Option<PayloadDecoder>,
}

impl RequestDecoder {
    pub fn new() -> Self {
        Default::default()
    }
}

impl Decoder for RequestDecoder {
    type Item = Message<(RequestHeader, PayloadSize)>;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(payload_decoder) = &mut self.payload_decoder {
            let message = match payload_decoder.decode(src)? {
                Some(item @ PayloadItem::Chunk(_)) => Some(Message::Payload(item)),
                Some(item @ PayloadItem::Eof) => {
                    self.payload_decoder = None;
                    Some(Message::Payload(item))
                }
                None => None,
            };
            return Ok(message);
        }

        let message = match self.header_decoder.decode(src)? {
            Some((header, payload_size)) => {
                self.payload_decoder = Some(payload_size.into());
                Some(Message::Header((header, payload_size)))
            }
            None => None,
        };
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn pipelined_requests() {
        let mut buffer = BytesMut::from(
            &b"POST /echo HTTP/1.1\r\nContent-Length: 3\r\n\r\nabcGET / HTTP/1.1\r\n\r\n"[..],
        );
        let mut decoder = RequestDecoder::new();

        let Some(Message::Header((header, payload_size))) = decoder.decode(&mut buffer).unwrap() else {
            panic!("expected a head");
        };
        assert_eq!(header.method(), &Method::POST);
        assert_eq!(payload_size, PayloadSize::Length(3));

        let Some(Message::Payload(chunk)) = decoder.decode(&mut buffer).unwrap() else {
            panic!("expected payload");
        };
        assert_eq!(chunk.as_bytes().unwrap().as_ref(), b"abc");
        assert!(matches!(decoder.decode(&mut buffer).unwrap(), Some(Message::Payload(PayloadItem::Eof))));

        let Some(Message::Header((header, payload_size))) = decoder.decode(&mut buffer).unwrap() else {
            panic!("expected the second head");
        };
        assert_eq!(header.uri().path(), "/");
        assert!(payload_size.is_empty());
        assert!(matches!(decoder.decode(&mut buffer).unwrap(), Some(Message::Payload(PayloadItem::Eof))));
        assert!(decoder.decode(&mut buffer).unwrap().is_none());
    }
}
