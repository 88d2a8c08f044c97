use bytes::BytesMut;
use tokio_util::codec::Encoder;
use tracing::error;

use crate::codec::body::PayloadEncoder;
use crate::codec::header::HeaderEncoder;
use crate::protocol::{Message, PayloadSize, ResponseHead, SendError};

/// Encoder for responses: a head followed by payload items up to the end marker.
#[derive(Debug, Default)]
pub struct ResponseEncoder {
    header_encoder: HeaderEncoder,
    payload_encoder: Option<PayloadEncoder>,
}

impl ResponseEncoder {
    pub fn new() -> Self {
        Default::default()
    }
}

impl Encoder<Message<(ResponseHead, PayloadSize)>> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, item: Message<(ResponseHead, PayloadSize)>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            Message::Header((head, payload_size)) => {
                if self.payload_encoder.is_some() {
                    error!("expect payload item but receive response head");
                    return Err(SendError::invalid_body("response head sent before the previous payload ended"));
                }

                self.payload_encoder = Some(payload_size.into());
                self.header_encoder.encode((head, payload_size), dst)
            }

            Message::Payload(payload_item) => {
                let Some(payload_encoder) = &mut self.payload_encoder else {
                    error!("expect response head but receive payload item");
                    return Err(SendError::invalid_body("payload sent before the response head"));
                };

                let result = payload_encoder.encode(payload_item, dst);
                if payload_encoder.is_finish() {
                    self.payload_encoder = None;
                }
                result
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::{Response, StatusCode};

    #[test]
    fn head_then_payload() {
        let mut encoder = ResponseEncoder::new();
        let mut dst = BytesMut::new();
        let head = Response::builder().status(StatusCode::OK).body(()).unwrap();

        encoder.encode(Message::Header((head, PayloadSize::Length(2))), &mut dst).unwrap();
        encoder.encode(Message::from(Bytes::from_static(b"ok")), &mut dst).unwrap();
        encoder.encode(Message::Payload(crate::protocol::PayloadItem::Eof), &mut dst).unwrap();

        assert_eq!(&dst[..], b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\n\r\nok");
    }

    #[test]
    fn payload_without_head() {
        let mut encoder = ResponseEncoder::new();
        let mut dst = BytesMut::new();
        assert!(encoder.encode(Message::from(Bytes::from_static(b"ok")), &mut dst).is_err());
    }
}
