//! `tokio_util` codecs turning bytes into requests and responses into bytes.
//!
//! - [`RequestDecoder`]: a request head, then payload items, then the next head
//! - [`ResponseEncoder`]: a response head, then payload items framed by
//!   content-length or chunked encoding

mod body;
mod header;
mod request_decoder;
mod response_encoder;

pub use request_decoder::RequestDecoder;
pub use response_encoder::ResponseEncoder;
