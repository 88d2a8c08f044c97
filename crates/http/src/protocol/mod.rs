//! Protocol types shared by the codec and the connection.
//!
//! - [`Message`] / [`PayloadItem`] / [`PayloadSize`]: what the codec yields
//!   and accepts, a head followed by payload chunks and an end marker
//! - [`RequestHeader`]: the decoded request line and header fields
//! - [`ResponseHead`]: a response without its body
//! - [`body::ReqBody`]: the request body as an `http_body::Body`
//! - [`HttpError`], [`ParseError`], [`SendError`]: failures on either side

mod message;
pub use message::Message;
pub use message::PayloadItem;
pub use message::PayloadSize;

mod request;
pub use request::RequestHeader;

mod response;
pub use response::ResponseHead;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;

pub mod body;
