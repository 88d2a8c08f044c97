//! The request body seen by handlers.
//!
//! The connection keeps decoding payload items while the handler runs and
//! forwards them through a bounded channel to [`ReqBody`]. Every data frame
//! the body yields is one chunk as it arrived on the wire; the stream ending
//! marks the end of the body. Whatever the handler leaves unread is drained
//! by [`ReqBodySender::skip_body`] so the connection can be reused.

mod req_body;

pub use req_body::ReqBody;
pub use req_body::ReqBodySender;
