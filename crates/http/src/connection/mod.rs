//! Connection handling: decode requests, run the handler while the body
//! streams, write the response, repeat while the peer keeps the connection.

mod http_connection;

pub use http_connection::HttpConnection;
