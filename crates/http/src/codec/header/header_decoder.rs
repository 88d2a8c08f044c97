//! Request head decoding on top of `httparse`.

use bytes::BytesMut;
use http::{HeaderName, HeaderValue, Request, header};
use httparse::{Error, Status};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::protocol::{ParseError, PayloadSize, RequestHeader};

/// Maximum number of headers allowed in a request
const MAX_HEADER_NUM: usize = 64;

/// Maximum size in bytes allowed for the request line and all header fields
const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Decodes a request head and works out how its payload is framed.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderDecoder;

impl Decoder for HeaderDecoder {
    type Item = (RequestHeader, PayloadSize);
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADER_NUM];
        let mut req = httparse::Request::new(&mut headers);

        let body_offset = match req.parse(src) {
            Ok(Status::Complete(body_offset)) => body_offset,
            Ok(Status::Partial) => {
                ensure!(src.len() <= MAX_HEADER_BYTES, ParseError::too_large_header(src.len(), MAX_HEADER_BYTES));
                return Ok(None);
            }
            Err(Error::TooManyHeaders) => return Err(ParseError::too_many_headers(MAX_HEADER_NUM)),
            Err(e) => return Err(ParseError::invalid_header(e)),
        };

        trace!(head_size = body_offset, "parsed request head");
        ensure!(body_offset <= MAX_HEADER_BYTES, ParseError::too_large_header(body_offset, MAX_HEADER_BYTES));

        let version = match req.version {
            Some(0) => http::Version::HTTP_10,
            Some(1) => http::Version::HTTP_11,
            // HTTP/2 and HTTP/3 are not supported
            _ => return Err(ParseError::InvalidVersion(req.version)),
        };

        let mut builder = Request::builder()
            .method(req.method.ok_or(ParseError::InvalidMethod)?)
            .uri(req.path.ok_or(ParseError::InvalidUri)?)
            .version(version);

        for field in req.headers.iter() {
            let name = HeaderName::from_bytes(field.name.as_bytes()).map_err(ParseError::invalid_header)?;
            let value = HeaderValue::from_bytes(field.value).map_err(ParseError::invalid_header)?;
            builder = builder.header(name, value);
        }

        let request = builder.body(()).map_err(|e| match e {
            e if e.is::<http::method::InvalidMethod>() => ParseError::InvalidMethod,
            e if e.is::<http::uri::InvalidUri>() => ParseError::InvalidUri,
            e => ParseError::invalid_header(e),
        })?;

        let request_header = RequestHeader::from(request);
        let payload_size = parse_payload_size(&request_header)?;

        // only drop the head once it is fully valid
        let _ = src.split_to(body_offset);
        Ok(Some((request_header, payload_size)))
    }
}

/// Chunked transfer encoding wins over content-length; neither means no body.
fn parse_payload_size(request_header: &RequestHeader) -> Result<PayloadSize, ParseError> {
    let headers = request_header.headers();

    if let Some(value) = headers.get(header::TRANSFER_ENCODING) {
        let value = value.to_str().map_err(ParseError::invalid_header)?;
        let chunked = value.rsplit(',').next().is_some_and(|last| last.trim().eq_ignore_ascii_case("chunked"));
        ensure!(chunked, ParseError::invalid_header(format!("unsupported transfer-encoding: {value}")));
        return Ok(PayloadSize::Chunked);
    }

    let mut lengths = headers.get_all(header::CONTENT_LENGTH).iter();
    match (lengths.next(), lengths.next()) {
        (None, _) => Ok(PayloadSize::Empty),
        (Some(_), Some(_)) => Err(ParseError::invalid_content_length("multiple content-length headers")),
        (Some(value), None) => {
            let length = value
                .to_str()
                .map_err(ParseError::invalid_content_length)?
                .trim()
                .parse::<u64>()
                .map_err(ParseError::invalid_content_length)?;
            Ok(if length == 0 { PayloadSize::Empty } else { PayloadSize::Length(length) })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use indoc::indoc;

    fn decode(raw: &str) -> Result<Option<(RequestHeader, PayloadSize)>, ParseError> {
        let mut buffer = BytesMut::from(raw.replace('\n', "\r\n").as_str());
        HeaderDecoder.decode(&mut buffer)
    }

    #[test]
    fn from_curl() {
        let raw = indoc! {r##"
        GET /api/data/42?verbose=1 HTTP/1.1
        Host: 127.0.0.1:3000
        User-Agent: curl/7.79.1
        Accept: */*

        "##};

        let (header, payload_size) = decode(raw).unwrap().unwrap();
        assert_eq!(header.method(), &Method::GET);
        assert_eq!(header.version(), http::Version::HTTP_11);
        assert_eq!(header.uri().path(), "/api/data/42");
        assert_eq!(header.uri().query(), Some("verbose=1"));
        assert_eq!(header.headers().len(), 3);
        assert_eq!(header.headers().get(http::header::ACCEPT).unwrap(), "*/*");
        assert_eq!(payload_size, PayloadSize::Empty);
    }

    #[test]
    fn content_length_body() {
        let raw = indoc! {r##"
        POST /users HTTP/1.1
        Content-Type: application/json
        Content-Length: 7

        "##};

        let (_, payload_size) = decode(raw).unwrap().unwrap();
        assert_eq!(payload_size, PayloadSize::Length(7));
    }

    #[test]
    fn chunked_body() {
        let raw = indoc! {r##"
        POST /users HTTP/1.1
        Transfer-Encoding: chunked

        "##};

        let (_, payload_size) = decode(raw).unwrap().unwrap();
        assert!(payload_size.is_chunked());
    }

    #[test]
    fn partial_head_waits_for_more() {
        assert!(decode("GET / HTTP/1.1\nHost: loc").unwrap().is_none());
    }

    #[test]
    fn bad_content_length() {
        let raw = indoc! {r##"
        POST /users HTTP/1.1
        Content-Length: seven

        "##};

        assert!(matches!(decode(raw), Err(ParseError::InvalidContentLength { .. })));
    }

    #[test]
    fn oversized_head() {
        let raw = format!("GET / HTTP/1.1\nX-Big: {}\n", "a".repeat(MAX_HEADER_BYTES));
        assert!(matches!(decode(&raw), Err(ParseError::TooLargeHeader { .. })));
    }
}
