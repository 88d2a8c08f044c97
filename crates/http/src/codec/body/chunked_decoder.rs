//! Decoding of `Transfer-Encoding: chunked` payloads (RFC 9112 section 7.1).

use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::protocol::{ParseError, PayloadItem};

/// Longest size or trailer line accepted before giving up on the peer.
const MAX_LINE_BYTES: usize = 4 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedDecoder {
    state: ChunkedState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkedState {
    /// Expecting `<hex size>[;extensions]\r\n`
    Size,
    /// Inside chunk data with this many bytes left
    Data(u64),
    /// Expecting the `\r\n` closing a chunk
    DataEnd,
    /// After the last chunk, skipping trailer fields up to the empty line
    Trailer,
    End,
}

impl ChunkedDecoder {
    pub fn new() -> Self {
        Self { state: ChunkedState::Size }
    }
}

impl Default for ChunkedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for ChunkedDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            match self.state {
                ChunkedState::Size => {
                    let Some(line) = take_line(src)? else { return Ok(None) };
                    let size = parse_chunk_size(&line)?;
                    trace!(size, "read chunk size");
                    self.state = if size == 0 { ChunkedState::Trailer } else { ChunkedState::Data(size) };
                }

                ChunkedState::Data(remaining) => {
                    if src.is_empty() {
                        return Ok(None);
                    }
                    let len = remaining.min(src.len() as u64);
                    let bytes = src.split_to(len as usize).freeze();
                    self.state =
                        if remaining == len { ChunkedState::DataEnd } else { ChunkedState::Data(remaining - len) };
                    return Ok(Some(PayloadItem::Chunk(bytes)));
                }

                ChunkedState::DataEnd => {
                    if src.len() < 2 {
                        return Ok(None);
                    }
                    ensure!(&src[..2] == b"\r\n", ParseError::invalid_chunk("missing CRLF after chunk data"));
                    src.advance(2);
                    self.state = ChunkedState::Size;
                }

                ChunkedState::Trailer => {
                    let Some(line) = take_line(src)? else { return Ok(None) };
                    if line.is_empty() {
                        trace!("finished reading chunked data");
                        self.state = ChunkedState::End;
                    }
                }

                ChunkedState::End => return Ok(Some(PayloadItem::Eof)),
            }
        }
    }
}

/// Splits off one CRLF terminated line, without the terminator.
fn take_line(src: &mut BytesMut) -> Result<Option<BytesMut>, ParseError> {
    match src.windows(2).position(|window| window == b"\r\n") {
        Some(pos) => {
            let line = src.split_to(pos);
            src.advance(2);
            Ok(Some(line))
        }
        None => {
            ensure!(src.len() <= MAX_LINE_BYTES, ParseError::invalid_chunk("line too long"));
            Ok(None)
        }
    }
}

fn parse_chunk_size(line: &[u8]) -> Result<u64, ParseError> {
    let size = line.split(|b| *b == b';').next().unwrap_or_default();
    let size = std::str::from_utf8(size).map_err(ParseError::invalid_chunk)?.trim();
    ensure!(!size.is_empty(), ParseError::invalid_chunk("empty chunk size"));
    u64::from_str_radix(size, 16).map_err(ParseError::invalid_chunk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn chunk(bytes: &'static [u8]) -> PayloadItem {
        PayloadItem::Chunk(Bytes::from_static(bytes))
    }

    #[test]
    fn complete_body() {
        let mut buffer = BytesMut::from(&b"7\r\n{\"a\":1}\r\n0\r\n\r\nGET /next"[..]);
        let mut decoder = ChunkedDecoder::new();

        assert_eq!(decoder.decode(&mut buffer).unwrap(), Some(chunk(b"{\"a\":1}")));
        assert_eq!(decoder.decode(&mut buffer).unwrap(), Some(PayloadItem::Eof));
        assert_eq!(&buffer[..], b"GET /next");
    }

    #[test]
    fn chunk_split_across_reads() {
        let mut buffer = BytesMut::from(&b"A;ext=1\r\nhello"[..]);
        let mut decoder = ChunkedDecoder::new();

        assert_eq!(decoder.decode(&mut buffer).unwrap(), Some(chunk(b"hello")));
        assert_eq!(decoder.decode(&mut buffer).unwrap(), None);

        buffer.extend_from_slice(b"world\r\n0\r\nX-Trailer: 1\r\n\r\n");
        assert_eq!(decoder.decode(&mut buffer).unwrap(), Some(chunk(b"world")));
        assert_eq!(decoder.decode(&mut buffer).unwrap(), Some(PayloadItem::Eof));
        assert!(buffer.is_empty());
    }

    #[test]
    fn invalid_size() {
        let mut buffer = BytesMut::from(&b"zz\r\n"[..]);
        assert!(matches!(ChunkedDecoder::new().decode(&mut buffer), Err(ParseError::InvalidChunk { .. })));
    }

    #[test]
    fn missing_data_terminator() {
        let mut buffer = BytesMut::from(&b"2\r\nhiXX"[..]);
        let mut decoder = ChunkedDecoder::new();

        assert_eq!(decoder.decode(&mut buffer).unwrap(), Some(chunk(b"hi")));
        assert!(decoder.decode(&mut buffer).is_err());
    }
}
