//! Incremental decoding of chunked text responses.
//!
//! A streamed chat reply arrives as arbitrary byte chunks.  Chunk boundaries may fall inside a
//! multi-byte UTF-8 sequence; this module defers the incomplete tail until the next chunk so
//! every chunk it yields is valid text.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};

use crate::observability::{STREAM_BYTES, STREAM_CHUNKS};
use crate::{Error, Result};

/// Streaming UTF-8 decoder that carries incomplete sequences across chunk boundaries.
#[derive(Debug, Default)]
pub struct Utf8ChunkDecoder {
    pending: Vec<u8>,
}

impl Utf8ChunkDecoder {
    /// Creates a decoder with no buffered bytes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds `bytes` and returns all text that is now complete.
    ///
    /// Returns `Ok(None)` when nothing decodable is available yet.  A byte sequence that can
    /// never become valid UTF-8 is an encoding error.
    pub fn decode(&mut self, bytes: &[u8]) -> Result<Option<String>> {
        self.pending.extend_from_slice(bytes);
        let valid = match std::str::from_utf8(&self.pending) {
            Ok(_) => self.pending.len(),
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(e) => {
                self.pending.clear();
                return Err(Error::encoding(
                    format!("Invalid UTF-8 in stream: {e}"),
                    Some(Box::new(e)),
                ));
            }
        };
        if valid == 0 {
            return Ok(None);
        }
        let text = std::str::from_utf8(&self.pending[..valid])?.to_string();
        self.pending.drain(..valid);
        Ok(Some(text))
    }

    /// True if an incomplete sequence is buffered.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Signals end of input; leftover bytes mean the stream was truncated mid-character.
    pub fn finish(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            Ok(())
        } else {
            let count = self.pending.len();
            self.pending.clear();
            Err(Error::encoding(
                format!("stream ended inside a UTF-8 sequence ({count} trailing bytes)"),
                None,
            ))
        }
    }
}

/// Process a stream of bytes into a stream of non-empty text chunks.
///
/// Chunks are yielded in receive order.  No buffering is done beyond what the decoder needs to
/// complete a split character.  Transport errors are yielded once and end the stream.
pub fn process_chunks<S>(byte_stream: S) -> impl Stream<Item = Result<String>>
where
    S: Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Unpin,
{
    // Convert reqwest errors to our error type
    let stream = byte_stream.map(|result| {
        result
            .map_err(|e| Error::streaming(format!("Error in HTTP stream: {e}"), Some(Box::new(e))))
    });

    stream::unfold(
        (stream, Utf8ChunkDecoder::new(), false),
        move |(mut stream, mut decoder, done)| async move {
            if done {
                return None;
            }
            loop {
                match stream.next().await {
                    Some(Ok(bytes)) => {
                        STREAM_BYTES.count(bytes.len() as u64);
                        match decoder.decode(&bytes) {
                            Ok(Some(text)) => {
                                STREAM_CHUNKS.click();
                                return Some((Ok(text), (stream, decoder, false)));
                            }
                            Ok(None) => continue,
                            Err(e) => return Some((Err(e), (stream, decoder, true))),
                        }
                    }
                    Some(Err(e)) => {
                        return Some((Err(e), (stream, decoder, true)));
                    }
                    None => {
                        // End of stream
                        return match decoder.finish() {
                            Ok(()) => None,
                            Err(e) => Some((Err(e), (stream, decoder, true))),
                        };
                    }
                }
            }
        },
    )
}
