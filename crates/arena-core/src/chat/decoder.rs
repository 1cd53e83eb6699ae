//! Incremental UTF-8 decoding for streamed response bodies.
//!
//! Chunk boundaries are arbitrary, so a multi-byte character may arrive
//! split across two reads. The decoder holds the incomplete tail until the
//! next chunk. Invalid sequences become U+FFFD and are recorded as
//! [`DecodeError`]s; they never abort decoding.

use arena_types::error::DecodeError;

const REPLACEMENT: char = '\u{FFFD}';

#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    /// Bytes of an incomplete character carried over from the last chunk.
    pending: Vec<u8>,
    /// Stream offset of the first byte in `pending`.
    offset: usize,
    errors: Vec<DecodeError>,
}

impl Utf8StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next chunk, returning all text that is complete so far.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut buffer = std::mem::take(&mut self.pending);
        buffer.extend_from_slice(chunk);

        let mut out = String::with_capacity(buffer.len());
        let mut pos = 0;

        while pos < buffer.len() {
            match std::str::from_utf8(&buffer[pos..]) {
                Ok(valid) => {
                    out.push_str(valid);
                    pos = buffer.len();
                }
                Err(err) => {
                    let valid_end = pos + err.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&buffer[pos..valid_end]));

                    match err.error_len() {
                        Some(len) => {
                            self.record(self.offset + valid_end, len);
                            out.push(REPLACEMENT);
                            pos = valid_end + len;
                        }
                        None => {
                            // Incomplete character at the end: wait for more bytes.
                            self.pending = buffer[valid_end..].to_vec();
                            self.offset += valid_end;
                            return out;
                        }
                    }
                }
            }
        }

        self.offset += buffer.len();
        out
    }

    /// Flush at end of stream. A dangling partial character becomes U+FFFD.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        let len = self.pending.len();
        self.record(self.offset, len);
        self.offset += len;
        self.pending.clear();
        REPLACEMENT.to_string()
    }

    /// Invalid sequences seen so far.
    pub fn errors(&self) -> &[DecodeError] {
        &self.errors
    }

    fn record(&mut self, offset: usize, len: usize) {
        let err = DecodeError { offset, len };
        tracing::warn!(%err, "replacing undecodable bytes in response stream");
        self.errors.push(err);
    }
}
