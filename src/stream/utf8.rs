// src/stream/utf8.rs
use crate::utils::error::SourceError;

/// Incremental UTF-8 decoder for byte chunks that may split characters.
///
/// A Korean syllable is three bytes, so a read boundary regularly lands in the
/// middle of one. Incomplete trailing bytes are held until the next chunk.
#[derive(Debug, Default)]
pub struct Utf8ChunkDecoder {
    pending: Vec<u8>,
}

impl Utf8ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes as much of `pending + bytes` as possible.
    /// Invalid sequences become U+FFFD.
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        let mut buffer = std::mem::take(&mut self.pending);
        buffer.extend_from_slice(bytes);

        let mut text = String::with_capacity(buffer.len());
        let mut rest = buffer.as_slice();

        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    text.push_str(valid);
                    break;
                }
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    text.push_str(&String::from_utf8_lossy(valid));
                    match err.error_len() {
                        Some(len) => {
                            tracing::warn!("Replacing {} invalid byte(s) in text stream", len);
                            text.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        None => {
                            // Incomplete sequence at the end: wait for more bytes
                            self.pending = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }

        text
    }

    /// Number of bytes held back waiting for the rest of a character.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Ends the stream; fails if a character was left incomplete.
    pub fn finish(self) -> Result<(), SourceError> {
        if self.pending.is_empty() {
            Ok(())
        } else {
            Err(SourceError::TruncatedUtf8(self.pending.len()))
        }
    }
}
