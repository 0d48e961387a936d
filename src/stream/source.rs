// src/stream/source.rs
use crate::stream::utf8::Utf8ChunkDecoder;
use crate::utils::error::SourceError;
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;

// Chunks buffered between the producer task and the session.
const CHANNEL_CAPACITY: usize = 64;
const READ_BUFFER_SIZE: usize = 4096;

pub type ChunkSender = mpsc::Sender<Result<String, SourceError>>;
pub type ChunkReceiver = mpsc::Receiver<Result<String, SourceError>>;

/// Pumps text from `reader` into `tx` until EOF, an error, or the receiver is dropped.
///
/// Byte reads are decoded incrementally, so chunk boundaries never split a character.
pub async fn read_chunks<R>(mut reader: R, tx: ChunkSender)
where
    R: AsyncRead + Unpin,
{
    let mut decoder = Utf8ChunkDecoder::new();
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    let mut total = 0usize;

    loop {
        let read = match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                tracing::error!("Reading text source failed after {} bytes: {}", total, e);
                let _ = tx.send(Err(SourceError::Io(e))).await;
                return;
            }
        };
        total += read;

        let text = decoder.decode(&buf[..read]);
        tracing::trace!("Decoded {} bytes, {} held back", read, decoder.pending_len());
        if text.is_empty() {
            continue;
        }
        if tx.send(Ok(text)).await.is_err() {
            tracing::debug!("Chunk receiver dropped, stopping reader");
            return;
        }
    }

    tracing::debug!("Text source reached EOF after {} bytes", total);
    if let Err(e) = decoder.finish() {
        let _ = tx.send(Err(e)).await;
    }
}

/// Spawns [`read_chunks`] on the runtime and returns the receiving end.
pub fn spawn_reader<R>(reader: R) -> ChunkReceiver
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    tokio::spawn(read_chunks(reader, tx));
    rx
}

/// Streams stdin, e.g. `some-model-cli | manuscript-extractor watch`.
pub fn spawn_stdin() -> ChunkReceiver {
    tracing::info!("Reading generated text from stdin");
    spawn_reader(tokio::io::stdin())
}

/// Splits `text` into pieces of at most `chunk_chars` characters.
pub fn split_chunks(text: &str, chunk_chars: usize) -> Vec<String> {
    let chunk_chars = chunk_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;

    for ch in text.chars() {
        current.push(ch);
        count += 1;
        if count == chunk_chars {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Sends `text` as a sequence of chunks with `delay` between them.
pub async fn replay_text(text: String, chunk_chars: usize, delay: Duration, tx: ChunkSender) {
    let chunks = split_chunks(&text, chunk_chars);
    tracing::debug!("Replaying {} chunks of up to {} chars", chunks.len(), chunk_chars);

    for (index, chunk) in chunks.into_iter().enumerate() {
        if index > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if tx.send(Ok(chunk)).await.is_err() {
            tracing::debug!("Chunk receiver dropped, stopping replay at chunk {}", index);
            return;
        }
    }
}

/// Re-streams a saved manuscript file as if it were being generated.
pub async fn open_replay<P: AsRef<Path>>(
    path: P,
    chunk_chars: usize,
    delay: Duration,
) -> Result<ChunkReceiver, SourceError> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path).await?;
    tracing::info!("Replaying {} ({} bytes)", path.display(), text.len());

    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    tokio::spawn(replay_text(text, chunk_chars, delay, tx));
    Ok(rx)
}
