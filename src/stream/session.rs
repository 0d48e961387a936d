// src/stream/session.rs
use crate::extractors::{Manuscript, ManuscriptExtractor, StreamPhase};
use crate::stream::source::ChunkReceiver;
use crate::utils::error::SourceError;
use serde::Serialize;

/// Lifecycle of one generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum GenerationState {
    Idle,
    Generating,
    Complete,
    Failed(String),
}

/// Accumulates streamed text and re-extracts the manuscript after every chunk.
#[derive(Debug)]
pub struct GenerationSession {
    extractor: ManuscriptExtractor,
    markdown: String,
    state: GenerationState,
    chunk_count: usize,
}

impl Default for GenerationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationSession {
    pub fn new() -> Self {
        Self {
            extractor: ManuscriptExtractor::new(),
            markdown: String::new(),
            state: GenerationState::Idle,
            chunk_count: 0,
        }
    }

    /// Clears any previous text and enters `Generating`.
    pub fn start(&mut self) {
        self.markdown.clear();
        self.chunk_count = 0;
        self.state = GenerationState::Generating;
        tracing::info!("Generation started");
    }

    /// Appends a chunk and returns the streaming view of everything received so far.
    pub fn append(&mut self, chunk: &str) -> Option<Manuscript> {
        if self.state != GenerationState::Generating {
            tracing::warn!("Appending chunk while session is {:?}", self.state);
        }
        self.markdown.push_str(chunk);
        self.chunk_count += 1;
        tracing::debug!(
            "Chunk {} received ({} bytes, {} total)",
            self.chunk_count,
            chunk.len(),
            self.markdown.len()
        );
        self.extractor.extract(&self.markdown, StreamPhase::Streaming)
    }

    /// Marks the stream finished and returns the final extraction.
    pub fn complete(&mut self) -> Option<Manuscript> {
        self.state = GenerationState::Complete;
        tracing::info!(
            "Generation complete: {} chunks, {} bytes",
            self.chunk_count,
            self.markdown.len()
        );
        self.extractor.extract(&self.markdown, StreamPhase::Complete)
    }

    /// Records a source failure. Text received so far is kept.
    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!("Generation failed after {} chunks: {}", self.chunk_count, message);
        self.state = GenerationState::Failed(message);
    }

    /// Current view, streaming while generating and final otherwise.
    pub fn current(&self) -> Option<Manuscript> {
        let phase = match self.state {
            GenerationState::Generating => StreamPhase::Streaming,
            _ => StreamPhase::Complete,
        };
        self.extractor.extract(&self.markdown, phase)
    }

    pub fn markdown(&self) -> &str {
        &self.markdown
    }

    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }
}

/// Drives `session` from a chunk channel until the source ends.
///
/// `on_update` sees every intermediate manuscript. On success the final
/// (non-streaming) manuscript is returned; `None` means the source produced no text.
pub async fn run_session<F>(
    session: &mut GenerationSession,
    mut rx: ChunkReceiver,
    mut on_update: F,
) -> Result<Option<Manuscript>, SourceError>
where
    F: FnMut(&Manuscript),
{
    session.start();

    while let Some(item) = rx.recv().await {
        match item {
            Ok(chunk) => {
                if let Some(manuscript) = session.append(&chunk) {
                    on_update(&manuscript);
                }
            }
            Err(e) => {
                session.fail(e.to_string());
                return Err(e);
            }
        }
    }

    Ok(session.complete())
}
