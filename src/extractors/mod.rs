// src/extractors/mod.rs
pub mod manuscript;
pub mod segments;

// Re-export key extraction types for convenience
#[allow(unused_imports)]
pub use manuscript::{
    AuthorNote,
    BodySource,
    Manuscript,
    ManuscriptExtractor,
    Resolution,
    StreamPhase,
    PENDING_FIELD,
    PENDING_TITLE,
};
