// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};
use crate::extractors::Manuscript;
use crate::utils::error::StorageError;

const UNTITLED_DIR: &str = "untitled";

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// Directory for one manuscript: /base_dir/<title slug>/
    fn target_dir(&self, manuscript: &Manuscript) -> Result<PathBuf, StorageError> {
        let slug = manuscript
            .title
            .value()
            .map(slugify)
            .filter(|slug| !slug.is_empty())
            .unwrap_or_else(|| UNTITLED_DIR.to_string());
        let target_dir = self.base_dir.join(slug);

        if !target_dir.exists() {
            fs::create_dir_all(&target_dir)
                .map_err(StorageError::IoError)?;
        }
        Ok(target_dir)
    }

    /// Saves the raw generated markdown next to its metadata
    pub fn save_manuscript(&self, manuscript: &Manuscript, markdown: &str) -> Result<PathBuf, StorageError> {
        let file_path = self.target_dir(manuscript)?.join("manuscript.md");

        fs::write(&file_path, markdown)
            .map_err(StorageError::IoError)?;

        tracing::info!("Saved manuscript to {}", file_path.display());

        Ok(file_path)
    }

    /// Saves metadata about the manuscript in JSON format
    pub fn save_metadata(&self, manuscript: &Manuscript) -> Result<PathBuf, StorageError> {
        let file_path = self.target_dir(manuscript)?.join("manuscript_meta.json");

        let metadata = serde_json::json!({
            "title": manuscript.title.value(),
            "genre": manuscript.metadata.genre.value(),
            "intent": manuscript.metadata.intent.value(),
            "body_source": manuscript.body_source,
            "body_chars": manuscript.body.chars().count(),
            "paragraphs": manuscript.paragraphs().count(),
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, metadata_str)
            .map_err(StorageError::IoError)?;

        tracing::info!("Saved metadata to {}", file_path.display());

        Ok(file_path)
    }
}

/// File-system-safe directory name from a title; keeps Hangul and other letters.
fn slugify(title: &str) -> String {
    title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}
