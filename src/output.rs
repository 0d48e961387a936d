// src/output.rs
use crate::extractors::{BodySource, Manuscript};

/// Plain-text rendering for the terminal.
///
/// The author's note is only shown once both genre and intent are known.
pub fn render_text(manuscript: &Manuscript) -> String {
    let mut out = format!("# {}\n\n", manuscript.display_title());

    if manuscript.body_source == BodySource::Missing {
        out.push_str("(no story section)\n");
    } else {
        for paragraph in manuscript.paragraphs() {
            out.push_str(paragraph);
            out.push_str("\n\n");
        }
    }

    if manuscript.is_metadata_ready() {
        out.push_str("---\n");
        out.push_str(&format!("Genre:  {}\n", manuscript.metadata.display_genre()));
        out.push_str(&format!("Intent: {}\n", manuscript.metadata.display_intent()));
    }

    out
}

pub fn render_json(manuscript: &Manuscript) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(manuscript)
}
