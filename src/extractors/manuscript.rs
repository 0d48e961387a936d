// src/extractors/manuscript.rs

// --- Imports ---
use crate::extractors::segments::{tokenize, LineKind, MetaLabel, Segment};
use serde::Serialize;

// --- Constants ---
/// Shown in place of a title that has not been streamed yet.
pub const PENDING_TITLE: &str = "제목 없음...";
/// Shown in place of a genre or intent that has not been streamed yet.
pub const PENDING_FIELD: &str = "...";

// --- Data Structures ---

/// A field that is either still waiting for input or has a real value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Resolution {
    #[default]
    Pending,
    Resolved(String),
}

impl Resolution {
    /// Empty (after trimming) text counts as not yet written.
    fn from_text(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            Resolution::Pending
        } else {
            Resolution::Resolved(text.to_string())
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Resolution::Pending)
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Resolution::Pending => None,
            Resolution::Resolved(value) => Some(value),
        }
    }

    /// The resolved value, or `placeholder` while pending.
    pub fn or_placeholder<'a>(&'a self, placeholder: &'a str) -> &'a str {
        self.value().unwrap_or(placeholder)
    }
}

/// Whether the extractor is looking at a partial stream or the finished text.
///
/// The phase only decides if the whole-text fallback may fill the body when
/// no story section exists; every other rule is identical in both phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPhase {
    Streaming,
    Complete,
}

/// Where the body text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BodySource {
    /// Bounded by a story header and a rule, note header or end of text.
    Section,
    /// Whole input minus the title line (streaming only).
    Fallback,
    /// No story section in the finished text.
    Missing,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthorNote {
    pub genre: Resolution,
    pub intent: Resolution,
}

impl AuthorNote {
    /// First genre line and first intent line, searched independently.
    fn from_segments(segments: &[Segment<'_>]) -> Self {
        let first = |wanted: MetaLabel| {
            segments
                .iter()
                .find_map(|segment| match segment.kind {
                    LineKind::MetaEntry { label, value } if label == wanted => Some(value),
                    _ => None,
                })
                .map_or(Resolution::Pending, Resolution::from_text)
        };

        AuthorNote {
            genre: first(MetaLabel::Genre),
            intent: first(MetaLabel::Intent),
        }
    }

    pub fn display_genre(&self) -> &str {
        self.genre.or_placeholder(PENDING_FIELD)
    }

    pub fn display_intent(&self) -> &str {
        self.intent.or_placeholder(PENDING_FIELD)
    }
}

/// Structured view of a (possibly partial) generated manuscript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Manuscript {
    pub title: Resolution,
    /// Story text with internal newlines kept as written. A bounded section
    /// is trimmed; the streaming fallback is the raw text minus the title line.
    pub body: String,
    pub body_source: BodySource,
    pub metadata: AuthorNote,
}

impl Manuscript {
    pub fn display_title(&self) -> &str {
        self.title.or_placeholder(PENDING_TITLE)
    }

    /// Both genre and intent are known, so the author's note can be shown.
    pub fn is_metadata_ready(&self) -> bool {
        !self.metadata.genre.is_pending() && !self.metadata.intent.is_pending()
    }

    /// Non-blank body lines, trimmed.
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.body.lines().map(str::trim).filter(|line| !line.is_empty())
    }
}

// --- Main Extractor Structure ---
#[derive(Debug, Default, Clone, Copy)]
pub struct ManuscriptExtractor;

impl ManuscriptExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Builds a best-effort [`Manuscript`] from `raw`.
    ///
    /// Returns `None` only for empty input. The call is pure: the same input
    /// and phase always produce the same result, so it can be re-run on every
    /// streamed chunk.
    pub fn extract(&self, raw: &str, phase: StreamPhase) -> Option<Manuscript> {
        if raw.is_empty() {
            return None;
        }

        // 1. Single pass over the lines
        let segments = tokenize(raw);

        // 2. Title: first `# ` line only
        let title_segment = segments
            .iter()
            .find(|segment| matches!(segment.kind, LineKind::Title(_)));
        let title = match title_segment.map(|segment| segment.kind) {
            Some(LineKind::Title(text)) => Resolution::from_text(text),
            _ => Resolution::Pending,
        };
        tracing::trace!("Title resolved to {:?}", title);

        // 3. Body: story section, or the streaming fallback
        let (body, body_source) = match story_bounds(&segments, raw.len()) {
            Some((start, end)) => {
                tracing::trace!("Story section spans bytes {}..{}", start, end);
                (raw[start..end].trim().to_string(), BodySource::Section)
            }
            None if phase == StreamPhase::Streaming => {
                tracing::trace!("No story header yet, using whole text as body");
                (without_segment(raw, title_segment), BodySource::Fallback)
            }
            None => {
                tracing::debug!("Finished text has no story section");
                (String::new(), BodySource::Missing)
            }
        };

        // 4. Metadata: everything after the first author's note header
        let metadata = segments
            .iter()
            .position(|segment| segment.kind == LineKind::NoteHeader)
            .map(|index| AuthorNote::from_segments(&segments[index + 1..]))
            .unwrap_or_default();

        Some(Manuscript {
            title,
            body,
            body_source,
            metadata,
        })
    }
}

/// Byte range of the story body: from the line after the first story header up
/// to whichever comes first of a `---` line, a note header, or the end of text.
fn story_bounds(segments: &[Segment<'_>], len: usize) -> Option<(usize, usize)> {
    let header = segments
        .iter()
        .position(|segment| segment.kind == LineKind::StoryHeader)?;
    let start = segments[header].end;
    let end = segments[header + 1..]
        .iter()
        .find(|segment| matches!(segment.kind, LineKind::Rule | LineKind::NoteHeader))
        .map_or(len, |segment| segment.start);
    Some((start, end))
}

/// `raw` with the given line removed. Everything else is kept untouched,
/// surrounding whitespace and blank lines included.
fn without_segment(raw: &str, segment: Option<&Segment<'_>>) -> String {
    match segment {
        Some(segment) => {
            let mut text = String::with_capacity(raw.len());
            text.push_str(&raw[..segment.start]);
            text.push_str(&raw[segment.end..]);
            text
        }
        None => raw.to_string(),
    }
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = "# 달빛 아래\n## Story\n그는 천천히 걸었다.\n---\n## Author's Note\n- **Genre:** 에세이\n- **Intent:** 고요한 밤의 위로";

    fn extract(raw: &str, phase: StreamPhase) -> Manuscript {
        ManuscriptExtractor::new()
            .extract(raw, phase)
            .expect("non-empty input must produce a manuscript")
    }

    fn resolved(value: &str) -> Resolution {
        Resolution::Resolved(value.to_string())
    }

    #[test]
    fn test_empty_input_is_absent() {
        let extractor = ManuscriptExtractor::new();
        assert_eq!(extractor.extract("", StreamPhase::Streaming), None);
        assert_eq!(extractor.extract("", StreamPhase::Complete), None);
    }

    #[test]
    fn test_complete_document() {
        let doc = extract(FULL, StreamPhase::Complete);
        assert_eq!(doc.title, resolved("달빛 아래"));
        assert_eq!(doc.body, "그는 천천히 걸었다.");
        assert_eq!(doc.body_source, BodySource::Section);
        assert_eq!(doc.metadata.genre, resolved("에세이"));
        assert_eq!(doc.metadata.intent, resolved("고요한 밤의 위로"));
        assert!(doc.is_metadata_ready());
    }

    #[test]
    fn test_partial_stream() {
        let doc = extract("# 달빛 아래\n## Story\n그는 천천히", StreamPhase::Streaming);
        assert_eq!(doc.title, resolved("달빛 아래"));
        assert_eq!(doc.body, "그는 천천히");
        assert_eq!(doc.body_source, BodySource::Section);
        assert_eq!(doc.metadata.display_genre(), "...");
        assert_eq!(doc.metadata.display_intent(), "...");
        assert!(!doc.is_metadata_ready());
    }

    #[test]
    fn test_no_header_yet_uses_fallback() {
        let doc = extract("그는 천천히 걸었다", StreamPhase::Streaming);
        assert_eq!(doc.title, Resolution::Pending);
        assert_eq!(doc.display_title(), "제목 없음...");
        assert_eq!(doc.body, "그는 천천히 걸었다");
        assert_eq!(doc.body_source, BodySource::Fallback);
    }

    #[test]
    fn test_unstructured_input_when_complete_has_empty_body() {
        let doc = extract("그는 천천히 걸었다", StreamPhase::Complete);
        assert_eq!(doc.display_title(), PENDING_TITLE);
        assert_eq!(doc.body, "");
        assert_eq!(doc.body_source, BodySource::Missing);
        assert_eq!(doc.metadata, AuthorNote::default());
    }

    #[test]
    fn test_unstructured_inputs_degrade_to_placeholders() {
        let inputs = [
            "a",
            "plain text\nsecond line",
            "##",
            "- **Genre:** 없음",
            "---",
            "  그는 걸었다\n",
            "\n첫 줄\n\n",
            " a",
        ];
        for raw in inputs {
            let doc = extract(raw, StreamPhase::Streaming);
            assert_eq!(doc.display_title(), PENDING_TITLE, "input {:?}", raw);
            assert_eq!(doc.metadata.display_genre(), PENDING_FIELD, "input {:?}", raw);
            assert_eq!(doc.metadata.display_intent(), PENDING_FIELD, "input {:?}", raw);
            assert_eq!(doc.body, raw, "input {:?}", raw);
        }
    }

    #[test]
    fn test_fallback_strips_title_line() {
        let doc = extract("# 달빛 아래\n\n그는 천천히", StreamPhase::Streaming);
        assert_eq!(doc.title, resolved("달빛 아래"));
        assert_eq!(doc.body, "\n그는 천천히");
        assert_eq!(doc.body_source, BodySource::Fallback);
        assert_eq!(doc.paragraphs().collect::<Vec<_>>(), vec!["그는 천천히"]);
    }

    #[test]
    fn test_fallback_keeps_text_around_title_line() {
        let raw = "  서문\n# 달빛 아래\n그는 \n";
        let doc = extract(raw, StreamPhase::Streaming);
        assert_eq!(doc.title, resolved("달빛 아래"));
        assert_eq!(doc.body, "  서문\n그는 \n");
    }

    #[test]
    fn test_empty_story_section_does_not_fall_back() {
        let doc = extract("# 달빛 아래\n## Story\n", StreamPhase::Streaming);
        assert_eq!(doc.body, "");
        assert_eq!(doc.body_source, BodySource::Section);
    }

    #[test]
    fn test_localized_headers() {
        let raw = "# 달빛 아래\n## 이야기\n그는 걸었다.\n\n## 작가의 말\n- **장르:** 에세이\n* **의도:** 위로";
        let doc = extract(raw, StreamPhase::Complete);
        assert_eq!(doc.body, "그는 걸었다.");
        assert_eq!(doc.metadata.genre, resolved("에세이"));
        assert_eq!(doc.metadata.intent, resolved("위로"));
    }

    #[test]
    fn test_english_keywords_are_case_insensitive() {
        let raw = "# T\n## STORY\nbody\n## AUTHOR'S NOTE\n- **GENRE:** g\n- **intent:** i";
        let doc = extract(raw, StreamPhase::Complete);
        assert_eq!(doc.body, "body");
        assert_eq!(doc.metadata.genre, resolved("g"));
        assert_eq!(doc.metadata.intent, resolved("i"));
    }

    #[test]
    fn test_rule_before_note_header_wins() {
        let raw = "# T\n## Story\n본문\n---\n후기\n## Author's Note\n- **Genre:** g";
        assert_eq!(extract(raw, StreamPhase::Complete).body, "본문");
    }

    #[test]
    fn test_note_header_before_rule_wins() {
        let raw = "# T\n## Story\n본문\n## Author's Note\n- **Genre:** g\n---\n꼬리";
        let doc = extract(raw, StreamPhase::Complete);
        assert_eq!(doc.body, "본문");
        assert_eq!(doc.metadata.genre, resolved("g"));
    }

    #[test]
    fn test_inline_dashes_do_not_end_body() {
        let raw = "## Story\n그---녀는 말했다.\n끝";
        assert_eq!(extract(raw, StreamPhase::Complete).body, "그---녀는 말했다.\n끝");
    }

    #[test]
    fn test_body_keeps_internal_newlines() {
        let raw = "## Story\n\n  첫 문단.\n\n둘째 문단.  \n\n---";
        let doc = extract(raw, StreamPhase::Complete);
        assert_eq!(doc.body, "첫 문단.\n\n둘째 문단.");
        assert_eq!(doc.paragraphs().collect::<Vec<_>>(), vec!["첫 문단.", "둘째 문단."]);
    }

    #[test]
    fn test_first_title_and_story_header_win() {
        let raw = "# 첫 제목\n## Story\n# 본문 속 제목\n## Story\n계속\n---";
        let doc = extract(raw, StreamPhase::Complete);
        assert_eq!(doc.title, resolved("첫 제목"));
        assert_eq!(doc.body, "# 본문 속 제목\n## Story\n계속");
    }

    #[test]
    fn test_title_found_on_later_line() {
        let raw = "서문\n# 늦은 제목\n## Story\n본문";
        assert_eq!(extract(raw, StreamPhase::Complete).title, resolved("늦은 제목"));
    }

    #[test]
    fn test_genre_and_intent_resolve_independently() {
        let doc = extract("## Author's Note\n- **Intent:** 위로", StreamPhase::Streaming);
        assert_eq!(doc.metadata.genre, Resolution::Pending);
        assert_eq!(doc.metadata.intent, resolved("위로"));
        assert!(!doc.is_metadata_ready());
    }

    #[test]
    fn test_metadata_lines_outside_note_are_ignored() {
        let raw = "## Story\n- **Genre:** 가짜\n---\n## Author's Note\n- **Intent:** 진짜";
        let doc = extract(raw, StreamPhase::Complete);
        assert_eq!(doc.metadata.genre, Resolution::Pending);
        assert_eq!(doc.metadata.intent, resolved("진짜"));
    }

    #[test]
    fn test_empty_label_value_stays_pending() {
        let doc = extract("## Author's Note\n- **Genre:**   ", StreamPhase::Streaming);
        assert_eq!(doc.metadata.genre, Resolution::Pending);
    }

    #[test]
    fn test_crlf_input() {
        let raw = FULL.replace('\n', "\r\n");
        let doc = extract(&raw, StreamPhase::Complete);
        assert_eq!(doc.title, resolved("달빛 아래"));
        assert_eq!(doc.body, "그는 천천히 걸었다.");
        assert_eq!(doc.metadata.intent, resolved("고요한 밤의 위로"));
    }

    #[test]
    fn test_idempotent() {
        let extractor = ManuscriptExtractor::new();
        for phase in [StreamPhase::Streaming, StreamPhase::Complete] {
            assert_eq!(extractor.extract(FULL, phase), extractor.extract(FULL, phase));
        }
    }

    #[test]
    fn test_resolved_fields_never_revert_while_streaming() {
        let extractor = ManuscriptExtractor::new();
        let mut seen_title = false;
        let mut seen_genre = false;
        let mut seen_intent = false;

        let ends = FULL.char_indices().map(|(i, _)| i).skip(1).chain([FULL.len()]);
        for end in ends {
            let doc = extractor
                .extract(&FULL[..end], StreamPhase::Streaming)
                .expect("prefix is non-empty");

            assert!(!(seen_title && doc.title.is_pending()), "title reverted at {}", end);
            assert!(!(seen_genre && doc.metadata.genre.is_pending()), "genre reverted at {}", end);
            assert!(!(seen_intent && doc.metadata.intent.is_pending()), "intent reverted at {}", end);

            seen_title |= !doc.title.is_pending();
            seen_genre |= !doc.metadata.genre.is_pending();
            seen_intent |= !doc.metadata.intent.is_pending();
        }
        assert!(seen_title && seen_genre && seen_intent);
    }

    #[test]
    fn test_completed_lines_match_final_values() {
        let extractor = ManuscriptExtractor::new();
        let finished = extract(FULL, StreamPhase::Complete);

        for (index, _) in FULL.match_indices('\n') {
            let doc = extractor
                .extract(&FULL[..=index], StreamPhase::Streaming)
                .expect("prefix is non-empty");
            if let Some(title) = doc.title.value() {
                assert_eq!(Some(title), finished.title.value());
            }
            if let Some(genre) = doc.metadata.genre.value() {
                assert_eq!(Some(genre), finished.metadata.genre.value());
            }
        }
    }

    #[test]
    fn test_serializes_pending_and_resolved_states() {
        let doc = extract("# 제목\n## Story\n본문", StreamPhase::Streaming);
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["title"], serde_json::json!({"state": "resolved", "value": "제목"}));
        assert_eq!(json["metadata"]["genre"], serde_json::json!({"state": "pending"}));
        assert_eq!(json["body_source"], "section");
    }
}
