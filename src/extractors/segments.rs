// src/extractors/segments.rs

// --- Imports ---
use once_cell::sync::Lazy;
use regex::Regex;

// --- Regex Patterns for Line Classification (Lazy Static) ---
// Every pattern runs against a single line with its terminator removed.

// "## Story", "### story", "## 이야기". English keyword is case-insensitive, Korean is exact.
static STORY_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t]*#{2,}[ \t]*(?:(?i:story)|이야기)")
        .expect("Failed to compile STORY_HEADER_RE")
});

// "## Author's Note" (ASCII or typographic apostrophe) or "## 작가의 말".
static NOTE_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t]*#{2,}[ \t]*(?:(?i:author['’]s\s+note)|작가의\s*말)")
        .expect("Failed to compile NOTE_HEADER_RE")
});

// A single '#' at column 0, at least one space or tab, then the title text.
static TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#[ \t]+(.*)$").expect("Failed to compile TITLE_RE")
});

// "- **Genre:** value", "* **의도:** value", also tolerates "- **Genre**: value".
static META_ENTRY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[ \t]*[-*][ \t]*\*\*[ \t]*(?P<label>(?i:genre|intent)|장르|의도)[ \t]*(?::\*\*|\*\*[ \t]*:)(?P<value>.*)$",
    )
    .expect("Failed to compile META_ENTRY_RE")
});

// --- Data Structures ---

/// Label of a bullet line inside the author's note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaLabel {
    Genre,
    Intent,
}

impl MetaLabel {
    fn parse(label: &str) -> Option<Self> {
        match label {
            "장르" => Some(Self::Genre),
            "의도" => Some(Self::Intent),
            other if other.eq_ignore_ascii_case("genre") => Some(Self::Genre),
            other if other.eq_ignore_ascii_case("intent") => Some(Self::Intent),
            _ => None,
        }
    }
}

/// What a single line of the manuscript is, as far as section detection cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `# Title` line; the text is trimmed and may be empty while streaming.
    Title(&'a str),
    StoryHeader,
    NoteHeader,
    /// A line holding only `---`.
    Rule,
    MetaEntry { label: MetaLabel, value: &'a str },
    Text,
}

impl LineKind<'_> {
    pub fn label(&self) -> &'static str {
        match self {
            LineKind::Title(_) => "title",
            LineKind::StoryHeader => "story-header",
            LineKind::NoteHeader => "note-header",
            LineKind::Rule => "rule",
            LineKind::MetaEntry { label: MetaLabel::Genre, .. } => "meta-genre",
            LineKind::MetaEntry { label: MetaLabel::Intent, .. } => "meta-intent",
            LineKind::Text => "text",
        }
    }
}

/// One line of the raw document together with its byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub kind: LineKind<'a>,
    /// Byte offset of the first character of the line.
    pub start: usize,
    /// Byte offset just past the line terminator (or end of input).
    pub end: usize,
    /// The line without its `\n` / `\r\n` terminator.
    pub text: &'a str,
}

// --- Tokenizer ---

/// Splits `raw` into line segments in a single pass.
///
/// The last line may be unterminated (it is still being streamed); it is
/// classified exactly like a complete line.
pub fn tokenize(raw: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut offset = 0;

    for line in raw.split_inclusive('\n') {
        let start = offset;
        offset += line.len();

        let text = line.strip_suffix('\n').unwrap_or(line);
        let text = text.strip_suffix('\r').unwrap_or(text);

        segments.push(Segment {
            kind: classify(text),
            start,
            end: offset,
            text,
        });
    }

    tracing::trace!("Tokenized {} bytes into {} segments", raw.len(), segments.len());
    segments
}

fn classify(line: &str) -> LineKind<'_> {
    if line.trim() == "---" {
        return LineKind::Rule;
    }
    if STORY_HEADER_RE.is_match(line) {
        return LineKind::StoryHeader;
    }
    if NOTE_HEADER_RE.is_match(line) {
        return LineKind::NoteHeader;
    }
    if let Some(caps) = TITLE_RE.captures(line) {
        let text = caps.get(1).map_or("", |m| m.as_str().trim());
        return LineKind::Title(text);
    }
    if let Some(caps) = META_ENTRY_RE.captures(line) {
        let label = caps.name("label").and_then(|m| MetaLabel::parse(m.as_str()));
        if let Some(label) = label {
            let value = caps.name("value").map_or("", |m| m.as_str().trim());
            return LineKind::MetaEntry { label, value };
        }
    }
    LineKind::Text
}
