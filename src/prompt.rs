// src/prompt.rs
use crate::utils::error::PromptError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Output contract the extractor depends on. Keep in sync with `extractors::segments`.
pub const OUTPUT_FORMAT: &str = "\
# [Title]

## Story
(The complete literary manuscript in Korean.)

---

## Author's Note
- **Genre:** (The final genre/format)
- **Intent:** (An explanation of the creative choices and the story's core message.)";

const ROLE: &str = "\
You are a professional novelist and literary ghostwriter.
Turn the reader's configuration into a finished, polished manuscript written in Korean (한국어).
Favour thematic depth, concrete sensory detail, and controlled pacing over exposition.";

const GUIDELINES: &str = "\
- Follow every configured option exactly; when an option says auto, choose the most fitting one yourself.
- Give the story a clear beginning, an escalating middle and a meaningful resolution.
- Separate paragraphs with blank lines and use standard dialogue formatting.";

const AUTO: &str = "Auto-detect / Best fit";

/// Target length of the generated story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoryLength {
    Short,
    Medium,
    Long,
    Max,
}

impl StoryLength {
    fn instruction(self) -> &'static str {
        match self {
            StoryLength::Short => "Short length (approx. 1,000 ~ 1,500 characters). Concise but impactful.",
            StoryLength::Medium => "Standard length (approx. 2,000 ~ 3,000 characters). Well-paced.",
            StoryLength::Long => "Long length (approx. 4,000+ characters). Richly detailed.",
            StoryLength::Max => "Maximum possible length (aim for 8,000+ characters). Epic and sprawling.",
        }
    }
}

/// Story-generation parameters. Absent options fall back to model defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub content: String,
    pub format: Option<String>,
    pub length: Option<StoryLength>,
    pub genre: Option<String>,
    pub theme: Option<String>,
    pub author_style: Option<String>,
    pub ending_style: Option<String>,
    pub point_of_view: Option<String>,
    pub emotional_tone: Option<String>,
    pub narrative_pace: Option<String>,
    pub narrative_mode: Option<String>,
    pub author_personality: Option<String>,
    pub author_tone: Option<String>,
    pub custom_story_config: Option<String>,
    pub custom_author_config: Option<String>,
}

impl GenerationConfig {
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self, PromptError> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        let config: GenerationConfig = serde_json::from_str(&raw)?;
        tracing::debug!("Loaded generation config from {}", path.as_ref().display());
        Ok(config)
    }
}

// Blank strings count as unset.
fn option_value(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn instruction(label: &str, value: &Option<String>, default: &str) -> String {
    format!("- **{}:** {}", label, option_value(value).unwrap_or(default))
}

/// System instruction sent with every generation request.
pub fn system_prompt() -> String {
    format!(
        "<role>\n{}\n</role>\n\n<guidelines>\n{}\n</guidelines>\n\n<output_format>\nStrictly follow this Markdown structure:\n\n{}\n</output_format>\n",
        ROLE, GUIDELINES, OUTPUT_FORMAT
    )
}

/// Renders the user prompt: one instruction line per option.
pub fn build_user_prompt(config: &GenerationConfig) -> String {
    let mut lines = vec![
        "Please write a literary piece based on the following configuration:\n".to_string(),
        instruction("Format", &config.format, "Default (Short Novel / Story)"),
    ];

    lines.push(match config.length {
        Some(length) => format!("- **Target Length:** {}", length.instruction()),
        None => "- **Target Length:** Auto (Writer's discretion, usually 2,000+ characters)".to_string(),
    });

    if let Some(extra) = option_value(&config.custom_story_config) {
        lines.push(format!("- **Additional Story Requirements:** {}", extra));
    }

    lines.push(instruction("Target Author Style", &config.author_style, "Professional Novelist Style"));
    lines.push(instruction("Emotional Tone", &config.emotional_tone, "Balanced"));
    lines.push(instruction("Narrative Pace", &config.narrative_pace, "Appropriate to genre"));
    lines.push(instruction("Narrative Mode", &config.narrative_mode, "Balanced mix of dialogue and narration"));
    lines.push(instruction("Author's Personality", &config.author_personality, "Professional, Objective"));
    lines.push(instruction("Author's Voice/Speech", &config.author_tone, "Polite, Formal"));

    if let Some(extra) = option_value(&config.custom_author_config) {
        lines.push(format!("- **Additional Author Instructions:** {}", extra));
    }

    lines.push(instruction("Genre", &config.genre, AUTO));
    lines.push(instruction("Theme", &config.theme, AUTO));
    lines.push(instruction("Ending Style", &config.ending_style, AUTO));
    lines.push(instruction("Point of View", &config.point_of_view, AUTO));

    let content = config.content.trim();
    lines.push(if content.is_empty() {
        "- **Story Idea / Content:** Creative Freedom (Invent a compelling story based on the genre)".to_string()
    } else {
        format!("- **Story Idea / Content:** {}", content)
    });

    lines.join("\n")
}
