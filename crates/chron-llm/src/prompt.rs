//! Request context and prompt construction.

use serde::Serialize;

/// Maximum characters of an episode description included in a prompt.
pub const DESCRIPTION_LIMIT: usize = 600;

const SYSTEM_PROMPT: &str = "You classify history podcast episodes. \
Given a provisional series name and its episodes, reply with a single JSON object \
with exactly these keys: \
\"seriesTitle\" (short display title for the series), \
\"umbrellaTitle\" (broad historical theme the series belongs to), \
\"yearPrimary\", \"yearFrom\", \"yearTo\" (integers, negative for BC, or null when unknown), \
\"scope\" (one of \"point\", \"range\", \"broad\", \"unknown\"), \
\"confidence\" (number between 0 and 1). \
Reply with JSON only.";

/// One member episode as shown to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EpisodeContext {
    pub number: u32,
    pub title: String,
    pub description: String,
}

/// Everything the model sees about one series seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JudgeRequest {
    /// Provisional series name.
    pub stem: String,
    pub episodes: Vec<EpisodeContext>,
    /// Century labels attached to any member episode.
    pub centuries: Vec<String>,
}

impl JudgeRequest {
    /// Render the user message.
    #[must_use]
    pub fn user_prompt(&self) -> String {
        let mut prompt = format!("Series: {}\n\nEpisodes:\n", self.stem);
        for ep in &self.episodes {
            prompt.push_str(&format!("#{} {}\n", ep.number, ep.title));
            let description = truncate_chars(ep.description.trim(), DESCRIPTION_LIMIT);
            if !description.is_empty() {
                prompt.push_str(&format!("  {description}\n"));
            }
        }
        if !self.centuries.is_empty() {
            prompt.push_str(&format!("\nKnown centuries: {}\n", self.centuries.join(", ")));
        }
        prompt
    }

    /// Build the chat-completion request body.
    #[must_use]
    pub fn chat_body(&self, model: &str) -> serde_json::Value {
        serde_json::json!({
            "model": model,
            "temperature": 0,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": self.user_prompt() },
            ],
        })
    }
}

fn truncate_chars(text: &str, limit: usize) -> &str {
    text.char_indices()
        .nth(limit)
        .map_or(text, |(idx, _)| &text[..idx])
}

/// Strip a surrounding Markdown code fence (```` ```json ... ``` ````).
#[must_use]
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
