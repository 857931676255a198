use serde::Deserialize;

use super::LlmResponse;
use crate::error::AppError;

const CONTENT_MARKER: &str = "content=";
const REASONING_MARKER: &str = "reasoning=";
const IRRELEVANT_MARKER: &str = "is_irrelevant=";
const REASONING_SEPARATOR: &str = ", reasoning=";
const IRRELEVANT_SEPARATOR: &str = ", is_irrelevant=";

#[derive(Debug, Deserialize)]
struct StructuredAnswer {
    #[serde(default)]
    content: String,
    #[serde(default)]
    reasoning: String,
    #[serde(default)]
    is_irrelevant: Option<bool>,
}

/// Turn raw model output into an [`LlmResponse`].
///
/// JSON matching the response schema is preferred. Output rendered as
/// `content="..", reasoning="..", is_irrelevant=True` is accepted as a fallback.
/// An undeterminable relevance flag counts as irrelevant.
pub fn parse_llm_output(raw: &str) -> Result<LlmResponse, AppError> {
    let trimmed = raw.trim();

    if let Ok(answer) = serde_json::from_str::<StructuredAnswer>(trimmed) {
        return Ok(LlmResponse {
            content: answer.content,
            reasoning: answer.reasoning,
            is_irrelevant: answer.is_irrelevant.unwrap_or(true),
        });
    }

    parse_marked_fields(trimmed).ok_or_else(|| {
        let preview: String = trimmed.chars().take(120).collect();
        AppError::LLMParsing(format!(
            "response carries neither JSON fields nor content/reasoning markers: {preview}"
        ))
    })
}

fn parse_marked_fields(raw: &str) -> Option<LlmResponse> {
    let content = raw
        .split_once(CONTENT_MARKER)
        .map(|(_, rest)| marked_value(rest, REASONING_SEPARATOR));
    let reasoning = raw
        .split_once(REASONING_MARKER)
        .map(|(_, rest)| marked_value(rest, IRRELEVANT_SEPARATOR));

    if content.is_none() && reasoning.is_none() {
        return None;
    }

    let is_irrelevant = raw
        .split_once(IRRELEVANT_MARKER)
        .and_then(|(_, rest)| parse_flag(rest))
        .unwrap_or(true);

    Some(LlmResponse {
        content: content.unwrap_or_default(),
        reasoning: reasoning.unwrap_or_default(),
        is_irrelevant,
    })
}

fn marked_value(rest: &str, terminator: &str) -> String {
    let value = rest.split_once(terminator).map_or(rest, |(value, _)| value);
    value
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .replace("\\n", "\n")
}

fn parse_flag(rest: &str) -> Option<bool> {
    let rest = rest.trim_start();
    if rest.starts_with("True") || rest.starts_with("true") {
        Some(true)
    } else if rest.starts_with("False") || rest.starts_with("false") {
        Some(false)
    } else {
        None
    }
}
