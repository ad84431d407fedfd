use serde::{Deserialize, Serialize};

use crate::types::Content;

/// Why the model stopped generating a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinishReason {
    /// Natural stop point or stop sequence.
    Stop,
    /// Output token limit reached.
    MaxTokens,
    /// Flagged for safety reasons.
    Safety,
    /// Flagged for recitation.
    Recitation,
    /// Any other reason.
    #[serde(other)]
    Other,
}

/// A single response candidate.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Generated content; absent on chunks that only carry a finish reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,

    /// Set on the final chunk of the candidate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,

    /// Candidate index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

/// Feedback about the prompt, set when the prompt was blocked.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// The reason the prompt was blocked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
}

/// Token accounting for a request.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    /// Tokens in the prompt.
    #[serde(default)]
    pub prompt_token_count: u32,

    /// Tokens across all candidates.
    #[serde(default)]
    pub candidates_token_count: u32,

    /// Total tokens.
    #[serde(default)]
    pub total_token_count: u32,
}

/// A response, or one chunk of a streamed response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Response candidates.
    #[serde(default)]
    pub candidates: Vec<Candidate>,

    /// Prompt feedback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<PromptFeedback>,

    /// Usage metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<UsageMetadata>,

    /// The model version that produced the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

impl GenerateContentResponse {
    /// Creates a chunk with one candidate holding `text`.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(Content {
                    role: Some(crate::types::ContentRole::Model),
                    parts: vec![crate::types::Part::text(text)],
                }),
                ..Candidate::default()
            }],
            ..Self::default()
        }
    }

    /// The answer text of the first candidate, or the empty string.
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(Content::text)
            .unwrap_or_default()
    }

    /// The finish reason of the first candidate, if present.
    pub fn finish_reason(&self) -> Option<&FinishReason> {
        self.candidates
            .first()
            .and_then(|candidate| candidate.finish_reason.as_ref())
    }

    /// The prompt block reason, if the prompt was blocked.
    pub fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_chunk_deserialization() {
        let json = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "Hi "}, {"text": "there"}], "role": "model"},
                "finishReason": "STOP",
                "index": 0
            }],
            "usageMetadata": {"promptTokenCount": 4, "candidatesTokenCount": 2, "totalTokenCount": 6},
            "modelVersion": "gemini-3-flash-preview"
        }"#;
        let chunk: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(chunk.text(), "Hi there");
        assert_eq!(chunk.finish_reason(), Some(&FinishReason::Stop));
        assert_eq!(chunk.usage_metadata.unwrap().total_token_count, 6);
    }

    #[test]
    fn unknown_finish_reason() {
        let json = r#"{"candidates": [{"finishReason": "MALFORMED_FUNCTION_CALL"}]}"#;
        let chunk: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(chunk.finish_reason(), Some(&FinishReason::Other));
        assert_eq!(chunk.text(), "");
    }

    #[test]
    fn blocked_prompt() {
        let json = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let chunk: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert!(chunk.candidates.is_empty());
        assert_eq!(chunk.block_reason(), Some("SAFETY"));
    }
}
