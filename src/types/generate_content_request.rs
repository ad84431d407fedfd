use serde::{Deserialize, Serialize};

use crate::attachment::Attachment;
use crate::types::{Content, Part};

/// Sampling configuration for a generation request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Nucleus sampling probability.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    /// Top-k sampling limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,

    /// Maximum number of output tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

/// Body of a `generateContent` / `streamGenerateContent` request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// The conversation contents.
    pub contents: Vec<Content>,

    /// Optional system instruction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,

    /// Optional sampling configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// Builds a single-turn request.
    ///
    /// The user content carries every attachment as an inline part, in order,
    /// followed by the prompt text as the trailing part.
    pub fn from_prompt(
        prompt: &str,
        attachments: &[Attachment],
        system_instruction: Option<&str>,
        temperature: Option<f32>,
    ) -> Self {
        let mut parts: Vec<Part> = attachments
            .iter()
            .map(|attachment| Part::inline_data(attachment.mime_type(), attachment.payload()))
            .collect();
        parts.push(Part::text(prompt));

        Self {
            contents: vec![Content::user(parts)],
            system_instruction: system_instruction.map(Content::instruction),
            generation_config: temperature.map(|temperature| GenerationConfig {
                temperature: Some(temperature),
                ..GenerationConfig::default()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn prompt_only_request() {
        let request = GenerateContentRequest::from_prompt("Hello", &[], None, None);
        assert_eq!(
            to_value(&request).unwrap(),
            json!({"contents": [{"role": "user", "parts": [{"text": "Hello"}]}]})
        );
    }

    #[test]
    fn attachments_precede_prompt_and_lose_data_url_prefix() {
        let png = Attachment::from_bytes("dot.png", "image/png", b"\x89PNG").unwrap();
        let txt = Attachment::from_bytes("notes.txt", "text/plain", b"hi").unwrap();
        let request = GenerateContentRequest::from_prompt(
            "Describe these",
            &[png, txt],
            Some("Be precise."),
            Some(0.5),
        );

        assert_eq!(
            to_value(&request).unwrap(),
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        {"inlineData": {"mimeType": "image/png", "data": "iVBORw=="}},
                        {"inlineData": {"mimeType": "text/plain", "data": "aGk="}},
                        {"text": "Describe these"}
                    ]
                }],
                "systemInstruction": {"parts": [{"text": "Be precise."}]},
                "generationConfig": {"temperature": 0.5}
            })
        );
    }
}
