use serde::{Deserialize, Serialize};

/// Role of the author of a [`Content`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentRole {
    /// Content authored by the user.
    User,

    /// Content authored by the model.
    Model,
}

/// Raw bytes carried inline in a request, base64 encoded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    /// The IANA media type of the data.
    pub mime_type: String,

    /// The base64-encoded payload, without a data URL prefix.
    pub data: String,
}

impl Blob {
    /// Create a new `Blob`.
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

/// One part of a multi-part [`Content`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Part {
    /// A text part.
    Text {
        /// The text.
        text: String,
        /// Set when the part is a thought summary rather than answer text.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thought: Option<bool>,
    },

    /// An inline binary part.
    InlineData {
        /// The inline data.
        #[serde(rename = "inlineData")]
        inline_data: Blob,
    },

    /// Any other part kind (function calls, code execution, ...), kept verbatim.
    Other(serde_json::Value),
}

impl Part {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text {
            text: text.into(),
            thought: None,
        }
    }

    /// Create an inline data part.
    pub fn inline_data(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Part::InlineData {
            inline_data: Blob::new(mime_type, data),
        }
    }

    /// The answer text of this part, if it is a non-thought text part.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text {
                text,
                thought: None | Some(false),
            } => Some(text),
            _ => None,
        }
    }
}

/// A multi-part message.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Content {
    /// The author of the content; omitted for system instructions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ContentRole>,

    /// Ordered parts of the content.
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// Create user content from parts.
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some(ContentRole::User),
            parts,
        }
    }

    /// Create role-less content holding a single text part.
    pub fn instruction(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }

    /// Concatenates the answer text of every part.
    pub fn text(&self) -> String {
        self.parts.iter().filter_map(Part::as_text).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn inline_data_serialization() {
        let part = Part::inline_data("image/png", "iVBORw0KGgo=");
        assert_eq!(
            to_value(&part).unwrap(),
            json!({"inlineData": {"mimeType": "image/png", "data": "iVBORw0KGgo="}})
        );
    }

    #[test]
    fn user_content_serialization() {
        let content = Content::user(vec![Part::text("Hello")]);
        assert_eq!(
            to_value(&content).unwrap(),
            json!({"role": "user", "parts": [{"text": "Hello"}]})
        );

        let instruction = Content::instruction("Be concise.");
        assert_eq!(
            to_value(&instruction).unwrap(),
            json!({"parts": [{"text": "Be concise."}]})
        );
    }

    #[test]
    fn unknown_parts_are_preserved() {
        let content: Content = serde_json::from_value(json!({
            "role": "model",
            "parts": [
                {"text": "Hi"},
                {"functionCall": {"name": "lookup", "args": {}}},
                {"text": " there", "thoughtSignature": "abc"}
            ]
        }))
        .unwrap();
        assert_eq!(content.role, Some(ContentRole::Model));
        assert!(matches!(content.parts[1], Part::Other(_)));
        assert_eq!(content.text(), "Hi there");
    }

    #[test]
    fn thought_parts_are_not_answer_text() {
        let content: Content = serde_json::from_value(json!({
            "parts": [
                {"text": "considering...", "thought": true},
                {"text": "Answer"}
            ]
        }))
        .unwrap();
        assert_eq!(content.text(), "Answer");
    }
}
