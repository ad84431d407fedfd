//! Ordered chat state.
//!
//! The store is append-only. The one exception is the streaming model
//! message, whose text and streaming flag are updated in place through the
//! [`MessageHandle`] obtained when it was appended.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::attachment::Attachment;
use crate::error::{Error, Result};
use crate::utils::time::unix_millis;

/// Sequence shared by every store so ids never repeat within the process.
static NEXT_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Text that replaces a streaming reply when its stream fails.
pub const INTERRUPTED_TEXT: &str = "Connection interrupted.";

/// Text of the error message appended after a failed stream.
pub const APOLOGY_TEXT: &str = "I apologize, but I encountered an error processing your request. Please check your connection or try again.";

/// The author of a chat message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Written by the user.
    User,

    /// Written by the model.
    Model,
}

/// Unique identifier of a message within the process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// The id as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    id: MessageId,
    role: Role,
    text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<Attachment>,
    #[serde(with = "crate::utils::time")]
    timestamp: OffsetDateTime,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    is_streaming: bool,
}

impl Message {
    /// The message id.
    pub fn id(&self) -> &MessageId {
        &self.id
    }

    /// Who wrote the message.
    pub fn role(&self) -> Role {
        self.role
    }

    /// The latest full text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Attachments sent with the message.
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Creation time.
    pub fn timestamp(&self) -> OffsetDateTime {
        self.timestamp
    }

    /// True while the reply is still being streamed.
    pub fn is_streaming(&self) -> bool {
        self.is_streaming
    }

    /// True for messages written by the user.
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// A handle to a message, obtained when the message is appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHandle {
    index: usize,
    id: MessageId,
}

impl MessageHandle {
    /// The id of the referenced message.
    pub fn id(&self) -> &MessageId {
        &self.id
    }
}

/// The ordered message list of one conversation.
#[derive(Debug, Default)]
pub struct ChatStore {
    messages: Vec<Message>,
}

impl ChatStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a user message.
    pub fn append_user_message(
        &mut self,
        text: impl Into<String>,
        attachments: Vec<Attachment>,
    ) -> MessageHandle {
        self.push(Role::User, text.into(), attachments, false)
    }

    /// Appends an empty, streaming model message.
    ///
    /// Fails if another message is still streaming.
    pub fn append_placeholder_model_message(&mut self) -> Result<MessageHandle> {
        if let Some(streaming) = self.streaming_message() {
            return Err(Error::invalid_state(format!(
                "message {} is still streaming",
                streaming.id
            )));
        }
        Ok(self.push(Role::Model, String::new(), Vec::new(), true))
    }

    /// Replaces the text of a streaming message.
    pub fn patch_message_text(
        &mut self,
        handle: &MessageHandle,
        text: impl Into<String>,
    ) -> Result<()> {
        let message = self.streaming_mut(handle)?;
        message.text = text.into();
        Ok(())
    }

    /// Ends streaming for a message. Allowed exactly once per message.
    pub fn mark_streaming_done(&mut self, handle: &MessageHandle) -> Result<()> {
        let message = self.streaming_mut(handle)?;
        message.is_streaming = false;
        Ok(())
    }

    /// Overwrites a streaming message with [`INTERRUPTED_TEXT`] and ends
    /// streaming.
    pub fn interrupt(&mut self, handle: &MessageHandle) -> Result<()> {
        let message = self.streaming_mut(handle)?;
        message.text = INTERRUPTED_TEXT.to_string();
        message.is_streaming = false;
        Ok(())
    }

    /// Appends a finished model message carrying an error for the user.
    pub fn append_error_message(&mut self, text: impl Into<String>) -> MessageHandle {
        self.push(Role::Model, text.into(), Vec::new(), false)
    }

    /// All messages in order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Looks up the message behind `handle`.
    pub fn get(&self, handle: &MessageHandle) -> Option<&Message> {
        self.messages
            .get(handle.index)
            .filter(|message| message.id == handle.id)
    }

    /// The message that is currently streaming, if any.
    pub fn streaming_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|message| message.is_streaming)
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if there are no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn push(
        &mut self,
        role: Role,
        text: String,
        attachments: Vec<Attachment>,
        is_streaming: bool,
    ) -> MessageHandle {
        let timestamp = OffsetDateTime::now_utc();
        let sequence = NEXT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let id = MessageId(format!("{}-{}", unix_millis(timestamp), sequence));
        let handle = MessageHandle {
            index: self.messages.len(),
            id: id.clone(),
        };
        self.messages.push(Message {
            id,
            role,
            text,
            attachments,
            timestamp,
            is_streaming,
        });
        handle
    }

    fn streaming_mut(&mut self, handle: &MessageHandle) -> Result<&mut Message> {
        let message = self
            .messages
            .get_mut(handle.index)
            .filter(|message| message.id == handle.id)
            .ok_or_else(|| Error::invalid_state(format!("no message {}", handle.id)))?;
        if !message.is_streaming {
            return Err(Error::invalid_state(format!(
                "message {} is not streaming",
                handle.id
            )));
        }
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn user_then_placeholder() {
        let mut store = ChatStore::new();
        let user = store.append_user_message("Hello", Vec::new());
        let reply = store.append_placeholder_model_message().unwrap();

        assert_eq!(store.len(), 2);
        let user = store.get(&user).unwrap();
        assert_eq!(user.role(), Role::User);
        assert_eq!(user.text(), "Hello");
        assert!(!user.is_streaming());

        let reply = store.get(&reply).unwrap();
        assert_eq!(reply.role(), Role::Model);
        assert_eq!(reply.text(), "");
        assert!(reply.is_streaming());
        assert_eq!(store.streaming_message().unwrap().id(), reply.id());
    }

    #[test]
    fn patch_replaces_text() {
        let mut store = ChatStore::new();
        let reply = store.append_placeholder_model_message().unwrap();
        store.patch_message_text(&reply, "Hi").unwrap();
        store.patch_message_text(&reply, "Hi there").unwrap();
        assert_eq!(store.get(&reply).unwrap().text(), "Hi there");
        assert!(store.get(&reply).unwrap().is_streaming());

        store.mark_streaming_done(&reply).unwrap();
        assert!(!store.get(&reply).unwrap().is_streaming());
        assert!(store.streaming_message().is_none());
    }

    #[test]
    fn streaming_ends_exactly_once() {
        let mut store = ChatStore::new();
        let reply = store.append_placeholder_model_message().unwrap();
        store.mark_streaming_done(&reply).unwrap();

        assert!(store.mark_streaming_done(&reply).unwrap_err().is_invalid_state());
        assert!(store.patch_message_text(&reply, "late").unwrap_err().is_invalid_state());
        assert!(store.interrupt(&reply).unwrap_err().is_invalid_state());
        assert_eq!(store.get(&reply).unwrap().text(), "");
    }

    #[test]
    fn one_streaming_message_at_a_time() {
        let mut store = ChatStore::new();
        let first = store.append_placeholder_model_message().unwrap();
        assert!(store.append_placeholder_model_message().unwrap_err().is_invalid_state());

        store.mark_streaming_done(&first).unwrap();
        assert!(store.append_placeholder_model_message().is_ok());
    }

    #[test]
    fn interrupt_overwrites_text() {
        let mut store = ChatStore::new();
        let reply = store.append_placeholder_model_message().unwrap();
        store.patch_message_text(&reply, "partial answ").unwrap();
        store.interrupt(&reply).unwrap();

        let error = store.append_error_message(APOLOGY_TEXT);
        let reply = store.get(&reply).unwrap();
        assert_eq!(reply.text(), INTERRUPTED_TEXT);
        assert!(!reply.is_streaming());

        let error = store.get(&error).unwrap();
        assert_eq!(error.role(), Role::Model);
        assert_eq!(error.text(), APOLOGY_TEXT);
        assert!(!error.is_streaming());
    }

    #[test]
    fn ids_are_unique() {
        let mut store = ChatStore::new();
        for i in 0..50 {
            store.append_user_message(format!("message {i}"), Vec::new());
        }
        let ids: HashSet<&MessageId> = store.messages().iter().map(Message::id).collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn foreign_handle_is_rejected() {
        let mut first = ChatStore::new();
        let mut second = ChatStore::new();
        second.append_user_message("padding", Vec::new());
        let handle = first.append_placeholder_model_message().unwrap();

        assert!(second.get(&handle).is_none());
        assert!(second.patch_message_text(&handle, "x").is_err());
    }

    #[test]
    fn handle_from_lockstep_store_is_rejected() {
        for _ in 0..20 {
            let mut first = ChatStore::new();
            let mut second = ChatStore::new();
            let handle = first.append_placeholder_model_message().unwrap();
            let other = second.append_placeholder_model_message().unwrap();
            assert_ne!(handle.id(), other.id());

            assert!(second.get(&handle).is_none());
            assert!(second.patch_message_text(&handle, "x").unwrap_err().is_invalid_state());
            assert!(second.mark_streaming_done(&handle).is_err());
            assert!(second.get(&other).unwrap().is_streaming());
            assert_eq!(second.get(&other).unwrap().text(), "");
        }
    }

    #[test]
    fn message_serialization() {
        let mut store = ChatStore::new();
        let attachment = Attachment::from_bytes("a.txt", "text/plain", b"a").unwrap();
        store.append_user_message("Hello", vec![attachment]);
        store.append_placeholder_model_message().unwrap();

        let json = serde_json::to_value(store.messages()).unwrap();
        assert_eq!(json[0]["role"], "user");
        assert_eq!(json[0]["attachments"][0]["mimeType"], "text/plain");
        assert!(json[0].get("isStreaming").is_none());
        assert_eq!(json[1]["role"], "model");
        assert_eq!(json[1]["isStreaming"], true);
        assert!(json[1].get("attachments").is_none());

        let restored: Vec<Message> = serde_json::from_value(json).unwrap();
        assert_eq!(restored.as_slice(), store.messages());
    }
}
