//! Draft text and pending attachments for the next message.

use std::path::Path;

use crate::attachment::{ACCEPTED_MIME_TYPES, Attachment, capture_attachments, is_accepted_mime_type};

/// The message being written.
#[derive(Debug, Default)]
pub struct Composer {
    text: String,
    attachments: Vec<Attachment>,
}

impl Composer {
    /// Creates an empty composer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the draft text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// The draft text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Captures `paths` and appends them to the pending attachments.
    ///
    /// Returns user-visible warnings: one per oversized file and one per file
    /// outside the accept hint. Files outside the hint are still attached.
    pub async fn attach<I, P>(&mut self, paths: I) -> Vec<String>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let capture = capture_attachments(paths).await;
        let mut warnings = capture.warnings;
        for attachment in &capture.attachments {
            if !is_accepted_mime_type(attachment.mime_type()) {
                warnings.push(format!(
                    "File {} has type {}, expected one of {ACCEPTED_MIME_TYPES}.",
                    attachment.name(),
                    attachment.mime_type()
                ));
            }
        }
        self.attachments.extend(capture.attachments);
        warnings
    }

    /// Removes the pending attachment at `index`.
    pub fn remove_attachment(&mut self, index: usize) -> Option<Attachment> {
        if index < self.attachments.len() {
            Some(self.attachments.remove(index))
        } else {
            None
        }
    }

    /// Pending attachments in the order they were added.
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// True if there is something to send and no send is in flight.
    pub fn can_send(&self, is_loading: bool) -> bool {
        !is_loading && self.has_content()
    }

    /// Takes the draft, leaving the composer empty.
    ///
    /// Returns `None`, and keeps the draft, when there is nothing to send.
    pub fn take(&mut self) -> Option<(String, Vec<Attachment>)> {
        if !self.has_content() {
            return None;
        }
        let text = std::mem::take(&mut self.text);
        let attachments = std::mem::take(&mut self.attachments);
        Some((text, attachments))
    }

    fn has_content(&self) -> bool {
        !self.text.trim().is_empty() || !self.attachments.is_empty()
    }
}
