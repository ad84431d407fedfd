//! Cumulative text snapshots over a stream of response chunks.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use futures::stream::FusedStream;

use crate::client::ChunkStream;
use crate::error::Result;
use crate::types::{FinishReason, UsageMetadata};

/// A stream wrapper that turns response chunks into cumulative text.
///
/// The wire carries deltas; every item yielded here is the full text observed
/// so far. Chunks without answer text yield nothing. The stream is lazy,
/// finite and not restartable: after it ends or yields an error it only yields
/// `None`. Dropping it drops the underlying response body.
pub struct TextSnapshots {
    inner: Option<ChunkStream>,
    text: String,
    finish_reason: Option<FinishReason>,
    usage: Option<UsageMetadata>,
}

impl TextSnapshots {
    /// Wraps a chunk stream.
    pub fn new(chunks: ChunkStream) -> Self {
        Self {
            inner: Some(chunks),
            text: String::new(),
            finish_reason: None,
            usage: None,
        }
    }

    /// The text accumulated so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The finish reason, once a chunk reported one.
    pub fn finish_reason(&self) -> Option<&FinishReason> {
        self.finish_reason.as_ref()
    }

    /// The most recent usage metadata reported by the stream.
    pub fn usage(&self) -> Option<UsageMetadata> {
        self.usage
    }

    /// Drains the stream and returns the full text.
    pub async fn collect_text(mut self) -> Result<String> {
        use futures::StreamExt;

        while let Some(snapshot) = self.next().await {
            snapshot?;
        }
        Ok(self.text)
    }
}

impl Stream for TextSnapshots {
    type Item = Result<String>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            let Some(inner) = this.inner.as_mut() else {
                return Poll::Ready(None);
            };
            match inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => {
                    if let Some(reason) = chunk.finish_reason() {
                        this.finish_reason = Some(reason.clone());
                    }
                    if let Some(usage) = chunk.usage_metadata {
                        this.usage = Some(usage);
                    }
                    if let Some(reason) = chunk.block_reason() {
                        tracing::warn!(reason, "prompt was blocked");
                    }
                    let delta = chunk.text();
                    if delta.is_empty() {
                        continue;
                    }
                    this.text.push_str(&delta);
                    return Poll::Ready(Some(Ok(this.text.clone())));
                }
                Poll::Ready(Some(Err(e))) => {
                    this.inner = None;
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Ready(None) => {
                    this.inner = None;
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

impl FusedStream for TextSnapshots {
    fn is_terminated(&self) -> bool {
        self.inner.is_none()
    }
}
