//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which owns the conversation
//! state and drives one streaming request per user message.

use std::time::Instant;

use futures::StreamExt;

use crate::attachment::Attachment;
use crate::chat::config::ChatConfig;
use crate::chat::store::{APOLOGY_TEXT, ChatStore, Message, MessageHandle};
use crate::client::ContentStreamer;
use crate::error::{Error, Result};
use crate::observability::{CHAT_SEND_DURATION, CHAT_SEND_FAILURES, CHAT_SENDS};
use crate::render::Renderer;
use crate::snapshot::TextSnapshots;
use crate::types::{GenerateContentRequest, Model};

/// Where a session is in its send cycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SendState {
    /// Ready to accept a message.
    #[default]
    Idle,

    /// Messages are appended and the request is being opened.
    Sending,

    /// Snapshots are arriving.
    Streaming,
}

/// The result of [`ChatSession::send`].
#[derive(Debug)]
pub enum SendOutcome {
    /// Nothing was sent: the input was blank or a send was in flight.
    Ignored,

    /// The reply streamed to completion.
    Completed {
        /// Full text of the reply.
        text: String,
    },

    /// The request failed. The reply is marked interrupted and an apology
    /// follows it in the store.
    Failed {
        /// What went wrong.
        error: Error,
    },
}

impl SendOutcome {
    /// True if the reply completed.
    pub fn is_completed(&self) -> bool {
        matches!(self, SendOutcome::Completed { .. })
    }

    /// True if the request failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, SendOutcome::Failed { .. })
    }
}

/// One send cycle. Dropping it returns the session to idle and interrupts
/// the reply if it is still streaming.
struct SendCycle<'a> {
    state: &'a mut SendState,
    store: &'a mut ChatStore,
    reply: Option<MessageHandle>,
}

impl<'a> SendCycle<'a> {
    fn enter(state: &'a mut SendState, store: &'a mut ChatStore) -> Self {
        *state = SendState::Sending;
        Self {
            state,
            store,
            reply: None,
        }
    }

    fn set(&mut self, next: SendState) {
        *self.state = next;
    }

    fn store(&self) -> &ChatStore {
        &*self.store
    }

    fn store_mut(&mut self) -> &mut ChatStore {
        &mut *self.store
    }

    fn open_reply(&mut self) -> Result<MessageHandle> {
        let reply = self.store.append_placeholder_model_message()?;
        self.reply = Some(reply.clone());
        Ok(reply)
    }
}

impl Drop for SendCycle<'_> {
    fn drop(&mut self) {
        if let Some(reply) = self.reply.take() {
            let streaming = self.store.get(&reply).is_some_and(Message::is_streaming);
            if streaming {
                tracing::warn!(id = %reply.id(), "send abandoned mid-stream; interrupting reply");
                if let Err(err) = self.store.interrupt(&reply) {
                    tracing::warn!(error = %err, "could not interrupt reply");
                }
            }
        }
        *self.state = SendState::Idle;
    }
}

/// A chat session that manages conversation state and API interactions.
pub struct ChatSession<S: ContentStreamer> {
    streamer: S,
    config: ChatConfig,
    store: ChatStore,
    state: SendState,
}

impl<S: ContentStreamer> ChatSession<S> {
    /// Creates a new chat session with the given streamer and configuration.
    pub fn new(streamer: S, config: ChatConfig) -> Self {
        Self {
            streamer,
            config,
            store: ChatStore::new(),
            state: SendState::Idle,
        }
    }

    /// Sends a user message and streams the reply into the store.
    ///
    /// The user message and an empty streaming reply are appended, and
    /// rendered, before the request is opened. Every snapshot replaces the
    /// reply text. On failure the reply is marked interrupted and an apology
    /// message is appended. The session is idle again when this returns, or
    /// when the returned future is dropped early. In the latter case a reply
    /// still streaming is marked interrupted.
    ///
    /// Blank text without attachments is ignored.
    pub async fn send(
        &mut self,
        text: &str,
        attachments: Vec<Attachment>,
        renderer: &mut dyn Renderer,
    ) -> SendOutcome {
        if self.state != SendState::Idle {
            tracing::debug!(state = ?self.state, "send ignored while another is in flight");
            return SendOutcome::Ignored;
        }
        if text.trim().is_empty() && attachments.is_empty() {
            return SendOutcome::Ignored;
        }

        let mut cycle = SendCycle::enter(&mut self.state, &mut self.store);
        let start = Instant::now();
        CHAT_SENDS.click();

        let request = GenerateContentRequest::from_prompt(
            text,
            &attachments,
            self.config.system_instruction.as_deref(),
            self.config.temperature,
        );

        let user = cycle.store_mut().append_user_message(text, attachments);
        render_appended(cycle.store(), &user, renderer);
        let result = match cycle.open_reply() {
            Ok(reply) => {
                render_appended(cycle.store(), &reply, renderer);
                renderer.set_loading(true);
                let result = stream_reply(
                    &self.streamer,
                    &self.config.model,
                    request,
                    &mut cycle,
                    &reply,
                    renderer,
                )
                .await;
                if result.is_err() {
                    match cycle.store_mut().interrupt(&reply) {
                        Ok(()) => render_updated(cycle.store(), &reply, renderer),
                        Err(err) => tracing::warn!(error = %err, "could not interrupt reply"),
                    }
                }
                result
            }
            Err(err) => Err(err),
        };

        let outcome = match result {
            Ok(text) => {
                tracing::debug!(
                    model = %self.config.model,
                    chars = text.len(),
                    "reply complete"
                );
                SendOutcome::Completed { text }
            }
            Err(error) => {
                CHAT_SEND_FAILURES.click();
                tracing::error!(model = %self.config.model, error = %error, "error during streaming");
                let apology = cycle.store_mut().append_error_message(APOLOGY_TEXT);
                render_appended(cycle.store(), &apology, renderer);
                SendOutcome::Failed { error }
            }
        };

        renderer.set_loading(false);
        CHAT_SEND_DURATION.add(start.elapsed().as_secs_f64());
        drop(cycle);
        outcome
    }

    /// True while a send is in flight.
    pub fn is_loading(&self) -> bool {
        self.state != SendState::Idle
    }

    /// The current send state.
    pub fn state(&self) -> SendState {
        self.state
    }

    /// All messages of the conversation in order.
    pub fn messages(&self) -> &[Message] {
        self.store.messages()
    }

    /// The underlying message store.
    pub fn store(&self) -> &ChatStore {
        &self.store
    }

    /// The active configuration.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Changes the model used for responses.
    pub fn set_model(&mut self, model: Model) {
        self.config.model = model;
    }

    /// Returns the current model.
    pub fn model(&self) -> &Model {
        &self.config.model
    }

    /// Sets or clears the system instruction.
    pub fn set_system_instruction(&mut self, instruction: Option<String>) {
        self.config.system_instruction = instruction;
    }

    /// Returns the current system instruction, if any.
    pub fn system_instruction(&self) -> Option<&str> {
        self.config.system_instruction.as_deref()
    }

    /// Sets the sampling temperature.
    pub fn set_temperature(&mut self, temperature: Option<f32>) {
        self.config.temperature = temperature;
    }
}

async fn stream_reply<S: ContentStreamer>(
    streamer: &S,
    model: &Model,
    request: GenerateContentRequest,
    cycle: &mut SendCycle<'_>,
    reply: &MessageHandle,
    renderer: &mut dyn Renderer,
) -> Result<String> {
    let chunks = streamer.stream_content(model, request).await?;
    cycle.set(SendState::Streaming);

    let mut snapshots = TextSnapshots::new(chunks);
    while let Some(snapshot) = snapshots.next().await {
        cycle.store_mut().patch_message_text(reply, snapshot?)?;
        render_updated(cycle.store(), reply, renderer);
    }
    cycle.store_mut().mark_streaming_done(reply)?;
    render_updated(cycle.store(), reply, renderer);
    Ok(snapshots.text().to_string())
}

fn render_appended(store: &ChatStore, handle: &MessageHandle, renderer: &mut dyn Renderer) {
    if let Some(message) = store.get(handle) {
        renderer.message_appended(message);
    }
}

fn render_updated(store: &ChatStore, handle: &MessageHandle, renderer: &mut dyn Renderer) {
    if let Some(message) = store.get(handle) {
        renderer.message_updated(message);
    }
}
