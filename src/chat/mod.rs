//! Chat application module for interactive conversations with Gemini.
//!
//! This module provides the conversation state and send cycle behind the
//! `coporties-chat` REPL. It supports:
//!
//! - Cumulative streaming replies patched into the message list
//! - File attachments sent inline with a message
//! - Slash commands for session control
//!
//! # Architecture
//!
//! - [`store`]: the ordered message list and its handle-keyed updates
//! - [`composer`]: draft text and pending attachments
//! - [`session`]: send orchestration against a [`ContentStreamer`](crate::ContentStreamer)
//! - [`config`]: CLI argument parsing and configuration
//! - [`commands`]: slash command parsing

pub mod commands;
pub mod composer;
pub mod config;
pub mod session;
pub mod store;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, SUGGESTIONS, help_text, parse_command};
pub use composer::Composer;
pub use config::{ChatArgs, ChatConfig, DEFAULT_SYSTEM_INSTRUCTION, DEFAULT_TEMPERATURE};
pub use session::{ChatSession, SendOutcome, SendState};
pub use store::{
    APOLOGY_TEXT, ChatStore, INTERRUPTED_TEXT, Message, MessageHandle, MessageId, Role,
};
