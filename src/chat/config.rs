//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and the resolved
//! configuration that every request is built from.

use arrrg_derive::CommandLine;

use crate::chat::commands::{MAX_TEMPERATURE, parse_f32_in_range};
use crate::error::{Error, Result};
use crate::types::Model;

/// Instruction sent with every request unless overridden.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are AI Coporties, a sophisticated, high-end AI assistant designed for professional use. Your responses should be mature, concise, precise, and elegant. You excel at analysis, coding, and creative writing. Always maintain a helpful and professional tone.";

/// Sampling temperature used unless overridden.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Command-line arguments for the coporties-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model to use for chat.
    #[arrrg(optional, "Model to use (default: gemini-3-flash-preview)", "MODEL")]
    pub model: Option<String>,

    /// System instruction to set context for the conversation.
    #[arrrg(optional, "System instruction for the conversation", "PROMPT")]
    pub system: Option<String>,

    /// Sampling temperature, 0.0 to 2.0.
    #[arrrg(optional, "Sampling temperature 0.0-2.0 (default: 0.7)", "TEMP")]
    pub temperature: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat session.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// The model to use for generating responses.
    pub model: Model,

    /// System instruction sent with every request. `None` sends none.
    pub system_instruction: Option<String>,

    /// Sampling temperature. `None` uses the model default.
    pub temperature: Option<f32>,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Model: gemini-3-flash-preview
    /// - System instruction: [`DEFAULT_SYSTEM_INSTRUCTION`]
    /// - Temperature: 0.7
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            model: Model::default(),
            system_instruction: Some(DEFAULT_SYSTEM_INSTRUCTION.to_string()),
            temperature: Some(DEFAULT_TEMPERATURE),
            use_color: true,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    /// Sets or clears the system instruction.
    pub fn with_system_instruction(mut self, instruction: Option<String>) -> Self {
        self.system_instruction = instruction;
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<ChatArgs> for ChatConfig {
    type Error = Error;

    /// Resolves arguments against the defaults.
    ///
    /// Fails with a validation error when `--temperature` is not a number
    /// between 0.0 and 2.0.
    fn try_from(args: ChatArgs) -> Result<Self> {
        let defaults = ChatConfig::new();
        let model = match args.model {
            Some(name) => name.parse::<Model>().unwrap_or(Model::Custom(name)),
            None => defaults.model.clone(),
        };
        let temperature = match args.temperature {
            Some(raw) => Some(parse_f32_in_range(raw.trim(), 0.0, MAX_TEMPERATURE).map_err(
                |err| Error::validation(format!("--temperature {err}"), Some("temperature".to_string())),
            )?),
            None => defaults.temperature,
        };

        Ok(ChatConfig {
            model,
            system_instruction: args.system.or(defaults.system_instruction),
            temperature,
            use_color: !args.no_color,
        })
    }
}
