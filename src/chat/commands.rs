//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to manage attachments and the session without sending
//! messages to the API.

/// Prompts offered when the conversation is empty.
pub const SUGGESTIONS: [&str; 3] = [
    "Analyze this financial report PDF",
    "Generate a React component for a dashboard",
    "Write an elegant executive summary",
];

/// Highest sampling temperature the API accepts.
pub(crate) const MAX_TEMPERATURE: f32 = 2.0;

/// A parsed chat command.
///
/// These commands control the chat session and are not sent to the API.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Attach one or more files to the next message.
    Attach(Vec<String>),

    /// Remove a pending attachment by its 1-based position.
    Detach(usize),

    /// List pending attachments.
    Attachments,

    /// Send the suggestion with the given 1-based position.
    Suggest(usize),

    /// List the suggestions.
    Suggestions,

    /// Print the whole conversation again.
    History,

    /// Change the model.
    Model(String),

    /// Set or clear the system instruction.
    /// `None` clears the current system instruction.
    System(Option<String>),

    /// Set the sampling temperature.
    Temperature(f32),

    /// Clear the sampling temperature (use model default).
    ClearTemperature,

    /// Show the current configuration.
    Config,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a valid command,
/// or `None` if it should be treated as a regular message.
///
/// # Examples
///
/// ```
/// # use coporties::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/attach report.pdf").is_some());
/// assert!(parse_command("Summarize this").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    let rest = input.strip_prefix('/')?;
    let mut parts = rest.splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "attach" => match argument {
            Some(paths) => ChatCommand::Attach(paths.split_whitespace().map(String::from).collect()),
            None => ChatCommand::Invalid("/attach requires at least one file path".to_string()),
        },
        "detach" => parse_position(argument, ChatCommand::Detach, "/detach"),
        "attachments" | "files" => ChatCommand::Attachments,
        "suggest" => match argument {
            Some(_) => parse_position(argument, ChatCommand::Suggest, "/suggest"),
            None => ChatCommand::Suggestions,
        },
        "suggestions" => ChatCommand::Suggestions,
        "history" => ChatCommand::History,
        "model" => match argument {
            Some(model) => ChatCommand::Model(model.to_string()),
            None => ChatCommand::Invalid("/model requires a model name".to_string()),
        },
        "system" => ChatCommand::System(argument.map(|s| s.to_string())),
        "temperature" => match argument {
            Some(arg) if arg.eq_ignore_ascii_case("clear") => ChatCommand::ClearTemperature,
            Some(arg) => match parse_f32_in_range(arg, 0.0, MAX_TEMPERATURE) {
                Ok(value) => ChatCommand::Temperature(value),
                Err(err) => ChatCommand::Invalid(format!("/temperature {err}")),
            },
            None => ChatCommand::Invalid("/temperature requires a value".to_string()),
        },
        "config" => ChatCommand::Config,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

fn parse_position<F>(argument: Option<&str>, constructor: F, name: &str) -> ChatCommand
where
    F: Fn(usize) -> ChatCommand,
{
    match argument {
        Some(arg) => match arg.parse::<usize>() {
            Ok(value) if value > 0 => constructor(value),
            _ => ChatCommand::Invalid(format!("{} expects a positive integer", name)),
        },
        None => ChatCommand::Invalid(format!("{} requires a value", name)),
    }
}

pub(crate) fn parse_f32_in_range(value: &str, min: f32, max: f32) -> Result<f32, String> {
    let parsed: f32 = value
        .parse()
        .map_err(|_| format!("expects a value between {min} and {max}"))?;
    if parsed.is_finite() && parsed >= min && parsed <= max {
        Ok(parsed)
    } else {
        Err(format!("expects a value between {min} and {max}"))
    }
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /attach <path>...      Attach files to the next message (max 5MB each)
  /detach <n>            Remove pending attachment n
  /attachments           List pending attachments
  /suggest [n]           List suggestions, or send suggestion n
  /history               Show the conversation so far
  /model <name>          Change the model (e.g., /model gemini-2.5-pro)
  /system [prompt]       Set system instruction (no argument clears it)
  /temperature <v>       Set temperature 0.0-2.0 (use 'clear' to reset)
  /config                Show current configuration
  /help                  Show this help message
  /quit                  Exit the chat"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_quit_commands() {
        assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/exit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/q"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("  /quit  "), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/QUIT"), Some(ChatCommand::Quit));
    }

    #[test]
    fn parse_attach() {
        assert_eq!(
            parse_command("/attach report.pdf"),
            Some(ChatCommand::Attach(vec!["report.pdf".to_string()]))
        );
        assert_eq!(
            parse_command("/attach a.png   b.txt"),
            Some(ChatCommand::Attach(vec![
                "a.png".to_string(),
                "b.txt".to_string()
            ]))
        );
        assert!(matches!(
            parse_command("/attach"),
            Some(ChatCommand::Invalid(msg)) if msg.contains("requires")
        ));
    }

    #[test]
    fn parse_detach() {
        assert_eq!(parse_command("/detach 2"), Some(ChatCommand::Detach(2)));
        assert!(matches!(
            parse_command("/detach 0"),
            Some(ChatCommand::Invalid(msg)) if msg.contains("positive")
        ));
        assert!(matches!(
            parse_command("/detach first"),
            Some(ChatCommand::Invalid(_))
        ));
        assert!(matches!(
            parse_command("/detach"),
            Some(ChatCommand::Invalid(msg)) if msg.contains("requires")
        ));
        assert_eq!(parse_command("/attachments"), Some(ChatCommand::Attachments));
    }

    #[test]
    fn parse_suggest() {
        assert_eq!(parse_command("/suggest"), Some(ChatCommand::Suggestions));
        assert_eq!(parse_command("/suggestions"), Some(ChatCommand::Suggestions));
        assert_eq!(parse_command("/suggest 3"), Some(ChatCommand::Suggest(3)));
        assert!(matches!(
            parse_command("/suggest x"),
            Some(ChatCommand::Invalid(_))
        ));
    }

    #[test]
    fn parse_model() {
        assert_eq!(
            parse_command("/model gemini-2.5-pro"),
            Some(ChatCommand::Model("gemini-2.5-pro".to_string()))
        );
        assert_eq!(
            parse_command("/model   gemini-2.5-flash  "),
            Some(ChatCommand::Model("gemini-2.5-flash".to_string()))
        );
        assert_eq!(
            parse_command("/model"),
            Some(ChatCommand::Invalid(
                "/model requires a model name".to_string()
            ))
        );
    }

    #[test]
    fn parse_system() {
        assert_eq!(
            parse_command("/system You are a helpful assistant"),
            Some(ChatCommand::System(Some(
                "You are a helpful assistant".to_string()
            )))
        );
        assert_eq!(parse_command("/system"), Some(ChatCommand::System(None)));
    }

    #[test]
    fn parse_temperature() {
        assert_eq!(
            parse_command("/temperature 0.5"),
            Some(ChatCommand::Temperature(0.5))
        );
        assert_eq!(
            parse_command("/temperature 2"),
            Some(ChatCommand::Temperature(2.0))
        );
        assert_eq!(
            parse_command("/temperature clear"),
            Some(ChatCommand::ClearTemperature)
        );
        assert!(matches!(
            parse_command("/temperature 2.5"),
            Some(ChatCommand::Invalid(msg)) if msg.contains("between")
        ));
        assert!(matches!(
            parse_command("/temperature NaN"),
            Some(ChatCommand::Invalid(_))
        ));
        assert!(matches!(
            parse_command("/temperature"),
            Some(ChatCommand::Invalid(msg)) if msg.contains("requires")
        ));
    }

    #[test]
    fn parse_misc() {
        assert_eq!(parse_command("/history"), Some(ChatCommand::History));
        assert_eq!(parse_command("/config"), Some(ChatCommand::Config));
        assert_eq!(parse_command("/help"), Some(ChatCommand::Help));
        assert_eq!(parse_command("/?"), Some(ChatCommand::Help));
        assert_eq!(
            parse_command("/clear"),
            Some(ChatCommand::Invalid("Unknown command: /clear".to_string()))
        );
    }

    #[test]
    fn non_commands() {
        assert_eq!(parse_command("Hello there"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("  "), None);
    }

    #[test]
    fn help_text_not_empty() {
        let help = help_text();
        assert!(help.contains("/quit"));
        assert!(help.contains("/attach"));
        assert!(help.contains("/model"));
        assert!(help.contains("/temperature"));
    }
}
