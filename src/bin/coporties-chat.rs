//! Interactive chat application for conversing with Gemini.
//!
//! This binary provides a streaming REPL interface over the
//! `streamGenerateContent` endpoint. Replies are printed as they stream.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage with default settings
//! coporties-chat
//!
//! # Specify a model
//! coporties-chat --model gemini-2.5-pro
//!
//! # Set a system instruction
//! coporties-chat --system "You are a helpful coding assistant"
//!
//! # Show request logs
//! RUST_LOG=coporties=debug coporties-chat
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/attach <path>...` - Attach files to the next message
//! - `/suggest [n]` - List or send a suggested prompt
//! - `/model <name>` - Change the model
//! - `/quit` - Exit the application

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use coporties::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, Composer, PlainTextRenderer, Renderer,
    SUGGESTIONS, help_text, parse_command,
};
use coporties::{Gemini, Model};

const DISCLAIMER: &str = "AI Coporties can make mistakes. Please verify important information.";

/// Main entry point for the coporties-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("coporties-chat [OPTIONS]");
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = ChatConfig::try_from(args)?;
    let use_color = config.use_color;

    let client = Gemini::new(None)?;
    let mut session = ChatSession::new(client, config);
    let mut composer = Composer::new();
    let mut renderer = PlainTextRenderer::with_color(use_color);
    let mut rl = DefaultEditor::new()?;

    println!("AI Coporties (model: {})", session.model());
    println!("{DISCLAIMER}");
    println!("Type /help for commands, /quit to exit\n");
    print_suggestions();

    loop {
        let readline = rl.readline("> ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                // Check for slash commands
                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Attach(paths) => {
                            for warning in composer.attach(&paths).await {
                                renderer.print_warning(&warning);
                            }
                            print_attachments(&composer);
                        }
                        ChatCommand::Detach(position) => {
                            match composer.remove_attachment(position - 1) {
                                Some(attachment) => renderer
                                    .print_info(&format!("Removed {}", attachment.name())),
                                None => renderer
                                    .print_error(&format!("No attachment at position {position}")),
                            }
                        }
                        ChatCommand::Attachments => {
                            print_attachments(&composer);
                        }
                        ChatCommand::Suggestions => {
                            print_suggestions();
                        }
                        ChatCommand::Suggest(position) => match SUGGESTIONS.get(position - 1) {
                            Some(prompt) => {
                                session.send(prompt, Vec::new(), &mut renderer).await;
                            }
                            None => renderer.print_error(&format!(
                                "No suggestion {position}; choose 1-{}",
                                SUGGESTIONS.len()
                            )),
                        },
                        ChatCommand::History => {
                            renderer.render_all(session.messages());
                        }
                        ChatCommand::Model(model_name) => {
                            let model = model_name
                                .parse()
                                .unwrap_or_else(|_| Model::Custom(model_name.clone()));
                            session.set_model(model);
                            renderer.print_info(&format!("Model changed to: {}", model_name));
                        }
                        ChatCommand::System(instruction) => {
                            session.set_system_instruction(instruction.clone());
                            match instruction {
                                Some(p) => renderer
                                    .print_info(&format!("System instruction set to: {}", p)),
                                None => renderer.print_info("System instruction cleared."),
                            }
                        }
                        ChatCommand::Temperature(value) => {
                            session.set_temperature(Some(value));
                            renderer.print_info(&format!("temperature set to {:.2}", value));
                        }
                        ChatCommand::ClearTemperature => {
                            session.set_temperature(None);
                            renderer.print_info("temperature reset to model default");
                        }
                        ChatCommand::Config => {
                            print_config(session.config(), session.messages().len());
                        }
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                // Regular message - send with pending attachments
                composer.set_text(line);
                if !composer.can_send(session.is_loading()) {
                    continue;
                }
                if let Some((text, attachments)) = composer.take() {
                    session.send(&text, attachments, &mut renderer).await;
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

fn print_suggestions() {
    println!("    Try one of these (/suggest <n>):");
    for (i, suggestion) in SUGGESTIONS.iter().enumerate() {
        println!("      {}. {}", i + 1, suggestion);
    }
    println!();
}

fn print_attachments(composer: &Composer) {
    if composer.attachments().is_empty() {
        println!("    Attachments: (none)");
        return;
    }
    println!("    Attachments:");
    for (i, attachment) in composer.attachments().iter().enumerate() {
        println!(
            "      {}. {} ({})",
            i + 1,
            attachment.name(),
            attachment.mime_type()
        );
    }
}

fn print_config(config: &ChatConfig, message_count: usize) {
    println!("    Current Configuration:");
    println!("      Model: {}", config.model);
    println!("      Temperature: {}", describe_float(config.temperature));
    match config.system_instruction.as_deref() {
        Some(instruction) => println!("      System instruction: {}", instruction),
        None => println!("      System instruction: (none)"),
    }
    println!("      Messages: {}", message_count);
}

fn describe_float(value: Option<f32>) -> String {
    value
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| "default".to_string())
}
