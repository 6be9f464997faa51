//! Command parsing, dispatch, and the built-in handlers.
//!
//! Handlers produce a [`CommandResult`]; the dispatcher turns that into
//! output lines and appends them to the transcript. Handlers never write to
//! the transcript themselves.

mod registry;

pub use registry::{AiPrompt, Command, CommandInvocation, Handler, LocalHandler, Registry};

use std::fmt;

use tracing::debug;

use crate::core::app::{App, Services};
use crate::core::session::Session;
use crate::core::transcript::OutputLine;
use crate::ui::theme::Theme;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Nothing to show.
    Continue,
    Output(String),
    ClearTranscript,
    OpenCredentialPrompt {
        mode: CredentialMode,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialMode {
    Login,
    Register,
}

/// Follow-up the terminal has to perform after rendering a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    ClearScreen,
    PromptCredentials(CredentialMode),
}

/// Lines produced by one submitted input, in display order.
#[derive(Debug, Default)]
pub struct Dispatch {
    pub lines: Vec<OutputLine>,
    pub action: Option<UiAction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError {
    message: String,
}

impl CommandError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CommandError {}

pub struct CommandContext<'a> {
    pub session: &'a mut Session,
    pub services: &'a Services,
    pub registry: &'a Registry,
}

impl Handler {
    pub async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        invocation: &CommandInvocation<'_>,
    ) -> Result<CommandResult, CommandError> {
        match self {
            Handler::Local(handler) => handler(ctx, invocation),
            Handler::Ai(prompt) => match prompt.render(&invocation.args) {
                Ok(text) => Ok(CommandResult::Output(
                    ctx.services.ai.query(&text, prompt.context).await,
                )),
                Err(usage) => Ok(CommandResult::Output(usage.to_string())),
            },
            Handler::Papers { default_query } => {
                let joined = invocation.args.join(" ");
                let query = if joined.is_empty() {
                    *default_query
                } else {
                    joined.as_str()
                };
                let services = ctx.services;
                Ok(CommandResult::Output(
                    services
                        .papers
                        .summarize_papers(query, services.ai.as_ref())
                        .await,
                ))
            }
        }
    }
}

pub async fn process_input(app: &mut App, input: &str) -> Dispatch {
    dispatch_with(&Registry::builtin(), app, input).await
}

/// Run one line of input against `registry` and record the result.
pub async fn dispatch_with(registry: &Registry, app: &mut App, input: &str) -> Dispatch {
    let Some(invocation) = CommandInvocation::parse(input) else {
        return Dispatch::default();
    };

    let mut dispatch = Dispatch::default();
    dispatch.lines.push(OutputLine::echo(invocation.input));

    match registry.lookup(invocation.name) {
        None => {
            debug!(command = invocation.name, "Unknown command");
            dispatch.lines.push(OutputLine::error(format!(
                "Command not found: {}",
                invocation.name
            )));
        }
        Some(command) => {
            debug!(
                command = command.name,
                args = invocation.args.len(),
                "Dispatching command"
            );
            let mut ctx = CommandContext {
                session: &mut app.session,
                services: &app.services,
                registry,
            };
            match command.handler.execute(&mut ctx, &invocation).await {
                Ok(CommandResult::Continue) => {}
                Ok(CommandResult::Output(text)) => {
                    if !text.is_empty() {
                        dispatch.lines.push(OutputLine::output(text));
                    }
                }
                Ok(CommandResult::ClearTranscript) => {
                    dispatch.action = Some(UiAction::ClearScreen);
                }
                Ok(CommandResult::OpenCredentialPrompt { mode, message }) => {
                    dispatch.lines.push(OutputLine::output(message));
                    dispatch.action = Some(UiAction::PromptCredentials(mode));
                }
                Err(err) => {
                    dispatch.lines.push(OutputLine::error(format!("Error: {err}")));
                }
            }
        }
    }

    if dispatch.action == Some(UiAction::ClearScreen) {
        app.transcript.clear();
    } else {
        app.transcript.extend(dispatch.lines.iter().cloned());
    }
    dispatch
}

/// Apply a submitted credential form. Returns the line that was recorded.
pub fn submit_credentials(
    app: &mut App,
    mode: CredentialMode,
    username: &str,
    password: &str,
) -> OutputLine {
    let outcome = match mode {
        CredentialMode::Login => app
            .credentials
            .verify(username, password)
            .map(|()| format!("Welcome back, {username}!")),
        CredentialMode::Register => app
            .credentials
            .register(username, password)
            .map(|()| format!("Account created for {username}!")),
    };

    let line = match outcome {
        Ok(message) => {
            app.session.sign_in(username);
            OutputLine::output(message)
        }
        Err(err) => {
            debug!(?mode, error = %err, "Credential submission rejected");
            OutputLine::error(err.to_string())
        }
    };
    app.transcript.push(line.clone());
    line
}

pub fn help_text(registry: &Registry) -> String {
    let commands = registry.list();
    let width = commands
        .iter()
        .map(|command| command.name.chars().count())
        .max()
        .unwrap_or(0)
        + 2;
    let rows: Vec<String> = commands
        .iter()
        .map(|command| format!("  {:<width$}{}", command.name, command.description))
        .collect();
    format!("Available commands:\n{}", rows.join("\n"))
}

pub(super) fn handle_help(
    ctx: &mut CommandContext<'_>,
    _invocation: &CommandInvocation<'_>,
) -> Result<CommandResult, CommandError> {
    Ok(CommandResult::Output(help_text(ctx.registry)))
}

pub(super) fn handle_clear(
    _ctx: &mut CommandContext<'_>,
    _invocation: &CommandInvocation<'_>,
) -> Result<CommandResult, CommandError> {
    Ok(CommandResult::ClearTranscript)
}

pub(super) fn handle_login(
    _ctx: &mut CommandContext<'_>,
    _invocation: &CommandInvocation<'_>,
) -> Result<CommandResult, CommandError> {
    Ok(CommandResult::OpenCredentialPrompt {
        mode: CredentialMode::Login,
        message: "Please use the login form".to_string(),
    })
}

pub(super) fn handle_register(
    _ctx: &mut CommandContext<'_>,
    _invocation: &CommandInvocation<'_>,
) -> Result<CommandResult, CommandError> {
    Ok(CommandResult::OpenCredentialPrompt {
        mode: CredentialMode::Register,
        message: "Please use the registration form".to_string(),
    })
}

pub(super) fn handle_logout(
    ctx: &mut CommandContext<'_>,
    _invocation: &CommandInvocation<'_>,
) -> Result<CommandResult, CommandError> {
    ctx.session.sign_out();
    Ok(CommandResult::Output("Logged out successfully".to_string()))
}

pub(super) fn handle_theme(
    ctx: &mut CommandContext<'_>,
    invocation: &CommandInvocation<'_>,
) -> Result<CommandResult, CommandError> {
    let theme = Theme::from_arg(invocation.args.first().copied());
    ctx.session.theme = theme;
    Ok(CommandResult::Output(format!("Theme set to {}", theme.id())))
}
