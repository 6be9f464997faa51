use super::{CommandContext, CommandError, CommandResult};

pub type LocalHandler =
    fn(&mut CommandContext<'_>, &CommandInvocation<'_>) -> Result<CommandResult, CommandError>;

/// How an AI-backed command turns its arguments into a prompt.
pub struct AiPrompt {
    pub prefix: &'static str,
    pub suffix: &'static str,
    /// Extra system-prompt instructions for this command.
    pub context: &'static str,
    /// Returned instead of querying when no arguments were given.
    pub missing_args: Option<&'static str>,
    /// Topic used when arguments are empty and `missing_args` is `None`.
    pub default_topic: &'static str,
}

impl AiPrompt {
    /// The full prompt, or the usage message when a required topic is missing.
    pub fn render(&self, args: &[&str]) -> Result<String, &'static str> {
        let joined = args.join(" ");
        let topic = if joined.is_empty() {
            if let Some(usage) = self.missing_args {
                return Err(usage);
            }
            self.default_topic
        } else {
            joined.as_str()
        };
        Ok(format!("{}{}{}", self.prefix, topic, self.suffix))
    }
}

pub enum Handler {
    Local(LocalHandler),
    Ai(AiPrompt),
    Papers { default_query: &'static str },
}

pub struct Command {
    pub name: &'static str,
    pub description: &'static str,
    pub handler: Handler,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation<'a> {
    pub input: &'a str,
    pub name: &'a str,
    pub args: Vec<&'a str>,
}

impl<'a> CommandInvocation<'a> {
    /// Split a line into a command name and whitespace-separated arguments.
    /// Blank lines yield `None`.
    pub fn parse(raw: &'a str) -> Option<Self> {
        let input = raw.trim();
        let mut tokens = input.split_whitespace();
        let name = tokens.next()?;
        Some(Self {
            input,
            name,
            args: tokens.collect(),
        })
    }
}

#[derive(Clone, Copy)]
pub struct Registry {
    commands: &'static [Command],
}

impl Registry {
    pub const fn new(commands: &'static [Command]) -> Self {
        Self { commands }
    }

    pub fn builtin() -> Self {
        Self::new(COMMANDS)
    }

    /// Exact, case-sensitive lookup.
    pub fn lookup(&self, name: &str) -> Option<&'static Command> {
        self.commands.iter().find(|command| command.name == name)
    }

    /// Commands in registration order.
    pub fn list(&self) -> &'static [Command] {
        self.commands
    }
}

const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        description: "Show available commands",
        handler: Handler::Local(super::handle_help),
    },
    Command {
        name: "ask",
        description: "Ask anything about quantum optics",
        handler: Handler::Ai(AiPrompt {
            prefix: "",
            suffix: "",
            context: "Provide detailed technical answer.",
            missing_args: Some("Please enter your question"),
            default_topic: "",
        }),
    },
    Command {
        name: "explain",
        description: "Explain a quantum optics concept",
        handler: Handler::Ai(AiPrompt {
            prefix: "Explain ",
            suffix: " in quantum optics",
            context: "Include mathematical formalism and practical applications.",
            missing_args: Some("Please specify a concept"),
            default_topic: "",
        }),
    },
    Command {
        name: "quiz",
        description: "Generate interactive quiz",
        handler: Handler::Ai(AiPrompt {
            prefix: "Create 3 multiple choice questions about ",
            suffix: "",
            context: "Format with letters (A-D). Include answers at the end.",
            missing_args: None,
            default_topic: "random quantum optics topic",
        }),
    },
    Command {
        name: "derive",
        description: "Derive a quantum optics formula",
        handler: Handler::Ai(AiPrompt {
            prefix: "Derive ",
            suffix: " step-by-step",
            context: "Use proper mathematical notation with numbered steps.",
            missing_args: Some("Please specify a formula/effect"),
            default_topic: "",
        }),
    },
    Command {
        name: "papers",
        description: "Find and summarize recent papers",
        handler: Handler::Papers {
            default_query: "quantum optics",
        },
    },
    Command {
        name: "clear",
        description: "Clear terminal history",
        handler: Handler::Local(super::handle_clear),
    },
    Command {
        name: "login",
        description: "Authenticate user session",
        handler: Handler::Local(super::handle_login),
    },
    Command {
        name: "logout",
        description: "End current session",
        handler: Handler::Local(super::handle_logout),
    },
    Command {
        name: "register",
        description: "Create new account",
        handler: Handler::Local(super::handle_register),
    },
    Command {
        name: "theme",
        description: "Change interface color theme",
        handler: Handler::Local(super::handle_theme),
    },
];
