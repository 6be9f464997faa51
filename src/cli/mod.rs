//! Command-line interface parsing and handling

use std::error::Error;
use std::io::{self, IsTerminal, Write};

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing_subscriber::EnvFilter;

use crate::auth::AuthManager;
use crate::commands::{self, UiAction};
use crate::core::app::{self, App, AppInitConfig};
use crate::core::config::Config;
use crate::ui::chat_loop::{prompt_credentials, run_chat};
use crate::ui::renderer::Renderer;

#[derive(Parser)]
#[command(name = "quantoptik", version)]
#[command(about = "A quantum optics tutor in your terminal")]
#[command(
    long_about = "Quantoptik is a terminal tutor for quantum optics. Typed commands are \
either handled locally or forwarded to a chat-completion API, and the answer is printed \
as terminal output.\n\n\
Authentication:\n\
  Use 'quantoptik auth' to store an API token in your system keyring.\n\n\
Environment Variables:\n\
  DEEPSEEK_API_KEY        API token (takes precedence over the keyring)\n\
  QUANTOPTIK_CONFIG_DIR   Directory holding config.toml\n\
  QUANTOPTIK_DATA_DIR     Directory holding the local user registry\n\
  RUST_LOG                Diagnostic log filter (written to stderr)\n\n\
Commands at the prompt:\n\
  help              List available commands\n\
  ask <question>    Ask anything about quantum optics\n\
  papers [query]    Summarize recent arXiv papers\n\
  theme <color>     green, amber, or blue"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model to request from the chat API
    #[arg(short = 'm', long, global = true)]
    pub model: Option<String>,

    /// Accent color: green, amber, or blue
    #[arg(short = 't', long, global = true)]
    pub theme: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Ignore the keyring and read the API token only from the environment
    #[arg(long, global = true)]
    pub env_only: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the interactive terminal (default)
    Chat,
    /// Run a single command line and print its output
    Run {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        line: Vec<String>,
    },
    /// Store the API token in the system keyring
    Auth,
    /// Remove the API token from the system keyring
    Deauth,
    /// Set a configuration value
    Set {
        /// One of: base-url, model, papers-url, theme
        key: String,
        value: String,
    },
    /// Unset a configuration value
    Unset { key: String },
    /// Print the current configuration
    Config,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let color = !args.no_color && std::env::var_os("NO_COLOR").is_none();

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let app = build_app(args.model, args.theme, args.env_only)?;
            run_chat(app, color).await
        }
        Commands::Run { line } => {
            let mut app = build_app(args.model, args.theme, args.env_only)?;
            run_once(&mut app, &line.join(" "), color).await
        }
        Commands::Auth => {
            if let Err(e) = AuthManager::new().interactive_auth() {
                eprintln!("❌ Authentication failed: {e}");
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Deauth => {
            if let Err(e) = AuthManager::new().interactive_deauth() {
                eprintln!("❌ Deauthentication failed: {e}");
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Set { key, value } => {
            let mut config = Config::load()?;
            if let Err(e) = config.set(&key, &value) {
                eprintln!("❌ {e}");
                std::process::exit(1);
            }
            config.save()?;
            println!("✅ Set {key} to: {value}");
            Ok(())
        }
        Commands::Unset { key } => {
            let mut config = Config::load()?;
            if let Err(e) = config.unset(&key) {
                eprintln!("❌ {e}");
                std::process::exit(1);
            }
            config.save()?;
            println!("✅ Unset {key}");
            Ok(())
        }
        Commands::Config => {
            Config::load()?.print_all();
            Ok(())
        }
    }
}

fn build_app(
    model: Option<String>,
    theme: Option<String>,
    env_only: bool,
) -> Result<App, Box<dyn Error>> {
    let config = Config::load()?;
    let auth = if env_only {
        AuthManager::env_only()
    } else {
        AuthManager::new()
    };

    Ok(app::new_with_config(
        AppInitConfig {
            model,
            theme,
            api_key: auth.resolve_api_key(),
        },
        &config,
        app::open_credentials(),
    ))
}

async fn run_once(app: &mut App, line: &str, color: bool) -> Result<(), Box<dyn Error>> {
    let mut stdout = io::stdout();
    let terminal = stdout.is_terminal();
    let renderer = Renderer::new(color && terminal, terminal);
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    run_line(app, line, &mut input, &mut stdout, &renderer).await?;
    if app.transcript.lines().iter().any(|line| line.is_error()) {
        std::process::exit(1);
    }
    Ok(())
}

/// Dispatch one line and print every produced line, echo included.
/// `login` and `register` read the credential form from `input`.
async fn run_line<R, W>(
    app: &mut App,
    line: &str,
    input: &mut Lines<R>,
    out: &mut W,
    renderer: &Renderer,
) -> Result<(), Box<dyn Error>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let dispatch = commands::process_input(app, line).await;
    renderer.render_lines(out, &dispatch.lines, app.session.theme)?;
    match dispatch.action {
        Some(UiAction::ClearScreen) => renderer.clear_screen(out)?,
        Some(UiAction::PromptCredentials(mode)) => {
            prompt_credentials(app, input, out, renderer, mode).await?;
        }
        None => {}
    }
    Ok(())
}
