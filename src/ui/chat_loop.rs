//! Interactive read-dispatch-render loop.
//!
//! One line is dispatched at a time; anything typed while a slow command is
//! running stays buffered on stdin and is handled afterwards, in order.

use std::error::Error;
use std::io::{self, IsTerminal, Write};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::debug;

use crate::commands::{self, CredentialMode, UiAction};
use crate::core::app::App;
use crate::core::transcript::OutputLine;
use crate::ui::renderer::{Renderer, PROMPT};

pub async fn run_chat(mut app: App, color: bool) -> Result<(), Box<dyn Error>> {
    let mut stdout = io::stdout();
    let terminal = stdout.is_terminal();
    let renderer = Renderer::interactive(color && terminal, terminal);
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    run_loop(&mut app, &mut input, &mut stdout, &renderer).await
}

pub async fn run_loop<R, W>(
    app: &mut App,
    input: &mut Lines<R>,
    out: &mut W,
    renderer: &Renderer,
) -> Result<(), Box<dyn Error>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    renderer.render_line(
        out,
        &OutputLine::output("Type 'help' for available commands"),
        app.session.theme,
    )?;

    loop {
        renderer.prompt(out, PROMPT, app.session.theme)?;
        let Some(line) = input.next_line().await? else {
            writeln!(out)?;
            break;
        };

        let dispatch = commands::process_input(app, &line).await;
        match dispatch.action {
            Some(UiAction::ClearScreen) => renderer.clear_screen(out)?,
            other => {
                renderer.render_lines(out, &dispatch.lines, app.session.theme)?;
                if let Some(UiAction::PromptCredentials(mode)) = other {
                    prompt_credentials(app, input, out, renderer, mode).await?;
                }
            }
        }
    }

    Ok(())
}

/// Terminal stand-in for the login/registration form. An empty username
/// closes the form without submitting.
pub async fn prompt_credentials<R, W>(
    app: &mut App,
    input: &mut Lines<R>,
    out: &mut W,
    renderer: &Renderer,
    mode: CredentialMode,
) -> Result<(), Box<dyn Error>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    renderer.prompt(out, "username:", app.session.theme)?;
    let Some(username) = input.next_line().await? else {
        return Ok(());
    };
    let username = username.trim().to_string();
    if username.is_empty() {
        debug!(?mode, "Credential form dismissed");
        return Ok(());
    }

    renderer.prompt(out, "password:", app.session.theme)?;
    let Some(password) = input.next_line().await? else {
        return Ok(());
    };

    let line = commands::submit_credentials(app, mode, &username, &password);
    renderer.render_line(out, &line, app.session.theme)?;
    Ok(())
}
