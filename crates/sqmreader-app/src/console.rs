//! Interactive console
//!
//! Line-oriented stand-in for the port picker and buttons: refresh the
//! port list, pick one, connect, and take readings one at a time.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::output::{render_display, render_notice, render_ports};
use crate::state::AppState;

const HELP: &str = "\
Commands:
  refresh            re-scan serial ports
  ports              show the last port list
  select <n|name>    choose a port by number or name
  connect [port]     connect to the given or selected port
  read               request one reading (or just press Enter)
  status             show the current fields
  disconnect         close the port
  help               this text
  quit               exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Refresh,
    Ports,
    Select(String),
    Connect(Option<String>),
    Read,
    Status,
    Disconnect,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<ConsoleCommand, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };
    let arg = (!rest.is_empty()).then(|| rest.to_string());

    match word.to_ascii_lowercase().as_str() {
        "" | "r" | "read" => Ok(ConsoleCommand::Read),
        "refresh" => Ok(ConsoleCommand::Refresh),
        "ports" | "list" => Ok(ConsoleCommand::Ports),
        "select" | "use" => arg
            .map(ConsoleCommand::Select)
            .ok_or_else(|| "select needs a port number or name".to_string()),
        "connect" | "c" => Ok(ConsoleCommand::Connect(arg)),
        "status" | "s" => Ok(ConsoleCommand::Status),
        "disconnect" => Ok(ConsoleCommand::Disconnect),
        "help" | "?" => Ok(ConsoleCommand::Help),
        "quit" | "exit" | "q" => Ok(ConsoleCommand::Quit),
        other => Err(format!("Unknown command '{}', try 'help'", other)),
    }
}

async fn say(out: &mut tokio::io::Stdout, text: &str) -> std::io::Result<()> {
    out.write_all(text.as_bytes()).await?;
    out.write_all(b"\n").await?;
    out.flush().await
}

/// Run the console until `quit` or end of input
pub async fn run(state: &AppState, initial_port: Option<String>) -> anyhow::Result<()> {
    let mut out = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let ports = state.refresh_ports().await;
    say(&mut out, &render_ports(&ports, state.selected().await.as_deref())).await?;

    if let Some(port) = initial_port {
        say(&mut out, &format!("Connecting to {}...", port)).await?;
        let notice = state.connect(Some(port)).await;
        say(&mut out, &render_notice(&notice)).await?;
    }
    say(&mut out, "Type 'help' for commands.").await?;

    loop {
        out.write_all(b"sqm> ").await?;
        out.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match parse_command(&line) {
            Ok(c) => c,
            Err(msg) => {
                say(&mut out, &msg).await?;
                continue;
            }
        };

        match command {
            ConsoleCommand::Refresh => {
                let ports = state.refresh_ports().await;
                say(&mut out, &render_ports(&ports, state.selected().await.as_deref())).await?;
            }
            ConsoleCommand::Ports => {
                let ports = state.ports().await;
                say(&mut out, &render_ports(&ports, state.selected().await.as_deref())).await?;
            }
            ConsoleCommand::Select(choice) => match state.select(&choice).await {
                Ok(port) => say(&mut out, &format!("Selected {}", port)).await?,
                Err(msg) => say(&mut out, &msg).await?,
            },
            ConsoleCommand::Connect(port) => {
                let notice = state.connect(port).await;
                say(&mut out, &render_notice(&notice)).await?;
            }
            ConsoleCommand::Read => {
                let notice = state.read().await;
                say(&mut out, &render_notice(&notice)).await?;
                say(&mut out, &render_display(&state.display().await)).await?;
            }
            ConsoleCommand::Status => {
                say(&mut out, &render_display(&state.display().await)).await?;
            }
            ConsoleCommand::Disconnect => {
                let notice = state.disconnect().await;
                say(&mut out, &render_notice(&notice)).await?;
            }
            ConsoleCommand::Help => say(&mut out, HELP).await?,
            ConsoleCommand::Quit => break,
        }
    }

    state.disconnect().await;
    Ok(())
}
