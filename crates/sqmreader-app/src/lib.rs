//! SQM Reader command-line front end

pub mod cli;
pub mod console;
pub mod logging;
pub mod output;
pub mod state;

use anyhow::{bail, Context};
use sqmreader_core::display::Severity;
use sqmreader_core::protocol::list_port_details;
use std::process::ExitCode;

use cli::{Cli, Command};
use output::{render_display, render_notice, render_port_details, render_ports, to_json, ReadReport};
use state::AppState;

/// Run the command selected on the command line
pub async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = cli.link.to_config();
    tracing::debug!("link config: {:?}", config);
    let state = AppState::new(config);

    match cli.command.unwrap_or(Command::Console { port: None }) {
        Command::Ports { details, json } => {
            if details {
                let ports = tokio::task::spawn_blocking(list_port_details)
                    .await
                    .context("port enumeration task failed")?;
                println!("{}", if json { to_json(&ports)? } else { render_port_details(&ports) });
            } else {
                let ports = state.refresh_ports().await;
                println!("{}", if json { to_json(&ports)? } else { render_ports(&ports, None) });
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Read { port, json } => read_once(&state, port, json).await,
        Command::Console { port } => {
            console::run(&state, port).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn read_once(state: &AppState, port: Option<String>, json: bool) -> anyhow::Result<ExitCode> {
    let port = match port {
        Some(p) => p,
        None => match state.refresh_ports().await.into_iter().next() {
            Some(p) => p,
            None => bail!("No serial ports found; pass --port"),
        },
    };

    let mut notice = state.connect(Some(port.clone())).await;
    if notice.severity == Severity::Info {
        notice = state.read().await;
    }
    let display = state.display().await;
    state.disconnect().await;

    let ok = notice.severity == Severity::Info;
    if json {
        let report = ReadReport {
            port: &port,
            ok,
            display: &display,
            notice: &notice,
        };
        println!("{}", to_json(&report)?);
    } else {
        if !ok {
            eprintln!("{}", render_notice(&notice));
        }
        println!("{}", render_display(&display));
    }

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
