//! Supersurf MCP CLI
//!
//! Command-line entry point for the Supersurf browser-automation broker,
//! plus the `--debug` parent/child hot-reload wrapper (spec 4.H).

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use supersurf_mcp::config::ServerConfig;
use supersurf_mcp::connection::ConnectionManager;
use supersurf_mcp::logger::{LogFormat, LogRegistry};
use supersurf_mcp::server::McpServer;
use supersurf_mcp::transport::{ScriptModeTransport, StdioTransport};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tracing_subscriber::EnvFilter;

/// Supersurf MCP broker - bridges an MCP agent to a browser extension.
#[derive(Parser, Debug, Clone)]
#[command(name = "supersurf-mcp")]
#[command(version)]
#[command(about = "MCP server bridging an agent to a browser extension")]
struct Args {
    /// Enable the durable debug log, optionally without truncation
    /// (`--debug=no_truncate`). When passed without `--child`, this process
    /// becomes the hot-reload wrapper rather than the broker itself.
    #[arg(long, value_name = "MODE", num_args = 0..=1, default_missing_value = "truncate")]
    debug: Option<String>,

    /// Override the debug log file/directory.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Loopback port the extension bridge listens on.
    #[arg(long, value_name = "PORT", default_value_t = 5555)]
    port: u16,

    /// Internal: marks this process as the wrapper's child. Not for direct use.
    #[arg(long, hide = true)]
    child: bool,

    /// Read line-delimited JSON-RPC 2.0 from stdin instead of MCP stdio.
    #[arg(long)]
    script_mode: bool,
}

const RELOAD_EXIT_CODE: i32 = 42;
const RESPAWN_DELAY: std::time::Duration = std::time::Duration::from_millis(100);

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let args = Args::parse();

    if args.debug.is_some() && !args.child {
        let code = run_wrapper(&args).await?;
        std::process::exit(code);
    }

    run_broker(&args).await
}

/// Runs the broker in-process: builds `ServerConfig`/`LogRegistry`/
/// `ConnectionManager`, then dispatches to the selected transport.
async fn run_broker(args: &Args) -> Result<()> {
    let log_format = match args.debug.as_deref() {
        Some("no_truncate") => LogFormat::NoTruncate,
        _ => LogFormat::Truncate,
    };
    let debug = args.debug.is_some();

    let config = Arc::new(ServerConfig::new(Some(args.port), debug, log_format, args.log_file.clone()));
    let logger = Arc::new(LogRegistry::new(config.log_dir.clone(), log_format)?);
    let manager = ConnectionManager::new(config, logger);
    let server = McpServer::new(manager);

    if args.script_mode {
        ScriptModeTransport::new(server).run().await?;
    } else {
        StdioTransport::new(server).run().await?;
    }

    Ok(())
}

/// The `--debug` hot-reload wrapper: a byte pump between this process's
/// stdio and a `--child` copy of itself, respawning the child whenever it
/// exits with [`RELOAD_EXIT_CODE`] (spec 4.H).
async fn run_wrapper(args: &Args) -> Result<i32> {
    loop {
        let mut child_args = std::env::args().skip(1).collect::<Vec<_>>();
        child_args.push("--child".to_string());

        let mut child = Command::new(std::env::current_exe()?)
            .args(&child_args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;

        let mut child_stdin = child.stdin.take().expect("piped stdin");
        let mut child_stdout = child.stdout.take().expect("piped stdout");

        let stdin_pump = tokio::spawn(async move {
            let mut stdin = tokio::io::stdin();
            let mut buf = [0u8; 8192];
            loop {
                let n = match stdin.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => n,
                };
                if child_stdin.write_all(&buf[..n]).await.is_err() {
                    break;
                }
            }
        });

        let stdout_pump = tokio::spawn(async move {
            let mut stdout = tokio::io::stdout();
            let mut buf = [0u8; 8192];
            loop {
                let n = match child_stdout.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => n,
                };
                if stdout.write_all(&buf[..n]).await.is_err() {
                    break;
                }
                let _ = stdout.flush().await;
            }
        });

        let status = tokio::select! {
            status = child.wait() => status?,
            _ = wait_for_shutdown_signal() => {
                let _ = child.start_kill();
                let _ = child.wait().await;
                return Ok(0);
            }
        };

        stdin_pump.abort();
        stdout_pump.abort();

        let code = status.code().unwrap_or(1);
        if code == RELOAD_EXIT_CODE {
            tracing::info!("child requested reload, respawning");
            tokio::time::sleep(RESPAWN_DELAY).await;
            continue;
        }
        return Ok(code);
    }
}

async fn wait_for_shutdown_signal() {
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .expect("failed to install SIGTERM handler");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}
