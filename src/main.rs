// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Docdesk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Docdesk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Docdesk CLI entrypoint.
//!
//! Serves the MCP tools over stdio by default. `--http-port` serves streamable HTTP at
//! `http://127.0.0.1:<port>/mcp` instead.

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use rmcp::transport::{
    streamable_http_server::session::local::LocalSessionManager, StreamableHttpServerConfig,
    StreamableHttpService,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use docdesk::config::Config;
use docdesk::mcp::DocdeskMcp;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--http-port <port>] [--workspace <dir>] [--identity <name>]\n          [--identity-header <header>] [--idle-timeout <secs>] [--max-sessions <n>] [--save-on-evict] [--durable-writes]\n\nWithout --http-port the MCP server runs over stdio.\n--http-port serves streamable HTTP at `http://127.0.0.1:<port>/mcp` (0 = ephemeral).\n\n--workspace restricts every path to <dir>; relative paths resolve against it.\n--identity runs stdio calls as principal <name> (default: anonymous).\n--identity-header takes the HTTP caller's principal from <header>, set by a trusted proxy;\n  without it every HTTP MCP session is its own caller.\n--idle-timeout closes sessions untouched for <secs> seconds (0 disables eviction).\n--save-on-evict writes modified documents before evicting them (default: discard).\n--durable-writes opts into slower, best-effort durable persistence (fsync where supported).\n\nEvery option can also be set through DOCDESK_* environment variables or a .env file;\nflags take precedence. Log verbosity follows RUST_LOG (default docdesk=info)."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    http_port: Option<u16>,
    workspace: Option<String>,
    identity: Option<String>,
    identity_header: Option<String>,
    idle_timeout_secs: Option<u64>,
    max_sessions: Option<usize>,
    save_on_evict: bool,
    durable_writes: bool,
    help: bool,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => options.help = true,
            "--http-port" => {
                if options.http_port.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                options.http_port = Some(raw.parse().map_err(|_| ())?);
            }
            "--workspace" => {
                if options.workspace.is_some() {
                    return Err(());
                }
                options.workspace = Some(args.next().ok_or(())?);
            }
            "--identity" => {
                if options.identity.is_some() {
                    return Err(());
                }
                options.identity = Some(args.next().ok_or(())?);
            }
            "--identity-header" => {
                if options.identity_header.is_some() {
                    return Err(());
                }
                options.identity_header = Some(args.next().ok_or(())?);
            }
            "--idle-timeout" => {
                if options.idle_timeout_secs.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                options.idle_timeout_secs = Some(raw.parse().map_err(|_| ())?);
            }
            "--max-sessions" => {
                if options.max_sessions.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                options.max_sessions = Some(raw.parse().map_err(|_| ())?);
            }
            "--save-on-evict" => {
                if options.save_on_evict {
                    return Err(());
                }
                options.save_on_evict = true;
            }
            "--durable-writes" => {
                if options.durable_writes {
                    return Err(());
                }
                options.durable_writes = true;
            }
            _ => return Err(()),
        }
    }

    Ok(options)
}

fn apply_options(config: &mut Config, options: CliOptions) {
    if let Some(port) = options.http_port {
        config.http_port = Some(port);
    }
    if let Some(workspace) = options.workspace {
        config.workspace = Some(PathBuf::from(workspace));
    }
    if let Some(identity) = options.identity {
        config.identity = Some(identity);
    }
    if let Some(header) = options.identity_header {
        config.identity_header = Some(header.trim().to_ascii_lowercase());
    }
    if let Some(secs) = options.idle_timeout_secs {
        config.idle_timeout = Duration::from_secs(secs);
    }
    if let Some(limit) = options.max_sessions {
        config.max_sessions = (limit > 0).then_some(limit);
    }
    config.save_on_evict |= options.save_on_evict;
    config.durable_writes |= options.durable_writes;
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("docdesk=info"));
    // Stdout carries the stdio transport; logs go to stderr.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn serve_http(mcp: DocdeskMcp, port: u16) -> Result<(), Box<dyn Error>> {
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    info!(address = %listener.local_addr()?, "serving MCP over streamable HTTP at /mcp");

    let config = StreamableHttpServerConfig {
        stateful_mode: true,
        ..StreamableHttpServerConfig::default()
    };
    let shutdown_token = config.cancellation_token.clone();

    let session_manager = Arc::new(LocalSessionManager::default());
    let mcp_service = StreamableHttpService::new(move || Ok(mcp.clone()), session_manager, config);
    let router = Router::new().nest_service("/mcp", mcp_service);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            shutdown_token.cancel();
        })
        .await?;
    Ok(())
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "docdesk".to_owned());

        let options = match parse_options(args) {
            Ok(options) if options.help => {
                print_usage(&program);
                return Ok(());
            }
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        dotenvy::dotenv().ok();
        init_tracing();

        let mut config = Config::from_env()?;
        apply_options(&mut config, options);

        let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
        runtime.block_on(async move {
            let dispatcher = Arc::new(config.dispatcher());
            let eviction = dispatcher.sessions().spawn_eviction_task();
            let mcp = DocdeskMcp::with_identity(Arc::clone(&dispatcher), config.identity_accessor())
                .with_identity_header(config.identity_header.clone());
            info!(
                idle_timeout_secs = config.idle_timeout.as_secs(),
                max_sessions = ?config.max_sessions,
                workspace = ?config.workspace,
                "docdesk starting"
            );

            let served = match config.http_port {
                Some(port) => serve_http(mcp, port).await,
                None => mcp.serve_stdio().await.map_err(|err| -> Box<dyn Error> { Box::new(err) }),
            };
            eviction.abort();
            served
        })?;

        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("docdesk: {err}");
        std::process::exit(1);
    }
}
